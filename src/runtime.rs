//! Runtime wiring: managers, the tick pipeline, and command dispatch
//!
//! Owns every manager and the in-memory world, advances them in a fixed
//! order each tick, and translates console commands into manager calls.
//! Command output and world feedback come back as printable lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::Vec3;
use tracing::{info, warn};

use elementum_core::{secs_to_ticks, PlayerId, TickClock};
use elementum_game::{
    AbilityCatalog, AbilityEngine, ConversionTask, CooldownManager, DataStore, EffectEvent,
    ElementManager, GameConfig, ManaManager, RollEvent, SideTable, SimWorld, TeamManager,
    TeamSaveData, TrustManager, WorldView, MAX_UPGRADE_LEVEL,
};

use crate::commands::{Command, ConfigAction, Permission, TeamAction};
use crate::settings::ServerSettings;

const TEAMS_FILE: &str = "teams.json";

/// The assembled plugin core plus the simulated host world
pub struct PluginRuntime {
    clock: TickClock,
    config: GameConfig,
    store: DataStore,
    cooldowns: CooldownManager,
    mana: ManaManager,
    trust: TrustManager,
    teams: TeamManager,
    elements: ElementManager,
    engine: AbilityEngine,
    sidetable: SideTable,
    conversion: ConversionTask,
    world: SimWorld,
    names: HashMap<String, PlayerId>,
    labels: HashMap<PlayerId, String>,
    online: Vec<PlayerId>,
    creative_names: Vec<String>,
    teams_file: PathBuf,
    autosave_enabled: bool,
    autosave_interval: u64,
    next_autosave: u64,
    next_regen: u64,
}

impl PluginRuntime {
    pub fn new(settings: &ServerSettings) -> anyhow::Result<Self> {
        let data_dir = settings.storage.resolve_data_dir();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data directory {data_dir:?}"))?;

        let config = GameConfig::default();
        let store = DataStore::open(&data_dir, settings.storage.max_backups);
        let teams_file = data_dir.join(TEAMS_FILE);
        let teams = load_teams(&teams_file, config.max_team_size);

        let autosave_interval = secs_to_ticks(settings.autosave.interval_secs as f32);
        Ok(Self {
            clock: TickClock::new(),
            cooldowns: CooldownManager::new(),
            mana: ManaManager::new(),
            trust: TrustManager::new(config.trust_request_expiry_ticks),
            teams,
            elements: ElementManager::new(AbilityCatalog::from_config(&config)),
            engine: AbilityEngine::new(),
            sidetable: SideTable::new(),
            conversion: ConversionTask::new(config.conversion_interval_ticks),
            world: SimWorld::new(),
            names: HashMap::new(),
            labels: HashMap::new(),
            online: Vec::new(),
            creative_names: settings.game.creative_players.clone(),
            teams_file,
            autosave_enabled: settings.autosave.enabled,
            autosave_interval,
            next_autosave: autosave_interval,
            next_regen: config.regen_interval_ticks,
            config,
            store,
        })
    }

    /// Advance the world by one tick and run every periodic task in a fixed
    /// order: regen, conversion, rolls, abilities, expiry sweeps, autosave.
    pub fn tick(&mut self) -> Vec<String> {
        self.clock.advance();
        let now = self.clock.now();
        let mut lines = Vec::new();

        if now >= self.next_regen {
            self.mana.regen_tick(&mut self.store, &self.online, &self.config);
            self.next_regen = now + self.config.regen_interval_ticks;
        }

        for player in self.conversion.tick(now, &mut self.store, &self.online) {
            lines.push(format!("[{}] raw metal in your pack was refined", self.label(player)));
        }

        let (roll_events, roll_effects) =
            self.elements
                .tick_rolls(now, &mut self.store, &mut self.engine, &mut self.sidetable);
        for event in roll_events {
            match event {
                RollEvent::Display { player, element } => {
                    lines.push(format!("[{}] ... {element}", self.label(player)));
                }
                RollEvent::Committed { player, element } => {
                    lines.push(format!("[{}] the wheel stops on {element}!", self.label(player)));
                }
            }
        }
        self.apply_effects(roll_effects, &mut lines);

        let effects = self.engine.tick(
            now,
            &self.world,
            &mut self.store,
            &self.trust,
            &mut self.sidetable,
        );
        self.apply_effects(effects, &mut lines);

        self.trust.purge_expired(now);
        for entity in self.sidetable.sweep(now) {
            self.world.apply(&EffectEvent::ClearCharm { target: entity });
        }

        if self.autosave_enabled && now >= self.next_autosave {
            let saved = self.store.save_all_dirty();
            self.save_teams();
            if saved > 0 {
                info!("Autosave wrote {} player record(s)", saved);
            }
            self.next_autosave = now + self.autosave_interval;
        }

        lines
    }

    /// Execute one command on behalf of `caller`. Admin commands are refused
    /// for a plain player caller before any state is touched.
    pub fn execute(&mut self, cmd: Command, caller: Permission) -> Vec<String> {
        if cmd.permission() == Permission::Admin && caller != Permission::Admin {
            return vec!["you do not have permission for that command".to_string()];
        }
        match cmd {
            Command::Join { name } => self.handle_join(&name),
            Command::Leave { name } => self.with_player(&name, Self::handle_leave),
            Command::Die { name } => self.with_player(&name, Self::handle_death),
            Command::Roll { name, keep_level } => self.with_player(&name, |rt, p| {
                match rt.elements.start_roll(p, keep_level, rt.clock.now()) {
                    Ok(()) => vec![format!("[{}] the elemental wheel spins...", rt.label(p))],
                    Err(e) => vec![e.to_string()],
                }
            }),
            Command::Use { name, slot } => self.with_player(&name, |rt, p| {
                let result = rt.elements.use_ability(
                    p,
                    slot,
                    rt.clock.now(),
                    &mut rt.store,
                    &mut rt.cooldowns,
                    &rt.mana,
                    &mut rt.engine,
                );
                match result {
                    Ok(ack) => vec![format!("[{}] {ack}", rt.label(p))],
                    Err(e) => vec![e.to_string()],
                }
            }),
            Command::Info { name } => self.with_player(&name, |rt, p| {
                let data = rt.store.load(p);
                let element = data
                    .current_element()
                    .map_or_else(|| "none".to_string(), |e| e.to_string());
                let level = data.upgrade_level();
                let passives: Vec<String> = rt
                    .elements
                    .passives_of(p)
                    .iter()
                    .map(|e| format!("{e:?}"))
                    .collect();
                vec![
                    format!("[{}] element: {element}, level {level}", rt.label(p)),
                    format!("[{}] passives: {}", rt.label(p), passives.join(", ")),
                ]
            }),
            Command::Mana { name } => self.with_player(&name, |rt, p| {
                let pool = rt.store.load(p).mana();
                let tag = if rt.mana.is_creative(p) { " (creative)" } else { "" };
                vec![format!("[{}] mana: {pool}/{}{tag}", rt.label(p), rt.config.max_mana)]
            }),
            Command::Trust { name, target } => self.with_two(&name, &target, |rt, a, b| {
                match rt.trust.request(&mut rt.store, a, b, rt.clock.now()) {
                    Ok(()) => vec![format!(
                        "[{}] trust request sent to {} (expires in {:.0}s)",
                        rt.label(a),
                        rt.label(b),
                        rt.trust.expiry_secs()
                    )],
                    Err(e) => vec![e.to_string()],
                }
            }),
            Command::Accept { name, requester } => self.with_two(&name, &requester, |rt, a, b| {
                match rt.trust.accept(&mut rt.store, a, b, rt.clock.now()) {
                    Ok(()) => vec![format!(
                        "[{}] you and {} now trust each other",
                        rt.label(a),
                        rt.label(b)
                    )],
                    Err(e) => vec![e.to_string()],
                }
            }),
            Command::Deny { name, requester } => self.with_two(&name, &requester, |rt, a, b| {
                match rt.trust.deny(a, b) {
                    Ok(()) => vec![format!("[{}] request from {} denied", rt.label(a), rt.label(b))],
                    Err(e) => vec![e.to_string()],
                }
            }),
            Command::Untrust { name, target } => self.with_two(&name, &target, |rt, a, b| {
                if rt.trust.remove_trust(&mut rt.store, a, b) {
                    vec![format!("[{}] no longer trusts {}", rt.label(a), rt.label(b))]
                } else {
                    vec![format!("[{}] did not trust {}", rt.label(a), rt.label(b))]
                }
            }),
            Command::TrustList { name } => self.with_player(&name, |rt, p| {
                let trusted = rt.trust.trusted_list(&mut rt.store, p);
                let labels: Vec<String> = trusted.iter().map(|&t| rt.label(t)).collect();
                vec![format!("[{}] trusts: {}", rt.label(p), labels.join(", "))]
            }),
            Command::Grant { name, element } => self.with_player(&name, |rt, p| {
                if rt.store.load_mut(p).add_element_item(element) {
                    vec![format!("[{}] received a {element} focus", rt.label(p))]
                } else {
                    vec![format!("[{}] already holds a {element} focus", rt.label(p))]
                }
            }),
            Command::Upgrade { name } => self.with_player(&name, Self::handle_upgrade),
            Command::Team { name, action } => {
                self.with_player(&name, |rt, p| rt.handle_team(p, action))
            }
            Command::SetElement { name, element } => self.with_player(&name, |rt, p| {
                rt.elements
                    .set_element(p, element, &mut rt.store, &mut rt.engine, &mut rt.sidetable);
                let shown = element.map_or_else(|| "none".to_string(), |e| e.to_string());
                vec![format!("[{}] element set to {shown}", rt.label(p))]
            }),
            Command::SetLevel { name, level } => self.with_player(&name, |rt, p| {
                rt.store.load_mut(p).set_upgrade_level(level);
                let actual = rt.store.load(p).upgrade_level();
                vec![format!("[{}] upgrade level set to {actual}", rt.label(p))]
            }),
            Command::SetMana { name, amount } => self.with_player(&name, |rt, p| {
                rt.mana.set_mana(&mut rt.store, p, amount, &rt.config);
                vec![format!("[{}] mana set to {}", rt.label(p), rt.store.load(p).mana())]
            }),
            Command::Creative { name, enabled } => self.with_player(&name, |rt, p| {
                rt.mana.set_creative(p, enabled);
                vec![format!(
                    "[{}] creative mode {}",
                    rt.label(p),
                    if enabled { "on" } else { "off" }
                )]
            }),
            Command::Config { action } => self.handle_config(action),
            Command::Save => {
                let saved = self.store.save_all_dirty();
                self.save_teams();
                vec![format!("saved {saved} dirty player record(s) and the team roster")]
            }
            Command::Backup => match self.store.create_backup() {
                Some(path) => vec![format!("backup written to {path:?}")],
                None => vec!["no player store on disk to back up".to_string()],
            },
            Command::Stats => vec![format!(
                "tick {}: {} online, {} cached records ({} dirty), {} teams, {} active abilities, {} charms",
                self.clock.now(),
                self.online.len(),
                self.store.cached_count(),
                self.store.dirty_count(),
                self.teams.team_count(),
                self.engine.active_count(),
                self.sidetable.len(),
            )],
            Command::Help => vec![Command::help_text().to_string()],
            Command::Exit => Vec::new(),
        }
    }

    /// Flush everything to disk. Called on shutdown.
    pub fn shutdown(&mut self) {
        let saved = self.store.save_all_dirty();
        self.save_teams();
        info!("Shutdown: {} player record(s) flushed", saved);
    }

    fn handle_join(&mut self, name: &str) -> Vec<String> {
        let id = *self
            .names
            .entry(name.to_string())
            .or_insert_with(PlayerId::new);
        self.labels.insert(id, name.to_string());

        if self.online.contains(&id) {
            return vec![format!("{name} is already online")];
        }
        if self.world.player_entity(id).is_some() {
            self.world.set_online(id, true);
        } else {
            let n = self.names.len() as f32;
            self.world.spawn_player(id, Vec3::new(n * 2.0, 0.0, 0.0));
        }
        self.online.push(id);
        if self.creative_names.iter().any(|n| n == name) {
            self.mana.set_creative(id, true);
        }

        // Warm the cache and re-apply passives for the stored element
        let element = self.store.load(id).current_element();
        self.elements.apply_upsides(&mut self.store, id);
        info!("{} joined as {}", name, id);
        match element {
            Some(e) => vec![format!("{name} joined (element: {e})")],
            None => vec![format!("{name} joined (no element yet; try roll)")],
        }
    }

    fn handle_leave(&mut self, player: PlayerId) -> Vec<String> {
        let mut lines = Vec::new();
        self.elements.cancel_roll(player);
        let effects = self
            .elements
            .clear_effects(player, &mut self.engine, &mut self.sidetable);
        self.apply_effects(effects, &mut lines);
        self.cooldowns.clear(player);
        self.store.save(player);
        self.world.set_online(player, false);
        self.online.retain(|&p| p != player);
        lines.push(format!("{} left; record saved", self.label(player)));
        lines
    }

    fn handle_death(&mut self, player: PlayerId) -> Vec<String> {
        let mut lines = Vec::new();
        let effects = self
            .elements
            .clear_effects(player, &mut self.engine, &mut self.sidetable);
        self.apply_effects(effects, &mut lines);
        // Passives survive death; only running abilities stop
        self.elements.apply_upsides(&mut self.store, player);
        if let Some(entity) = self.world.player_entity(player) {
            self.world.set_health(entity, 20.0);
        }
        lines.push(format!("{} died and respawned", self.label(player)));
        lines
    }

    fn handle_upgrade(&mut self, player: PlayerId) -> Vec<String> {
        let data = self.store.load_mut(player);
        let Some(element) = data.current_element() else {
            return vec!["no element to upgrade".to_string()];
        };
        let level = data.upgrade_level();
        if level >= MAX_UPGRADE_LEVEL {
            return vec![format!("{element} is already at level {MAX_UPGRADE_LEVEL}")];
        }
        if !data.remove_element_item(element) {
            return vec![format!("upgrading needs a {element} focus")];
        }
        data.set_upgrade_level(level as i32 + 1);
        vec![format!(
            "[{}] {element} upgraded to level {}",
            self.label(player),
            level + 1
        )]
    }

    fn handle_team(&mut self, player: PlayerId, action: TeamAction) -> Vec<String> {
        let result = match action {
            TeamAction::Create { team } => self
                .teams
                .create(player, &team)
                .map(|id| format!("team '{team}' created ({id:?})")),
            TeamAction::Invite { target } => match self.resolve(&target) {
                Some(t) => self
                    .teams
                    .invite(player, t)
                    .map(|_| format!("{target} invited")),
                None => Ok(format!("unknown player '{target}'")),
            },
            TeamAction::Join { team } => match self.teams.find_by_name(&team).map(|t| t.id) {
                Some(id) => self
                    .teams
                    .accept_invite(player, id)
                    .map(|()| format!("joined '{team}'")),
                None => Ok(format!("no team named '{team}'")),
            },
            TeamAction::Leave => self.teams.leave(player).map(|()| "left the team".to_string()),
            TeamAction::Kick { target } => match self.resolve(&target) {
                Some(t) => self.teams.kick(player, t).map(|()| format!("{target} kicked")),
                None => Ok(format!("unknown player '{target}'")),
            },
            TeamAction::Disband => self
                .teams
                .disband(player)
                .map(|()| "team disbanded".to_string()),
            TeamAction::Rename { team } => self
                .teams
                .rename(player, &team)
                .map(|()| format!("team renamed to '{team}'")),
            TeamAction::Color { color } => {
                let style = self
                    .teams
                    .team_of(player)
                    .map(|t| t.style)
                    .map(|mut s| {
                        s.color = color;
                        s
                    })
                    .unwrap_or_default();
                self.teams
                    .set_style(player, style)
                    .map(|()| format!("team color set to {}", color.name()))
            }
            TeamAction::Ally { team } => match self.teams.find_by_name(&team).map(|t| t.id) {
                Some(id) => self
                    .teams
                    .add_ally(player, id)
                    .map(|()| format!("allied with '{team}'")),
                None => Ok(format!("no team named '{team}'")),
            },
            TeamAction::Unally => self
                .teams
                .remove_ally(player)
                .map(|()| "alliance dissolved".to_string()),
            TeamAction::Info => {
                return match self.teams.team_of(player) {
                    Some(team) => {
                        let members: Vec<String> =
                            team.members.iter().map(|&m| self.label(m)).collect();
                        vec![format!(
                            "team '{}' ({}): {}",
                            team.name,
                            team.style.color.name(),
                            members.join(", ")
                        )]
                    }
                    None => vec!["not in a team".to_string()],
                };
            }
        };
        match result {
            Ok(line) => vec![line],
            Err(e) => vec![e.to_string()],
        }
    }

    fn handle_config(&mut self, action: ConfigAction) -> Vec<String> {
        match action {
            ConfigAction::View => vec![
                format!(
                    "max_mana {}, mana_regen {}, regen_interval_ticks {}",
                    self.config.max_mana, self.config.mana_regen, self.config.regen_interval_ticks
                ),
                format!(
                    "max_team_size {}, trust_request_expiry_ticks {}, conversion_interval_ticks {}",
                    self.config.max_team_size,
                    self.config.trust_request_expiry_ticks,
                    self.config.conversion_interval_ticks
                ),
                format!("{} ability definitions loaded", self.config.abilities.len()),
            ],
            ConfigAction::Set { key, value } => {
                let parsed: u64 = match value.parse() {
                    Ok(v) => v,
                    Err(_) => return vec![format!("'{value}' is not a number")],
                };
                match key.as_str() {
                    "max_mana" => self.config.max_mana = parsed as u32,
                    "mana_regen" => self.config.mana_regen = parsed as u32,
                    "regen_interval_ticks" => self.config.regen_interval_ticks = parsed,
                    other => {
                        return vec![format!("'{other}' is not adjustable at runtime")];
                    }
                }
                vec![format!("{key} set to {parsed}")]
            }
            ConfigAction::Reload => {
                // Rebuilding the catalog drops in-flight rolls and passive
                // sets; running ability instances keep their old definitions
                self.config = GameConfig::default();
                self.elements = ElementManager::new(AbilityCatalog::from_config(&self.config));
                for &player in &self.online.clone() {
                    self.elements.apply_upsides(&mut self.store, player);
                }
                vec!["balance values reloaded from defaults".to_string()]
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<EffectEvent>, lines: &mut Vec<String>) {
        for event in effects {
            self.world.apply(&event);
            match &event {
                EffectEvent::Message { player, text } => {
                    lines.push(format!("[{}] {text}", self.label(*player)));
                }
                EffectEvent::Charm { target, owner } => {
                    lines.push(format!("entity {target:?} now fights for {}", self.label(*owner)));
                }
                EffectEvent::ClearCharm { target } => {
                    lines.push(format!("entity {target:?} shakes off the charm"));
                }
                _ => {}
            }
        }
    }

    fn resolve(&self, name: &str) -> Option<PlayerId> {
        self.names.get(name).copied()
    }

    fn label(&self, player: PlayerId) -> String {
        self.labels
            .get(&player)
            .cloned()
            .unwrap_or_else(|| player.to_string())
    }

    fn with_player(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self, PlayerId) -> Vec<String>,
    ) -> Vec<String> {
        match self.resolve(name) {
            Some(p) => f(self, p),
            None => vec![format!("unknown player '{name}' (join them first)")],
        }
    }

    fn with_two(
        &mut self,
        a: &str,
        b: &str,
        f: impl FnOnce(&mut Self, PlayerId, PlayerId) -> Vec<String>,
    ) -> Vec<String> {
        let Some(a_id) = self.resolve(a) else {
            return vec![format!("unknown player '{a}'")];
        };
        let Some(b_id) = self.resolve(b) else {
            return vec![format!("unknown player '{b}'")];
        };
        f(self, a_id, b_id)
    }

    fn save_teams(&self) {
        let data = self.teams.to_save_data();
        match serde_json::to_string_pretty(&data) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.teams_file, json) {
                    warn!("Failed to write {:?}: {}", self.teams_file, e);
                }
            }
            Err(e) => warn!("Failed to serialize team roster: {}", e),
        }
    }
}

fn load_teams(path: &Path, max_size: usize) -> TeamManager {
    if !path.exists() {
        return TeamManager::new(max_size);
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<TeamSaveData>(&content) {
            Ok(data) => {
                let teams = TeamManager::from_save_data(&data, max_size);
                info!("Restored {} team(s) from {:?}", teams.team_count(), path);
                teams
            }
            Err(e) => {
                warn!("Corrupt team roster {:?} ({}), starting empty", path, e);
                TeamManager::new(max_size)
            }
        },
        Err(e) => {
            warn!("Failed to read {:?} ({}), starting empty", path, e);
            TeamManager::new(max_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AutosaveSettings, StorageSettings};

    fn runtime_in(dir: &std::path::Path) -> PluginRuntime {
        let settings = ServerSettings {
            storage: StorageSettings {
                data_dir: Some(dir.to_path_buf()),
                max_backups: 3,
            },
            autosave: AutosaveSettings {
                enabled: true,
                interval_secs: 1,
            },
            ..Default::default()
        };
        PluginRuntime::new(&settings).unwrap()
    }

    fn run(rt: &mut PluginRuntime, line: &str) -> Vec<String> {
        rt.execute(Command::parse(line).unwrap(), Permission::Admin)
    }

    #[test]
    fn test_join_roll_and_use_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join alice");
        run(&mut rt, "set alice fire");
        run(&mut rt, "manaset alice 100");

        let out = run(&mut rt, "use alice primary");
        assert!(out[0].contains("activated"), "{out:?}");

        // A second activation while the first runs is rejected
        let out = run(&mut rt, "use alice primary");
        assert!(out[0].contains("already active"), "{out:?}");
    }

    #[test]
    fn test_use_spends_mana_and_starts_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join alice");
        run(&mut rt, "set alice fire");
        run(&mut rt, "manaset alice 100");
        run(&mut rt, "use alice primary");

        let id = rt.resolve("alice").unwrap();
        assert_eq!(rt.store.load(id).mana(), 60);
        assert!(rt
            .cooldowns
            .remaining(id, "Flame Burst", rt.clock.now())
            .is_some());
    }

    #[test]
    fn test_admin_commands_refused_for_players() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join alice");
        let cmd = Command::parse("set alice fire").unwrap();
        let out = rt.execute(cmd, Permission::Player);
        assert!(out[0].contains("permission"), "{out:?}");

        let id = rt.resolve("alice").unwrap();
        assert_eq!(rt.store.load(id).current_element(), None);

        // Player-level commands still go through
        let out = rt.execute(Command::parse("mana alice").unwrap(), Permission::Player);
        assert!(out[0].contains("mana"), "{out:?}");
    }

    #[test]
    fn test_unknown_player_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());
        let out = run(&mut rt, "mana ghost");
        assert!(out[0].contains("unknown player"), "{out:?}");
    }

    #[test]
    fn test_roll_commits_via_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join bob");
        run(&mut rt, "roll bob");
        for _ in 0..1000 {
            rt.tick();
        }
        let id = rt.resolve("bob").unwrap();
        assert!(rt.store.load(id).current_element().is_some());
    }

    #[test]
    fn test_upgrade_consumes_focus_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join alice");
        run(&mut rt, "set alice frost");
        let out = run(&mut rt, "upgrade alice");
        assert!(out[0].contains("needs"), "{out:?}");

        run(&mut rt, "grant alice frost");
        let out = run(&mut rt, "upgrade alice");
        assert!(out[0].contains("level 1"), "{out:?}");

        // The focus was consumed
        let out = run(&mut rt, "upgrade alice");
        assert!(out[0].contains("needs"), "{out:?}");
    }

    #[test]
    fn test_leave_saves_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime_in(dir.path());

        run(&mut rt, "join carol");
        run(&mut rt, "set carol earth");
        run(&mut rt, "leave carol");
        let id = rt.resolve("carol").unwrap();
        assert!(!rt.store.load(id).is_dirty());
    }

    #[test]
    fn test_team_roster_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut rt = runtime_in(dir.path());
            run(&mut rt, "join alice");
            run(&mut rt, "team create alice Ravens");
            rt.shutdown();
        }

        let rt = runtime_in(dir.path());
        assert_eq!(rt.teams.team_count(), 1);
        assert!(rt.teams.find_by_name("Ravens").is_some());
    }
}
