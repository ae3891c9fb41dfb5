//! Ability runtime: activation gates and the per-tick state machine
//!
//! Each activation becomes an [`ActiveAbility`] instance driven only by the
//! external tick clock. An instance re-validates its caster every sweep,
//! recomputes targets, filters them through the one shared
//! [`is_valid_target`] predicate, and terminates on its duration bound, on
//! caster loss, or on explicit cancellation.

use std::collections::HashMap;

use glam::Vec3;
use tracing::debug;

use elementum_core::{secs_to_ticks, PlayerId};

use crate::ability::{AbilityDef, AbilityError, AbilityKey, EffectKind, TargetShape};
use crate::cooldown::{CooldownManager, CooldownStatus};
use crate::mana::ManaManager;
use crate::sidetable::SideTable;
use crate::store::DataStore;
use crate::trust::TrustManager;
use crate::world::{EffectEvent, EntitySnapshot, WorldView};

/// The one targeting predicate every ability runs each candidate through.
/// Dead or offline entities are dropped, the caster is excluded unless the
/// ability targets self, and players the caster trusts are protected.
pub fn is_valid_target(
    caster: PlayerId,
    target: &EntitySnapshot,
    affects_self: bool,
    store: &mut DataStore,
    trust: &TrustManager,
) -> bool {
    if !target.alive {
        return false;
    }
    match target.player {
        Some(p) if p == caster => affects_self,
        Some(p) => !trust.is_trusted(store, caster, p),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbilityState {
    Active,
    Terminated,
}

/// One running ability instance
#[derive(Debug)]
struct ActiveAbility {
    def: AbilityDef,
    caster: PlayerId,
    level: u8,
    /// Tick at which the duration bound is reached
    ends_at: u64,
    /// Next target sweep
    next_sweep: u64,
    sweeps_run: u32,
    /// Single application, then done
    one_shot: bool,
    state: AbilityState,
}

/// Owns every active ability instance and advances them once per tick
#[derive(Debug, Default)]
pub struct AbilityEngine {
    active: HashMap<(PlayerId, AbilityKey), ActiveAbility>,
}

impl AbilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every gate in order and activate on success. Gate failures leave
    /// no state behind: the cooldown is the last check before the spend, and
    /// affordability is verified read-only first, so a rejected invocation
    /// never costs mana and never burns a cooldown.
    pub fn try_activate(
        &mut self,
        caster: PlayerId,
        def: &AbilityDef,
        level: u8,
        now: u64,
        store: &mut DataStore,
        mana: &ManaManager,
        cooldowns: &mut CooldownManager,
    ) -> Result<(), AbilityError> {
        let key = (caster, def.key());
        if self.active.contains_key(&key) {
            return Err(AbilityError::AlreadyActive {
                name: def.name.clone(),
            });
        }
        if level < def.required_level {
            return Err(AbilityError::UpgradeRequired {
                name: def.name.clone(),
                required: def.required_level,
                have: level,
            });
        }
        if !mana.has_mana(store, caster, def.mana_cost) {
            return Err(AbilityError::InsufficientMana {
                cost: def.mana_cost,
                have: store.load(caster).mana(),
            });
        }
        if let CooldownStatus::Cooling { remaining_secs } =
            cooldowns.try_use_ability(caster, &def.name, def.cooldown_secs, now)
        {
            return Err(AbilityError::OnCooldown {
                name: def.name.clone(),
                remaining_secs,
            });
        }
        // Affordability was just verified and nothing can interleave on the
        // tick sequence, so the spend must succeed.
        let spent = mana.spend(store, caster, def.mana_cost);
        debug_assert!(spent, "spend failed after affordability check");

        let one_shot = def.duration_ticks == 0;
        self.active.insert(
            key,
            ActiveAbility {
                def: def.clone(),
                caster,
                level,
                ends_at: now + def.duration_ticks,
                next_sweep: now,
                sweeps_run: 0,
                one_shot,
                state: AbilityState::Active,
            },
        );
        debug!("{} activated {} at tick {}", caster, def.name, now);
        Ok(())
    }

    /// Whether `key` is currently running for `player`
    pub fn is_active(&self, player: PlayerId, key: AbilityKey) -> bool {
        self.active.contains_key(&(player, key))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Advance every instance by one tick, returning the effects for the
    /// host to apply
    pub fn tick(
        &mut self,
        now: u64,
        world: &dyn WorldView,
        store: &mut DataStore,
        trust: &TrustManager,
        sidetable: &mut SideTable,
    ) -> Vec<EffectEvent> {
        let mut events = Vec::new();
        let keys: Vec<(PlayerId, AbilityKey)> = self.active.keys().copied().collect();

        for key in keys {
            let (caster, level, def, next_sweep, ends_at, one_shot, sweeps_run) = {
                let inst = match self.active.get(&key) {
                    Some(inst) => inst,
                    None => continue,
                };
                (
                    inst.caster,
                    inst.level,
                    inst.def.clone(),
                    inst.next_sweep,
                    inst.ends_at,
                    inst.one_shot,
                    inst.sweeps_run,
                )
            };

            // Caster validity comes before anything else; a disconnected or
            // dead caster cancels the instance instead of erroring.
            if !world.is_online(caster) || !world.is_alive(caster) {
                events.extend(self.terminate(key, sidetable));
                continue;
            }

            let mut swept = false;
            if now >= next_sweep {
                let apply = sweeps_run % def.effect_every.max(1) == 0;
                if apply {
                    self.run_sweep(&def, caster, level, ends_at, world, store, trust, sidetable, &mut events);
                }
                swept = true;
            }

            if let Some(inst) = self.active.get_mut(&key) {
                if swept {
                    inst.sweeps_run += 1;
                    inst.next_sweep = now + def.period_ticks.max(1);
                }
            }

            if one_shot && swept {
                events.extend(self.terminate(key, sidetable));
            } else if now >= ends_at {
                events.extend(self.terminate(key, sidetable));
            }
        }

        events
    }

    #[allow(clippy::too_many_arguments)]
    fn run_sweep(
        &self,
        def: &AbilityDef,
        caster: PlayerId,
        level: u8,
        ends_at: u64,
        world: &dyn WorldView,
        store: &mut DataStore,
        trust: &TrustManager,
        sidetable: &mut SideTable,
        events: &mut Vec<EffectEvent>,
    ) {
        let Some(caster_pos) = world.position(caster) else {
            return;
        };
        let affects_self = matches!(def.shape, TargetShape::SelfOnly);

        let candidates: Vec<EntitySnapshot> = match def.shape {
            TargetShape::Radius { radius } => world.entities_within(caster_pos, radius),
            TargetShape::Ray { range } => {
                let Some(dir) = world.facing(caster) else {
                    return;
                };
                world.ray_trace(caster_pos, dir, range).into_iter().collect()
            }
            TargetShape::SelfOnly => {
                let Some(entity) = world.player_entity(caster) else {
                    return;
                };
                vec![EntitySnapshot {
                    entity,
                    player: Some(caster),
                    position: caster_pos,
                    alive: true,
                }]
            }
        };

        let multiplier = def.level_multiplier(level);
        for target in candidates {
            if !is_valid_target(caster, &target, affects_self, store, trust) {
                continue;
            }
            self.apply_effect(
                def, caster, caster_pos, multiplier, &target, ends_at, world, sidetable, events,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_effect(
        &self,
        def: &AbilityDef,
        caster: PlayerId,
        caster_pos: Vec3,
        multiplier: f32,
        target: &EntitySnapshot,
        ends_at: u64,
        world: &dyn WorldView,
        sidetable: &mut SideTable,
        events: &mut Vec<EffectEvent>,
    ) {
        match def.effect {
            EffectKind::Damage { amount } => {
                events.push(EffectEvent::Damage {
                    target: target.entity,
                    amount: amount * multiplier,
                });
            }
            EffectKind::Launch { velocity } => {
                let away = (target.position - caster_pos).normalize_or_zero();
                let v = velocity * multiplier;
                events.push(EffectEvent::Launch {
                    target: target.entity,
                    velocity: away * v + Vec3::new(0.0, 0.6 * v, 0.0),
                });
            }
            EffectKind::Pull { strength } => {
                let toward = (caster_pos - target.position).normalize_or_zero();
                events.push(EffectEvent::Launch {
                    target: target.entity,
                    velocity: toward * strength * multiplier,
                });
            }
            EffectKind::Slow { factor, duration_secs } => {
                events.push(EffectEvent::Slow {
                    target: target.entity,
                    factor: (factor * multiplier).min(1.0),
                    duration_ticks: secs_to_ticks(duration_secs),
                });
            }
            EffectKind::Drain { amount } => {
                events.push(EffectEvent::Damage {
                    target: target.entity,
                    amount: amount * multiplier,
                });
                if let Some(caster_entity) = world.player_entity(caster) {
                    events.push(EffectEvent::Heal {
                        target: caster_entity,
                        amount: amount * multiplier * 0.5,
                    });
                }
            }
            EffectKind::HealSelf { amount } => {
                events.push(EffectEvent::Heal {
                    target: target.entity,
                    amount: amount * multiplier,
                });
            }
            EffectKind::Charm => {
                // Charming a player makes no sense; only free-willed mobs
                if target.player.is_some() {
                    return;
                }
                let already = sidetable.is_charmed_by(target.entity, caster);
                sidetable.set_charm(target.entity, caster, ends_at);
                if !already {
                    events.push(EffectEvent::Charm {
                        target: target.entity,
                        owner: caster,
                    });
                }
            }
        }
    }

    /// Move one instance to Terminated and drop it, emitting any cleanup the
    /// host must perform (charm release)
    fn terminate(
        &mut self,
        key: (PlayerId, AbilityKey),
        sidetable: &mut SideTable,
    ) -> Vec<EffectEvent> {
        let Some(mut inst) = self.active.remove(&key) else {
            return Vec::new();
        };
        inst.state = AbilityState::Terminated;
        debug!("{} ability {} terminated", inst.caster, inst.def.name);

        if matches!(inst.def.effect, EffectKind::Charm) {
            sidetable
                .clear_owner(inst.caster)
                .into_iter()
                .map(|target| EffectEvent::ClearCharm { target })
                .collect()
        } else {
            Vec::new()
        }
    }

    /// External forced cleanup: death, element change, disconnect. Halts
    /// every instance belonging to `player` immediately.
    pub fn deactivate_player(
        &mut self,
        player: PlayerId,
        sidetable: &mut SideTable,
    ) -> Vec<EffectEvent> {
        let keys: Vec<(PlayerId, AbilityKey)> = self
            .active
            .keys()
            .filter(|(caster, _)| *caster == player)
            .copied()
            .collect();

        let mut events = Vec::new();
        for key in keys {
            events.extend(self.terminate(key, sidetable));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilitySlot;
    use crate::element::Element;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: DataStore,
        mana: ManaManager,
        cooldowns: CooldownManager,
        trust: TrustManager,
        sidetable: SideTable,
        engine: AbilityEngine,
        world: crate::sim::SimWorld,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        Fixture {
            store: DataStore::open(dir.path(), 3),
            _dir: dir,
            mana: ManaManager::new(),
            cooldowns: CooldownManager::new(),
            trust: TrustManager::new(6000),
            sidetable: SideTable::new(),
            engine: AbilityEngine::new(),
            world: crate::sim::SimWorld::new(),
        }
    }

    fn area_damage_def() -> AbilityDef {
        AbilityDef {
            element: Element::Fire,
            slot: AbilitySlot::Primary,
            name: "Flame Burst".to_string(),
            required_level: 0,
            mana_cost: 40,
            cooldown_secs: 10.0,
            duration_ticks: 100,
            period_ticks: 10,
            effect_every: 1,
            shape: TargetShape::Radius { radius: 5.0 },
            effect: EffectKind::Damage { amount: 3.0 },
            per_level_bonus: 0.5,
        }
    }

    fn one_shot_def() -> AbilityDef {
        AbilityDef {
            duration_ticks: 0,
            period_ticks: 1,
            ..area_damage_def()
        }
    }

    fn caster_with_mana(f: &mut Fixture, amount: u32) -> PlayerId {
        let p = PlayerId::new();
        f.world.spawn_player(p, Vec3::ZERO);
        f.store.load_mut(p).set_mana(amount);
        p
    }

    fn activate(f: &mut Fixture, caster: PlayerId, def: &AbilityDef, level: u8, now: u64) -> Result<(), AbilityError> {
        f.engine
            .try_activate(caster, def, level, now, &mut f.store, &f.mana, &mut f.cooldowns)
    }

    fn run_tick(f: &mut Fixture, now: u64) -> Vec<EffectEvent> {
        f.engine
            .tick(now, &f.world, &mut f.store, &f.trust, &mut f.sidetable)
    }

    #[test]
    fn test_insufficient_mana_leaves_everything_untouched() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 40);
        let def = AbilityDef { mana_cost: 50, ..area_damage_def() };

        let err = activate(&mut f, caster, &def, 0, 0).unwrap_err();
        assert_eq!(err, AbilityError::InsufficientMana { cost: 50, have: 40 });
        assert_eq!(f.store.load(caster).mana(), 40);
        assert_eq!(f.cooldowns.remaining(caster, &def.name, 0), None);
        assert_eq!(f.engine.active_count(), 0);
    }

    #[test]
    fn test_upgrade_gate_spends_nothing() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let def = AbilityDef { required_level: 1, ..area_damage_def() };

        let err = activate(&mut f, caster, &def, 0, 0).unwrap_err();
        assert!(matches!(err, AbilityError::UpgradeRequired { required: 1, have: 0, .. }));
        assert_eq!(f.store.load(caster).mana(), 100);
    }

    #[test]
    fn test_successful_activation_deducts_once() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let def = area_damage_def();

        activate(&mut f, caster, &def, 0, 0).unwrap();
        assert_eq!(f.store.load(caster).mana(), 60);
        assert!(f.engine.is_active(caster, def.key()));
    }

    #[test]
    fn test_reentry_rejected_until_terminated() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let def = area_damage_def();

        activate(&mut f, caster, &def, 0, 0).unwrap();
        let err = activate(&mut f, caster, &def, 0, 1).unwrap_err();
        assert!(matches!(err, AbilityError::AlreadyActive { .. }));
        // Only the first activation paid
        assert_eq!(f.store.load(caster).mana(), 60);
    }

    #[test]
    fn test_cooldown_rejection_after_termination() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let def = one_shot_def();

        activate(&mut f, caster, &def, 0, 0).unwrap();
        run_tick(&mut f, 0); // one-shot applies and terminates
        assert_eq!(f.engine.active_count(), 0);

        let err = activate(&mut f, caster, &def, 0, 5).unwrap_err();
        match err {
            AbilityError::OnCooldown { remaining_secs, .. } => assert!(remaining_secs > 0.0),
            other => panic!("expected cooldown rejection, got {other:?}"),
        }
        // The rejection costs nothing
        assert_eq!(f.store.load(caster).mana(), 60);
    }

    #[test]
    fn test_area_effect_respects_trust() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let trusted = PlayerId::new();
        let untrusted = PlayerId::new();
        let trusted_entity = f.world.spawn_player(trusted, Vec3::new(2.0, 0.0, 0.0));
        let untrusted_entity = f.world.spawn_player(untrusted, Vec3::new(3.0, 0.0, 0.0));
        f.trust.add_trust(&mut f.store, caster, trusted);

        activate(&mut f, caster, &area_damage_def(), 0, 0).unwrap();
        let events = run_tick(&mut f, 0);

        let damaged: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::Damage { target, .. } => Some(*target),
                _ => None,
            })
            .collect();
        assert!(damaged.contains(&untrusted_entity));
        assert!(!damaged.contains(&trusted_entity));
    }

    #[test]
    fn test_caster_not_hit_by_own_area() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let caster_entity = f.world.player_entity(caster).unwrap();

        activate(&mut f, caster, &area_damage_def(), 0, 0).unwrap();
        let events = run_tick(&mut f, 0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, EffectEvent::Damage { target, .. } if *target == caster_entity)));
    }

    #[test]
    fn test_dead_targets_dropped_without_error() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let mob = f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));
        f.world.set_health(mob, 0.0);

        activate(&mut f, caster, &area_damage_def(), 0, 0).unwrap();
        let events = run_tick(&mut f, 0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, EffectEvent::Damage { target, .. } if *target == mob)));
    }

    #[test]
    fn test_one_shot_applies_once() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let mob = f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));

        activate(&mut f, caster, &one_shot_def(), 0, 0).unwrap();
        let first = run_tick(&mut f, 0);
        assert_eq!(
            first
                .iter()
                .filter(|e| matches!(e, EffectEvent::Damage { target, .. } if *target == mob))
                .count(),
            1
        );
        assert_eq!(f.engine.active_count(), 0);
        assert!(run_tick(&mut f, 1).is_empty());
    }

    #[test]
    fn test_duration_bound_terminates() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let def = AbilityDef { duration_ticks: 20, period_ticks: 10, ..area_damage_def() };

        activate(&mut f, caster, &def, 0, 0).unwrap();
        for t in 0..=20 {
            run_tick(&mut f, t);
        }
        assert_eq!(f.engine.active_count(), 0);
    }

    #[test]
    fn test_damage_tick_gating() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let mob = f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));
        // Sweeps every 10 ticks for 40 ticks, damage on every 2nd sweep:
        // sweeps at t=0,10,20,30,40 but damage only at t=0,20,40
        let def = AbilityDef {
            duration_ticks: 40,
            period_ticks: 10,
            effect_every: 2,
            ..area_damage_def()
        };

        activate(&mut f, caster, &def, 0, 0).unwrap();
        let mut hits = 0;
        for t in 0..=40 {
            let events = run_tick(&mut f, t);
            hits += events
                .iter()
                .filter(|e| matches!(e, EffectEvent::Damage { target, .. } if *target == mob))
                .count();
        }
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_caster_disconnect_cancels_all_instances() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));

        activate(&mut f, caster, &area_damage_def(), 0, 0).unwrap();
        f.world.set_online(caster, false);
        run_tick(&mut f, 10);
        assert_eq!(f.engine.active_count(), 0);
    }

    #[test]
    fn test_charm_records_and_clears() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let mob = f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));
        let bystander = PlayerId::new();
        f.world.spawn_player(bystander, Vec3::new(1.0, 0.0, 0.0));
        let def = AbilityDef {
            duration_ticks: 40,
            period_ticks: 10,
            effect: EffectKind::Charm,
            shape: TargetShape::Radius { radius: 5.0 },
            ..area_damage_def()
        };

        activate(&mut f, caster, &def, 0, 0).unwrap();
        let events = run_tick(&mut f, 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, EffectEvent::Charm { target, .. } if *target == mob)));
        // Players are never charmed
        assert_eq!(
            events.iter().filter(|e| matches!(e, EffectEvent::Charm { .. })).count(),
            1
        );
        assert!(f.sidetable.is_charmed_by(mob, caster));

        let cleanup = f.engine.deactivate_player(caster, &mut f.sidetable);
        assert!(cleanup
            .iter()
            .any(|e| matches!(e, EffectEvent::ClearCharm { target } if *target == mob)));
        assert!(f.sidetable.is_empty());
    }

    #[test]
    fn test_ray_hits_first_entity_only() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        f.world.set_facing(caster, Vec3::new(1.0, 0.0, 0.0));
        let near = f.world.spawn_mob(Vec3::new(4.0, 0.0, 0.0));
        let far = f.world.spawn_mob(Vec3::new(9.0, 0.0, 0.0));
        let def = AbilityDef {
            shape: TargetShape::Ray { range: 14.0 },
            duration_ticks: 0,
            period_ticks: 1,
            ..area_damage_def()
        };

        activate(&mut f, caster, &def, 0, 0).unwrap();
        let events = run_tick(&mut f, 0);
        let damaged: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::Damage { target, .. } => Some(*target),
                _ => None,
            })
            .collect();
        assert_eq!(damaged, vec![near]);
        assert!(!damaged.contains(&far));
    }

    #[test]
    fn test_level_scales_magnitude() {
        let mut f = fixture();
        let caster = caster_with_mana(&mut f, 100);
        let mob = f.world.spawn_mob(Vec3::new(2.0, 0.0, 0.0));

        activate(&mut f, caster, &one_shot_def(), 2, 0).unwrap();
        let events = run_tick(&mut f, 0);
        let amount = events
            .iter()
            .find_map(|e| match e {
                EffectEvent::Damage { target, amount } if *target == mob => Some(*amount),
                _ => None,
            })
            .unwrap();
        // 3.0 base, +50% per level above requirement 0, level 2 -> 2.0x
        assert!((amount - 6.0).abs() < 1e-5);
    }
}
