//! Gameplay configuration
//!
//! Balance numbers for mana, teams, trust, persistence cadence, and the
//! per-element ability tables. Loaded by the settings layer; read-only to the
//! core at runtime.

use serde::{Deserialize, Serialize};

use crate::ability::{AbilityDef, AbilitySlot, EffectKind, TargetShape};
use crate::element::Element;

/// All tunable gameplay values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Mana pool cap
    pub max_mana: u32,
    /// Mana gained per regen interval
    pub mana_regen: u32,
    /// Ticks between regen pulses
    pub regen_interval_ticks: u64,
    /// Members per team, including the leader
    pub max_team_size: usize,
    /// How long a trust request stays pending
    pub trust_request_expiry_ticks: u64,
    /// Backups kept before pruning
    pub max_backups: usize,
    /// Ticks between dirty-record save sweeps
    pub autosave_interval_ticks: u64,
    /// Ticks between item auto-conversion passes
    pub conversion_interval_ticks: u64,
    /// The shipped ability tables, one per (element, slot)
    pub abilities: Vec<AbilityDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_mana: 100,
            mana_regen: 5,
            regen_interval_ticks: 20,
            max_team_size: 5,
            trust_request_expiry_ticks: 5 * 60 * 20,
            max_backups: 5,
            autosave_interval_ticks: 5 * 60 * 20,
            conversion_interval_ticks: 100,
            abilities: default_abilities(),
        }
    }
}

fn ability(
    element: Element,
    slot: AbilitySlot,
    name: &str,
    required_level: u8,
    mana_cost: u32,
    cooldown_secs: f32,
    duration_ticks: u64,
    period_ticks: u64,
    effect_every: u32,
    shape: TargetShape,
    effect: EffectKind,
) -> AbilityDef {
    AbilityDef {
        element,
        slot,
        name: name.to_string(),
        required_level,
        mana_cost,
        cooldown_secs,
        duration_ticks,
        period_ticks,
        effect_every,
        shape,
        effect,
        per_level_bonus: 0.5,
    }
}

/// The shipped balance table: two abilities per element
fn default_abilities() -> Vec<AbilityDef> {
    use AbilitySlot::{Primary, Secondary};
    use EffectKind::*;
    use Element::*;
    use TargetShape::*;

    vec![
        ability(Air, Primary, "Gust", 0, 30, 6.0, 0, 1, 1,
            Radius { radius: 5.0 }, Launch { velocity: 1.2 }),
        ability(Air, Secondary, "Cyclone", 1, 60, 20.0, 120, 10, 1,
            Radius { radius: 6.0 }, Pull { strength: 0.6 }),
        ability(Water, Primary, "Tide Surge", 0, 35, 8.0, 0, 1, 1,
            Ray { range: 12.0 }, Slow { factor: 0.5, duration_secs: 3.0 }),
        ability(Water, Secondary, "Maelstrom", 1, 65, 25.0, 140, 10, 2,
            Radius { radius: 7.0 }, Damage { amount: 3.0 }),
        ability(Fire, Primary, "Flame Burst", 0, 40, 10.0, 100, 10, 2,
            Radius { radius: 4.0 }, Damage { amount: 3.0 }),
        ability(Fire, Secondary, "Meteor", 2, 80, 30.0, 0, 1, 1,
            Ray { range: 20.0 }, Damage { amount: 12.0 }),
        ability(Earth, Primary, "Tremor", 0, 35, 9.0, 0, 1, 1,
            Radius { radius: 5.0 }, Damage { amount: 5.0 }),
        ability(Earth, Secondary, "Fissure", 1, 55, 18.0, 0, 1, 1,
            Ray { range: 10.0 }, Slow { factor: 1.0, duration_secs: 4.0 }),
        ability(Life, Primary, "Mending", 0, 30, 12.0, 100, 20, 1,
            SelfOnly, HealSelf { amount: 2.0 }),
        ability(Life, Secondary, "Thorn Ward", 1, 60, 22.0, 120, 10, 2,
            Radius { radius: 5.0 }, Damage { amount: 2.0 }),
        ability(Death, Primary, "Soul Drain", 0, 40, 10.0, 0, 1, 1,
            Ray { range: 14.0 }, Drain { amount: 6.0 }),
        ability(Death, Secondary, "Dread Charm", 2, 75, 35.0, 200, 20, 1,
            Radius { radius: 8.0 }, Charm),
        ability(Metal, Primary, "Shrapnel", 0, 35, 8.0, 0, 1, 1,
            Radius { radius: 4.5 }, Damage { amount: 6.0 }),
        ability(Metal, Secondary, "Magnet Pull", 1, 50, 15.0, 60, 10, 1,
            Radius { radius: 9.0 }, Pull { strength: 0.9 }),
        ability(Frost, Primary, "Frost Nova", 0, 40, 10.0, 0, 1, 1,
            Radius { radius: 5.0 }, Slow { factor: 0.7, duration_secs: 3.0 }),
        ability(Frost, Secondary, "Glacial Prison", 1, 70, 28.0, 0, 1, 1,
            Ray { range: 12.0 }, Slow { factor: 1.0, duration_secs: 6.0 }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ELEMENT_COUNT;
    use std::collections::HashSet;

    #[test]
    fn test_default_tables_complete() {
        let config = GameConfig::default();
        assert_eq!(config.abilities.len(), ELEMENT_COUNT * 2);

        let keys: HashSet<_> = config.abilities.iter().map(|a| a.key()).collect();
        assert_eq!(keys.len(), ELEMENT_COUNT * 2, "duplicate (element, slot)");
    }

    #[test]
    fn test_costs_within_pool() {
        let config = GameConfig::default();
        for def in &config.abilities {
            assert!(
                def.mana_cost <= config.max_mana,
                "{} costs more than the pool holds",
                def.name
            );
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.max_mana, config.max_mana);
        assert_eq!(loaded.abilities.len(), config.abilities.len());
        assert_eq!(loaded.abilities[0], config.abilities[0]);
    }

    #[test]
    fn test_periodic_abilities_have_nonzero_period() {
        for def in GameConfig::default().abilities {
            if def.duration_ticks > 0 {
                assert!(def.period_ticks > 0, "{} would never tick", def.name);
            }
            assert!(def.effect_every >= 1, "{} would never apply", def.name);
        }
    }
}
