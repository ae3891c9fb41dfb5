//! Ability definitions — targeting shapes, effect payloads, gating data
//!
//! An [`AbilityDef`] is pure data: what the ability costs, how long it runs,
//! how it finds targets, and what it does to them. The runtime state machine
//! that executes definitions lives in [`engine`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::Element;

pub mod engine;

/// Which of the two ability slots a definition occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilitySlot {
    Primary,
    Secondary,
}

impl AbilitySlot {
    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for AbilitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog key: one ability per (element, slot)
pub type AbilityKey = (Element, AbilitySlot);

/// How an ability finds its targets each effect tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetShape {
    /// All entities within `radius` of the caster
    Radius { radius: f32 },
    /// First entity along the caster's view direction up to `range`
    Ray { range: f32 },
    /// The caster only
    SelfOnly,
}

/// What the ability does to each surviving target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Direct damage
    Damage { amount: f32 },
    /// Launch away from the caster with vertical bias
    Launch { velocity: f32 },
    /// Drag toward the caster
    Pull { strength: f32 },
    /// Movement slow; factor 1.0 is a full root
    Slow { factor: f32, duration_secs: f32 },
    /// Damage the target and heal the caster for half
    Drain { amount: f32 },
    /// Heal the caster
    HealSelf { amount: f32 },
    /// Charm the target to fight for the caster until the ability ends
    Charm,
}

/// A complete ability definition. Built once into the catalog at startup and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub element: Element,
    pub slot: AbilitySlot,
    pub name: String,
    /// Minimum upgrade level required to use this ability
    pub required_level: u8,
    pub mana_cost: u32,
    pub cooldown_secs: f32,
    /// Total run time in ticks; 0 means a single application
    pub duration_ticks: u64,
    /// Ticks between target sweeps while active
    pub period_ticks: u64,
    /// Apply the effect only every Nth sweep (damage gating); 1 = every sweep
    pub effect_every: u32,
    pub shape: TargetShape,
    pub effect: EffectKind,
    /// Fractional magnitude bonus per upgrade level above the requirement
    pub per_level_bonus: f32,
}

impl AbilityDef {
    pub fn key(&self) -> AbilityKey {
        (self.element, self.slot)
    }

    /// Effect magnitude multiplier at the given upgrade level
    pub fn level_multiplier(&self, level: u8) -> f32 {
        let extra = level.saturating_sub(self.required_level) as f32;
        1.0 + self.per_level_bonus * extra
    }
}

/// Why an ability invocation was rejected. Every variant is user-facing; none
/// of them leaves any state mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbilityError {
    #[error("You have no element. Roll one with /element roll")]
    NoElement,
    #[error("{element} has no {slot} ability configured")]
    NoSuchAbility { element: Element, slot: AbilitySlot },
    #[error("{name} is already active")]
    AlreadyActive { name: String },
    #[error("{name} requires upgrade level {required} (you have {have})")]
    UpgradeRequired { name: String, required: u8, have: u8 },
    #[error("{name} is on cooldown ({remaining_secs:.1}s remaining)")]
    OnCooldown { name: String, remaining_secs: f32 },
    #[error("Not enough mana: {cost} needed, {have} available")]
    InsufficientMana { cost: u32, have: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def() -> AbilityDef {
        AbilityDef {
            element: Element::Fire,
            slot: AbilitySlot::Primary,
            name: "Flame Burst".to_string(),
            required_level: 1,
            mana_cost: 40,
            cooldown_secs: 8.0,
            duration_ticks: 100,
            period_ticks: 10,
            effect_every: 2,
            shape: TargetShape::Radius { radius: 4.0 },
            effect: EffectKind::Damage { amount: 3.0 },
            per_level_bonus: 0.5,
        }
    }

    #[test]
    fn test_level_multiplier() {
        let d = def();
        assert_eq!(d.level_multiplier(1), 1.0); // at requirement
        assert_eq!(d.level_multiplier(2), 1.5); // one above
        assert_eq!(d.level_multiplier(0), 1.0); // never below 1.0
    }

    #[test]
    fn test_key() {
        assert_eq!(def().key(), (Element::Fire, AbilitySlot::Primary));
    }
}
