//! The eight elements and their passive effects
//!
//! Air, Water, Fire, Earth, Life, Death, Metal, Frost. Passives are a fixed
//! property of the element; magnitudes for abilities live in the catalog.

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod manager;

/// The 8 player elements
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Element {
    Air,
    Water,
    Fire,
    Earth,
    Life,
    Death,
    Metal,
    Frost,
}

/// Total number of elements
pub const ELEMENT_COUNT: usize = 8;

impl Element {
    /// Array index for this element
    pub fn index(self) -> usize {
        match self {
            Self::Air => 0,
            Self::Water => 1,
            Self::Fire => 2,
            Self::Earth => 3,
            Self::Life => 4,
            Self::Death => 5,
            Self::Metal => 6,
            Self::Frost => 7,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Air => "Air",
            Self::Water => "Water",
            Self::Fire => "Fire",
            Self::Earth => "Earth",
            Self::Life => "Life",
            Self::Death => "Death",
            Self::Metal => "Metal",
            Self::Frost => "Frost",
        }
    }

    /// Color as [r, g, b] floats (0.0-1.0), for chat and display accents
    pub fn color(self) -> [f32; 3] {
        match self {
            Self::Air => [0.8, 0.9, 1.0],
            Self::Water => [0.2, 0.5, 1.0],
            Self::Fire => [1.0, 0.3, 0.1],
            Self::Earth => [0.6, 0.4, 0.2],
            Self::Life => [0.3, 0.9, 0.3],
            Self::Death => [0.3, 0.1, 0.4],
            Self::Metal => [0.75, 0.75, 0.8],
            Self::Frost => [0.6, 0.85, 1.0],
        }
    }

    /// Parse a user-typed element name, case-insensitive
    pub fn parse(input: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(input))
    }

    /// Passive effects granted while this element is active
    pub fn passives(self) -> &'static [PassiveEffect] {
        match self {
            Self::Air => &[PassiveEffect::SpeedBoost, PassiveEffect::SlowFalling],
            Self::Water => &[PassiveEffect::WaterBreathing, PassiveEffect::SwimSpeed],
            Self::Fire => &[PassiveEffect::FireResistance],
            Self::Earth => &[PassiveEffect::MiningHaste, PassiveEffect::DamageResistance],
            Self::Life => &[PassiveEffect::Regeneration, PassiveEffect::ExtraHearts],
            Self::Death => &[PassiveEffect::NightVision],
            Self::Metal => &[PassiveEffect::KnockbackResistance],
            Self::Frost => &[PassiveEffect::FrostWalking, PassiveEffect::FreezeImmunity],
        }
    }

    /// All element variants
    pub fn all() -> &'static [Element] {
        &[
            Self::Air,
            Self::Water,
            Self::Fire,
            Self::Earth,
            Self::Life,
            Self::Death,
            Self::Metal,
            Self::Frost,
        ]
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Passive buffs applied while an element is active. The host maps these to
/// its own status-effect system; the core only tracks which are in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveEffect {
    SpeedBoost,
    SlowFalling,
    WaterBreathing,
    SwimSpeed,
    FireResistance,
    MiningHaste,
    DamageResistance,
    Regeneration,
    ExtraHearts,
    NightVision,
    KnockbackResistance,
    FrostWalking,
    FreezeImmunity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(Element::all().len(), ELEMENT_COUNT);
    }

    #[test]
    fn test_element_indices_unique() {
        let mut indices: Vec<usize> = Element::all().iter().map(|e| e.index()).collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), ELEMENT_COUNT);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Element::parse("fire"), Some(Element::Fire));
        assert_eq!(Element::parse("FROST"), Some(Element::Frost));
        assert_eq!(Element::parse("Death"), Some(Element::Death));
        assert_eq!(Element::parse("plasma"), None);
    }

    #[test]
    fn test_every_element_has_passives() {
        for &elem in Element::all() {
            assert!(!elem.passives().is_empty(), "{} has no passives", elem);
        }
    }

    #[test]
    fn test_element_names_nonempty() {
        for &elem in Element::all() {
            assert!(!elem.name().is_empty());
        }
    }
}
