//! Immutable ability catalog
//!
//! Built once from the game config at startup. Lookups hand out borrowed
//! definitions; nothing ever mutates the catalog after construction.

use std::collections::HashMap;

use crate::ability::{AbilityDef, AbilityKey, AbilitySlot};
use crate::config::GameConfig;
use crate::element::Element;

/// (element, slot) -> ability definition
#[derive(Debug, Clone)]
pub struct AbilityCatalog {
    defs: HashMap<AbilityKey, AbilityDef>,
}

impl AbilityCatalog {
    /// Build from config. A later entry for the same (element, slot) wins,
    /// which lets config files override individual defaults.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut defs = HashMap::new();
        for def in &config.abilities {
            defs.insert(def.key(), def.clone());
        }
        Self { defs }
    }

    pub fn get(&self, element: Element, slot: AbilitySlot) -> Option<&AbilityDef> {
        self.defs.get(&(element, slot))
    }

    /// Both definitions for one element, for listing
    pub fn for_element(&self, element: Element) -> Vec<&AbilityDef> {
        [AbilitySlot::Primary, AbilitySlot::Secondary]
            .iter()
            .filter_map(|&slot| self.get(element, slot))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_total() {
        let catalog = AbilityCatalog::from_config(&GameConfig::default());
        for &element in Element::all() {
            assert!(catalog.get(element, AbilitySlot::Primary).is_some());
            assert!(catalog.get(element, AbilitySlot::Secondary).is_some());
            assert_eq!(catalog.for_element(element).len(), 2);
        }
        assert_eq!(catalog.len(), 16);
    }

    #[test]
    fn test_later_entry_overrides() {
        let mut config = GameConfig::default();
        let mut patched = config.abilities[0].clone();
        patched.mana_cost = 1;
        config.abilities.push(patched.clone());

        let catalog = AbilityCatalog::from_config(&config);
        let def = catalog.get(patched.element, patched.slot).unwrap();
        assert_eq!(def.mana_cost, 1);
    }
}
