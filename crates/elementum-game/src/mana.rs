//! Mana pool gating and regeneration
//!
//! All reads and writes go through the store's cache, so there is exactly one
//! copy of any player's pool. `spend` is the only deduction path and runs to
//! completion on the tick sequence, which rules out double-spends between
//! concurrent invocations for the same player.

use std::collections::HashSet;

use elementum_core::PlayerId;

use crate::config::GameConfig;
use crate::store::DataStore;

/// Gates ability costs and applies interval regeneration
#[derive(Debug, Default)]
pub struct ManaManager {
    /// Players in the free-resource (creative) mode: spends always succeed
    /// and regen force-fills the pool
    creative: HashSet<PlayerId>,
}

impl ManaManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only affordability check
    pub fn has_mana(&self, store: &mut DataStore, player: PlayerId, amount: u32) -> bool {
        self.creative.contains(&player) || store.load(player).mana() >= amount
    }

    /// Deduct `amount`, or return false with no state change if the player
    /// cannot afford it. Creative players always pass without deduction.
    pub fn spend(&self, store: &mut DataStore, player: PlayerId, amount: u32) -> bool {
        if self.creative.contains(&player) {
            return true;
        }
        let data = store.load_mut(player);
        let current = data.mana();
        if current < amount {
            return false;
        }
        data.set_mana(current - amount);
        true
    }

    /// Set the pool directly, clamped to the configured maximum
    pub fn set_mana(&self, store: &mut DataStore, player: PlayerId, amount: u32, config: &GameConfig) {
        store.load_mut(player).set_mana(amount.min(config.max_mana));
    }

    /// Add to the pool, clamped to the configured maximum
    pub fn add_mana(&self, store: &mut DataStore, player: PlayerId, amount: u32, config: &GameConfig) {
        let data = store.load_mut(player);
        let next = data.mana().saturating_add(amount).min(config.max_mana);
        data.set_mana(next);
    }

    /// One regen pulse for every connected player. Creative players are
    /// force-set to the maximum instead of incrementally regenerated.
    pub fn regen_tick(&self, store: &mut DataStore, online: &[PlayerId], config: &GameConfig) {
        for &player in online {
            if self.creative.contains(&player) {
                store.load_mut(player).set_mana(config.max_mana);
            } else {
                self.add_mana(store, player, config.mana_regen, config);
            }
        }
    }

    pub fn set_creative(&mut self, player: PlayerId, creative: bool) {
        if creative {
            self.creative.insert(player);
        } else {
            self.creative.remove(&player);
        }
    }

    pub fn is_creative(&self, player: PlayerId) -> bool {
        self.creative.contains(&player)
    }
}
