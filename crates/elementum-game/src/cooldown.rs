//! Per-player, per-ability cooldown tracking
//!
//! Entries are expiry ticks, never persisted, and dropped on disconnect.

use std::collections::HashMap;

use elementum_core::{secs_to_ticks, ticks_to_secs, PlayerId};

/// Result of a cooldown check-and-set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CooldownStatus {
    /// The ability may fire; its expiry has been recorded
    Ready,
    /// Still cooling down
    Cooling { remaining_secs: f32 },
}

/// Tracks ability expiry timestamps for every connected player
#[derive(Debug, Default)]
pub struct CooldownManager {
    entries: HashMap<PlayerId, HashMap<String, u64>>,
}

impl CooldownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single atomic check-and-set: if `ability` is off cooldown for
    /// `player`, record a new expiry and return [`CooldownStatus::Ready`];
    /// otherwise report the remaining time. There is no window in which two
    /// callers could both pass.
    pub fn try_use_ability(
        &mut self,
        player: PlayerId,
        ability: &str,
        cooldown_secs: f32,
        now: u64,
    ) -> CooldownStatus {
        let per_player = self.entries.entry(player).or_default();
        if let Some(&expiry) = per_player.get(ability) {
            if expiry > now {
                return CooldownStatus::Cooling {
                    remaining_secs: ticks_to_secs(expiry - now),
                };
            }
        }
        per_player.insert(ability.to_string(), now + secs_to_ticks(cooldown_secs));
        CooldownStatus::Ready
    }

    /// Remaining cooldown in seconds, without mutating anything
    pub fn remaining(&self, player: PlayerId, ability: &str, now: u64) -> Option<f32> {
        let expiry = *self.entries.get(&player)?.get(ability)?;
        (expiry > now).then(|| ticks_to_secs(expiry - now))
    }

    /// Drop every entry for a player (disconnect)
    pub fn clear(&mut self, player: PlayerId) {
        self.entries.remove(&player);
    }
}
