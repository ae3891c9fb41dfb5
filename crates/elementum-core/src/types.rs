//! Stable identifiers for players and world entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable player identifier, valid across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generate a fresh random player id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a live world entity (player or not), valid for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids_unique() {
        assert_ne!(PlayerId::new(), PlayerId::new());
    }

    #[test]
    fn test_player_id_serde_roundtrip() {
        let id = PlayerId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
