//! Entity side-table for charm state
//!
//! Instead of tagging host entities with opaque metadata, charmed entities
//! are tracked here as typed records with an explicit expiry sweep, so
//! cleanup order is testable independent of the host entity lifecycle.

use std::collections::HashMap;

use elementum_core::{EntityId, PlayerId};

/// A charm in force on one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharmRecord {
    pub owner: PlayerId,
    /// Tick at which the charm lapses
    pub until: u64,
}

/// entity-id -> charm record
#[derive(Debug, Default)]
pub struct SideTable {
    charms: HashMap<EntityId, CharmRecord>,
}

impl SideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a charm, replacing any existing one on the entity
    pub fn set_charm(&mut self, entity: EntityId, owner: PlayerId, until: u64) {
        self.charms.insert(entity, CharmRecord { owner, until });
    }

    pub fn charm(&self, entity: EntityId) -> Option<&CharmRecord> {
        self.charms.get(&entity)
    }

    pub fn is_charmed_by(&self, entity: EntityId, owner: PlayerId) -> bool {
        self.charms.get(&entity).is_some_and(|c| c.owner == owner)
    }

    /// Drop every charm owned by `owner` (ability ended, caster left).
    /// Returns the affected entities so the host can restore their AI.
    pub fn clear_owner(&mut self, owner: PlayerId) -> Vec<EntityId> {
        let expired: Vec<EntityId> = self
            .charms
            .iter()
            .filter(|(_, c)| c.owner == owner)
            .map(|(&e, _)| e)
            .collect();
        for entity in &expired {
            self.charms.remove(entity);
        }
        expired
    }

    /// Drop charms whose expiry has passed. Returns the affected entities.
    pub fn sweep(&mut self, now: u64) -> Vec<EntityId> {
        let expired: Vec<EntityId> = self
            .charms
            .iter()
            .filter(|(_, c)| c.until <= now)
            .map(|(&e, _)| e)
            .collect();
        for entity in &expired {
            self.charms.remove(entity);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.charms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_query() {
        let mut table = SideTable::new();
        let owner = PlayerId::new();
        let e = EntityId(7);

        table.set_charm(e, owner, 100);
        assert!(table.is_charmed_by(e, owner));
        assert!(!table.is_charmed_by(e, PlayerId::new()));
        assert_eq!(table.charm(e).unwrap().until, 100);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let mut table = SideTable::new();
        let owner = PlayerId::new();
        table.set_charm(EntityId(1), owner, 50);
        table.set_charm(EntityId(2), owner, 200);

        let expired = table.sweep(50);
        assert_eq!(expired, vec![EntityId(1)]);
        assert_eq!(table.len(), 1);
        assert!(table.charm(EntityId(2)).is_some());
    }

    #[test]
    fn test_clear_owner() {
        let mut table = SideTable::new();
        let a = PlayerId::new();
        let b = PlayerId::new();
        table.set_charm(EntityId(1), a, 100);
        table.set_charm(EntityId(2), a, 100);
        table.set_charm(EntityId(3), b, 100);

        let mut cleared = table.clear_owner(a);
        cleared.sort();
        assert_eq!(cleared, vec![EntityId(1), EntityId(2)]);
        assert_eq!(table.len(), 1);
    }
}
