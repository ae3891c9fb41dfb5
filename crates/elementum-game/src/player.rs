//! Per-player resource record with change tracking
//!
//! Every mutator sets the dirty flag only when the value actually changed, so
//! the periodic save sweep never rewrites unchanged records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use elementum_core::PlayerId;

use crate::element::Element;

/// Highest reachable upgrade level
pub const MAX_UPGRADE_LEVEL: u8 = 2;

/// One player's durable state: element, progression, mana, crafted items,
/// and outgoing trust edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    id: PlayerId,
    #[serde(default)]
    current_element: Option<Element>,
    #[serde(default)]
    upgrade_level: u8,
    #[serde(default)]
    mana: u32,
    /// Elements this player has permanently crafted the item for (craft once)
    #[serde(default)]
    owned_element_items: BTreeSet<Element>,
    /// Players this player unilaterally trusts
    #[serde(default)]
    trusted_players: BTreeSet<PlayerId>,
    /// Set between any mutation and the next successful save
    #[serde(skip)]
    dirty: bool,
}

impl PlayerData {
    /// Fresh record with defaults (no element, level 0, empty mana)
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            current_element: None,
            upgrade_level: 0,
            mana: 0,
            owned_element_items: BTreeSet::new(),
            trusted_players: BTreeSet::new(),
            dirty: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn current_element(&self) -> Option<Element> {
        self.current_element
    }

    pub fn upgrade_level(&self) -> u8 {
        self.upgrade_level
    }

    pub fn mana(&self) -> u32 {
        self.mana
    }

    /// Switch element. Resets the upgrade level to 0: progression is
    /// meaningless across elements.
    pub fn set_current_element(&mut self, element: Option<Element>) {
        if self.current_element != element {
            self.current_element = element;
            self.dirty = true;
        }
        if self.upgrade_level != 0 {
            self.upgrade_level = 0;
            self.dirty = true;
        }
    }

    /// Switch element without touching the upgrade level (reroll rewards that
    /// explicitly preserve progression)
    pub fn set_current_element_preserving_level(&mut self, element: Option<Element>) {
        if self.current_element != element {
            self.current_element = element;
            self.dirty = true;
        }
    }

    /// Set the upgrade level, silently clamped to `[0, MAX_UPGRADE_LEVEL]`
    pub fn set_upgrade_level(&mut self, level: i32) {
        let clamped = level.clamp(0, MAX_UPGRADE_LEVEL as i32) as u8;
        if self.upgrade_level != clamped {
            self.upgrade_level = clamped;
            self.dirty = true;
        }
    }

    /// Set mana directly. The cap against the configured maximum is applied
    /// by the mana manager; negative values cannot exist by type.
    pub fn set_mana(&mut self, amount: u32) {
        if self.mana != amount {
            self.mana = amount;
            self.dirty = true;
        }
    }

    /// Record a crafted element item. Returns false if already owned
    /// (craft-once enforcement).
    pub fn add_element_item(&mut self, element: Element) -> bool {
        let added = self.owned_element_items.insert(element);
        if added {
            self.dirty = true;
        }
        added
    }

    /// Remove a crafted element item. Idempotent.
    pub fn remove_element_item(&mut self, element: Element) -> bool {
        let removed = self.owned_element_items.remove(&element);
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn owns_element_item(&self, element: Element) -> bool {
        self.owned_element_items.contains(&element)
    }

    pub fn owned_element_items(&self) -> &BTreeSet<Element> {
        &self.owned_element_items
    }

    /// Add an outgoing trust edge. Idempotent.
    pub fn add_trusted(&mut self, other: PlayerId) -> bool {
        let added = self.trusted_players.insert(other);
        if added {
            self.dirty = true;
        }
        added
    }

    /// Remove an outgoing trust edge. Idempotent.
    pub fn remove_trusted(&mut self, other: PlayerId) -> bool {
        let removed = self.trusted_players.remove(&other);
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn trusts(&self, other: PlayerId) -> bool {
        self.trusted_players.contains(&other)
    }

    pub fn trusted_players(&self) -> &BTreeSet<PlayerId> {
        &self.trusted_players
    }

    /// Whether this record has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the store after a successful persist
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
