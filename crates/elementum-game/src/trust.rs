//! Trust relationships and the request/accept handshake
//!
//! Trust is directional. The edges themselves persist inside each player's
//! record (the truster's outgoing set); this manager owns only the ephemeral
//! pending-request map. Requests expire after a configured window and must be
//! explicitly accepted or denied. A target's pending set is unbounded, so a
//! hostile player can flood requests; known limitation.

use std::collections::HashMap;

use thiserror::Error;

use elementum_core::{ticks_to_secs, PlayerId};

use crate::store::DataStore;

/// Why a trust operation was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrustError {
    #[error("You already trust that player")]
    AlreadyTrusted,
    #[error("You already have a pending request to that player")]
    AlreadyPending,
    #[error("You cannot trust yourself")]
    SelfTrust,
    #[error("No pending trust request from that player")]
    NoPendingRequest,
}

/// Pairwise trust with a pending-request handshake
#[derive(Debug)]
pub struct TrustManager {
    /// (target, requester) -> expiry tick
    pending: HashMap<(PlayerId, PlayerId), u64>,
    expiry_ticks: u64,
}

impl TrustManager {
    pub fn new(expiry_ticks: u64) -> Self {
        Self {
            pending: HashMap::new(),
            expiry_ticks,
        }
    }

    /// One-directional check: does `a` trust `b`?
    pub fn is_trusted(&self, store: &mut DataStore, a: PlayerId, b: PlayerId) -> bool {
        store.load(a).trusts(b)
    }

    /// Both directions hold
    pub fn is_mutual(&self, store: &mut DataStore, a: PlayerId, b: PlayerId) -> bool {
        self.is_trusted(store, a, b) && self.is_trusted(store, b, a)
    }

    /// Add a single directed edge (admin/command path). Idempotent.
    pub fn add_trust(&self, store: &mut DataStore, truster: PlayerId, trusted: PlayerId) -> bool {
        store.load_mut(truster).add_trusted(trusted)
    }

    /// Remove a single directed edge. Idempotent.
    pub fn remove_trust(&self, store: &mut DataStore, truster: PlayerId, trusted: PlayerId) -> bool {
        store.load_mut(truster).remove_trusted(trusted)
    }

    /// Establish both directions at once
    pub fn add_mutual_trust(&self, store: &mut DataStore, a: PlayerId, b: PlayerId) {
        store.load_mut(a).add_trusted(b);
        store.load_mut(b).add_trusted(a);
    }

    /// File a request from `requester` to `target`. One outstanding request
    /// per (target, requester) pair.
    pub fn request(
        &mut self,
        store: &mut DataStore,
        requester: PlayerId,
        target: PlayerId,
        now: u64,
    ) -> Result<(), TrustError> {
        if requester == target {
            return Err(TrustError::SelfTrust);
        }
        if self.is_mutual(store, requester, target) {
            return Err(TrustError::AlreadyTrusted);
        }
        let key = (target, requester);
        if self.pending.get(&key).is_some_and(|&expiry| expiry > now) {
            return Err(TrustError::AlreadyPending);
        }
        self.pending.insert(key, now + self.expiry_ticks);
        Ok(())
    }

    /// Accept a pending request: establishes mutual trust atomically and
    /// clears the pending entry
    pub fn accept(
        &mut self,
        store: &mut DataStore,
        target: PlayerId,
        requester: PlayerId,
        now: u64,
    ) -> Result<(), TrustError> {
        match self.pending.remove(&(target, requester)) {
            Some(expiry) if expiry > now => {
                self.add_mutual_trust(store, target, requester);
                Ok(())
            }
            _ => Err(TrustError::NoPendingRequest),
        }
    }

    /// Deny a pending request: clears the entry, establishes nothing
    pub fn deny(&mut self, target: PlayerId, requester: PlayerId) -> Result<(), TrustError> {
        self.pending
            .remove(&(target, requester))
            .map(|_| ())
            .ok_or(TrustError::NoPendingRequest)
    }

    /// Requesters with a live request to `target`
    pub fn pending_for(&self, target: PlayerId, now: u64) -> Vec<PlayerId> {
        self.pending
            .iter()
            .filter(|(&(t, _), &expiry)| t == target && expiry > now)
            .map(|(&(_, requester), _)| requester)
            .collect()
    }

    /// Drop expired requests. Called on a periodic sweep.
    pub fn purge_expired(&mut self, now: u64) {
        self.pending.retain(|_, &mut expiry| expiry > now);
    }

    /// Players `a` currently trusts, for listing
    pub fn trusted_list(&self, store: &mut DataStore, a: PlayerId) -> Vec<PlayerId> {
        store.load(a).trusted_players().iter().copied().collect()
    }

    /// Request expiry window in seconds (for user messages)
    pub fn expiry_secs(&self) -> f32 {
        ticks_to_secs(self.expiry_ticks)
    }
}
