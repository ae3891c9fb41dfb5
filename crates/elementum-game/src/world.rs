//! The seam between the coordination core and the host game server
//!
//! The core only ever reads the world through [`WorldView`] and pushes
//! changes back as [`EffectEvent`] values; rendering, physics, and entity
//! mutation stay on the host side.

use glam::Vec3;

use elementum_core::{EntityId, PlayerId};

/// One entity as seen at targeting time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub entity: EntityId,
    /// Present when the entity is a player
    pub player: Option<PlayerId>,
    pub position: Vec3,
    pub alive: bool,
}

/// Read-only world queries the abilities need
pub trait WorldView {
    fn is_online(&self, player: PlayerId) -> bool;
    fn is_alive(&self, player: PlayerId) -> bool;
    /// Entity id of a player's avatar, while connected
    fn player_entity(&self, player: PlayerId) -> Option<EntityId>;
    fn position(&self, player: PlayerId) -> Option<Vec3>;
    /// Unit view direction
    fn facing(&self, player: PlayerId) -> Option<Vec3>;
    /// All live entities within `radius` of `center`
    fn entities_within(&self, center: Vec3, radius: f32) -> Vec<EntitySnapshot>;
    /// First entity hit along `dir` from `origin`, up to `max_dist`
    fn ray_trace(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<EntitySnapshot>;
}

/// A world change requested by the core, applied by the host
#[derive(Debug, Clone, PartialEq)]
pub enum EffectEvent {
    Damage { target: EntityId, amount: f32 },
    Heal { target: EntityId, amount: f32 },
    /// Knockback impulse
    Launch { target: EntityId, velocity: Vec3 },
    /// Movement slow; factor 1.0 is a full root
    Slow { target: EntityId, factor: f32, duration_ticks: u64 },
    /// The entity fights for `owner` until cleared
    Charm { target: EntityId, owner: PlayerId },
    /// Restore the entity's own AI
    ClearCharm { target: EntityId },
    /// User-facing text for one player
    Message { player: PlayerId, text: String },
}
