//! In-memory world model
//!
//! Implements [`WorldView`] for the console harness and the test suite: flat
//! positions, straight-line ray tests, and direct application of effect
//! events. No rendering, no physics.

use std::collections::HashMap;

use glam::Vec3;

use elementum_core::{EntityId, PlayerId};

use crate::world::{EffectEvent, EntitySnapshot, WorldView};

#[derive(Debug, Clone)]
struct SimEntity {
    player: Option<PlayerId>,
    position: Vec3,
    facing: Vec3,
    health: f32,
    online: bool,
}

/// A minimal stand-in for the host server's entity model
#[derive(Debug, Default)]
pub struct SimWorld {
    entities: HashMap<EntityId, SimEntity>,
    by_player: HashMap<PlayerId, EntityId>,
    next_entity: u64,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntityId {
        self.next_entity += 1;
        EntityId(self.next_entity)
    }

    /// Spawn a player avatar at `position`
    pub fn spawn_player(&mut self, player: PlayerId, position: Vec3) -> EntityId {
        let id = self.next_id();
        self.entities.insert(
            id,
            SimEntity {
                player: Some(player),
                position,
                facing: Vec3::new(1.0, 0.0, 0.0),
                health: 20.0,
                online: true,
            },
        );
        self.by_player.insert(player, id);
        id
    }

    /// Spawn a non-player entity (mob) at `position`
    pub fn spawn_mob(&mut self, position: Vec3) -> EntityId {
        let id = self.next_id();
        self.entities.insert(
            id,
            SimEntity {
                player: None,
                position,
                facing: Vec3::new(1.0, 0.0, 0.0),
                health: 20.0,
                online: true,
            },
        );
        id
    }

    pub fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.position = position;
        }
    }

    pub fn set_facing(&mut self, player: PlayerId, facing: Vec3) {
        if let Some(id) = self.by_player.get(&player) {
            if let Some(e) = self.entities.get_mut(id) {
                e.facing = facing.normalize_or_zero();
            }
        }
    }

    pub fn set_online(&mut self, player: PlayerId, online: bool) {
        if let Some(id) = self.by_player.get(&player) {
            if let Some(e) = self.entities.get_mut(id) {
                e.online = online;
            }
        }
    }

    pub fn health(&self, entity: EntityId) -> Option<f32> {
        self.entities.get(&entity).map(|e| e.health)
    }

    pub fn set_health(&mut self, entity: EntityId, health: f32) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.health = health;
        }
    }

    /// Apply one effect event the way the host would. Messages are ignored
    /// here; the harness prints them itself.
    pub fn apply(&mut self, event: &EffectEvent) {
        match event {
            EffectEvent::Damage { target, amount } => {
                if let Some(e) = self.entities.get_mut(target) {
                    e.health = (e.health - amount).max(0.0);
                }
            }
            EffectEvent::Heal { target, amount } => {
                if let Some(e) = self.entities.get_mut(target) {
                    e.health = (e.health + amount).min(20.0);
                }
            }
            EffectEvent::Launch { target, velocity } => {
                if let Some(e) = self.entities.get_mut(target) {
                    e.position += *velocity;
                }
            }
            // Slows, charms, and messages have no physical analogue here
            _ => {}
        }
    }

    fn snapshot(&self, id: EntityId, e: &SimEntity) -> EntitySnapshot {
        EntitySnapshot {
            entity: id,
            player: e.player,
            position: e.position,
            alive: e.health > 0.0 && e.online,
        }
    }
}

impl WorldView for SimWorld {
    fn is_online(&self, player: PlayerId) -> bool {
        self.by_player
            .get(&player)
            .and_then(|id| self.entities.get(id))
            .is_some_and(|e| e.online)
    }

    fn is_alive(&self, player: PlayerId) -> bool {
        self.by_player
            .get(&player)
            .and_then(|id| self.entities.get(id))
            .is_some_and(|e| e.health > 0.0)
    }

    fn player_entity(&self, player: PlayerId) -> Option<EntityId> {
        self.by_player.get(&player).copied()
    }

    fn position(&self, player: PlayerId) -> Option<Vec3> {
        self.by_player
            .get(&player)
            .and_then(|id| self.entities.get(id))
            .map(|e| e.position)
    }

    fn facing(&self, player: PlayerId) -> Option<Vec3> {
        self.by_player
            .get(&player)
            .and_then(|id| self.entities.get(id))
            .map(|e| e.facing)
    }

    fn entities_within(&self, center: Vec3, radius: f32) -> Vec<EntitySnapshot> {
        self.entities
            .iter()
            .filter(|(_, e)| e.online && e.position.distance(center) <= radius)
            .map(|(&id, e)| self.snapshot(id, e))
            .collect()
    }

    fn ray_trace(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<EntitySnapshot> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        // Nearest entity within half a block of the ray
        self.entities
            .iter()
            .filter(|(_, e)| e.online)
            .filter_map(|(&id, e)| {
                let to = e.position - origin;
                let along = to.dot(dir);
                if along <= 0.01 || along > max_dist {
                    return None;
                }
                let off_ray = (to - dir * along).length();
                (off_ray <= 0.5).then(|| (along, self.snapshot(id, e)))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, snap)| snap)
    }
}
