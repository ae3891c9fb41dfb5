//! Elementum Game - element, ability, and resource coordination core
//!
//! Provides per-player resource records, the cached player store, mana and
//! cooldown gating, trust and team relationships, and the tick-driven ability
//! state machines. The host game server is abstracted behind the [`WorldView`]
//! trait; effects flow back out as [`EffectEvent`] values.

pub mod ability;
pub mod config;
pub mod conversion;
pub mod cooldown;
pub mod element;
pub mod mana;
pub mod player;
pub mod sidetable;
pub mod sim;
pub mod store;
pub mod team;
pub mod trust;

mod world;

pub use ability::engine::AbilityEngine;
pub use ability::{AbilityDef, AbilityError, AbilityKey, AbilitySlot, EffectKind, TargetShape};
pub use config::GameConfig;
pub use conversion::ConversionTask;
pub use cooldown::{CooldownManager, CooldownStatus};
pub use element::catalog::AbilityCatalog;
pub use element::manager::{ElementManager, RollError, RollEvent};
pub use element::{Element, PassiveEffect};
pub use mana::ManaManager;
pub use player::{PlayerData, MAX_UPGRADE_LEVEL};
pub use sidetable::{CharmRecord, SideTable};
pub use sim::SimWorld;
pub use store::DataStore;
pub use team::{Team, TeamColor, TeamError, TeamId, TeamManager, TeamSaveData, TeamStyle};
pub use trust::{TrustError, TrustManager};
pub use world::{EffectEvent, EntitySnapshot, WorldView};
