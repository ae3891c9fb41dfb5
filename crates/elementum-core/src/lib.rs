//! Elementum Core - identifiers and timing for the Elementum plugin core
//!
//! This crate provides the foundational types used throughout the plugin:
//! - Stable player and entity identifiers
//! - The server tick clock that drives every manager
//! - Tick/second conversion helpers

pub mod tick;
pub mod types;

pub use glam::Vec3;
pub use tick::{secs_to_ticks, ticks_to_secs, TickClock, TICKS_PER_SECOND};
pub use types::{EntityId, PlayerId};
