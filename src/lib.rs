//! tilerun: simulation core for a side-scrolling action platformer
//!
//! Tile-map stages, swept-AABB platform collision, ladders, a frame-event
//! animation engine, a multi-state player controller, four enemy behaviors
//! and a zone-based camera. Everything runs in fixed 1/60 s ticks driven by
//! `game::GameRuntime`.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod math;
pub mod game;
