//! Game Simulation Module
//!
//! The runtime core of a side-scrolling action platformer: collision,
//! frame-sequenced animation, the player controller, enemy behaviors, zones
//! and the camera. Rendering, audio playback and input devices belong to the
//! host; the simulation only reports events and consumes commands.
//!
//! Key concepts:
//! - Entity: Generational index for safe references between objects
//! - Stage: Static obstacle sets and spawn tables built from map layers
//! - World: Owns everything that moves and runs one fixed tick at a time
//! - Event: Sounds, damage, deaths, spawns and zone changes for the host
//!
//! Design philosophy:
//! - Simple over flexible (we know what game we're making)
//! - Closed enums over trait objects for enemy behaviors
//! - Deterministic: fixed timestep, seeded randomness

pub mod animation;
pub mod body;
pub mod camera;
pub mod collision;
pub mod component;
pub mod config;
pub mod enemy;
pub mod entity;
pub mod event;
pub mod explosion;
pub mod gate;
pub mod input;
pub mod item;
pub mod player;
pub mod runtime;
pub mod stage;
pub mod weapon;
pub mod world;

// Re-export main types
pub use config::Tuning;
pub use entity::Entity;
pub use event::Events;
pub use input::{InputMethod, InputScript, PlayerCommand, ScriptedInput};
pub use runtime::{AudioSink, GameMode, GameRuntime, NullAudio};
pub use stage::{Stage, StageData};
pub use world::World;
