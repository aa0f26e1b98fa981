//! Tuning Constants
//!
//! Physics, player, camera and timing constants. Defaults are the stock
//! game values; a RON file can override any subset of fields:
//!
//! ```ron
//! (
//!     physics: (terminal_velocity: 16.0),
//!     camera: (transition_speed: 8.0),
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

/// Stage tile size in pixels
pub const TILE_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Maximum downward velocity (px/tick)
    pub terminal_velocity: f32,
    /// Velocity added on the first falling tick
    pub fall_start: f32,
    /// Velocity added on later falling ticks
    pub gravity_step: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            terminal_velocity: 20.0,
            fall_start: 1.0,
            gravity_step: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    /// Hitbox width while airborne or on a ladder
    pub narrow_width: f32,
    /// Horizontal speed (px/tick); doubled impulse when reversing
    pub move_speed: f32,
    pub climb_speed: f32,
    pub jump_speed: f32,
    pub max_hit_points: i32,
    pub lives: u32,
    /// Knockback impulse when damaged (px/tick)
    pub knockback: f32,
    /// Seconds the damaged pose is held
    pub damaged_time: f32,
    /// Seconds of invincibility after recovering
    pub invincible_time: f32,
    /// Seconds the warp-in landing pose is held
    pub arrive_time: f32,
    /// Buster pellets allowed on screen at once
    pub max_pellets: usize,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 24.0,
            height: 24.0,
            narrow_width: 16.0,
            move_speed: 2.0,
            climb_speed: 2.0,
            jump_speed: 8.0,
            max_hit_points: 28,
            lives: 3,
            knockback: 2.0,
            damaged_time: 0.2,
            invincible_time: 1.0,
            arrive_time: 0.05,
            max_pellets: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub view_width: f32,
    pub view_height: f32,
    /// Offset change per tick during a zone transition
    pub transition_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            view_width: 384.0,
            view_height: 384.0,
            transition_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Distance beyond the right view edge at which spawn points arm
    pub spawn_range: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self { spawn_range: 50.0 }
    }
}

/// Everything tunable about the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub camera: CameraTuning,
    pub spawn: SpawnTuning,
    /// Fixed simulation step in seconds
    pub timestep: f32,
    /// Steps run per host frame before dropping backlog
    pub max_steps_per_frame: u32,
    /// Loot RNG seed
    pub seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            player: PlayerTuning::default(),
            camera: CameraTuning::default(),
            spawn: SpawnTuning::default(),
            timestep: 1.0 / 60.0,
            max_steps_per_frame: 5,
            seed: 0,
        }
    }
}

/// Errors from loading a tuning file
#[derive(Debug)]
pub enum TuningError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ValidationError(String),
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for TuningError {
    fn from(e: ron::error::SpannedError) -> Self {
        TuningError::ParseError(e)
    }
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::IoError(e) => write!(f, "IO error: {}", e),
            TuningError::ParseError(e) => write!(f, "Parse error: {}", e),
            TuningError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// Parse from RON text; missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = ron::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TuningError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("timestep", self.timestep),
            ("physics.terminal_velocity", self.physics.terminal_velocity),
            ("player.width", self.player.width),
            ("player.height", self.player.height),
            ("player.narrow_width", self.player.narrow_width),
            ("camera.view_width", self.camera.view_width),
            ("camera.view_height", self.camera.view_height),
            ("camera.transition_speed", self.camera.transition_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::ValidationError(format!(
                    "{} must be positive, got {}", name, value
                )));
            }
        }
        if self.player.max_hit_points <= 0 {
            return Err(TuningError::ValidationError(
                "player.max_hit_points must be positive".to_string(),
            ));
        }
        if self.max_steps_per_frame == 0 {
            return Err(TuningError::ValidationError(
                "max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_ron_str("(physics: (terminal_velocity: 16.0), seed: 9)").unwrap();
        assert_eq!(tuning.physics.terminal_velocity, 16.0);
        assert_eq!(tuning.physics.gravity_step, 0.5);
        assert_eq!(tuning.player, PlayerTuning::default());
        assert_eq!(tuning.seed, 9);
    }

    #[test]
    fn test_rejects_non_positive() {
        let err = Tuning::from_ron_str("(camera: (transition_speed: 0.0))").unwrap_err();
        assert!(matches!(err, TuningError::ValidationError(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_ron_str("(physics: ").unwrap_err();
        assert!(matches!(err, TuningError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(player: (lives: 5))").unwrap();
        let tuning = Tuning::load(file.path()).unwrap();
        assert_eq!(tuning.player.lives, 5);
    }
}
