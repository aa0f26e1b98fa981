//! Game Runtime
//!
//! Drives a `World` from a host loop. The host feeds wall-clock frame time
//! and input events; the runtime turns frame time into fixed simulation
//! steps, handles pause and game over, forwards sounds to an `AudioSink` and
//! spends the player's lives.

use super::event::Events;
use super::input::{InputMethod, PlayerCommand};
use super::world::World;

/// Where sound requests go. `blocking` asks the host to let the sound finish
/// before continuing (player defeat).
pub trait AudioSink {
    fn play_sound(&mut self, name: &str, blocking: bool);
}

/// Discards every sound
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _name: &str, _blocking: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Playing,
    Paused,
    /// Out of lives; the world no longer advances
    GameOver,
}

pub struct GameRuntime {
    pub world: World,
    /// Events of the tick in progress (plus input-driven ones queued since
    /// the last tick)
    events: Events,
    mode: GameMode,
    /// Unsimulated time carried between frames
    accumulator: f32,
    ticks: u64,
}

impl GameRuntime {
    pub fn new(world: World) -> Self {
        Self {
            world,
            events: Events::new(),
            mode: GameMode::Playing,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Fixed steps run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            GameMode::Playing => GameMode::Paused,
            GameMode::Paused => GameMode::Playing,
            GameMode::GameOver => GameMode::GameOver,
        };
        tracing::debug!(mode = ?self.mode, "pause toggled");
    }

    /// Dispatch one input event: pause presses toggle the mode, everything
    /// else becomes a player command while playing.
    pub fn handle_input<I: InputMethod>(&mut self, input: &I, event: &I::Event) {
        if input.is_pause(event) {
            if input.is_pressed(event) {
                self.toggle_pause();
            }
            return;
        }
        if self.mode != GameMode::Playing {
            return;
        }
        if let Some(command) = PlayerCommand::from_input(input, event) {
            tracing::trace!(?command, "player command");
            self.world.apply_command(command, &mut self.events);
        }
    }

    /// Advance by `elapsed` seconds of wall-clock time. Runs as many fixed
    /// steps as fit, up to the configured maximum; leftover backlog beyond
    /// that is dropped. Returns the number of steps run.
    pub fn frame(&mut self, elapsed: f32, audio: &mut dyn AudioSink) -> u32 {
        if self.mode != GameMode::Playing {
            return 0;
        }

        let step = self.world.tuning.timestep;
        let max_steps = self.world.tuning.max_steps_per_frame;
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= step && steps < max_steps && self.mode == GameMode::Playing {
            self.tick(audio);
            self.accumulator -= step;
            steps += 1;
        }

        if self.accumulator >= step {
            tracing::debug!(backlog = self.accumulator, "dropping simulation backlog");
            self.accumulator = 0.0;
        }
        steps
    }

    /// Run exactly one fixed step regardless of the accumulator. Sounds go
    /// to `audio`; the step's remaining events are returned.
    pub fn tick(&mut self, audio: &mut dyn AudioSink) -> Events {
        if self.mode != GameMode::Playing {
            return Events::new();
        }

        let step = self.world.tuning.timestep;
        self.world.update(step, &mut self.events);
        self.ticks += 1;

        for sound in self.events.sounds.drain() {
            audio.play_sound(sound.sound.name(), sound.blocking);
        }

        if self.world.player.is_dead() {
            self.spend_life();
        }

        std::mem::take(&mut self.events)
    }

    fn spend_life(&mut self) {
        let player = &mut self.world.player;
        player.lives = player.lives.saturating_sub(1);
        if player.lives == 0 {
            self.mode = GameMode::GameOver;
            tracing::info!(score = player.score, ticks = self.ticks, "game over");
        } else {
            self.world.respawn();
        }
    }
}
