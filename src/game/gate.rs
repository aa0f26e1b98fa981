//! Boss Gates
//!
//! A gate is a shutter made of 16px tiles. Opening retracts it one tile
//! every 0.1 s until its height reaches zero; closing extends it back to
//! full height. Once the player has gone through, the gate locks.

use super::config::TILE_SIZE;
use crate::math::Rect;

/// Seconds between one-tile height steps
const STEP_TIME: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    /// Current extent; the top edge stays put while the height animates
    pub rect: Rect,
    max_height: f32,
    state: GateState,
    locked: bool,
    animation_time: f32,
}

impl Gate {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            max_height: rect.h,
            state: GateState::Closed,
            locked: false,
            animation_time: 0.0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Fully retracted
    pub fn is_open(&self) -> bool {
        self.rect.h == 0.0
    }

    /// Start retracting. Ignored while locked or already opening.
    pub fn open(&mut self) {
        if self.locked || matches!(self.state, GateState::Opening | GateState::Open) {
            return;
        }
        self.state = GateState::Opening;
        self.animation_time = 0.0;
    }

    /// Start extending back to full height.
    pub fn close(&mut self) {
        if matches!(self.state, GateState::Closing | GateState::Closed) {
            return;
        }
        self.state = GateState::Closing;
        self.animation_time = 0.0;
    }

    pub fn update(&mut self, delta: f32) {
        match self.state {
            GateState::Opening => {
                if self.rect.h <= 0.0 {
                    self.rect.h = 0.0;
                    self.state = GateState::Open;
                } else {
                    self.animation_time += delta;
                    if self.animation_time > STEP_TIME {
                        self.rect.h = (self.rect.h - TILE_SIZE).max(0.0);
                        self.animation_time = 0.0;
                    }
                }
            }
            GateState::Closing => {
                if self.rect.h >= self.max_height {
                    self.rect.h = self.max_height;
                    self.state = GateState::Closed;
                } else {
                    self.animation_time += delta;
                    if self.animation_time > STEP_TIME {
                        self.rect.h = (self.rect.h + TILE_SIZE).min(self.max_height);
                        self.animation_time = 0.0;
                    }
                }
            }
            GateState::Closed | GateState::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 16.0;

    #[test]
    fn test_open_retracts_one_tile_per_step() {
        let mut gate = Gate::new(Rect::new(0.0, 0.0, 16.0, 64.0));
        gate.open();
        assert_eq!(gate.state(), GateState::Opening);

        // 0.0625 then 0.125 > 0.1: one step every two ticks
        gate.update(DT);
        assert_eq!(gate.rect.h, 64.0);
        gate.update(DT);
        assert_eq!(gate.rect.h, 48.0);
        assert_eq!(gate.rect.y, 0.0);

        for _ in 0..6 {
            gate.update(DT);
        }
        assert!(gate.is_open());
        assert_eq!(gate.state(), GateState::Opening);
        gate.update(DT);
        assert_eq!(gate.state(), GateState::Open);
    }

    #[test]
    fn test_close_and_lock() {
        let mut gate = Gate::new(Rect::new(0.0, 0.0, 16.0, 32.0));
        gate.open();
        for _ in 0..10 {
            gate.update(DT);
        }
        assert_eq!(gate.state(), GateState::Open);

        gate.close();
        gate.lock();
        for _ in 0..10 {
            gate.update(DT);
        }
        assert_eq!(gate.state(), GateState::Closed);
        assert_eq!(gate.rect.h, 32.0);

        gate.open();
        assert_eq!(gate.state(), GateState::Closed);
    }
}
