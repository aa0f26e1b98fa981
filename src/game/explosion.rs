//! Death explosions: four shrinking frames, then gone.

use super::animation::{Animation, Frame};
use crate::math::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionEvent {
    Remove,
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub position: Vec2,
    animation: Animation<ExplosionEvent>,
    current_time: f32,
    finished: bool,
}

impl Explosion {
    pub fn new(position: Vec2) -> Self {
        let animation = Animation::new(vec![
            Frame::new(0.1, Rect::new(48.0, 10.0, 16.0, 16.0)),
            Frame::new(0.1, Rect::new(67.0, 13.0, 12.0, 12.0)),
            Frame::new(0.1, Rect::new(82.0, 13.0, 10.0, 10.0)),
            Frame::new(0.1, Rect::new(84.0, 16.0, 4.0, 4.0)).with_event(ExplosionEvent::Remove),
        ]);
        Self {
            position,
            animation,
            current_time: 0.0,
            finished: false,
        }
    }

    pub fn frame(&self) -> &Frame<ExplosionEvent> {
        self.animation.current()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance; returns true once the last frame has been reached.
    pub fn update(&mut self, delta: f32) -> bool {
        self.current_time += delta;
        if self.current_time >= self.animation.next_time {
            let (_, event) = self.animation.advance(0.0);
            if event == Some(ExplosionEvent::Remove) {
                self.finished = true;
            }
            self.current_time = 0.0;
        }
        self.finished
    }
}
