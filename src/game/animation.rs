//! Frame Animation Engine
//!
//! An `Animation` is a non-empty loop of timed frames. Frames may carry an
//! event that is reported when the frame becomes current; owners match on
//! the returned event to drive their own state machines (a wall shooter
//! opening, the player's damage recovery, an explosion removing itself).
//!
//! `reset()` primes an animation for restart: the index goes to the last
//! frame with `next_time = 0`, so the very next `advance()` rolls over to
//! frame 0 and reports its event.
//!
//! `Animator` is the per-object driver shared by the player, enemies,
//! items and explosions: it picks the animation for the current key,
//! applies pending resets, accumulates time and advances when due.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::math::{Rect, Vec2};

/// Where a frame's image lives on its sprite sheet. Never inspected by the
/// simulation, only handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub region: Rect,
    /// Mirror horizontally
    pub flip: bool,
    /// Sheet uses a color key for transparency
    pub alpha: bool,
}

/// One timed frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<E> {
    /// Seconds the frame stays current
    pub duration: f32,
    pub sprite: Sprite,
    /// Hitbox size while this frame is current
    pub size: Vec2,
    pub event: Option<E>,
}

impl<E> Frame<E> {
    /// Frame whose hitbox matches the sprite region
    pub fn new(duration: f32, region: Rect) -> Self {
        Self {
            duration,
            sprite: Sprite { region, flip: false, alpha: true },
            size: region.size(),
            event: None,
        }
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.sprite.flip = flip;
        self
    }

    pub fn with_event(mut self, event: E) -> Self {
        self.event = Some(event);
        self
    }

    /// Override the hitbox size (e.g. wide shooting poses keep a body-sized box)
    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.size = Vec2::new(w, h);
        self
    }
}

/// Ordered loop of frames
#[derive(Debug, Clone)]
pub struct Animation<E> {
    frames: Vec<Frame<E>>,
    index: usize,
    /// Time at which the current frame expires
    pub next_time: f32,
    /// Reported by `reset()`
    on_reset: Option<E>,
}

impl<E: Copy> Animation<E> {
    /// Panics on an empty frame list.
    pub fn new(frames: Vec<Frame<E>>) -> Self {
        assert!(!frames.is_empty(), "animation needs at least one frame");
        let next_time = frames[0].duration;
        Self {
            frames,
            index: 0,
            next_time,
            on_reset: None,
        }
    }

    /// Event reported every time the animation is reset
    pub fn with_reset_event(mut self, event: E) -> Self {
        self.on_reset = Some(event);
        self
    }

    pub fn current(&self) -> &Frame<E> {
        &self.frames[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Prime for restart. Returns the reset event, if one is registered;
    /// `index()` holds the new (last) index.
    pub fn reset(&mut self) -> Option<E> {
        self.index = self.frames.len() - 1;
        self.next_time = 0.0;
        self.on_reset
    }

    /// Roll over to the next frame. Returns the new frame and its event.
    pub fn advance(&mut self, elapsed: f32) -> (&Frame<E>, Option<E>) {
        self.index = (self.index + 1) % self.frames.len();
        let frame = &self.frames[self.index];
        self.next_time = frame.duration + elapsed;
        (frame, frame.event)
    }
}

/// Animations keyed by an owner-defined key.
#[derive(Debug, Clone)]
pub struct AnimationSet<K, E> {
    animations: HashMap<K, Animation<E>>,
}

impl<K: Copy + Eq + Hash + Debug, E: Copy> AnimationSet<K, E> {
    pub fn new() -> Self {
        Self { animations: HashMap::new() }
    }

    pub fn insert(&mut self, key: K, animation: Animation<E>) {
        self.animations.insert(key, animation);
    }

    /// Builder form of `insert`
    pub fn with(mut self, key: K, frames: Vec<Frame<E>>) -> Self {
        self.insert(key, Animation::new(frames));
        self
    }

    pub fn contains(&self, key: K) -> bool {
        self.animations.contains_key(&key)
    }

    /// Panics when nothing is registered under `key`.
    pub fn get(&self, key: K) -> &Animation<E> {
        self.animations
            .get(&key)
            .unwrap_or_else(|| panic!("no animation registered for {:?}", key))
    }

    /// Panics when nothing is registered under `key`.
    pub fn get_mut(&mut self, key: K) -> &mut Animation<E> {
        self.animations
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no animation registered for {:?}", key))
    }
}

impl<K: Copy + Eq + Hash + Debug, E: Copy> Default for AnimationSet<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened during one `Animator::tick`
#[derive(Debug, Clone, Copy)]
pub struct AnimationStep<E> {
    /// Event registered on the animation, reported by a reset
    pub reset_event: Option<E>,
    /// Event of the frame that became current
    pub event: Option<E>,
    /// Hitbox size of the new frame, when the frame changed
    pub size: Option<Vec2>,
}

impl<E> AnimationStep<E> {
    /// Reset and frame events in the order they fired
    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.reset_event.iter().chain(self.event.iter())
    }
}

/// Per-object animation driver
#[derive(Debug, Clone)]
pub struct Animator<K, E> {
    set: AnimationSet<K, E>,
    key: K,
    current_time: f32,
}

impl<K: Copy + Eq + Hash + Debug, E: Copy> Animator<K, E> {
    /// Panics when `initial` has no animation.
    pub fn new(set: AnimationSet<K, E>, initial: K) -> Self {
        assert!(set.contains(initial), "no animation registered for {:?}", initial);
        Self {
            set,
            key: initial,
            current_time: 0.0,
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn animation(&self) -> &Animation<E> {
        self.set.get(self.key)
    }

    pub fn frame(&self) -> &Frame<E> {
        self.animation().current()
    }

    /// Select `key`, reset it if requested, then advance when the current
    /// frame has expired.
    pub fn tick(&mut self, key: K, reset: bool, delta: f32) -> AnimationStep<E> {
        self.key = key;
        let animation = self.set.get_mut(key);

        let mut step = AnimationStep {
            reset_event: None,
            event: None,
            size: None,
        };

        if reset {
            step.reset_event = animation.reset();
        }

        self.current_time += delta;
        if self.current_time >= animation.next_time {
            let (frame, event) = animation.advance(0.0);
            step.size = Some(frame.size);
            step.event = event;
            self.current_time = 0.0;
        }

        step
    }
}
