//! Kinematic Body
//!
//! The state every moving object shares: a center-based position, velocity,
//! hitbox size and the gravity/clip/falling flags. The `collide_*` methods
//! are the only way collision resolution moves a body: each one zeroes the
//! velocity axis it stops, snaps the body flush against the contact
//! boundary and asks for an animation reset.

use crate::math::{Rect, Vec2};

/// Side of a body that touched something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Left,
    Right,
}

impl Direction {
    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction from `from` toward `to` (right on a tie)
    pub fn toward(from: f32, to: f32) -> Self {
        if to < from {
            Direction::Left
        } else {
            Direction::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Center of the hitbox
    pub position: Vec2,
    pub velocity: Vec2,
    /// Hitbox extent
    pub size: Vec2,
    /// Affected by gravity
    pub gravity: bool,
    /// Collides with platforms
    pub clip: bool,
    pub falling: bool,
    /// Owner should restart its current animation
    pub reset_animation: bool,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            gravity: true,
            clip: true,
            falling: false,
            reset_animation: false,
        }
    }

    pub fn hitbox(&self) -> Rect {
        debug_assert!(self.position.is_finite(), "non-finite body position {:?}", self.position);
        Rect::from_center(self.position, self.size)
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.size.x * 0.5
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x * 0.5
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.size.y * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y * 0.5
    }

    pub fn accelerate(&mut self, dx: f32, dy: f32) {
        self.velocity.x += dx;
        self.velocity.y += dy;
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.velocity = Vec2::new(vx, vy);
    }

    pub fn stop_x(&mut self) {
        self.velocity.x = 0.0;
    }

    /// Move by one tick of velocity
    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    /// Resting on a surface at `y`
    pub fn collide_bottom(&mut self, y: f32) {
        self.velocity.y = 0.0;
        self.position.y = (y - self.size.y * 0.5).round();
        self.falling = false;
        self.reset_animation = true;
    }

    /// Head hit a ceiling at `y`
    pub fn collide_top(&mut self, y: f32) {
        self.velocity.y = 0.0;
        self.position.y = (y + self.size.y * 0.5).round();
        self.falling = true;
        self.reset_animation = true;
    }

    /// Ran into a wall whose left edge is `x`
    pub fn collide_right(&mut self, x: f32) {
        if self.velocity.x > 0.0 {
            self.velocity.x = 0.0;
        }
        self.position.x = (x - self.size.x * 0.5).round();
        self.reset_animation = true;
    }

    /// Ran into a wall whose right edge is `x`
    pub fn collide_left(&mut self, x: f32) {
        if self.velocity.x < 0.0 {
            self.velocity.x = 0.0;
        }
        self.position.x = (x + self.size.x * 0.5).round();
        self.reset_animation = true;
    }

    /// Dispatch a contact to the matching `collide_*`
    pub fn collide(&mut self, side: Side, boundary: f32) {
        match side {
            Side::Bottom => self.collide_bottom(boundary),
            Side::Top => self.collide_top(boundary),
            Side::Left => self.collide_left(boundary),
            Side::Right => self.collide_right(boundary),
        }
    }

    /// Adopt a new hitbox width, keeping the center
    pub fn set_width(&mut self, width: f32) {
        self.size.x = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Body {
        Body::new(Vec2::new(100.0, 50.0), Vec2::new(24.0, 24.0))
    }

    #[test]
    fn test_edges() {
        let b = body();
        assert_eq!(b.left(), 88.0);
        assert_eq!(b.right(), 112.0);
        assert_eq!(b.top(), 38.0);
        assert_eq!(b.bottom(), 62.0);
        assert_eq!(b.hitbox(), Rect::new(88.0, 38.0, 24.0, 24.0));
    }

    #[test]
    fn test_collide_bottom_lands() {
        let mut b = body();
        b.falling = true;
        b.velocity = Vec2::new(1.0, 5.0);
        b.collide_bottom(60.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
        assert!(!b.falling);
        assert!(b.reset_animation);
    }

    #[test]
    fn test_collide_top_starts_falling() {
        let mut b = body();
        b.velocity.y = -8.0;
        b.collide_top(30.0);
        assert_eq!(b.top(), 30.0);
        assert_eq!(b.velocity.y, 0.0);
        assert!(b.falling);
    }

    #[test]
    fn test_side_contacts_only_stop_motion_into_wall() {
        let mut b = body();
        b.velocity.x = -2.0;
        b.collide_right(110.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.velocity.x, -2.0);

        b.collide_left(80.0);
        assert_eq!(b.left(), 80.0);
        assert_eq!(b.velocity.x, 0.0);
    }

    #[test]
    fn test_snap_rounds() {
        let mut b = Body::new(Vec2::new(0.0, 0.0), Vec2::new(16.0, 21.0));
        b.collide_bottom(100.0);
        assert_eq!(b.position.y, 90.0);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::toward(10.0, 4.0), Direction::Left);
        assert_eq!(Direction::toward(10.0, 10.0), Direction::Right);
        assert_eq!(Direction::Left.reversed().sign(), 1.0);
    }
}
