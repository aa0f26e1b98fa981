//! Pellets
//!
//! Straight-line projectiles. Velocity is fixed at spawn: axis-aligned for
//! the player's buster and blue wall shooters, angle-derived toward a target
//! for red wall shooters. Pellets ignore terrain and die once they leave the
//! view.

use super::body::{Body, Direction};
use super::camera::View;
use super::entity::Entity;
use crate::math::{Rect, Vec2};

pub const BUSTER_SPEED: f32 = 10.0;
pub const BUSTER_DAMAGE: i32 = 1;
pub const SHOOTER_DAMAGE: i32 = 2;

const BUSTER_REGION: Rect = Rect { x: 0.0, y: 0.0, w: 14.0, h: 10.0 };
const SHOOTER_REGION: Rect = Rect { x: 281.0, y: 296.0, w: 6.0, h: 6.0 };

/// Which side fired a pellet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Player,
    Enemy,
}

#[derive(Debug, Clone)]
pub struct Pellet {
    pub team: Team,
    pub body: Body,
    pub damage: i32,
    /// Enemy that fired it
    pub owner: Option<Entity>,
    pub region: Rect,
}

impl Pellet {
    fn new(team: Team, position: Vec2, velocity: Vec2, damage: i32, region: Rect) -> Self {
        let mut body = Body::new(position, region.size());
        body.velocity = velocity;
        body.gravity = false;
        body.clip = false;
        Self { team, body, damage, owner: None, region }
    }

    /// Player buster shot
    pub fn buster(position: Vec2, direction: Direction) -> Self {
        let velocity = Vec2::new(direction.sign() * BUSTER_SPEED, 0.0);
        Self::new(Team::Player, position, velocity, BUSTER_DAMAGE, BUSTER_REGION)
    }

    /// Wall shooter shot along its facing
    pub fn straight(owner: Entity, position: Vec2, direction: Direction, speed: f32) -> Self {
        let velocity = Vec2::new(direction.sign() * speed, 0.0);
        let mut pellet = Self::new(Team::Enemy, position, velocity, SHOOTER_DAMAGE, SHOOTER_REGION);
        pellet.owner = Some(owner);
        pellet
    }

    /// Wall shooter shot toward `target`. Falls back to `fallback` when the
    /// target sits on the muzzle.
    pub fn aimed(owner: Entity, position: Vec2, target: Vec2, speed: f32, fallback: Direction) -> Self {
        let delta = target - position;
        if delta.len() == 0.0 {
            return Self::straight(owner, position, fallback, speed);
        }
        let mut pellet = Self::new(Team::Enemy, position, delta.normalize() * speed, SHOOTER_DAMAGE, SHOOTER_REGION);
        pellet.owner = Some(owner);
        pellet
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn update_position(&mut self) {
        self.body.integrate();
    }

    /// Left the view on either axis
    pub fn is_off_view(&self, view: &View) -> bool {
        let p = self.body.position;
        p.x < view.offset.x
            || p.x - view.offset.x > view.width
            || p.y < view.offset.y
            || p.y - view.offset.y > view.height
    }
}

/// Muzzle position for a buster shot: the facing edge, a third of the way
/// down the body.
pub fn buster_origin(body: &Body, direction: Direction) -> Vec2 {
    let x = match direction {
        Direction::Right => body.right(),
        Direction::Left => body.left(),
    };
    Vec2::new(x, body.top() + (body.size.y / 3.0).floor())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> View {
        View::new(384.0, 384.0)
    }

    #[test]
    fn test_buster_travels_horizontally() {
        let mut pellet = Pellet::buster(Vec2::new(100.0, 100.0), Direction::Left);
        pellet.update_position();
        assert_eq!(pellet.body.position, Vec2::new(90.0, 100.0));
        assert_eq!(pellet.team, Team::Player);
        assert_eq!(pellet.damage, 1);
    }

    #[test]
    fn test_aimed_velocity_has_requested_magnitude() {
        let owner = Entity::new(0, 1);
        let pellet = Pellet::aimed(owner, Vec2::new(0.0, 0.0), Vec2::new(30.0, 40.0), 1.5, Direction::Left);
        assert!((pellet.body.velocity.len() - 1.5).abs() < 1e-5);
        assert!((pellet.body.velocity.x - 0.9).abs() < 1e-5);
        assert!((pellet.body.velocity.y - 1.2).abs() < 1e-5);
        assert_eq!(pellet.owner, Some(owner));
    }

    #[test]
    fn test_aimed_at_self_fires_straight() {
        let p = Vec2::new(10.0, 10.0);
        let pellet = Pellet::aimed(Entity::new(0, 1), p, p, 1.5, Direction::Right);
        assert_eq!(pellet.body.velocity, Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_off_view() {
        let v = view();
        let inside = Pellet::buster(Vec2::new(100.0, 100.0), Direction::Right);
        assert!(!inside.is_off_view(&v));
        let right = Pellet::buster(Vec2::new(385.0, 100.0), Direction::Right);
        assert!(right.is_off_view(&v));
        let below = Pellet::buster(Vec2::new(100.0, 400.0), Direction::Right);
        assert!(below.is_off_view(&v));
    }

    #[test]
    fn test_buster_origin() {
        let body = Body::new(Vec2::new(100.0, 100.0), Vec2::new(24.0, 24.0));
        assert_eq!(buster_origin(&body, Direction::Right), Vec2::new(112.0, 96.0));
        assert_eq!(buster_origin(&body, Direction::Left), Vec2::new(88.0, 96.0));
    }
}
