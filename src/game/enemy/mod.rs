//! Enemies
//!
//! One `Enemy` struct for every enemy type. Per-type constants live in the
//! `EnemyKind` stats table; per-type behavior is a `Behavior` variant with
//! its own state, dispatched by matching on the tag:
//!
//! - `heli`: horizontal patrol with vertical swoops at the player
//! - `shooter`: wall-mounted turret that opens and fires in bursts
//! - `cutter`: ballistic jumps toward the player
//! - `octo`: eye that opens and travels along one axis between walls
//!
//! Animation frames report `EnemyEvent`s that the owning enemy applies to
//! its own state; they never touch other entities.

mod cutter;
mod heli;
mod octo;
mod registry;
mod shooter;

pub use cutter::{arc_position, flight_time, CutterPhase, CutterState};
pub use heli::{HeliState, SwoopPhase};
pub use octo::{OctoPhase, OctoState};
pub use registry::{Enemies, EnemyTemplate, SpawnError};
pub use shooter::{ShooterPhase, ShooterState};

use std::collections::BTreeMap;

use super::animation::{AnimationSet, Animator, Frame};
use super::body::{Body, Direction, Side};
use super::camera::{Axis, View};
use super::collision::Collider;
use super::entity::Entity;
use super::event::{Events, Sound};
use super::weapon::{Pellet, Team};
use crate::math::{Rect, Vec2};

// =============================================================================
// Kinds and stats
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    BlueHeli,
    GreenHeli,
    BlueShooter,
    RedShooter,
    Cutter,
    OctoBattery,
}

/// Defaults for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub move_speed_x: f32,
    pub move_speed_y: f32,
    pub moving: bool,
    pub hit_points: i32,
    /// Contact damage
    pub damage: i32,
    pub gravity: bool,
    pub clip: bool,
    /// Awarded on death
    pub points: u32,
}

const HELI: EnemyStats = EnemyStats {
    move_speed_x: 1.0,
    move_speed_y: 2.0,
    moving: true,
    hit_points: 1,
    damage: 4,
    gravity: false,
    clip: false,
    points: 500,
};

const SHOOTER: EnemyStats = EnemyStats {
    move_speed_x: 0.0,
    move_speed_y: 0.0,
    moving: false,
    hit_points: 1,
    damage: 4,
    gravity: false,
    clip: false,
    points: 800,
};

const CUTTER: EnemyStats = EnemyStats {
    move_speed_x: 0.0,
    move_speed_y: 0.0,
    moving: false,
    hit_points: 2,
    damage: 4,
    gravity: true,
    clip: true,
    points: 300,
};

const OCTO: EnemyStats = EnemyStats {
    move_speed_x: 2.0,
    move_speed_y: 2.0,
    moving: false,
    hit_points: 3,
    damage: 4,
    gravity: false,
    clip: true,
    points: 300,
};

impl EnemyKind {
    /// Map a spawn-layer type tag to a kind
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "bhc" => Some(EnemyKind::BlueHeli),
            "ghc" => Some(EnemyKind::GreenHeli),
            "bws" => Some(EnemyKind::BlueShooter),
            "rws" => Some(EnemyKind::RedShooter),
            "cut" => Some(EnemyKind::Cutter),
            "oct" => Some(EnemyKind::OctoBattery),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            EnemyKind::BlueHeli => "bhc",
            EnemyKind::GreenHeli => "ghc",
            EnemyKind::BlueShooter => "bws",
            EnemyKind::RedShooter => "rws",
            EnemyKind::Cutter => "cut",
            EnemyKind::OctoBattery => "oct",
        }
    }

    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::BlueHeli | EnemyKind::GreenHeli => &HELI,
            EnemyKind::BlueShooter | EnemyKind::RedShooter => &SHOOTER,
            EnemyKind::Cutter => &CUTTER,
            EnemyKind::OctoBattery => &OCTO,
        }
    }

    fn animations(self) -> AnimationSet<AnimKey, EnemyEvent> {
        match self {
            EnemyKind::BlueHeli => heli::animations(376.0, 416.0),
            EnemyKind::GreenHeli => heli::animations(296.0, 336.0),
            EnemyKind::BlueShooter => shooter::animations(291.0),
            EnemyKind::RedShooter => shooter::animations(251.0),
            EnemyKind::Cutter => cutter::animations(),
            EnemyKind::OctoBattery => octo::animations(),
        }
    }
}

// =============================================================================
// Overrides
// =============================================================================

/// Spawn-point properties layered over the kind's stats
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyOverrides {
    pub direction: Option<Direction>,
    pub move_speed_x: Option<f32>,
    pub move_speed_y: Option<f32>,
    pub moving: Option<bool>,
    pub hit_points: Option<i32>,
    pub damage: Option<i32>,
    pub axis: Option<Axis>,
}

impl EnemyOverrides {
    /// Parse the recognized keys of a property bag. Unrecognized keys are
    /// ignored; a recognized key with a malformed value is an error.
    pub fn parse(properties: &BTreeMap<String, String>) -> Result<Self, SpawnError> {
        fn bad(key: &str, value: &str) -> SpawnError {
            SpawnError::BadProperty { key: key.to_string(), value: value.to_string() }
        }

        let mut overrides = EnemyOverrides::default();
        for (key, value) in properties {
            let v = value.trim();
            match key.as_str() {
                "direction" => {
                    overrides.direction = Some(match v {
                        "0" | "left" => Direction::Left,
                        "1" | "right" => Direction::Right,
                        _ => return Err(bad(key, value)),
                    });
                }
                "move_speed_x" => {
                    overrides.move_speed_x = Some(v.parse().map_err(|_| bad(key, value))?);
                }
                "move_speed_y" => {
                    overrides.move_speed_y = Some(v.parse().map_err(|_| bad(key, value))?);
                }
                "moving" => {
                    overrides.moving = Some(match v {
                        "1" | "true" => true,
                        "0" | "false" => false,
                        _ => return Err(bad(key, value)),
                    });
                }
                "hit_points" => {
                    overrides.hit_points = Some(v.parse().map_err(|_| bad(key, value))?);
                }
                "damage" => {
                    overrides.damage = Some(v.parse().map_err(|_| bad(key, value))?);
                }
                "axis" => {
                    overrides.axis = Some(match v {
                        "x" => Axis::X,
                        "y" => Axis::Y,
                        _ => return Err(bad(key, value)),
                    });
                }
                _ => {}
            }
        }

        let finite = |f: Option<f32>| f.map(f32::is_finite).unwrap_or(true);
        if !finite(overrides.move_speed_x) {
            return Err(bad("move_speed_x", "non-finite"));
        }
        if !finite(overrides.move_speed_y) {
            return Err(bad("move_speed_y", "non-finite"));
        }
        Ok(overrides)
    }
}

// =============================================================================
// Shared runtime types
// =============================================================================

/// Read-only snapshot of the player handed to enemy behaviors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerProbe {
    pub position: Vec2,
    pub hitbox: Rect,
    pub falling: bool,
}

impl PlayerProbe {
    pub fn top(&self) -> f32 {
        self.hitbox.top()
    }

    pub fn bottom(&self) -> f32 {
        self.hitbox.bottom()
    }

    pub fn height(&self) -> f32 {
        self.hitbox.h
    }
}

/// Frame events for enemy animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyEvent {
    SetClosed,
    SetOpen,
    StartShooting,
    CloseAndDeactivate,
    Opened,
    Closed,
}

/// Animation poses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pose {
    Move,
    Still,
    Shoot,
    Jump,
    Closed,
    Opening,
    Open,
    Closing,
}

pub type AnimKey = (Pose, Direction);

/// Insert `frames` under `pose` for both facings, mirroring for `flip_facing`
fn both_facings(
    set: AnimationSet<AnimKey, EnemyEvent>,
    pose: Pose,
    frames: Vec<Frame<EnemyEvent>>,
    flip_facing: Direction,
) -> AnimationSet<AnimKey, EnemyEvent> {
    let flipped = frames.iter().map(|f| (*f).flipped(true)).collect();
    let (plain_dir, flip_dir) = (flip_facing.reversed(), flip_facing);
    set.with((pose, plain_dir), frames).with((pose, flip_dir), flipped)
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Heli(HeliState),
    Shooter(ShooterState),
    Cutter(CutterState),
    Octo(OctoState),
}

// =============================================================================
// Enemy
// =============================================================================

#[derive(Debug, Clone)]
pub struct Enemy {
    /// Spawn template this enemy came from
    pub template: usize,
    pub name: String,
    pub kind: EnemyKind,
    pub body: Body,
    pub direction: Direction,
    pub move_speed: Vec2,
    pub hit_points: i32,
    pub damage: i32,
    pub start_position: Vec2,
    pub behavior: Behavior,
    /// Last terrain contact side, consumed by behaviors
    pub last_contact: Option<Side>,
    /// Team that dealt the last damage
    pub last_hit_by: Option<Team>,
    animator: Animator<AnimKey, EnemyEvent>,
}

impl Enemy {
    pub fn spawn(
        template: usize,
        name: &str,
        kind: EnemyKind,
        position: Vec2,
        overrides: &EnemyOverrides,
        player: &PlayerProbe,
    ) -> Self {
        let stats = kind.stats();

        // Helis always turn toward the player
        let direction = match kind {
            EnemyKind::BlueHeli | EnemyKind::GreenHeli => Direction::toward(position.x, player.position.x),
            _ => overrides.direction.unwrap_or_default(),
        };

        let behavior = match kind {
            EnemyKind::BlueHeli | EnemyKind::GreenHeli => Behavior::Heli(HeliState::default()),
            EnemyKind::BlueShooter | EnemyKind::RedShooter => {
                Behavior::Shooter(ShooterState::new(kind == EnemyKind::RedShooter))
            }
            EnemyKind::Cutter => Behavior::Cutter(CutterState::default()),
            EnemyKind::OctoBattery => {
                Behavior::Octo(OctoState::new(overrides.axis.unwrap_or(Axis::X), direction.sign()))
            }
        };

        let move_speed = Vec2::new(
            overrides.move_speed_x.unwrap_or(stats.move_speed_x),
            overrides.move_speed_y.unwrap_or(stats.move_speed_y),
        );

        let initial_pose = match behavior {
            Behavior::Heli(_) => Pose::Move,
            Behavior::Octo(_) => Pose::Closed,
            _ => Pose::Still,
        };
        let animator = Animator::new(kind.animations(), (initial_pose, direction));

        let mut body = Body::new(position, animator.frame().size);
        body.gravity = stats.gravity;
        body.clip = stats.clip;
        if overrides.moving.unwrap_or(stats.moving) {
            body.velocity.x = direction.sign() * move_speed.x;
        }

        tracing::debug!(name, kind = kind.type_name(), x = position.x, y = position.y, ?direction, "enemy spawned");

        Self {
            template,
            name: name.to_string(),
            kind,
            body,
            direction,
            move_speed,
            hit_points: overrides.hit_points.unwrap_or(stats.hit_points),
            damage: overrides.damage.unwrap_or(stats.damage),
            start_position: position,
            behavior,
            last_contact: None,
            last_hit_by: None,
            animator,
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn points(&self) -> u32 {
        self.kind.stats().points
    }

    pub fn is_dead(&self) -> bool {
        self.hit_points <= 0
    }

    pub fn frame(&self) -> &Frame<EnemyEvent> {
        self.animator.frame()
    }

    pub fn animation_index(&self) -> usize {
        self.animator.animation().index()
    }

    /// Take a pellet hit. Closed shooters deflect it.
    pub fn hit(&mut self, damage: i32, team: Team, events: &mut Events) -> bool {
        if let Behavior::Shooter(state) = &self.behavior {
            if !state.open {
                events.play(Sound::Dink);
                return false;
            }
        }
        self.hit_points -= damage;
        self.last_hit_by = Some(team);
        events.play(Sound::EnemyDamage);
        true
    }

    /// Behavior decision against the current player snapshot
    pub fn react(&mut self, player: &PlayerProbe) {
        match self.behavior {
            Behavior::Heli(_) => heli::react(self, player),
            Behavior::Shooter(_) => shooter::react(self, player),
            Behavior::Cutter(_) => cutter::react(self, player),
            Behavior::Octo(_) => {}
        }
    }

    /// Per-tick state update, after `react`. Shots are pushed to `shots`.
    pub fn update(&mut self, entity: Entity, delta: f32, events: &mut Events, shots: &mut Vec<Pellet>) {
        match self.behavior {
            Behavior::Heli(_) => heli::update(self, delta),
            Behavior::Shooter(_) => shooter::update(self, entity, delta, events, shots),
            Behavior::Cutter(_) => cutter::update(self, delta),
            Behavior::Octo(_) => octo::update(self, delta),
        }
    }

    fn pose(&self) -> Pose {
        match &self.behavior {
            Behavior::Heli(_) => Pose::Move,
            Behavior::Shooter(state) => if state.active { Pose::Shoot } else { Pose::Still },
            Behavior::Cutter(state) => if state.is_jumping() { Pose::Jump } else { Pose::Still },
            Behavior::Octo(state) => state.pose(),
        }
    }

    /// Advance the current animation and apply its frame events.
    pub fn update_animation(&mut self, delta: f32) {
        let key = (self.pose(), self.direction);
        let reset = std::mem::take(&mut self.body.reset_animation);
        let step = self.animator.tick(key, reset, delta);
        for event in step.events() {
            self.handle_event(*event);
        }
    }

    fn handle_event(&mut self, event: EnemyEvent) {
        match self.behavior {
            Behavior::Shooter(_) => shooter::handle_event(self, event),
            Behavior::Octo(_) => octo::handle_event(self, event),
            Behavior::Heli(_) | Behavior::Cutter(_) => {}
        }
    }

    /// More than half a view outside the view horizontally, or below the map
    pub fn is_off_screen(&self, view: &View, map_height: f32) -> bool {
        let x = self.body.position.x;
        let half = (view.width / 2.0).floor();
        x < view.offset.x - half || x > view.offset.x + view.width + half || self.body.top() > map_height
    }
}

impl Collider for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn on_contact(&mut self, side: Side, boundary: f32, _events: &mut Events) {
        self.body.collide(side, boundary);
        self.last_contact = Some(side);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn probe(x: f32, y: f32) -> PlayerProbe {
        PlayerProbe {
            position: Vec2::new(x, y),
            hitbox: Rect::from_center(Vec2::new(x, y), Vec2::new(24.0, 24.0)),
            falling: false,
        }
    }

    pub(crate) fn spawn(kind: EnemyKind, x: f32, y: f32, player: &PlayerProbe) -> Enemy {
        Enemy::spawn(0, "test", kind, Vec2::new(x, y), &EnemyOverrides::default(), player)
    }

    #[test]
    fn test_kind_table() {
        assert_eq!(EnemyKind::from_type("rws"), Some(EnemyKind::RedShooter));
        assert_eq!(EnemyKind::from_type("xyz"), None);
        for kind in [EnemyKind::BlueHeli, EnemyKind::BlueShooter, EnemyKind::Cutter, EnemyKind::OctoBattery] {
            assert_eq!(EnemyKind::from_type(kind.type_name()), Some(kind));
        }
        assert_eq!(EnemyKind::GreenHeli.stats().damage, 4);
    }

    #[test]
    fn test_overrides_parse() {
        let mut props = BTreeMap::new();
        props.insert("direction".to_string(), "1".to_string());
        props.insert("hit_points".to_string(), "5".to_string());
        props.insert("axis".to_string(), "y".to_string());
        props.insert("spawn_note".to_string(), "whatever".to_string());
        let o = EnemyOverrides::parse(&props).unwrap();
        assert_eq!(o.direction, Some(Direction::Right));
        assert_eq!(o.hit_points, Some(5));
        assert_eq!(o.axis, Some(Axis::Y));
        assert_eq!(o.damage, None);

        props.insert("move_speed_x".to_string(), "fast".to_string());
        assert!(matches!(EnemyOverrides::parse(&props), Err(SpawnError::BadProperty { .. })));
    }

    #[test]
    fn test_overrides_apply_over_defaults() {
        let player = probe(0.0, 0.0);
        let overrides = EnemyOverrides {
            direction: Some(Direction::Right),
            hit_points: Some(3),
            moving: Some(false),
            ..Default::default()
        };
        let shooter = Enemy::spawn(2, "s", EnemyKind::BlueShooter, Vec2::new(50.0, 50.0), &overrides, &player);
        assert_eq!(shooter.hit_points, 3);
        assert_eq!(shooter.damage, 4);
        assert_eq!(shooter.direction, Direction::Right);
        assert_eq!(shooter.template, 2);
        assert_eq!(shooter.body.size, Vec2::new(16.0, 16.0));
    }

    #[test]
    fn test_heli_faces_player_and_patrols() {
        let heli = spawn(EnemyKind::BlueHeli, 300.0, 100.0, &probe(100.0, 100.0));
        assert_eq!(heli.direction, Direction::Left);
        assert_eq!(heli.body.velocity, Vec2::new(-1.0, 0.0));
        assert!(!heli.body.gravity);
    }

    #[test]
    fn test_hit_and_death() {
        let mut events = Events::new();
        let mut heli = spawn(EnemyKind::GreenHeli, 300.0, 100.0, &probe(100.0, 100.0));
        assert!(heli.hit(1, Team::Player, &mut events));
        assert!(heli.is_dead());
        assert_eq!(heli.last_hit_by, Some(Team::Player));
        assert_eq!(events.sounds.iter().next().map(|s| s.sound), Some(Sound::EnemyDamage));
    }

    #[test]
    fn test_off_screen() {
        let heli = spawn(EnemyKind::BlueHeli, 700.0, 100.0, &probe(100.0, 100.0));
        let view = View::new(384.0, 384.0);
        assert!(heli.is_off_screen(&view, 384.0));

        let near = spawn(EnemyKind::BlueHeli, 500.0, 100.0, &probe(100.0, 100.0));
        assert!(!near.is_off_screen(&view, 384.0));
    }
}
