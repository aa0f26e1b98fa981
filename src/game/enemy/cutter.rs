//! Cutter: leaps at the player along a ballistic arc.
//!
//! The arc is evaluated analytically from the jump's origin, direction and
//! start time, never integrated step by step, so a trajectory is fully
//! determined by `(origin, direction, start time)`:
//!
//! ```text
//! x(t) = x0 + dir·v·sin θ·t
//! y(t) = y0 − (v·cos θ·t − ½·g·t²)
//! ```
//!
//! The jump ends at `t = 2·v·cos θ / g`, back on the origin's height.

use super::super::animation::{AnimationSet, Frame};
use super::super::body::Direction;
use super::{both_facings, AnimKey, Behavior, Enemy, EnemyEvent, PlayerProbe, Pose};
use crate::math::{Rect, Vec2};

const TRIGGER_DISTANCE: f32 = 80.0;
/// Launch speed (px/s)
const JUMP_SPEED: f32 = 220.0;
/// Launch angle measured from vertical
const JUMP_ANGLE_DEGREES: f32 = 35.0;
/// Arc gravity (px/s²)
const ARC_GRAVITY: f32 = 600.0;
/// Seconds spent idle after landing
const REST_TIME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutterPhase {
    Idle { rest: f32 },
    Jumping { origin: Vec2, direction: Direction, start_time: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutterState {
    pub phase: CutterPhase,
    /// Seconds since spawn
    clock: f32,
}

impl Default for CutterState {
    fn default() -> Self {
        Self { phase: CutterPhase::Idle { rest: 0.0 }, clock: 0.0 }
    }
}

impl CutterState {
    pub fn is_jumping(&self) -> bool {
        matches!(self.phase, CutterPhase::Jumping { .. })
    }
}

/// Seconds from launch to landing
pub fn flight_time() -> f32 {
    2.0 * JUMP_SPEED * JUMP_ANGLE_DEGREES.to_radians().cos() / ARC_GRAVITY
}

/// Position on the arc `t` seconds after launch
pub fn arc_position(origin: Vec2, direction: Direction, t: f32) -> Vec2 {
    let theta = JUMP_ANGLE_DEGREES.to_radians();
    let x = origin.x + direction.sign() * JUMP_SPEED * theta.sin() * t;
    let y = origin.y - (JUMP_SPEED * theta.cos() * t - 0.5 * ARC_GRAVITY * t * t);
    Vec2::new(x, y)
}

pub(super) fn animations() -> AnimationSet<AnimKey, EnemyEvent> {
    let still = vec![Frame::new(1.0, Rect::new(256.0, 369.0, 16.0, 16.0))];
    let jump = vec![
        Frame::new(0.1, Rect::new(276.0, 369.0, 16.0, 16.0)),
        Frame::new(0.1, Rect::new(296.0, 369.0, 16.0, 16.0)),
    ];
    let set = both_facings(AnimationSet::new(), Pose::Still, still, Direction::Right);
    both_facings(set, Pose::Jump, jump, Direction::Right)
}

pub(super) fn react(enemy: &mut Enemy, player: &PlayerProbe) {
    let Behavior::Cutter(state) = &mut enemy.behavior else {
        return;
    };
    let CutterPhase::Idle { rest } = state.phase else {
        return;
    };

    let position = enemy.body.position;
    if rest > 0.0 || (position.x - player.position.x).abs() >= TRIGGER_DISTANCE {
        return;
    }

    let direction = Direction::toward(position.x, player.position.x);
    enemy.direction = direction;
    state.phase = CutterPhase::Jumping { origin: position, direction, start_time: state.clock };

    let body = &mut enemy.body;
    body.gravity = false;
    body.clip = false;
    body.falling = false;
    body.velocity = Vec2::ZERO;
    body.reset_animation = true;
    tracing::trace!(name = %enemy.name, ?direction, "cutter jump");
}

pub(super) fn update(enemy: &mut Enemy, delta: f32) {
    let Behavior::Cutter(state) = &mut enemy.behavior else {
        return;
    };
    state.clock += delta;

    match state.phase {
        CutterPhase::Idle { rest } => {
            state.phase = CutterPhase::Idle { rest: (rest - delta).max(0.0) };
        }
        CutterPhase::Jumping { origin, direction, start_time } => {
            let t = state.clock - start_time;
            let total = flight_time();
            let body = &mut enemy.body;

            if t >= total {
                let landing = arc_position(origin, direction, total);
                body.position = Vec2::new(landing.x, origin.y);
                body.gravity = true;
                body.clip = true;
                body.reset_animation = true;
                state.phase = CutterPhase::Idle { rest: REST_TIME };
            } else {
                body.position = arc_position(origin, direction, t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemy::tests::{probe, spawn};
    use crate::game::enemy::EnemyKind;

    const DT: f32 = 1.0 / 60.0;

    fn phase(enemy: &Enemy) -> CutterPhase {
        match &enemy.behavior {
            Behavior::Cutter(state) => state.phase,
            _ => unreachable!(),
        }
    }

    fn tick(enemy: &mut Enemy, player: &PlayerProbe) {
        enemy.react(player);
        enemy.update(crate::game::entity::Entity::new(0, 1), DT, &mut crate::game::event::Events::new(), &mut Vec::new());
    }

    #[test]
    fn test_arc_is_symmetric() {
        let origin = Vec2::new(100.0, 200.0);
        let total = flight_time();
        assert!((total - 0.6007).abs() < 1e-3);

        let landing = arc_position(origin, Direction::Right, total);
        assert!((landing.y - origin.y).abs() < 1e-3);
        assert!((landing.x - (100.0 + 220.0 * 35f32.to_radians().sin() * total)).abs() < 1e-3);

        let apex = arc_position(origin, Direction::Left, total / 2.0);
        assert!(apex.y < origin.y - 25.0);
        assert!(apex.x < origin.x);
    }

    #[test]
    fn test_jumps_toward_player_and_rests() {
        let player = probe(150.0, 200.0);
        let mut cutter = spawn(EnemyKind::Cutter, 200.0, 200.0, &player);

        tick(&mut cutter, &player);
        assert!(matches!(phase(&cutter), CutterPhase::Jumping { direction: Direction::Left, .. }));
        assert!(!cutter.body.gravity);
        assert!(cutter.body.position.y < 200.0);

        // Position follows the closed form at every tick
        let mut t = DT;
        for _ in 0..20 {
            tick(&mut cutter, &player);
            t += DT;
            let expected = arc_position(Vec2::new(200.0, 200.0), Direction::Left, t);
            assert!((cutter.body.position.x - expected.x).abs() < 1e-2);
            assert!((cutter.body.position.y - expected.y).abs() < 1e-2);
        }

        while matches!(phase(&cutter), CutterPhase::Jumping { .. }) {
            tick(&mut cutter, &player);
        }
        assert_eq!(cutter.body.position.y, 200.0);
        assert!(cutter.body.gravity);
        assert!(matches!(phase(&cutter), CutterPhase::Idle { rest } if rest > 0.4));

        // Still resting on the next tick even though the player is close
        tick(&mut cutter, &player);
        assert!(matches!(phase(&cutter), CutterPhase::Idle { .. }));
    }

    #[test]
    fn test_ignores_distant_player() {
        let player = probe(50.0, 200.0);
        let mut cutter = spawn(EnemyKind::Cutter, 200.0, 200.0, &player);
        for _ in 0..10 {
            tick(&mut cutter, &player);
        }
        assert!(matches!(phase(&cutter), CutterPhase::Idle { .. }));
    }
}
