//! Wall shooter: a turret that opens while the player is near and fires a
//! burst of four shots.
//!
//! The cycle is driven entirely by its animation's frame events:
//!
//! | frame | hold  | event                |
//! |-------|-------|----------------------|
//! | 0     | 1.0 s | `SetClosed`          |
//! | 1     | 0.1 s | `SetOpen`            |
//! | 2     | 0.1 s |                      |
//! | 3     | 3.5 s | `StartShooting`      |
//! | 4     | 0.1 s |                      |
//! | 5     | 0.1 s |                      |
//! | 6     | 0.5 s | `CloseAndDeactivate` |
//!
//! Blue shooters fire straight ahead. Red shooters fan their burst around
//! where the player stood when shooting started.

use super::super::animation::{AnimationSet, Frame};
use super::super::body::Direction;
use super::super::entity::Entity;
use super::super::event::{Events, Sound};
use super::super::weapon::Pellet;
use super::{both_facings, AnimKey, Behavior, Enemy, EnemyEvent, PlayerProbe, Pose};
use crate::math::{Rect, Vec2};

/// Horizontal distance at which the shooter wakes up
const ACTIVATION_RANGE: f32 = 100.0;
/// Seconds between shots in a burst
const SHOT_INTERVAL: f32 = 0.75;
const MAX_SHOTS: usize = 4;
const STRAIGHT_SPEED: f32 = 1.0;
const AIMED_SPEED: f32 = 1.5;
/// Vertical spread of a red shooter's targets around the player
const TARGET_SPREAD: [f32; MAX_SHOTS] = [-24.0, -8.0, 8.0, 24.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterState {
    pub active: bool,
    pub deactivating: bool,
    pub shooting: bool,
    /// Vulnerable to pellets
    pub open: bool,
    pub shots_fired: usize,
    pub shoot_time: f32,
    aimed: bool,
    last_player: Vec2,
    targets: [Vec2; MAX_SHOTS],
}

impl ShooterState {
    pub fn new(aimed: bool) -> Self {
        Self {
            active: false,
            deactivating: false,
            shooting: false,
            open: false,
            shots_fired: 0,
            shoot_time: 0.0,
            aimed,
            last_player: Vec2::ZERO,
            targets: [Vec2::ZERO; MAX_SHOTS],
        }
    }

    /// Phase implied by the shooting animation's frame
    pub fn phase(&self, frame_index: usize) -> ShooterPhase {
        if !self.active {
            return ShooterPhase::Closed;
        }
        match frame_index {
            1 | 2 => ShooterPhase::Opening,
            3 => ShooterPhase::Open,
            4 | 5 => ShooterPhase::Closing,
            _ => ShooterPhase::Closed,
        }
    }

    pub fn targets(&self) -> &[Vec2] {
        &self.targets
    }
}

impl Enemy {
    /// Current wall shooter phase, `None` for other behaviors
    pub fn shooter_phase(&self) -> Option<ShooterPhase> {
        match &self.behavior {
            Behavior::Shooter(state) => Some(state.phase(self.animation_index())),
            _ => None,
        }
    }
}

pub(super) fn animations(row_y: f32) -> AnimationSet<AnimKey, EnemyEvent> {
    let region = |x: f32| Rect::new(x, row_y, 16.0, 16.0);
    let shoot = vec![
        Frame::new(1.0, region(412.0)).with_event(EnemyEvent::SetClosed),
        Frame::new(0.1, region(372.0)).with_event(EnemyEvent::SetOpen),
        Frame::new(0.1, region(332.0)),
        Frame::new(3.5, region(295.0)).with_event(EnemyEvent::StartShooting),
        Frame::new(0.1, region(332.0)),
        Frame::new(0.1, region(372.0)),
        Frame::new(0.5, region(412.0)).with_event(EnemyEvent::CloseAndDeactivate),
    ];
    let still = vec![Frame::new(1.0, region(412.0))];

    let set = both_facings(AnimationSet::new(), Pose::Shoot, shoot, Direction::Right);
    both_facings(set, Pose::Still, still, Direction::Right)
}

pub(super) fn react(enemy: &mut Enemy, player: &PlayerProbe) {
    let Behavior::Shooter(state) = &mut enemy.behavior else {
        return;
    };
    state.last_player = player.position;

    let in_range = (enemy.body.position.x - player.position.x).abs() <= ACTIVATION_RANGE;
    if in_range && !state.active {
        state.active = true;
        state.deactivating = false;
        enemy.body.reset_animation = true;
        tracing::trace!(name = %enemy.name, "shooter activated");
    } else if state.active {
        state.deactivating = !in_range;
    }
}

pub(super) fn update(enemy: &mut Enemy, entity: Entity, delta: f32, events: &mut Events, shots: &mut Vec<Pellet>) {
    let Behavior::Shooter(state) = &mut enemy.behavior else {
        return;
    };
    if !state.active || !state.shooting {
        return;
    }

    state.shoot_time += delta;
    if state.shots_fired == 0 || state.shoot_time >= SHOT_INTERVAL {
        let body = &enemy.body;
        let x = match enemy.direction {
            Direction::Right => body.right(),
            Direction::Left => body.left(),
        };
        let origin = Vec2::new(x, body.bottom());

        let pellet = if state.aimed {
            let target = state.targets[state.shots_fired];
            Pellet::aimed(entity, origin, target, AIMED_SPEED, enemy.direction)
        } else {
            Pellet::straight(entity, origin, enemy.direction, STRAIGHT_SPEED)
        };
        shots.push(pellet);
        events.play(Sound::EnemyShoot);

        state.shoot_time = 0.0;
        state.shots_fired += 1;
    }

    if state.shots_fired == MAX_SHOTS {
        state.shooting = false;
    }
}

pub(super) fn handle_event(enemy: &mut Enemy, event: EnemyEvent) {
    let Behavior::Shooter(state) = &mut enemy.behavior else {
        return;
    };
    match event {
        EnemyEvent::SetClosed => state.open = false,
        EnemyEvent::SetOpen => state.open = true,
        EnemyEvent::StartShooting => {
            state.shooting = true;
            state.shoot_time = 0.0;
            state.shots_fired = 0;
            let center = state.last_player;
            state.targets = TARGET_SPREAD.map(|dy| Vec2::new(center.x, center.y + dy));
        }
        EnemyEvent::CloseAndDeactivate => {
            state.open = false;
            if state.deactivating {
                state.active = false;
                state.deactivating = false;
                tracing::trace!(name = %enemy.name, "shooter deactivated");
            }
        }
        EnemyEvent::Opened | EnemyEvent::Closed => {}
    }
}
