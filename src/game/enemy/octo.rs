//! Octo battery: an eye that sits closed, opens, and slides along its axis
//! until it hits terrain, then closes and reverses.

use super::super::animation::{AnimationSet, Frame};
use super::super::body::{Direction, Side};
use super::super::camera::Axis;
use super::{both_facings, AnimKey, Behavior, Enemy, EnemyEvent, Pose};
use crate::math::{Rect, Vec2};

/// Seconds spent closed before opening
const CLOSED_TIME: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OctoPhase {
    Closed { elapsed: f32 },
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctoState {
    pub phase: OctoPhase,
    pub axis: Axis,
    /// +1 or -1 along the axis
    pub travel: f32,
}

impl OctoState {
    pub fn new(axis: Axis, travel: f32) -> Self {
        Self { phase: OctoPhase::Closed { elapsed: 0.0 }, axis, travel }
    }

    pub(super) fn pose(&self) -> Pose {
        match self.phase {
            OctoPhase::Closed { .. } => Pose::Closed,
            OctoPhase::Opening => Pose::Opening,
            OctoPhase::Open => Pose::Open,
            OctoPhase::Closing => Pose::Closing,
        }
    }

    fn blocks_travel(&self, side: Side) -> bool {
        match self.axis {
            Axis::X => matches!(side, Side::Left | Side::Right),
            Axis::Y => matches!(side, Side::Top | Side::Bottom),
        }
    }
}

pub(super) fn animations() -> AnimationSet<AnimKey, EnemyEvent> {
    let region = |x: f32| Rect::new(x, 409.0, 16.0, 16.0);
    let closed = vec![Frame::new(1.0, region(256.0))];
    let opening = vec![
        Frame::new(0.1, region(256.0)),
        Frame::new(0.1, region(276.0)),
        Frame::new(0.1, region(296.0)).with_event(EnemyEvent::Opened),
    ];
    let open = vec![Frame::new(1.0, region(296.0))];
    let closing = vec![
        Frame::new(0.1, region(296.0)),
        Frame::new(0.1, region(276.0)),
        Frame::new(0.1, region(256.0)).with_event(EnemyEvent::Closed),
    ];

    let mut set = AnimationSet::new();
    for (pose, frames) in [(Pose::Closed, closed), (Pose::Opening, opening), (Pose::Open, open), (Pose::Closing, closing)] {
        set = both_facings(set, pose, frames, Direction::Right);
    }
    set
}

pub(super) fn update(enemy: &mut Enemy, delta: f32) {
    let contact = enemy.last_contact.take();
    let Behavior::Octo(state) = &mut enemy.behavior else {
        return;
    };

    match &mut state.phase {
        OctoPhase::Closed { elapsed } => {
            *elapsed += delta;
            if *elapsed >= CLOSED_TIME {
                state.phase = OctoPhase::Opening;
                enemy.body.reset_animation = true;
            }
        }
        OctoPhase::Open => {
            if let Some(side) = contact.filter(|s| state.blocks_travel(*s)) {
                enemy.body.velocity = Vec2::ZERO;
                state.travel = -state.travel;
                state.phase = OctoPhase::Closing;
                enemy.body.reset_animation = true;
                tracing::trace!(name = %enemy.name, ?side, "octo hit wall");
            }
        }
        OctoPhase::Opening | OctoPhase::Closing => {}
    }
}

pub(super) fn handle_event(enemy: &mut Enemy, event: EnemyEvent) {
    let Behavior::Octo(state) = &mut enemy.behavior else {
        return;
    };
    match event {
        EnemyEvent::Opened => {
            state.phase = OctoPhase::Open;
            enemy.body.velocity = match state.axis {
                Axis::X => Vec2::new(state.travel * enemy.move_speed.x, 0.0),
                Axis::Y => Vec2::new(0.0, state.travel * enemy.move_speed.y),
            };
            if state.axis == Axis::X {
                enemy.direction = if state.travel > 0.0 { Direction::Right } else { Direction::Left };
            }
        }
        EnemyEvent::Closed => {
            state.phase = OctoPhase::Closed { elapsed: 0.0 };
        }
        _ => {}
    }
}
