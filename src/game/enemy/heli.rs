//! Heli: patrols horizontally and swoops at the player.
//!
//! ```text
//! Patrol ──(player above/below, |dx| < 25)──> Swooping
//! Swooping ──(reached target y)──> reverse at double speed
//! Swooping ──(back at home y)──> CoolingDown ──(2 s)──> ready again
//! ```
//!
//! The return leg ends at the heli's own height when the swoop began (its
//! home y) and snaps there, rather than ending once the heli leaves the
//! player's height band. Patrol altitude therefore never drifts between
//! swoops.

use super::super::animation::{AnimationSet, Frame};
use super::super::body::{Body, Direction};
use super::{both_facings, AnimKey, Behavior, Enemy, EnemyEvent, PlayerProbe, Pose};
use crate::math::Rect;

/// Horizontal band around the heli that triggers a swoop
const SWOOP_BAND: f32 = 25.0;
/// Seconds between swoops
const COOLDOWN: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SwoopPhase {
    #[default]
    Patrol,
    Swooping {
        down: bool,
        target_y: f32,
        home_y: f32,
    },
    CoolingDown {
        elapsed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeliState {
    pub phase: SwoopPhase,
}

pub(super) fn animations(first_x: f32, second_x: f32) -> AnimationSet<AnimKey, EnemyEvent> {
    let frames = vec![
        Frame::new(0.05, Rect::new(first_x, 329.0, 16.0, 20.0)),
        Frame::new(0.05, Rect::new(second_x, 329.0, 16.0, 20.0)),
    ];
    both_facings(AnimationSet::new(), Pose::Move, frames, Direction::Right)
}

/// Vertical impulse; doubles when already moving vertically
fn move_vertical(body: &mut Body, speed: f32, down: bool) {
    let magnitude = if body.velocity.y != 0.0 { speed * 2.0 } else { speed };
    body.velocity.y = if down { magnitude } else { -magnitude };
}

pub(super) fn react(enemy: &mut Enemy, player: &PlayerProbe) {
    let Behavior::Heli(state) = &mut enemy.behavior else {
        return;
    };

    let ready = match state.phase {
        SwoopPhase::Patrol => true,
        SwoopPhase::CoolingDown { elapsed } => elapsed >= COOLDOWN,
        SwoopPhase::Swooping { .. } => false,
    };
    if !ready {
        return;
    }

    let (x, y) = (enemy.body.position.x, enemy.body.position.y);
    if (x - player.position.x).abs() >= SWOOP_BAND {
        return;
    }

    let down = if player.bottom() < y {
        false
    } else if player.top() > y {
        true
    } else {
        return;
    };

    move_vertical(&mut enemy.body, enemy.move_speed.y, down);
    state.phase = SwoopPhase::Swooping { down, target_y: player.position.y, home_y: y };
    tracing::trace!(name = %enemy.name, down, target_y = player.position.y, "heli swoop");
}

pub(super) fn update(enemy: &mut Enemy, delta: f32) {
    let Behavior::Heli(state) = &mut enemy.behavior else {
        return;
    };
    let body = &mut enemy.body;

    match &mut state.phase {
        SwoopPhase::Swooping { down, target_y, home_y } => {
            let (vy, y) = (body.velocity.y, body.position.y);
            let (reverse, returned) = if *down {
                (vy > 0.0 && y >= *target_y, vy < 0.0 && y <= *home_y)
            } else {
                (vy < 0.0 && y <= *target_y, vy > 0.0 && y >= *home_y)
            };

            if reverse {
                move_vertical(body, enemy.move_speed.y, !*down);
            } else if returned {
                body.velocity.y = 0.0;
                body.position.y = *home_y;
                state.phase = SwoopPhase::CoolingDown { elapsed: 0.0 };
            }
        }
        SwoopPhase::CoolingDown { elapsed } => *elapsed += delta,
        SwoopPhase::Patrol => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemy::tests::{probe, spawn};
    use crate::game::enemy::EnemyKind;

    const DT: f32 = 1.0 / 60.0;

    fn phase(enemy: &Enemy) -> SwoopPhase {
        match &enemy.behavior {
            Behavior::Heli(state) => state.phase,
            _ => unreachable!(),
        }
    }

    fn tick(enemy: &mut Enemy, player: &PlayerProbe) {
        enemy.react(player);
        update(enemy, DT);
        enemy.body.integrate();
    }

    #[test]
    fn test_swoop_down_and_return() {
        let player = probe(200.0, 200.0);
        let mut heli = spawn(EnemyKind::BlueHeli, 210.0, 100.0, &player);
        heli.body.velocity.x = 0.0;

        tick(&mut heli, &player);
        assert!(matches!(phase(&heli), SwoopPhase::Swooping { down: true, .. }));
        assert_eq!(heli.body.velocity.y, 2.0);

        let mut lowest = heli.body.position.y;
        for _ in 0..200 {
            tick(&mut heli, &player);
            lowest = lowest.max(heli.body.position.y);
            if matches!(phase(&heli), SwoopPhase::CoolingDown { .. }) {
                break;
            }
        }

        assert!(lowest >= 200.0);
        assert!(matches!(phase(&heli), SwoopPhase::CoolingDown { .. }));
        assert_eq!(heli.body.position.y, 100.0);
        assert_eq!(heli.body.velocity.y, 0.0);
    }

    #[test]
    fn test_reverse_is_double_speed() {
        let player = probe(200.0, 50.0);
        let mut heli = spawn(EnemyKind::GreenHeli, 200.0, 100.0, &player);
        heli.body.velocity.x = 0.0;

        tick(&mut heli, &player);
        assert_eq!(heli.body.velocity.y, -2.0);
        while heli.body.velocity.y < 0.0 {
            tick(&mut heli, &player);
        }
        assert_eq!(heli.body.velocity.y, 4.0);
    }

    #[test]
    fn test_cooldown_blocks_next_swoop() {
        let player = probe(200.0, 200.0);
        let mut heli = spawn(EnemyKind::BlueHeli, 200.0, 100.0, &player);
        heli.body.velocity.x = 0.0;
        if let Behavior::Heli(state) = &mut heli.behavior {
            state.phase = SwoopPhase::CoolingDown { elapsed: 0.0 };
        }

        for _ in 0..60 {
            tick(&mut heli, &player);
        }
        assert!(matches!(phase(&heli), SwoopPhase::CoolingDown { .. }));

        for _ in 0..70 {
            tick(&mut heli, &player);
        }
        assert!(matches!(phase(&heli), SwoopPhase::Swooping { .. }));
    }

    #[test]
    fn test_no_swoop_outside_band() {
        let player = probe(100.0, 200.0);
        let mut heli = spawn(EnemyKind::BlueHeli, 200.0, 100.0, &player);
        tick(&mut heli, &player);
        assert_eq!(phase(&heli), SwoopPhase::Patrol);
    }
}
