//! Collision System
//!
//! Axis-aligned rectangle resolution of a moving body against stage
//! terrain. Per tick, obstacle categories are checked as an exclusive chain:
//!
//! 1. Platforms: the first intersecting platform (registration order) whose
//!    contact side can be classified gets corrected
//! 2. Ladders, only when no platform intersects: a ladder top stops a body
//!    that is descending through it and not climbing
//! 3. Map boundary, only when neither of the above intersects
//!
//! A correction triggers one more full pass against the corrected position.
//! Residual penetration after that second pass is accepted.
//!
//! Gates, hazards and contact damage are checked afterwards by the world.

use super::body::{Body, Side};
use super::config::{PhysicsTuning, TILE_SIZE};
use super::event::Events;
use super::gate::{Gate, GateState};
use super::stage::{Hazard, Stage};
use crate::math::Rect;

/// Passes after the first one
const MAX_RECHECK_DEPTH: u8 = 1;

/// Anything the resolver can push around.
pub trait Collider {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Climbers pass through ladder tops
    fn is_climbing(&self) -> bool {
        false
    }

    /// React to a contact. The default snaps the body.
    fn on_contact(&mut self, side: Side, boundary: f32, _events: &mut Events) {
        self.body_mut().collide(side, boundary);
    }
}

impl Collider for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

/// Which obstacle category produced a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    Platform,
    Ladder,
    MapBoundary,
}

/// One applied correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub obstacle: Obstacle,
    pub side: Side,
    /// Edge the body was snapped against
    pub boundary: f32,
}

/// Result of resolving one body for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Corrections in the order they were applied
    pub contacts: Vec<Contact>,
}

impl CollisionResult {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Landed on something this tick
    pub fn landed(&self) -> bool {
        self.contacts.iter().any(|c| c.side == Side::Bottom)
    }

    pub fn touched(&self, side: Side) -> bool {
        self.contacts.iter().any(|c| c.side == side)
    }
}

/// Decide which side of `body` hits `platform`, from its velocity and the
/// overlap on each axis. Vertical contacts win over horizontal ones.
pub fn classify(body: &Body, platform: &Rect) -> Option<(Side, f32)> {
    let v = body.velocity;
    let (left, right, top, bottom) = (body.left(), body.right(), body.top(), body.bottom());
    let (pleft, pright, ptop, pbottom) = (platform.left(), platform.right(), platform.top(), platform.bottom());

    if v.x > 0.0 && v.y == 0.0 {
        return (pleft < right).then_some((Side::Right, pleft));
    }
    if v.x < 0.0 && v.y == 0.0 {
        return (pright > left).then_some((Side::Left, pright));
    }
    if v.y > 0.0 && v.x == 0.0 {
        return (ptop < bottom).then_some((Side::Bottom, ptop));
    }
    if v.y < 0.0 && v.x == 0.0 {
        return (pbottom > top).then_some((Side::Top, pbottom));
    }
    if v.x == 0.0 && v.y == 0.0 {
        return None;
    }

    // Diagonal: the center trajectory picks the axis, with the shallower
    // overlap as the tie-break when the center is outside the span
    let overlap = body.hitbox().overlap(platform);
    let center_within = body.position.x >= pleft && body.position.x <= pright;
    let vertical = center_within || (overlap.y < overlap.x && overlap.y < TILE_SIZE);

    if vertical {
        if v.y > 0.0 && ptop < bottom {
            return Some((Side::Bottom, ptop));
        }
        if v.y < 0.0 && pbottom > top {
            return Some((Side::Top, pbottom));
        }
    }

    if overlap.x < TILE_SIZE {
        if v.x > 0.0 && right > pleft && right < pright {
            return Some((Side::Right, pleft));
        }
        if v.x < 0.0 && left < pright && left > pleft {
            return Some((Side::Left, pright));
        }
    }

    None
}

/// Resolve a collider against platforms, ladders and the map edge.
pub fn resolve_terrain<C: Collider>(collider: &mut C, stage: &Stage, events: &mut Events) -> CollisionResult {
    let mut result = CollisionResult::default();
    resolve_pass(collider, stage, events, 0, &mut result);
    result
}

fn resolve_pass<C: Collider>(
    collider: &mut C,
    stage: &Stage,
    events: &mut Events,
    depth: u8,
    result: &mut CollisionResult,
) {
    let body = *collider.body();
    let hitbox = body.hitbox();
    debug_assert!(!hitbox.is_empty(), "zero-area hitbox at {:?}", body.position);

    let mut colliding_platforms = stage.platforms.iter().filter(|p| hitbox.intersects(&p.rect)).peekable();

    let contact = if colliding_platforms.peek().is_some() {
        colliding_platforms
            .find_map(|p| classify(&body, &p.rect))
            .map(|(side, boundary)| Contact { obstacle: Obstacle::Platform, side, boundary })
    } else if !collider.is_climbing() && body.gravity && stage.ladder_behind(&hitbox).is_some() {
        let half_height = body.size.y * 0.5;
        let bottom = body.bottom();
        stage.ladders
            .iter()
            .filter(|l| hitbox.intersects(&l.rect))
            .find(|l| body.velocity.y > 0.0 && l.rect.top() < bottom && bottom - l.rect.top() < half_height)
            .map(|l| Contact { obstacle: Obstacle::Ladder, side: Side::Bottom, boundary: l.rect.top() })
    } else if body.left() < 0.0 {
        Some(Contact { obstacle: Obstacle::MapBoundary, side: Side::Left, boundary: 0.0 })
    } else if body.right() > stage.width {
        Some(Contact { obstacle: Obstacle::MapBoundary, side: Side::Right, boundary: stage.width })
    } else {
        None
    };

    if let Some(contact) = contact {
        tracing::trace!(
            obstacle = ?contact.obstacle,
            side = ?contact.side,
            boundary = contact.boundary,
            x = body.position.x,
            y = body.position.y,
            vx = body.velocity.x,
            vy = body.velocity.y,
            depth,
            "collision"
        );
        collider.on_contact(contact.side, contact.boundary, events);
        result.contacts.push(contact);

        if depth < MAX_RECHECK_DEPTH {
            resolve_pass(collider, stage, events, depth + 1, result);
        }
    }
}

/// Gravity for one tick: accelerate while falling (clamped to terminal
/// velocity), start falling when nothing supports the body.
pub fn apply_gravity(body: &mut Body, stage: &Stage, physics: &PhysicsTuning) {
    if !body.gravity {
        return;
    }

    if body.falling {
        let vy = body.velocity.y;
        if vy == 0.0 {
            body.velocity.y += physics.fall_start;
        } else if vy < physics.terminal_velocity {
            body.velocity.y += physics.gravity_step;
        }
        body.velocity.y = body.velocity.y.min(physics.terminal_velocity);
    } else if !stage.has_support(&body.hitbox()) {
        body.falling = true;
    }
}

/// How a body met a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateContact {
    /// Locked gate pushed the body back
    Blocked(usize),
    /// Touched a closed, unlocked gate
    Entered(usize),
    /// Inside a gate that is already opening or open
    Passing(usize),
}

/// Check a collider against gates. Locked gates push back to the near edge
/// and halt horizontal motion; unlocked gates are passable.
pub fn resolve_gates<C: Collider>(collider: &mut C, gates: &[Gate], events: &mut Events) -> Option<GateContact> {
    let hitbox = collider.body().hitbox();
    let (index, gate) = gates.iter().enumerate().find(|(_, g)| hitbox.intersects(&g.rect))?;

    if gate.is_locked() {
        if collider.body().position.x < gate.rect.center_x() {
            collider.on_contact(Side::Right, gate.rect.left(), events);
        } else {
            collider.on_contact(Side::Left, gate.rect.right(), events);
        }
        collider.body_mut().stop_x();
        return Some(GateContact::Blocked(index));
    }

    match gate.state() {
        GateState::Closed => Some(GateContact::Entered(index)),
        _ => Some(GateContact::Passing(index)),
    }
}

/// First hazard overlapping `rect`
pub fn touching_hazard<'a>(stage: &'a Stage, rect: &Rect) -> Option<&'a Hazard> {
    stage.hazards.iter().find(|h| rect.intersects(&h.rect))
}
