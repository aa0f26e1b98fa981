//! Camera and Zones
//!
//! The view offset follows the player inside the active zone. When the
//! player crosses into a different zone the camera stops following and
//! sweeps to the new zone on a single axis at a fixed speed:
//!
//! ```text
//! Steady ──(player zone != active zone)──> Transitioning{axis, destination}
//!    ^                                              │
//!    └──────────(offset == destination)─────────────┘
//! ```
//!
//! Entity simulation is frozen by the world while a transition runs.

use super::config::CameraTuning;
use super::stage::Stage;
use crate::math::{Rect, Vec2};

/// Visible window into the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub width: f32,
    pub height: f32,
    /// Map position of the view's top-left corner
    pub offset: Vec2,
}

impl View {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, offset: Vec2::ZERO }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.width, self.height)
    }

    /// Strictly inside the view
    pub fn in_view(&self, rect: &Rect) -> bool {
        rect.left() > self.offset.x
            && rect.right() < self.offset.x + self.width
            && rect.top() > self.offset.y
            && rect.bottom() < self.offset.y + self.height
    }

    /// Just outside the left or right edge, within `distance`
    pub fn in_range(&self, rect: &Rect, distance: f32) -> bool {
        let right = self.offset.x + self.width;
        let left = self.offset.x;
        let right_distance = (rect.left() - right).abs();
        let left_distance = (left - rect.right()).abs();
        (right_distance < distance && rect.left() > right) || (left_distance < distance && rect.right() < left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An in-progress sweep between zones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub axis: Axis,
    /// Offset component the sweep ends on
    pub destination: f32,
    /// Steps taken so far
    pub ticks: u32,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub view: View,
    speed: f32,
    active_zone: Option<usize>,
    transition: Option<Transition>,
}

impl Camera {
    pub fn new(tuning: &CameraTuning) -> Self {
        Self {
            view: View::new(tuning.view_width, tuning.view_height),
            speed: tuning.transition_speed,
            active_zone: None,
            transition: None,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.view.offset
    }

    pub fn active_zone(&self) -> Option<usize> {
        self.active_zone
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Jump straight to the zone containing `target` (stage start, respawn).
    pub fn snap_to(&mut self, stage: &Stage, target: Vec2) {
        self.transition = None;
        self.active_zone = stage.zone_at(target);
        self.follow(stage, target);
    }

    /// Steady-state tracking: center on `target`, clamped to the active
    /// zone (or the whole map when there is none).
    pub fn follow(&mut self, stage: &Stage, target: Vec2) {
        if self.transition.is_some() {
            return;
        }
        let bounds = self.bounds(stage);
        let x = clamp_axis(target.x - self.view.width * 0.5, bounds.left(), bounds.right() - self.view.width);
        let y = clamp_axis(target.y - self.view.height * 0.5, bounds.top(), bounds.bottom() - self.view.height);
        self.view.offset = Vec2::new(x, y);
    }

    fn bounds(&self, stage: &Stage) -> Rect {
        self.active_zone
            .and_then(|i| stage.zones.get(i))
            .map(|z| z.rect)
            .unwrap_or_else(|| stage.bounds())
    }

    /// Start a transition when the player has left the active zone.
    /// Returns true when one started.
    pub fn check_transition(&mut self, stage: &Stage, player: Vec2, falling: bool) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let Some(target_index) = stage.zone_at(player) else {
            return false;
        };
        let Some(source_index) = self.active_zone else {
            self.active_zone = Some(target_index);
            return false;
        };
        if target_index == source_index {
            return false;
        }

        let source = &stage.zones[source_index];
        let target = &stage.zones[target_index];

        if target.rect.top() > source.rect.top() && falling && !target.allows_fall_in() {
            tracing::trace!(from = %source.name, to = %target.name, "zone transition inhibited while falling");
            return false;
        }

        let axis = if target.rect.x != source.rect.x { Axis::X } else { Axis::Y };
        let (origin, far, extent, current) = match axis {
            Axis::X => (target.rect.left(), target.rect.right(), self.view.width, self.view.offset.x),
            Axis::Y => (target.rect.top(), target.rect.bottom(), self.view.height, self.view.offset.y),
        };
        let destination = if origin >= current { origin } else { origin.max(far - extent) };

        tracing::debug!(from = %source.name, to = %target.name, ?axis, destination, "zone transition started");

        self.transition = Some(Transition {
            from: source_index,
            to: target_index,
            axis,
            destination,
            ticks: 0,
        });
        true
    }

    /// Move one step toward the destination. Returns the new active zone
    /// when the sweep completes.
    pub fn step_transition(&mut self) -> Option<usize> {
        let transition = self.transition.as_mut()?;
        let current = match transition.axis {
            Axis::X => &mut self.view.offset.x,
            Axis::Y => &mut self.view.offset.y,
        };

        let remaining = transition.destination - *current;
        let step = remaining.abs().min(self.speed);
        *current += step.copysign(remaining);
        if (transition.destination - *current).abs() < f32::EPSILON {
            *current = transition.destination;
        }
        transition.ticks += 1;

        if *current == transition.destination {
            let done = *transition;
            self.transition = None;
            self.active_zone = Some(done.to);
            tracing::debug!(zone = done.to, ticks = done.ticks, "zone transition complete");
            Some(done.to)
        } else {
            None
        }
    }
}

/// Clamp that tolerates a zone smaller than the view
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    if max < min {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stage::tests::flat_stage;
    use crate::game::stage::MapObject;

    fn camera() -> Camera {
        Camera::new(&CameraTuning::default())
    }

    #[test]
    fn test_follow_clamps_to_zone() {
        let stage = Stage::from_data(flat_stage()).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(40.0, 300.0));
        assert_eq!(cam.active_zone(), Some(0));
        assert_eq!(cam.offset(), Vec2::ZERO);

        // Entry zone is exactly one view wide: no horizontal scroll
        cam.follow(&stage, Vec2::new(300.0, 300.0));
        assert_eq!(cam.offset().x, 0.0);
    }

    #[test]
    fn test_follow_scrolls_inside_wide_zone() {
        let mut data = flat_stage();
        data.zones = vec![MapObject::new(Rect::new(0.0, 0.0, 768.0, 384.0)).with_name("wide")];
        let stage = Stage::from_data(data).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(100.0, 300.0));
        assert_eq!(cam.offset().x, 0.0);

        cam.follow(&stage, Vec2::new(300.0, 300.0));
        assert_eq!(cam.offset().x, 108.0);

        cam.follow(&stage, Vec2::new(760.0, 300.0));
        assert_eq!(cam.offset().x, 384.0);
    }

    #[test]
    fn test_transition_tick_count_and_destination() {
        let stage = Stage::from_data(flat_stage()).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(370.0, 300.0));

        assert!(cam.check_transition(&stage, Vec2::new(390.0, 300.0), false));
        assert_eq!(cam.transition().map(|t| t.axis), Some(Axis::X));

        let mut ticks = 0;
        let done = loop {
            ticks += 1;
            if let Some(zone) = cam.step_transition() {
                break zone;
            }
            assert!(cam.offset().x < 384.0);
        };

        assert_eq!(done, 1);
        assert_eq!(ticks, (384.0f32 / 4.0).ceil() as u32);
        assert_eq!(cam.offset().x, 384.0);
        assert_eq!(cam.active_zone(), Some(1));
        assert!(!cam.is_transitioning());
    }

    #[test]
    fn test_uneven_distance_does_not_overshoot() {
        let mut data = flat_stage();
        data.zones[1].rect.x = 386.0;
        data.zones[0].rect.w = 386.0;
        let stage = Stage::from_data(data).unwrap();
        let mut cam = Camera::new(&CameraTuning { transition_speed: 4.0, ..Default::default() });
        cam.snap_to(&stage, Vec2::new(370.0, 300.0));
        cam.view.offset.x = 0.0;

        assert!(cam.check_transition(&stage, Vec2::new(390.0, 300.0), false));
        let mut ticks = 0;
        while cam.step_transition().is_none() {
            ticks += 1;
        }
        assert_eq!(ticks + 1, (386.0f32 / 4.0).ceil() as u32);
        assert_eq!(cam.offset().x, 386.0);
    }

    #[test]
    fn test_falling_into_lower_zone_is_inhibited() {
        let mut data = flat_stage();
        data.height = 768.0;
        data.zones = vec![
            MapObject::new(Rect::new(0.0, 0.0, 384.0, 384.0)).with_name("top"),
            MapObject::new(Rect::new(0.0, 384.0, 384.0, 384.0)).with_name("shaft"),
        ];
        let stage = Stage::from_data(data.clone()).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(100.0, 300.0));

        assert!(!cam.check_transition(&stage, Vec2::new(100.0, 400.0), true));
        assert!(cam.check_transition(&stage, Vec2::new(100.0, 400.0), false));
        assert_eq!(cam.transition().map(|t| t.axis), Some(Axis::Y));

        data.zones[1] = data.zones[1].clone().with_property("fall_in", "true");
        let stage = Stage::from_data(data).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(100.0, 300.0));
        assert!(cam.check_transition(&stage, Vec2::new(100.0, 400.0), true));
    }

    #[test]
    fn test_leftward_transition_ends_on_far_edge() {
        let stage = Stage::from_data(flat_stage()).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(400.0, 300.0));
        assert_eq!(cam.offset().x, 384.0);

        assert!(cam.check_transition(&stage, Vec2::new(380.0, 300.0), false));
        assert_eq!(cam.transition().map(|t| t.destination), Some(0.0));
    }

    #[test]
    fn test_leftward_transition_into_wide_zone_stops_one_view_short() {
        let mut data = flat_stage();
        data.width = 1152.0;
        data.zones = vec![
            MapObject::new(Rect::new(0.0, 0.0, 768.0, 384.0)).with_name("long"),
            MapObject::new(Rect::new(768.0, 0.0, 384.0, 384.0)).with_name("end"),
        ];
        let stage = Stage::from_data(data).unwrap();
        let mut cam = camera();
        cam.snap_to(&stage, Vec2::new(800.0, 300.0));
        assert_eq!(cam.offset().x, 768.0);

        // The view lands on the long zone's right end, not its origin
        assert!(cam.check_transition(&stage, Vec2::new(760.0, 300.0), false));
        assert_eq!(cam.transition().map(|t| t.destination), Some(384.0));

        let mut ticks = 1;
        while cam.step_transition().is_none() {
            ticks += 1;
        }
        assert_eq!(ticks, 96);
        assert_eq!(cam.offset().x, 384.0);
        assert_eq!(cam.active_zone(), Some(0));
    }

    #[test]
    fn test_view_queries() {
        let mut view = View::new(384.0, 384.0);
        view.offset = Vec2::new(100.0, 0.0);
        assert!(view.in_view(&Rect::new(200.0, 100.0, 16.0, 16.0)));
        assert!(!view.in_view(&Rect::new(90.0, 100.0, 16.0, 16.0)));
        assert!(view.in_range(&Rect::new(500.0, 100.0, 16.0, 16.0), 50.0));
        assert!(!view.in_range(&Rect::new(600.0, 100.0, 16.0, 16.0), 50.0));
        assert!(view.in_range(&Rect::new(70.0, 100.0, 16.0, 16.0), 50.0));
    }
}
