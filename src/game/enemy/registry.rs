//! Enemy Registry
//!
//! Spawn templates loaded from the stage's enemy layer. Each template spawns
//! at most one live enemy: its count goes to one on spawn and back to zero
//! when that enemy dies or scrolls away, which re-arms the spawn point.

use std::fmt;

use super::super::camera::View;
use super::super::stage::SpawnPoint;
use super::{Enemy, EnemyKind, EnemyOverrides, PlayerProbe};
use crate::math::{Rect, Vec2};

/// Why a spawn point was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnError {
    UnknownType(String),
    BadProperty { key: String, value: String },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::UnknownType(kind) => write!(f, "unknown enemy type '{}'", kind),
            SpawnError::BadProperty { key, value } => write!(f, "malformed property {}={}", key, value),
        }
    }
}

impl std::error::Error for SpawnError {}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTemplate {
    pub name: String,
    pub kind: EnemyKind,
    pub start: Vec2,
    pub overrides: EnemyOverrides,
    /// Live enemies spawned from this template (0 or 1)
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Enemies {
    templates: Vec<EnemyTemplate>,
    spawn_range: f32,
}

impl Enemies {
    pub fn new(spawn_range: f32) -> Self {
        Self { templates: Vec::new(), spawn_range }
    }

    /// Build templates from spawn points, skipping the ones that fail to
    /// parse.
    pub fn from_spawn_points(points: &[SpawnPoint], spawn_range: f32) -> Self {
        let mut enemies = Self::new(spawn_range);
        for point in points {
            if let Err(e) = enemies.load(point) {
                tracing::warn!(name = %point.name, kind = %point.kind, "skipping enemy spawn: {}", e);
            }
        }
        enemies
    }

    pub fn load(&mut self, point: &SpawnPoint) -> Result<usize, SpawnError> {
        let kind = EnemyKind::from_type(&point.kind).ok_or_else(|| SpawnError::UnknownType(point.kind.clone()))?;
        let overrides = EnemyOverrides::parse(&point.properties)?;
        self.templates.push(EnemyTemplate {
            name: point.name.clone(),
            kind,
            start: point.position,
            overrides,
            count: 0,
        });
        Ok(self.templates.len() - 1)
    }

    pub fn templates(&self) -> &[EnemyTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Spawn armed templates whose start point sits just past the right edge
    /// of the view, inside the active zone.
    pub fn spawn_nearby(&mut self, view: &View, zone: Option<&Rect>, player: &PlayerProbe) -> Vec<Enemy> {
        let right = view.offset.x + view.width;
        let ready: Vec<usize> = self.templates
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.count == 0
                    && (t.start.x - right).abs() < self.spawn_range
                    && t.start.x > right
                    && zone.map(|z| z.contains(t.start.x, t.start.y)).unwrap_or(true)
            })
            .map(|(i, _)| i)
            .collect();

        ready.into_iter().filter_map(|i| self.spawn(i, player)).collect()
    }

    /// Spawn template `index` unconditionally (if armed).
    pub fn spawn(&mut self, index: usize, player: &PlayerProbe) -> Option<Enemy> {
        let template = self.templates.get_mut(index)?;
        if template.count > 0 {
            return None;
        }
        template.count += 1;
        Some(Enemy::spawn(index, &template.name, template.kind, template.start, &template.overrides, player))
    }

    /// An enemy from `index` died or left; re-arm its template.
    pub fn release(&mut self, index: usize) {
        if let Some(template) = self.templates.get_mut(index) {
            template.count = template.count.saturating_sub(1);
        }
    }

    /// Re-arm every template
    pub fn reset(&mut self) {
        for template in &mut self.templates {
            template.count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::game::enemy::tests::probe;

    fn point(name: &str, kind: &str, x: f32, y: f32) -> SpawnPoint {
        SpawnPoint {
            name: name.to_string(),
            kind: kind.to_string(),
            position: Vec2::new(x, y),
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_bad_points_are_skipped() {
        let mut bad_props = point("b", "bws", 10.0, 10.0);
        bad_props.properties.insert("hit_points".to_string(), "lots".to_string());
        let points = vec![point("a", "bhc", 10.0, 10.0), point("x", "dragon", 0.0, 0.0), bad_props];

        let enemies = Enemies::from_spawn_points(&points, 50.0);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies.templates()[0].kind, EnemyKind::BlueHeli);

        let mut registry = Enemies::new(50.0);
        assert_eq!(registry.load(&point("x", "dragon", 0.0, 0.0)), Err(SpawnError::UnknownType("dragon".to_string())));
    }

    #[test]
    fn test_spawn_nearby_window() {
        let points = vec![
            point("too_close", "bhc", 380.0, 100.0),
            point("in_window", "bhc", 420.0, 100.0),
            point("too_far", "bhc", 440.0, 100.0),
        ];
        let mut enemies = Enemies::from_spawn_points(&points, 50.0);
        let view = View::new(384.0, 384.0);
        let player = probe(100.0, 100.0);

        let spawned = enemies.spawn_nearby(&view, None, &player);
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].name, "in_window");
        assert_eq!(spawned[0].template, 1);

        // Armed templates spawn once
        assert!(enemies.spawn_nearby(&view, None, &player).is_empty());

        enemies.release(1);
        assert_eq!(enemies.spawn_nearby(&view, None, &player).len(), 1);
    }

    #[test]
    fn test_spawn_requires_active_zone() {
        let points = vec![point("next_room", "bws", 420.0, 100.0)];
        let mut enemies = Enemies::from_spawn_points(&points, 50.0);
        let view = View::new(384.0, 384.0);
        let zone = Rect::new(0.0, 0.0, 384.0, 384.0);

        assert!(enemies.spawn_nearby(&view, Some(&zone), &probe(100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_release_saturates_and_reset() {
        let mut enemies = Enemies::from_spawn_points(&[point("a", "cut", 10.0, 10.0)], 50.0);
        enemies.release(0);
        assert_eq!(enemies.templates()[0].count, 0);
        assert!(enemies.spawn(0, &probe(0.0, 0.0)).is_some());
        assert!(enemies.spawn(0, &probe(0.0, 0.0)).is_none());
        enemies.reset();
        assert_eq!(enemies.templates()[0].count, 0);
    }
}
