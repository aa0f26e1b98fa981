//! Stage Description
//!
//! The static side of a level: platforms, ladders, hazards, gates, zones and
//! the spawn tables. A stage arrives as `StageData`, the per-layer
//! `(rect, type, name, properties)` tuples produced by the map loader,
//! stored as RON:
//!
//! ```ron
//! (
//!     name: "cutman",
//!     width: 768.0,
//!     height: 384.0,
//!     warp_start: (x: 40.0, y: 0.0),
//!     platforms: [(rect: (x: 0.0, y: 352.0, w: 768.0, h: 32.0))],
//!     zones: [(rect: (x: 0.0, y: 0.0, w: 768.0, h: 384.0), name: "entry")],
//! )
//! ```
//!
//! `Stage::from_data` validates geometry before anything reaches the
//! simulation; unknown hazard or item types are logged and skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use super::gate::Gate;
use super::item::ItemKind;
use crate::math::{hex_to_rgb, Rect, Vec2};

/// Largest coordinate accepted from a stage file
const MAX_COORD: f32 = 1_000_000.0;

/// Longest name or property string accepted from a stage file
const MAX_STRING_LEN: usize = 256;

// =============================================================================
// Serialized form
// =============================================================================

/// One object from a map layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapObject {
    pub rect: Rect,
    /// Layer-specific type tag ("spike", "bhc", "redbonus", ...)
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    /// Flat attribute bag merged onto type defaults
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl MapObject {
    pub fn new(rect: Rect) -> Self {
        Self { rect, ..Default::default() }
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

/// Map layers as produced by the map loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageData {
    pub name: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub background: Option<String>,
    /// Where the player beams in
    pub warp_start: Vec2,
    /// Surface the warp beam lands on (any platform when absent)
    #[serde(default)]
    pub warp_land: Option<Rect>,
    #[serde(default)]
    pub platforms: Vec<MapObject>,
    #[serde(default)]
    pub ladders: Vec<MapObject>,
    #[serde(default)]
    pub hazards: Vec<MapObject>,
    #[serde(default)]
    pub gates: Vec<MapObject>,
    #[serde(default)]
    pub zones: Vec<MapObject>,
    #[serde(default)]
    pub enemies: Vec<MapObject>,
    #[serde(default)]
    pub items: Vec<MapObject>,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum StageError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ValidationError(String),
}

impl From<std::io::Error> for StageError {
    fn from(e: std::io::Error) -> Self {
        StageError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for StageError {
    fn from(e: ron::error::SpannedError) -> Self {
        StageError::ParseError(e)
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::IoError(e) => write!(f, "IO error: {}", e),
            StageError::ParseError(e) => write!(f, "Parse error: {}", e),
            StageError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for StageError {}

fn is_valid_coord(f: f32) -> bool {
    f.is_finite() && f.abs() <= MAX_COORD
}

fn validate_rect(rect: &Rect, context: &str) -> Result<(), String> {
    if !(is_valid_coord(rect.x) && is_valid_coord(rect.y) && is_valid_coord(rect.w) && is_valid_coord(rect.h)) {
        return Err(format!("{}: non-finite or out of range rectangle {:?}", context, rect));
    }
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return Err(format!("{}: rectangle must have positive size, got {}x{}", context, rect.w, rect.h));
    }
    Ok(())
}

fn validate_object(obj: &MapObject, context: &str) -> Result<(), String> {
    validate_rect(&obj.rect, context)?;
    if obj.name.len() > MAX_STRING_LEN || obj.kind.len() > MAX_STRING_LEN {
        return Err(format!("{}: name or type too long", context));
    }
    for (key, value) in &obj.properties {
        if key.len() > MAX_STRING_LEN || value.len() > MAX_STRING_LEN {
            return Err(format!("{}: property '{}' too long", context, key));
        }
    }
    Ok(())
}

/// Reject stage data the simulation cannot run on
pub fn validate_stage(data: &StageData) -> Result<(), StageError> {
    let check = || -> Result<(), String> {
        if !(is_valid_coord(data.width) && is_valid_coord(data.height)) || data.width <= 0.0 || data.height <= 0.0 {
            return Err(format!("map size must be positive, got {}x{}", data.width, data.height));
        }
        if !(is_valid_coord(data.warp_start.x) && is_valid_coord(data.warp_start.y)) {
            return Err(format!("warp start {:?} is not a valid position", data.warp_start));
        }
        if let Some(land) = &data.warp_land {
            validate_rect(land, "warp_land")?;
        }
        let layers: [(&str, &Vec<MapObject>); 7] = [
            ("platform", &data.platforms),
            ("ladder", &data.ladders),
            ("hazard", &data.hazards),
            ("gate", &data.gates),
            ("zone", &data.zones),
            ("enemy", &data.enemies),
            ("item", &data.items),
        ];
        for (layer, objects) in layers {
            for (i, obj) in objects.iter().enumerate() {
                validate_object(obj, &format!("{} {}", layer, i))?;
            }
        }
        Ok(())
    };
    check().map_err(StageError::ValidationError)
}

// =============================================================================
// Runtime form
// =============================================================================

/// Solid terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    /// Debug highlight, no gameplay effect
    pub flagged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    pub rect: Rect,
    /// Debug highlight, no gameplay effect
    pub flagged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Spike,
}

impl HazardKind {
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "spike" => Some(HazardKind::Spike),
            _ => None,
        }
    }

    pub fn damage(self) -> i32 {
        match self {
            HazardKind::Spike => 999,
        }
    }
}

/// Contact-damage terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub rect: Rect,
    pub kind: HazardKind,
    pub damage: i32,
}

/// Camera partition of the map
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub rect: Rect,
    pub background: Option<(u8, u8, u8)>,
    pub attributes: BTreeMap<String, String>,
}

impl Zone {
    pub fn music(&self) -> Option<&str> {
        self.attributes.get("music").map(String::as_str)
    }

    /// Whether the player may enter this zone by falling into it from above
    pub fn allows_fall_in(&self) -> bool {
        matches!(self.attributes.get("fall_in").map(String::as_str), Some("true") | Some("1"))
    }
}

/// Raw enemy spawn point; parsed by the enemy registry
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub name: String,
    pub kind: String,
    pub position: Vec2,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub position: Vec2,
}

/// A loaded stage
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub background: Option<(u8, u8, u8)>,
    pub warp_start: Vec2,
    pub warp_land: Option<Rect>,
    pub platforms: Vec<Platform>,
    pub ladders: Vec<Ladder>,
    pub hazards: Vec<Hazard>,
    pub gates: Vec<Gate>,
    pub zones: Vec<Zone>,
    pub enemy_spawns: Vec<SpawnPoint>,
    pub item_spawns: Vec<ItemSpawn>,
}

impl Stage {
    /// Validate and convert map layers.
    pub fn from_data(data: StageData) -> Result<Self, StageError> {
        validate_stage(&data)?;

        let flagged = |obj: &MapObject| obj.properties.get("flagged").map(|v| v == "true").unwrap_or(false);

        let platforms = data.platforms.iter()
            .map(|obj| Platform { rect: obj.rect, flagged: flagged(obj) })
            .collect();

        let ladders = data.ladders.iter()
            .map(|obj| Ladder { rect: obj.rect, flagged: flagged(obj) })
            .collect();

        let mut hazards = Vec::new();
        for obj in &data.hazards {
            match HazardKind::from_type(&obj.kind) {
                Some(kind) => hazards.push(Hazard { rect: obj.rect, kind, damage: kind.damage() }),
                None => tracing::warn!(kind = %obj.kind, name = %obj.name, "unknown hazard type, skipped"),
            }
        }

        let gates = data.gates.iter().map(|obj| Gate::new(obj.rect)).collect();

        let zones = data.zones.iter()
            .map(|obj| {
                let background = obj.properties.get("background").and_then(|hex| {
                    let rgb = hex_to_rgb(hex);
                    if rgb.is_none() {
                        tracing::warn!(zone = %obj.name, value = %hex, "ignoring malformed zone background");
                    }
                    rgb
                });
                tracing::debug!(zone = %obj.name, attributes = ?obj.properties, "zone loaded");
                Zone {
                    name: obj.name.clone(),
                    rect: obj.rect,
                    background,
                    attributes: obj.properties.clone(),
                }
            })
            .collect();

        let enemy_spawns = data.enemies.iter()
            .map(|obj| SpawnPoint {
                name: obj.name.clone(),
                kind: obj.kind.clone(),
                position: obj.rect.center(),
                properties: obj.properties.clone(),
            })
            .collect();

        let mut item_spawns = Vec::new();
        for obj in &data.items {
            match ItemKind::from_type(&obj.kind) {
                Some(kind) => item_spawns.push(ItemSpawn { kind, position: obj.rect.center() }),
                None => tracing::warn!(kind = %obj.kind, name = %obj.name, "unknown item type, skipped"),
            }
        }

        let background = data.background.as_deref().and_then(hex_to_rgb);

        let stage = Stage {
            name: data.name,
            width: data.width,
            height: data.height,
            background,
            warp_start: data.warp_start,
            warp_land: data.warp_land,
            platforms,
            ladders,
            hazards,
            gates,
            zones,
            enemy_spawns,
            item_spawns,
        };

        tracing::info!(
            stage = %stage.name,
            width = stage.width,
            height = stage.height,
            platforms = stage.platforms.len(),
            ladders = stage.ladders.len(),
            zones = stage.zones.len(),
            enemies = stage.enemy_spawns.len(),
            "stage loaded"
        );

        Ok(stage)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, StageError> {
        let data: StageData = ron::from_str(text)?;
        Self::from_data(data)
    }

    /// Load a stage from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StageError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let data: StageData = match ron::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(path = %path.display(), line = e.position.line, col = e.position.col, "stage parse error: {}", e.code);
                return Err(e.into());
            }
        };
        Self::from_data(data)
    }

    /// Whole-map rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// First platform directly under `rect` (probe shifted 1px down)
    pub fn platform_below(&self, rect: &Rect) -> Option<&Platform> {
        let probe = rect.translate(0.0, 1.0);
        self.platforms.iter().find(|p| probe.intersects(&p.rect))
    }

    /// First ladder directly under `rect` (probe shifted 1px down)
    pub fn ladder_below(&self, rect: &Rect) -> Option<&Ladder> {
        let probe = rect.translate(0.0, 1.0);
        self.ladders.iter().find(|l| probe.intersects(&l.rect))
    }

    /// First ladder overlapping `rect`
    pub fn ladder_behind(&self, rect: &Rect) -> Option<&Ladder> {
        self.ladders.iter().find(|l| rect.intersects(&l.rect))
    }

    /// Something under or behind `rect` keeps it from falling
    pub fn has_support(&self, rect: &Rect) -> bool {
        self.platform_below(rect).is_some()
            || self.ladder_below(rect).is_some()
            || self.ladder_behind(rect).is_some()
    }

    /// First zone containing a point
    pub fn zone_at(&self, point: Vec2) -> Option<usize> {
        self.zones.iter().position(|z| z.rect.contains(point.x, point.y))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Flat floor at y=352 across two side-by-side zones
    pub(crate) fn flat_stage() -> StageData {
        StageData {
            name: "flat".to_string(),
            width: 768.0,
            height: 384.0,
            warp_start: Vec2::new(40.0, 0.0),
            platforms: vec![MapObject::new(Rect::new(0.0, 352.0, 768.0, 32.0))],
            zones: vec![
                MapObject::new(Rect::new(0.0, 0.0, 384.0, 384.0)).with_name("entry"),
                MapObject::new(Rect::new(384.0, 0.0, 384.0, 384.0))
                    .with_name("hall")
                    .with_property("background", "#3cbcfc")
                    .with_property("music", "cutman"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_from_data() {
        let stage = Stage::from_data(flat_stage()).unwrap();
        assert_eq!(stage.platforms.len(), 1);
        assert_eq!(stage.zones[1].background, Some((0x3c, 0xbc, 0xfc)));
        assert_eq!(stage.zones[1].music(), Some("cutman"));
        assert_eq!(stage.zone_at(Vec2::new(400.0, 10.0)), Some(1));
        assert_eq!(stage.zone_at(Vec2::new(-1.0, 10.0)), None);
    }

    #[test]
    fn test_unknown_types_are_skipped() {
        let mut data = flat_stage();
        data.hazards.push(MapObject::new(Rect::new(0.0, 0.0, 16.0, 16.0)).with_kind("lava"));
        data.hazards.push(MapObject::new(Rect::new(16.0, 0.0, 16.0, 16.0)).with_kind("spike"));
        data.items.push(MapObject::new(Rect::new(0.0, 0.0, 8.0, 8.0)).with_kind("mystery"));
        let stage = Stage::from_data(data).unwrap();
        assert_eq!(stage.hazards.len(), 1);
        assert_eq!(stage.hazards[0].damage, 999);
        assert!(stage.item_spawns.is_empty());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut data = flat_stage();
        data.platforms.push(MapObject::new(Rect::new(0.0, 0.0, -16.0, 16.0)));
        assert!(matches!(Stage::from_data(data), Err(StageError::ValidationError(_))));

        let mut data = flat_stage();
        data.ladders.push(MapObject::new(Rect::new(f32::NAN, 0.0, 16.0, 16.0)));
        assert!(matches!(Stage::from_data(data), Err(StageError::ValidationError(_))));

        let mut data = flat_stage();
        data.width = 0.0;
        assert!(matches!(Stage::from_data(data), Err(StageError::ValidationError(_))));
    }

    #[test]
    fn test_support_queries() {
        let mut data = flat_stage();
        data.ladders.push(MapObject::new(Rect::new(200.0, 200.0, 16.0, 152.0)));
        let stage = Stage::from_data(data).unwrap();

        let standing = Rect::new(88.0, 328.0, 24.0, 24.0);
        assert!(stage.platform_below(&standing).is_some());
        assert!(stage.ladder_behind(&standing).is_none());

        let above_ladder = Rect::new(196.0, 176.0, 24.0, 24.0);
        assert!(stage.ladder_below(&above_ladder).is_some());
        assert!(stage.ladder_behind(&above_ladder).is_none());
        assert!(stage.has_support(&above_ladder));

        let midair = Rect::new(88.0, 100.0, 24.0, 24.0);
        assert!(!stage.has_support(&midair));
    }

    #[test]
    fn test_load_ron_file() {
        let text = r#"(
            name: "tiny",
            width: 384.0,
            height: 384.0,
            warp_start: (x: 32.0, y: 0.0),
            platforms: [(rect: (x: 0.0, y: 352.0, w: 384.0, h: 32.0))],
            hazards: [(rect: (x: 100.0, y: 336.0, w: 16.0, h: 16.0), kind: "spike")],
            zones: [(rect: (x: 0.0, y: 0.0, w: 384.0, h: 384.0), name: "only")],
        )"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let stage = Stage::load(file.path()).unwrap();
        assert_eq!(stage.name, "tiny");
        assert_eq!(stage.hazards[0].kind, HazardKind::Spike);

        assert!(matches!(Stage::from_ron_str("(name: "), Err(StageError::ParseError(_))));
    }
}
