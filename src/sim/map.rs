//! Level description handed over by the tilemap loader
//!
//! Only the parts the simulation needs: the map size and the named object
//! groups of typed rectangles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::zone::Rect;

/// Fatal level loading failures
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level has no object group named `{0}`")]
    MissingGroup(&'static str),
    #[error("level has no `{0}` region")]
    MissingRegion(&'static str),
    #[error("level has more than one `{0}` region")]
    DuplicateRegion(&'static str),
    #[error("unknown region type `{0}`")]
    UnknownRegion(String),
    #[error("level index {index} out of range ({count} levels)")]
    NoSuchLevel { index: usize, count: usize },
}

/// A typed rectangle from an object group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, clockwise, around the top-left corner
    #[serde(default)]
    pub rotation: f32,
}

impl MapObject {
    pub fn rect(&self) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
            self.rotation,
        )
    }
}

/// Tilemap as seen by the level runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelMap {
    /// Map size in tiles
    pub size_in_tiles: UVec2,
    pub object_groups: HashMap<String, Vec<MapObject>>,
}

impl LevelMap {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Object group by name (missing groups are a fatal level error)
    pub fn group(&self, name: &'static str) -> Result<&[MapObject], LevelError> {
        self.object_groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or(LevelError::MissingGroup(name))
    }

    /// Map extent in pixels
    pub fn size_in_pixels(&self, tile_size: f32) -> Vec2 {
        self.size_in_tiles.as_vec2() * tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "size_in_tiles": [40, 30],
        "object_groups": {
            "colliders": [ { "x": 0, "y": 464, "width": 640, "height": 16 } ],
            "other": [ { "type": "start", "x": 40, "y": 400, "width": 16, "height": 16 } ]
        }
    }"#;

    #[test]
    fn test_parse_groups_and_size() {
        let map = LevelMap::from_json(MAP).unwrap();
        assert_eq!(map.size_in_pixels(16.0), Vec2::new(640.0, 480.0));
        let colliders = map.group("colliders").unwrap();
        assert_eq!(colliders.len(), 1);
        assert_eq!(colliders[0].kind, "");
        assert_eq!(map.group("other").unwrap()[0].kind, "start");
    }

    #[test]
    fn test_missing_group_is_fatal() {
        let map = LevelMap::from_json(MAP).unwrap();
        assert!(matches!(
            map.group("decorations"),
            Err(LevelError::MissingGroup("decorations"))
        ));
    }
}
