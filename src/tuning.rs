//! Data-driven game balance
//!
//! Every gameplay constant the level runtime reads lives here so levels can be
//! rebalanced from a JSON file without recompiling. Missing fields fall back to
//! the defaults below.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::Rgba;

/// Errors while reading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of the level list (map file + display name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub path: PathBuf,
    pub name: String,
}

/// Game constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Visible area in game pixels
    pub view_size: Vec2,
    /// Tile edge length in game pixels
    pub tile_size: f32,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,

    // === Damage ===
    /// Impacts faster than this are severe; faster than a quarter of it are minor
    pub allowed_collision_speed: f32,
    /// Seconds after a processed contact during which contacts are ignored
    pub invulnerability_window: f32,
    /// Highest damage tier the crystal survives
    pub max_damage: u32,

    // === Camera ===
    /// Distance from a view edge that starts scrolling
    pub scroll_boundary: f32,
    pub scroll_speed_x: f32,
    pub scroll_speed_y: f32,
    /// How many tiles the camera may look above the map top
    pub overscroll_tiles: f32,

    // === Feedback ===
    pub strong_shake_duration: f32,
    pub strong_shake_intensity: f32,
    pub strong_flash_duration: f32,
    pub strong_flash_color: Rgba,
    pub large_burst: usize,
    pub small_burst: usize,
    pub dust_interval: f32,
    pub beam_particle_interval: f32,
    /// Alarm volume (0.0 - 1.0)
    pub alarm_volume: f32,
    /// Per-tick volume factor while the crystal is shattered
    pub death_volume_decay: f32,

    // === Lifecycle ===
    pub intro_fade_duration: f32,
    pub death_fade_duration: f32,

    // === Target / beam ===
    /// Crystal bounding box size
    pub target_size: Vec2,
    /// Upward force of the vertical beam
    pub beam_lift: f32,
    /// Horizontal spring constant pulling the crystal under the beam
    pub beam_pull: f32,
    /// Horizontal speed of the beam emitter following the mouse
    pub beam_follow_speed: f32,
    /// Restitution of crystal-vs-level contacts
    pub restitution: f32,

    /// Ordered list of playable levels
    pub levels: Vec<LevelEntry>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            view_size: Vec2::new(400.0, 300.0),
            tile_size: 16.0,
            gravity: 150.0,

            allowed_collision_speed: 80.0,
            invulnerability_window: 0.75,
            max_damage: 4,

            scroll_boundary: 32.0,
            scroll_speed_x: 120.0,
            scroll_speed_y: 90.0,
            overscroll_tiles: 10.0,

            strong_shake_duration: 0.4,
            strong_shake_intensity: 4.0,
            strong_flash_duration: 0.3,
            strong_flash_color: Rgba::new(255, 255, 255, 100),
            large_burst: 20,
            small_burst: 10,
            dust_interval: 0.025,
            beam_particle_interval: 0.12,
            alarm_volume: 0.25,
            death_volume_decay: 0.95,

            intro_fade_duration: 0.5,
            death_fade_duration: 1.75,

            target_size: Vec2::new(12.0, 16.0),
            beam_lift: 260.0,
            beam_pull: 6.0,
            beam_follow_speed: 140.0,
            restitution: 0.3,

            levels: vec![
                LevelEntry {
                    path: PathBuf::from("levels/level_1.json"),
                    name: "First Light".to_string(),
                },
                LevelEntry {
                    path: PathBuf::from("levels/level_2.json"),
                    name: "Lava Shaft".to_string(),
                },
            ],
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read tuning from a file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Negative camera allowance above the map top, in pixels
    pub fn overscroll_margin(&self) -> f32 {
        self.overscroll_tiles * self.tile_size
    }

    /// Threshold for the minor damage path
    pub fn minor_collision_speed(&self) -> f32 {
        self.allowed_collision_speed / 4.0
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "allowed_collision_speed": 10.0, "max_damage": 3 }"#)
            .unwrap();
        assert_eq!(tuning.allowed_collision_speed, 10.0);
        assert_eq!(tuning.max_damage, 3);
        assert_eq!(tuning.tile_size, 16.0);
        assert_eq!(tuning.level_count(), 2);
    }

    #[test]
    fn test_derived_values() {
        let tuning = Tuning::default();
        assert_eq!(tuning.overscroll_margin(), 160.0);
        assert_eq!(tuning.minor_collision_speed(), 20.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }
}
