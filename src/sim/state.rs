//! Level state
//!
//! One `LevelState` per loaded level attempt. It owns the physics world and
//! every subsystem; nothing outside the level mutates it except `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::CameraScroller;
use super::damage::CollisionDamageController;
use super::effects::EffectsDirector;
use super::lifecycle::{LevelLifecycle, Transition};
use super::map::{LevelError, LevelMap};
use super::physics::{BoxWorld, ContactQueue, PhysicsWorld};
use super::target::Target;
use super::zone::ZoneSet;
use crate::audio::{AudioSession, Music, Sound};
use crate::consts::{COLLIDER_LAYER, OTHER_LAYER};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Requests for the audio backend, drained by the shell every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    PlaySound(Sound),
    StopSound(Sound),
    SetVolume { sound: Sound, volume: f32 },
    PlayMusic(Music),
}

/// Seed of the level's random streams
fn level_seed(level: usize, timer: f32) -> u64 {
    ((level as u64) << 32) | u64::from(timer.to_bits())
}

pub struct LevelState {
    pub tuning: Tuning,
    /// Map extent in pixels
    pub map_size: Vec2,
    pub world: Box<dyn PhysicsWorld>,
    pub contacts: ContactQueue,
    pub target: Target,
    pub zones: ZoneSet,
    pub damage: CollisionDamageController,
    pub camera: CameraScroller,
    pub effects: EffectsDirector,
    pub lifecycle: LevelLifecycle,
    /// Seconds since the level was loaded (not frozen by death)
    pub age: f32,
    /// Draw the zone overlays
    pub show_zones: bool,
    pub(super) events: Vec<LevelEvent>,
}

impl LevelState {
    /// Build level `level` on the bundled physics world
    pub fn new(
        level: usize,
        timer: f32,
        map: &LevelMap,
        tuning: &Tuning,
        settings: &Settings,
        audio: &mut AudioSession,
    ) -> Result<Self, LevelError> {
        let world = BoxWorld::new(Vec2::new(0.0, tuning.gravity), tuning.restitution);
        Self::with_world(level, timer, map, tuning, settings, audio, Box::new(world))
    }

    /// Build level `level` on an empty physics world
    pub fn with_world(
        level: usize,
        timer: f32,
        map: &LevelMap,
        tuning: &Tuning,
        settings: &Settings,
        audio: &mut AudioSession,
        mut world: Box<dyn PhysicsWorld>,
    ) -> Result<Self, LevelError> {
        let level_count = tuning.level_count();
        if level >= level_count {
            return Err(LevelError::NoSuchLevel {
                index: level,
                count: level_count,
            });
        }

        let zones = ZoneSet::from_objects(map.group(OTHER_LAYER)?)?;
        let colliders = map.group(COLLIDER_LAYER)?;
        for obj in colliders {
            world.add_static_box(&obj.rect());
        }

        let map_size = map.size_in_pixels(tuning.tile_size);
        let target = Target::spawn(world.as_mut(), zones.start(), tuning.target_size);

        let seed = level_seed(level, timer);
        let mut camera = CameraScroller::new(tuning, map_size, seed);
        camera.center_on(zones.start());

        let mut events = Vec::new();
        if audio.start_music_once() {
            events.push(LevelEvent::PlayMusic(Music::Ingame));
        }

        log::info!(
            "Loaded level {} ({} colliders, {} damaging, {} blocking), timer {:.2}",
            level,
            colliders.len(),
            zones.damaging().len(),
            zones.blocking().len(),
            timer
        );

        Ok(Self {
            tuning: tuning.clone(),
            map_size,
            world,
            contacts: ContactQueue::new(),
            target,
            zones,
            damage: CollisionDamageController::new(tuning, 0.0),
            camera,
            effects: EffectsDirector::new(tuning, settings, seed.rotate_left(17)),
            lifecycle: LevelLifecycle::new(level, level_count, timer),
            age: 0.0,
            show_zones: false,
            events,
        })
    }

    pub fn level(&self) -> usize {
        self.lifecycle.level()
    }

    pub fn timer(&self) -> f32 {
        self.lifecycle.timer()
    }

    /// Pending transition, once the level has finished
    pub fn transition(&self) -> Option<Transition> {
        self.lifecycle.transition()
    }

    /// Take the audio requests produced since the last call
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "size_in_tiles": [40, 30],
        "object_groups": {
            "colliders": [
                { "type": "", "x": 0, "y": 400, "width": 640, "height": 32 }
            ],
            "other": [
                { "type": "start", "x": 100, "y": 300, "width": 16, "height": 16 },
                { "type": "end", "x": 500, "y": 300, "width": 32, "height": 32 },
                { "type": "damaging", "x": 200, "y": 380, "width": 40, "height": 20 },
                { "type": "blocking", "x": 300, "y": 200, "width": 40, "height": 200 }
            ]
        }
    }"#;

    #[test]
    fn test_new_level_spawns_at_start_and_centres_camera() {
        let map = LevelMap::from_json(LEVEL_JSON).unwrap();
        let mut audio = AudioSession::new();
        let level = LevelState::new(0, 0.0, &map, &Tuning::default(), &Settings::default(), &mut audio)
            .unwrap();

        assert_eq!(level.target.position(), Vec2::new(100.0, 300.0));
        // Map is 640x480; start - view/2 = (-100, 150) clamps to x = 0
        assert_eq!(level.camera.offset(), Vec2::new(0.0, 150.0));
        assert_eq!(level.map_size, Vec2::new(640.0, 480.0));
        assert!(level.transition().is_none());
    }

    #[test]
    fn test_music_starts_once_per_session() {
        let map = LevelMap::from_json(LEVEL_JSON).unwrap();
        let mut audio = AudioSession::new();
        let tuning = Tuning::default();
        let settings = Settings::default();

        let mut first = LevelState::new(0, 0.0, &map, &tuning, &settings, &mut audio).unwrap();
        assert_eq!(first.drain_events(), vec![LevelEvent::PlayMusic(Music::Ingame)]);
        assert!(first.drain_events().is_empty());

        let mut second = LevelState::new(1, 0.0, &map, &tuning, &settings, &mut audio).unwrap();
        assert!(second.drain_events().is_empty());
    }

    #[test]
    fn test_missing_group_and_bad_index_are_fatal() {
        let mut audio = AudioSession::new();
        let tuning = Tuning::default();
        let settings = Settings::default();

        let map = LevelMap::from_json(r#"{ "size_in_tiles": [10, 10], "object_groups": {} }"#).unwrap();
        assert!(matches!(
            LevelState::new(0, 0.0, &map, &tuning, &settings, &mut audio),
            Err(LevelError::MissingGroup(_))
        ));

        let map = LevelMap::from_json(LEVEL_JSON).unwrap();
        assert!(matches!(
            LevelState::new(99, 0.0, &map, &tuning, &settings, &mut audio),
            Err(LevelError::NoSuchLevel { index: 99, .. })
        ));
    }

    #[test]
    fn test_bundled_levels_load() {
        let levels = [
            include_str!("../../levels/level_1.json"),
            include_str!("../../levels/level_2.json"),
        ];
        let mut audio = AudioSession::new();
        for (index, json) in levels.into_iter().enumerate() {
            let map = LevelMap::from_json(json).unwrap();
            let level =
                LevelState::new(index, 0.0, &map, &Tuning::default(), &Settings::default(), &mut audio)
                    .unwrap();
            assert!(level.camera.bounds().contains(level.camera.offset()));
        }
    }
}
