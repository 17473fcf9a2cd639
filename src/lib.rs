//! Crystal Beam - level runtime of a 2D physics platformer
//!
//! Core modules:
//! - `sim`: Level simulation (damage, camera, effects, lifecycle)
//! - `render`: Draw command list handed to the renderer
//! - `audio`: Sound identifiers and the process-wide audio session
//! - `highscores`: Best completion time per level
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game constants

pub mod audio;
pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::AudioSession;
pub use highscores::{HighscoreStore, Highscores};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Fixed engine constants (everything tweakable lives in [`Tuning`])
pub mod consts {
    /// Solver passes handed to the physics world each step
    pub const VELOCITY_ITERATIONS: u32 = 6;
    pub const POSITION_ITERATIONS: u32 = 2;

    /// Object group holding the static level geometry
    pub const COLLIDER_LAYER: &str = "colliders";
    /// Object group holding start/end/damaging/blocking regions
    pub const OTHER_LAYER: &str = "other";

    /// Slots per particle system
    pub const PARTICLE_POOL_SIZE: usize = 100;
}

/// Rotate `point` around `origin` by `degrees` (clockwise in screen space, y down)
#[inline]
pub fn rotate_about(point: Vec2, origin: Vec2, degrees: f32) -> Vec2 {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - origin;
    origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Browser entry: route `log` to the console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Crystal Beam runtime loaded");
}

/// Best stored time for `level` (0 when unset or storage is unavailable)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn best_time(level: usize) -> f32 {
    match highscores::LocalStorageStore.load() {
        Ok(scores) => scores.best_time(level),
        Err(e) => {
            log::warn!("Could not read highscores: {}", e);
            0.0
        }
    }
}
