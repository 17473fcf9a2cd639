//! Camera scrolling and shake
//!
//! Horizontal scrolling follows the mouse near the left/right view edges;
//! vertical scrolling follows the crystal near the top/bottom edges, at double
//! speed once the crystal has left the view. The offset is clamped to the map
//! after every move, with a look-up margin above the map top.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::Tuning;

/// Allowed range of the camera offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl CameraBounds {
    /// `x ∈ [0, map.x - view.x]`, `y ∈ [-margin, map.y - view.y]`.
    /// Maps smaller than the view pin the camera to the minimum.
    pub fn new(map_size: Vec2, view: Vec2, overscroll_margin: f32) -> Self {
        let min = Vec2::new(0.0, -overscroll_margin);
        let max = (map_size - view).max(min);
        Self { min, max }
    }

    pub fn clamp(&self, offset: Vec2) -> Vec2 {
        offset.clamp(self.min, self.max)
    }

    pub fn contains(&self, offset: Vec2) -> bool {
        offset.cmpge(self.min).all() && offset.cmple(self.max).all()
    }
}

#[derive(Debug, Clone, Copy)]
struct Shake {
    remaining: f32,
    intensity: f32,
}

#[derive(Debug, Clone)]
pub struct CameraScroller {
    offset: Vec2,
    bounds: CameraBounds,
    view: Vec2,
    boundary: f32,
    speed: Vec2,
    shake: Option<Shake>,
    jitter: Vec2,
    rng: Pcg32,
}

impl CameraScroller {
    pub fn new(tuning: &Tuning, map_size: Vec2, seed: u64) -> Self {
        Self {
            offset: Vec2::new(0.0, 0.0),
            bounds: CameraBounds::new(map_size, tuning.view_size, tuning.overscroll_margin()),
            view: tuning.view_size,
            boundary: tuning.scroll_boundary,
            speed: Vec2::new(tuning.scroll_speed_x, tuning.scroll_speed_y),
            shake: None,
            jitter: Vec2::ZERO,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Scroll offset (top-left of the view in world pixels)
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Offset including shake jitter, for drawing only
    pub fn render_offset(&self) -> Vec2 {
        self.offset + self.jitter
    }

    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    pub fn view(&self) -> Vec2 {
        self.view
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    /// Mouse position clamped to the viewport, in world pixels
    pub fn mouse_to_world(&self, mouse_screen: Vec2) -> Vec2 {
        mouse_screen.clamp(Vec2::ZERO, self.view) + self.offset
    }

    /// Centre the view on `point` (clamped)
    pub fn center_on(&mut self, point: Vec2) {
        self.set_offset(point - self.view / 2.0);
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = self.bounds.clamp(offset);
    }

    /// Move by `delta` and clamp
    pub fn drift(&mut self, delta: Vec2) {
        self.set_offset(self.offset + delta);
    }

    /// Apply mouse-edge and target-edge scrolling for one tick
    pub fn update(&mut self, elapsed: f32, mouse_screen: Vec2, target_world: Vec2) {
        let mouse = mouse_screen.clamp(Vec2::ZERO, self.view);
        let mut velocity = Vec2::ZERO;

        if mouse.x < self.boundary {
            velocity.x -= self.speed.x;
        }
        if mouse.x > self.view.x - self.boundary {
            velocity.x += self.speed.x;
        }

        let screen = self.to_screen(target_world);
        if screen.y < self.boundary {
            let catch_up = if screen.y < 0.0 { 2.0 } else { 1.0 };
            velocity.y -= self.speed.y * catch_up;
        }
        if screen.y > self.view.y - self.boundary {
            let catch_up = if screen.y > self.view.y { 2.0 } else { 1.0 };
            velocity.y += self.speed.y * catch_up;
        }

        self.drift(velocity * elapsed);
    }

    /// Start a shake, replacing any running one
    pub fn shake(&mut self, duration: f32, intensity: f32) {
        self.shake = Some(Shake {
            remaining: duration,
            intensity: intensity.abs(),
        });
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// Advance the shake and pick this frame's jitter
    pub fn tick_shake(&mut self, dt: f32) {
        let Some(shake) = self.shake.as_mut() else {
            self.jitter = Vec2::ZERO;
            return;
        };
        shake.remaining -= dt;
        if shake.remaining <= 0.0 {
            self.shake = None;
            self.jitter = Vec2::ZERO;
            return;
        }
        let i = shake.intensity;
        self.jitter = Vec2::new(
            self.rng.random_range(-i..=i),
            self.rng.random_range(-i..=i),
        );
    }
}
