//! The crystal the player beams through the level

use glam::Vec2;

use super::physics::{BodyHandle, PhysicsWorld};
use super::zone::Rect;
use crate::tuning::Tuning;

/// Player body: a dynamic box plus damage and beam state
#[derive(Debug, Clone)]
pub struct Target {
    body: BodyHandle,
    size: Vec2,
    /// Cached body centre, refreshed after every physics step
    position: Vec2,
    damage: u32,
    alive: bool,
    /// X coordinate of the beam emitter (beam-emission anchor)
    beam_x: f32,
    /// False while inside a blocking zone
    vertical_beam: bool,
    /// Beam engaged this tick
    beam_active: bool,
}

impl Target {
    /// Spawn the crystal with its centre at `start`
    pub fn spawn(world: &mut dyn PhysicsWorld, start: Vec2, size: Vec2) -> Self {
        let body = world.add_dynamic_box(start, size);
        Self {
            body,
            size,
            position: start,
            damage: 0,
            alive: true,
            beam_x: start.x,
            vertical_beam: true,
            beam_active: false,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Bounding region used for zone tests
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position, self.size)
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    /// Set the damage tier, clamped to the survivable maximum
    pub fn set_damage(&mut self, damage: u32, max_damage: u32) {
        self.damage = damage.min(max_damage);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.beam_active = false;
    }

    pub fn beam_x(&self) -> f32 {
        self.beam_x
    }

    pub fn vertical_beam(&self) -> bool {
        self.vertical_beam
    }

    pub fn set_vertical_beam(&mut self, enabled: bool) {
        self.vertical_beam = enabled;
    }

    pub fn beam_active(&self) -> bool {
        self.beam_active
    }

    /// Move the emitter toward the mouse and, while the beam is held, pull the
    /// crystal under it and lift it (when the vertical beam is available).
    pub fn steer(
        &mut self,
        world: &mut dyn PhysicsWorld,
        mouse_world: Vec2,
        beam_held: bool,
        tuning: &Tuning,
        dt: f32,
    ) {
        if !self.alive {
            return;
        }
        let max_step = tuning.beam_follow_speed * dt;
        self.beam_x += (mouse_world.x - self.beam_x).clamp(-max_step, max_step);

        self.beam_active = beam_held;
        if !beam_held {
            return;
        }
        let mut force = Vec2::new((self.beam_x - self.position.x) * tuning.beam_pull, 0.0);
        if self.vertical_beam {
            force.y -= tuning.beam_lift;
        }
        world.apply_force(self.body, force);
    }

    /// Refresh the cached position after the world stepped
    pub fn sync(&mut self, world: &dyn PhysicsWorld) {
        self.position = world.position(self.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::{BoxWorld, ContactQueue};

    fn spawn() -> (BoxWorld, Target) {
        let mut world = BoxWorld::new(Vec2::ZERO, 0.0);
        let target = Target::spawn(&mut world, Vec2::new(100.0, 100.0), Vec2::new(12.0, 16.0));
        (world, target)
    }

    #[test]
    fn test_damage_is_clamped() {
        let (_, mut target) = spawn();
        target.set_damage(9, 4);
        assert_eq!(target.damage(), 4);
    }

    #[test]
    fn test_beam_follows_mouse_at_limited_speed() {
        let (mut world, mut target) = spawn();
        let tuning = Tuning::default();
        target.steer(&mut world, Vec2::new(500.0, 0.0), false, &tuning, 0.5);
        assert!((target.beam_x() - (100.0 + tuning.beam_follow_speed * 0.5)).abs() < 1e-3);
        assert!(!target.beam_active());
    }

    #[test]
    fn test_vertical_beam_lifts_only_when_enabled() {
        let tuning = Tuning::default();
        let mut queue = ContactQueue::new();

        let (mut world, mut target) = spawn();
        target.steer(&mut world, Vec2::new(100.0, 0.0), true, &tuning, 0.1);
        world.step(0.1, 1, 1, &mut queue);
        assert!(world.velocity(target.body()).y < 0.0);

        let (mut world, mut target) = spawn();
        target.set_vertical_beam(false);
        target.steer(&mut world, Vec2::new(100.0, 0.0), true, &tuning, 0.1);
        world.step(0.1, 1, 1, &mut queue);
        assert_eq!(world.velocity(target.body()).y, 0.0);
    }

    #[test]
    fn test_dead_target_ignores_steering() {
        let (mut world, mut target) = spawn();
        target.kill();
        target.steer(&mut world, Vec2::new(400.0, 0.0), true, &Tuning::default(), 1.0);
        assert_eq!(target.beam_x(), 100.0);
        assert!(!target.beam_active());
    }
}
