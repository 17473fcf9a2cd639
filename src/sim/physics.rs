//! Rigid body world seam
//!
//! The level only needs a handful of operations from a physics engine, so the
//! engine sits behind [`PhysicsWorld`]. Contacts are reported through a
//! [`ContactListener`] handed to each `step`, which keeps the world free of any
//! reference back into the level.
//!
//! [`BoxWorld`] is the bundled engine: dynamic axis-aligned boxes against
//! static boxes, with restitution and a sequential-impulse style velocity pass.
//! A contact is reported when it begins; a body resting on or sliding along a
//! static box does not report it again until they separate.

use glam::Vec2;

use super::zone::Rect;

/// Handle to a dynamic body owned by a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

/// A contact between a dynamic body and level geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    /// Approach speed along the contact normal
    pub impact_speed: f32,
}

/// Receives contacts while the world steps
pub trait ContactListener {
    fn on_contact(&mut self, impact_speed: f32);
}

/// Rigid body simulation used by a level
pub trait PhysicsWorld {
    /// Advance the simulation, reporting contacts that began in engine order
    fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
        listener: &mut dyn ContactListener,
    );

    /// Add immovable level geometry
    fn add_static_box(&mut self, rect: &Rect);

    /// Add a dynamic box centred on `center`
    fn add_dynamic_box(&mut self, center: Vec2, size: Vec2) -> BodyHandle;

    /// Centre of a dynamic body
    fn position(&self, body: BodyHandle) -> Vec2;

    fn velocity(&self, body: BodyHandle) -> Vec2;

    /// Accumulate a force for the next step
    fn apply_force(&mut self, body: BodyHandle, force: Vec2);

    /// Override a body's velocity
    fn set_velocity(&mut self, body: BodyHandle, vel: Vec2);
}

/// Contacts collected during one step, drained right after it
#[derive(Debug, Default)]
pub struct ContactQueue {
    events: Vec<DamageEvent>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the contacts in the order the world reported them
    pub fn drain(&mut self) -> std::vec::Drain<'_, DamageEvent> {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ContactListener for ContactQueue {
    fn on_contact(&mut self, impact_speed: f32) {
        self.events.push(DamageEvent { impact_speed });
    }
}

/// Gap below which a body counts as resting on a static box
const CONTACT_SLOP: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
struct StaticBox {
    min: Vec2,
    max: Vec2,
}

#[derive(Debug, Clone)]
struct DynamicBox {
    pos: Vec2,
    vel: Vec2,
    half: Vec2,
    force: Vec2,
    inv_mass: f32,
    /// Statics touched at the end of the previous step
    touching: Vec<usize>,
}

impl DynamicBox {
    fn min(&self) -> Vec2 {
        self.pos - self.half
    }

    fn max(&self) -> Vec2 {
        self.pos + self.half
    }
}

/// Bundled box-vs-box world
#[derive(Debug, Clone)]
pub struct BoxWorld {
    gravity: Vec2,
    restitution: f32,
    statics: Vec<StaticBox>,
    bodies: Vec<DynamicBox>,
}

impl BoxWorld {
    pub fn new(gravity: Vec2, restitution: f32) -> Self {
        Self {
            gravity,
            restitution: restitution.clamp(0.0, 1.0),
            statics: Vec::new(),
            bodies: Vec::new(),
        }
    }
}

/// Separation normal (pointing from `s` toward `b`) and penetration depth.
/// Boxes closer than `slop` count as touching with a depth ≤ 0.
fn separation(b_min: Vec2, b_max: Vec2, s: &StaticBox, slop: f32) -> Option<(Vec2, f32)> {
    let overlap_x = b_max.x.min(s.max.x) - b_min.x.max(s.min.x);
    let overlap_y = b_max.y.min(s.max.y) - b_min.y.max(s.min.y);
    if overlap_x <= -slop || overlap_y <= -slop {
        return None;
    }
    // Corner-to-corner proximity is not a contact
    if overlap_x <= 0.0 && overlap_y <= 0.0 {
        return None;
    }

    let b_center = (b_min + b_max) / 2.0;
    let s_center = (s.min + s.max) / 2.0;
    if overlap_x < overlap_y {
        let sign = if b_center.x < s_center.x { -1.0 } else { 1.0 };
        Some((Vec2::new(sign, 0.0), overlap_x))
    } else {
        let sign = if b_center.y < s_center.y { -1.0 } else { 1.0 };
        Some((Vec2::new(0.0, sign), overlap_y))
    }
}

impl PhysicsWorld for BoxWorld {
    fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
        listener: &mut dyn ContactListener,
    ) {
        if dt <= 0.0 {
            return;
        }
        let Self {
            gravity,
            restitution,
            statics,
            bodies,
        } = self;

        for body in bodies.iter_mut() {
            body.vel += (*gravity + body.force * body.inv_mass) * dt;
            body.force = Vec2::ZERO;

            // Contacts from the current configuration, in static insertion order
            let contacts: Vec<(usize, Vec2)> = statics
                .iter()
                .enumerate()
                .filter_map(|(i, s)| {
                    separation(body.min(), body.max(), s, CONTACT_SLOP)
                        .map(|(normal, _)| (i, normal))
                })
                .collect();
            let mut handled = vec![false; contacts.len()];

            for _ in 0..velocity_iterations.max(1) {
                for (k, (i, normal)) in contacts.iter().enumerate() {
                    let vn = body.vel.dot(*normal);
                    if vn >= 0.0 {
                        continue;
                    }
                    if !handled[k] {
                        handled[k] = true;
                        if !body.touching.contains(i) {
                            listener.on_contact(-vn);
                        }
                    }
                    body.vel -= (1.0 + *restitution) * vn * *normal;
                }
            }
            body.touching = contacts.iter().map(|(i, _)| *i).collect();

            body.pos += body.vel * dt;

            for _ in 0..position_iterations.max(1) {
                for s in statics.iter() {
                    if let Some((normal, depth)) = separation(body.min(), body.max(), s, 0.0) {
                        if depth > 0.0 {
                            body.pos += normal * depth;
                        }
                    }
                }
            }
        }
    }

    fn add_static_box(&mut self, rect: &Rect) {
        let (min, max) = rect.bounds();
        self.statics.push(StaticBox { min, max });
    }

    fn add_dynamic_box(&mut self, center: Vec2, size: Vec2) -> BodyHandle {
        self.bodies.push(DynamicBox {
            pos: center,
            vel: Vec2::ZERO,
            half: size / 2.0,
            force: Vec2::ZERO,
            inv_mass: 1.0,
            touching: Vec::new(),
        });
        BodyHandle(self.bodies.len() - 1)
    }

    fn position(&self, body: BodyHandle) -> Vec2 {
        self.bodies.get(body.0).map(|b| b.pos).unwrap_or(Vec2::ZERO)
    }

    fn velocity(&self, body: BodyHandle) -> Vec2 {
        self.bodies.get(body.0).map(|b| b.vel).unwrap_or(Vec2::ZERO)
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.force += force;
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, vel: Vec2) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.vel = vel;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{POSITION_ITERATIONS, VELOCITY_ITERATIONS};

    const DT: f32 = 1.0 / 60.0;

    fn floor_world() -> BoxWorld {
        let mut world = BoxWorld::new(Vec2::new(0.0, 150.0), 0.0);
        world.add_static_box(&Rect::new(Vec2::new(-100.0, 100.0), Vec2::new(200.0, 20.0), 0.0));
        world
    }

    #[test]
    fn test_falling_body_reports_one_impact_and_rests() {
        let mut world = floor_world();
        let body = world.add_dynamic_box(Vec2::new(0.0, 50.0), Vec2::splat(10.0));
        let mut queue = ContactQueue::new();

        let mut impacts = Vec::new();
        for _ in 0..240 {
            world.step(DT, VELOCITY_ITERATIONS, POSITION_ITERATIONS, &mut queue);
            impacts.extend(queue.drain().map(|e| e.impact_speed));
        }

        // Only the landing is reported; resting on the floor is silent
        assert_eq!(impacts.len(), 1);
        assert!(impacts[0] > 50.0, "landing speed {}", impacts[0]);
        // Resting on top of the floor (floor top at y = 100)
        assert!((world.position(body).y - 95.0).abs() < 1.0);
    }

    #[test]
    fn test_wall_hit_while_grounded_is_reported() {
        let mut world = floor_world();
        world.add_static_box(&Rect::new(Vec2::new(60.0, 0.0), Vec2::new(20.0, 100.0), 0.0));
        let body = world.add_dynamic_box(Vec2::new(0.0, 94.0), Vec2::splat(10.0));
        let mut queue = ContactQueue::new();

        for _ in 0..120 {
            world.step(DT, VELOCITY_ITERATIONS, POSITION_ITERATIONS, &mut queue);
        }
        queue.drain().for_each(drop);

        world.set_velocity(body, Vec2::new(200.0, 0.0));
        let mut impacts = Vec::new();
        for _ in 0..30 {
            world.step(DT, VELOCITY_ITERATIONS, POSITION_ITERATIONS, &mut queue);
            impacts.extend(queue.drain().map(|e| e.impact_speed));
        }

        assert_eq!(impacts.len(), 1);
        assert!((impacts[0] - 200.0).abs() < 1.0, "wall impact {}", impacts[0]);
    }

    #[test]
    fn test_restitution_bounces_back() {
        let mut world = BoxWorld::new(Vec2::ZERO, 1.0);
        world.add_static_box(&Rect::new(Vec2::new(10.0, -50.0), Vec2::new(10.0, 100.0), 0.0));
        let body = world.add_dynamic_box(Vec2::new(4.8, 0.0), Vec2::splat(10.0));
        world.set_velocity(body, Vec2::new(30.0, 0.0));

        let mut queue = ContactQueue::new();
        world.step(DT, 1, 1, &mut queue);
        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 1);
        assert!((events[0].impact_speed - 30.0).abs() < 1e-3);
        assert!(world.velocity(body).x < 0.0);
    }

    #[test]
    fn test_forces_are_consumed_by_step() {
        let mut world = BoxWorld::new(Vec2::ZERO, 0.0);
        let body = world.add_dynamic_box(Vec2::ZERO, Vec2::splat(4.0));
        world.apply_force(body, Vec2::new(60.0, 0.0));
        let mut queue = ContactQueue::new();
        world.step(DT, 1, 1, &mut queue);
        let v1 = world.velocity(body);
        world.step(DT, 1, 1, &mut queue);
        assert!((v1.x - 1.0).abs() < 1e-4);
        assert_eq!(world.velocity(body), v1);
        assert!(queue.is_empty());
    }
}
