//! Fixed-size particle pools with owned animation tasks
//!
//! A particle is animated by independent tasks (position, opacity, scale). A
//! task references its particle through a generation-checked handle, so a slot
//! that gets recycled silently orphans the tasks of its previous occupant. The
//! particle goes back to the pool when its last task completes.

use glam::Vec2;

/// Progress curve applied to a task's normalized time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// `t^exponent`; exponents below 1 rush toward the end value
    Power(f32),
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power(exponent) => t.powf(exponent),
        }
    }
}

/// Handle to a live particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleHandle {
    index: usize,
    generation: u32,
}

/// Animated property and its end points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    Position { from: Vec2, to: Vec2 },
    /// Opacity in 0..=255
    Opacity { from: f32, to: f32 },
    Scale { from: Vec2, to: Vec2 },
}

#[derive(Debug, Clone)]
struct AnimationTask {
    target: ParticleHandle,
    channel: Channel,
    duration: f32,
    delay: f32,
    elapsed: f32,
}

/// One pooled particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// 0..=255
    pub alpha: f32,
    pub scale: Vec2,
    live: bool,
    generation: u32,
    pending_tasks: u32,
    /// Fire order, used to pick the oldest slot when the pool is full
    fired_at: u64,
}

impl Particle {
    fn idle() -> Self {
        Self {
            pos: Vec2::ZERO,
            alpha: 0.0,
            scale: Vec2::ONE,
            live: false,
            generation: 0,
            pending_tasks: 0,
            fired_at: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

/// Fixed-capacity particle system
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    tasks: Vec<AnimationTask>,
    fired: u64,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::idle(); capacity.max(1)],
            tasks: Vec::new(),
            fired: 0,
        }
    }

    /// Take a free slot, or recycle the oldest live particle when full
    pub fn fire(&mut self, pos: Vec2, alpha: f32) -> ParticleHandle {
        let index = match self.particles.iter().position(|p| !p.live) {
            Some(i) => i,
            None => self
                .particles
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.fired_at)
                .map(|(i, _)| i)
                .unwrap_or(0),
        };

        self.fired += 1;
        let slot = &mut self.particles[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.live = true;
        slot.pending_tasks = 0;
        slot.fired_at = self.fired;
        slot.pos = pos;
        slot.alpha = alpha;
        slot.scale = Vec2::ONE;

        ParticleHandle {
            index,
            generation: slot.generation,
        }
    }

    /// Attach an animation to a live particle. Stale handles are ignored.
    pub fn animate(&mut self, handle: ParticleHandle, channel: Channel, duration: f32, delay: f32) {
        let Some(slot) = self.particles.get_mut(handle.index) else {
            return;
        };
        if !slot.live || slot.generation != handle.generation {
            return;
        }
        slot.pending_tasks += 1;
        self.tasks.push(AnimationTask {
            target: handle,
            channel,
            duration: duration.max(f32::EPSILON),
            delay: delay.max(0.0),
            elapsed: 0.0,
        });
    }

    /// Advance every task; finished particles return to the pool
    pub fn tick(&mut self, dt: f32) {
        let particles = &mut self.particles;
        self.tasks.retain_mut(|task| {
            let Some(slot) = particles.get_mut(task.target.index) else {
                return false;
            };
            if !slot.live || slot.generation != task.target.generation {
                return false;
            }

            task.elapsed += dt;
            if task.elapsed < task.delay {
                return true;
            }
            let t = ((task.elapsed - task.delay) / task.duration).clamp(0.0, 1.0);
            match task.channel {
                Channel::Position { from, to } => slot.pos = from.lerp(to, t),
                Channel::Opacity { from, to } => slot.alpha = from + (to - from) * t,
                Channel::Scale { from, to } => slot.scale = from.lerp(to, t),
            }

            if t < 1.0 {
                return true;
            }
            slot.pending_tasks = slot.pending_tasks.saturating_sub(1);
            if slot.pending_tasks == 0 {
                slot.live = false;
            }
            false
        });
    }

    /// Return every particle to the pool and drop all tasks
    pub fn clear(&mut self) {
        self.tasks.clear();
        for p in &mut self.particles {
            p.live = false;
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.live)
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.particles
            .get(handle.index)
            .filter(|p| p.live && p.generation == handle.generation)
    }
}

/// Single-value tween used by screen overlays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance and return the current value
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_returns_to_pool_after_last_task() {
        let mut pool = ParticlePool::new(4);
        let h = pool.fire(Vec2::ZERO, 255.0);
        pool.animate(h, Channel::Opacity { from: 255.0, to: 0.0 }, 0.5, 0.0);
        pool.animate(
            h,
            Channel::Position {
                from: Vec2::ZERO,
                to: Vec2::new(10.0, 0.0),
            },
            1.0,
            0.0,
        );

        pool.tick(0.5);
        let p = pool.get(h).unwrap();
        assert_eq!(p.alpha, 0.0);
        assert!((p.pos.x - 5.0).abs() < 1e-4);

        pool.tick(0.5);
        assert!(pool.get(h).is_none());
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_delay_holds_initial_value() {
        let mut pool = ParticlePool::new(1);
        let h = pool.fire(Vec2::ZERO, 255.0);
        pool.animate(h, Channel::Opacity { from: 255.0, to: 0.0 }, 0.125, 0.2);
        pool.tick(0.1);
        assert_eq!(pool.get(h).unwrap().alpha, 255.0);
        pool.tick(0.3);
        assert!(pool.get(h).is_none());
    }

    #[test]
    fn test_full_pool_recycles_oldest_and_orphans_its_tasks() {
        let mut pool = ParticlePool::new(2);
        let first = pool.fire(Vec2::ZERO, 1.0);
        pool.animate(first, Channel::Opacity { from: 1.0, to: 0.0 }, 10.0, 0.0);
        let second = pool.fire(Vec2::ONE, 1.0);
        pool.animate(second, Channel::Opacity { from: 1.0, to: 0.0 }, 10.0, 0.0);

        let third = pool.fire(Vec2::splat(2.0), 1.0);
        assert!(pool.get(first).is_none());
        assert!(pool.get(second).is_some());
        assert_eq!(pool.get(third).unwrap().pos, Vec2::splat(2.0));

        // The orphaned task is dropped instead of driving the new occupant
        pool.tick(1.0);
        assert_eq!(pool.get(third).unwrap().alpha, 1.0);
        assert_eq!(pool.tasks.len(), 1);
    }

    #[test]
    fn test_clear_abandons_animations() {
        let mut pool = ParticlePool::new(3);
        for _ in 0..3 {
            let h = pool.fire(Vec2::ZERO, 1.0);
            pool.animate(h, Channel::Scale { from: Vec2::ONE, to: Vec2::ZERO }, 1.0, 0.0);
        }
        pool.clear();
        assert_eq!(pool.live_count(), 0);
        pool.tick(1.0);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_power_easing_rushes_to_end() {
        let mut fade = Fade::new(0.0, 255.0, 1.0, Easing::Power(0.25));
        let early = fade.advance(0.0625);
        assert!((early - 127.5).abs() < 1e-3);
        fade.advance(10.0);
        assert!(fade.is_finished());
        assert_eq!(fade.value(), 255.0);
    }
}
