//! Visual and audio feedback
//!
//! Reacts to damage outcomes and lifecycle changes. Each triggering event issues
//! exactly one of each configured action (shake, flash, particle burst, sound);
//! nothing fires outside a triggering event except the continuous dust and beam
//! emitters.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::CameraScroller;
use super::damage::DamageOutcome;
use super::particles::{Channel, Easing, Fade, ParticlePool};
use super::state::LevelEvent;
use crate::audio::Sound;
use crate::consts::PARTICLE_POOL_SIZE;
use crate::render::Rgba;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// The three particle systems of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Glow trail left behind the crystal
    Dust,
    /// Crystal shards flying off on impact
    Shard,
    /// Sparks rising along the tractor beam
    Beam,
}

/// Alarm loop selection; at most one alarm plays at a time
#[derive(Debug, Clone)]
pub struct AlarmBank {
    active: Option<Sound>,
    volume: f32,
}

impl AlarmBank {
    pub fn new(volume: f32) -> Self {
        Self {
            active: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn active(&self) -> Option<Sound> {
        self.active
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Stop the other alarms, then play `alarm`
    pub fn play(&mut self, alarm: Sound, events: &mut Vec<LevelEvent>) {
        for other in Sound::ALARMS.into_iter().filter(|s| *s != alarm) {
            events.push(LevelEvent::StopSound(other));
        }
        events.push(LevelEvent::PlaySound(alarm));
        self.active = Some(alarm);
    }

    /// Scale the alarm volume by `factor`
    pub fn fade(&mut self, factor: f32, events: &mut Vec<LevelEvent>) {
        self.volume = (self.volume * factor).clamp(0.0, 1.0);
        for alarm in Sound::ALARMS {
            events.push(LevelEvent::SetVolume {
                sound: alarm,
                volume: self.volume,
            });
        }
    }
}

/// Zero-mean normal sample (Box-Muller)
fn gauss(rng: &mut Pcg32, std_dev: f32) -> f32 {
    let u1: f32 = rng.random_range(f32::EPSILON..1.0);
    let u2: f32 = rng.random();
    std_dev * (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

#[derive(Debug, Clone)]
pub struct EffectsDirector {
    rng: Pcg32,

    dust: ParticlePool,
    shards: ParticlePool,
    beam: ParticlePool,
    dust_running: bool,
    dust_timer: f32,
    beam_cooldown: f32,

    /// Black full-screen overlay, 0..=255
    overlay_alpha: f32,
    overlay_fade: Option<Fade>,
    /// The death fade waits one tick before it starts advancing
    overlay_hold: bool,
    death_fade: bool,
    flash: Option<(Rgba, Fade)>,

    alarms: AlarmBank,
    beam_engaged: bool,
    beam_loop_volume: f32,

    // configuration
    shake_enabled: bool,
    flash_enabled: bool,
    particles_enabled: bool,
    shake_duration: f32,
    shake_intensity: f32,
    flash_duration: f32,
    flash_color: Rgba,
    large_burst: usize,
    small_burst: usize,
    dust_interval: f32,
    beam_interval: f32,
    volume_decay: f32,
}

impl EffectsDirector {
    /// The level opens black and fades in
    pub fn new(tuning: &Tuning, settings: &Settings, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),

            dust: ParticlePool::new(PARTICLE_POOL_SIZE),
            shards: ParticlePool::new(PARTICLE_POOL_SIZE),
            beam: ParticlePool::new(PARTICLE_POOL_SIZE),
            dust_running: true,
            dust_timer: 0.0,
            beam_cooldown: 0.0,

            overlay_alpha: 255.0,
            overlay_fade: Some(Fade::new(255.0, 0.0, tuning.intro_fade_duration, Easing::Linear)),
            overlay_hold: false,
            death_fade: false,
            flash: None,

            alarms: AlarmBank::new(tuning.alarm_volume),
            beam_engaged: false,
            beam_loop_volume: 1.0,

            shake_enabled: settings.effective_screen_shake(),
            flash_enabled: settings.effective_flashes(),
            particles_enabled: settings.particles,
            shake_duration: tuning.strong_shake_duration,
            shake_intensity: tuning.strong_shake_intensity,
            flash_duration: tuning.strong_flash_duration,
            flash_color: tuning.strong_flash_color,
            large_burst: tuning.large_burst,
            small_burst: tuning.small_burst,
            dust_interval: tuning.dust_interval.max(f32::EPSILON),
            beam_interval: tuning.beam_particle_interval,
            volume_decay: tuning.death_volume_decay,
        }
    }

    /// Issue the feedback for one damage outcome
    pub fn on_damage(
        &mut self,
        outcome: DamageOutcome,
        origin: Vec2,
        camera: &mut CameraScroller,
        events: &mut Vec<LevelEvent>,
    ) {
        match outcome {
            DamageOutcome::Severe { .. } | DamageOutcome::Killed => {
                if self.shake_enabled {
                    camera.shake(self.shake_duration, self.shake_intensity);
                }
                if self.flash_enabled {
                    self.flash_screen(self.flash_color, self.flash_duration);
                }
                self.burst(self.large_burst, origin);
                events.push(LevelEvent::PlaySound(Sound::Collision));
                if let DamageOutcome::Severe { tier } = outcome {
                    if let Some(alarm) = Sound::alarm_for_tier(tier) {
                        self.alarms.play(alarm, events);
                    }
                }
            }
            DamageOutcome::Minor => {
                self.burst(self.small_burst, origin);
                events.push(LevelEvent::PlaySound(Sound::Collision));
            }
            DamageOutcome::NoOp | DamageOutcome::Ignored => {}
        }
    }

    /// Flash `color` over the screen, fading out over `duration`
    pub fn flash_screen(&mut self, color: Rgba, duration: f32) {
        let fade = Fade::new(color.a as f32, 0.0, duration, Easing::Linear);
        self.flash = Some((color, fade));
    }

    /// Fire `count` shards from `origin`
    pub fn burst(&mut self, count: usize, origin: Vec2) {
        if !self.particles_enabled {
            return;
        }
        for _ in 0..count {
            let end = origin
                + Vec2::new(
                    self.rng.random_range(-100.0..100.0),
                    self.rng.random_range(-100.0..100.0),
                );
            let h = self.shards.fire(origin, 255.0);
            self.shards.animate(h, Channel::Position { from: origin, to: end }, 1.0, 0.0);
            self.shards
                .animate(h, Channel::Opacity { from: 255.0, to: 0.0 }, 0.125, 0.2);
        }
    }

    /// Continuous dust trail behind the crystal
    pub fn emit_dust(&mut self, dt: f32, target: Vec2) {
        if !self.dust_running {
            return;
        }
        self.dust_timer += dt;
        while self.dust_timer >= self.dust_interval {
            self.dust_timer -= self.dust_interval;
            if !self.particles_enabled {
                continue;
            }
            let h = self.dust.fire(target - Vec2::new(8.0, 8.0), 100.0);
            self.dust.animate(h, Channel::Opacity { from: 100.0, to: 0.0 }, 0.5, 0.0);
            self.dust
                .animate(h, Channel::Scale { from: Vec2::ONE, to: Vec2::ZERO }, 0.75, 0.0);
        }
    }

    /// Stop the dust emitter and clear its live particles
    pub fn stop_dust(&mut self) {
        self.dust_running = false;
        self.dust.clear();
    }

    pub fn dust_running(&self) -> bool {
        self.dust_running
    }

    /// Beam sparks, one per interval while the beam is held
    pub fn emit_beam(&mut self, dt: f32, held: bool, beam_x: f32, target_y: f32) {
        self.beam_cooldown -= dt;
        if !held || self.beam_cooldown > 0.0 {
            return;
        }
        self.beam_cooldown = self.beam_interval;
        if !self.particles_enabled {
            return;
        }
        let start = Vec2::new(
            beam_x + gauss(&mut self.rng, 8.0),
            target_y + self.rng.random_range(-30.0..50.0),
        );
        let end = start + Vec2::new(0.0, -100.0 + gauss(&mut self.rng, 5.0));
        let h = self.beam.fire(start, 120.0);
        self.beam.animate(h, Channel::Position { from: start, to: end }, 1.0, 0.0);
        self.beam
            .animate(h, Channel::Opacity { from: 120.0, to: 0.0 }, 0.25, 0.6);
        self.beam.animate(
            h,
            Channel::Scale {
                from: Vec2::ONE,
                to: Vec2::new(1.0, 2.0),
            },
            1.0,
            0.0,
        );
    }

    /// Start or stop the beam hum when the beam engages or releases
    pub fn update_beam_sound(&mut self, engaged: bool, events: &mut Vec<LevelEvent>) {
        if engaged == self.beam_engaged {
            return;
        }
        self.beam_engaged = engaged;
        events.push(if engaged {
            LevelEvent::PlaySound(Sound::BeamLoop)
        } else {
            LevelEvent::StopSound(Sound::BeamLoop)
        });
    }

    /// Fade the overlay to black, starting with the next tick;
    /// [`tick`](Self::tick) reports completion
    pub fn start_death_fade(&mut self, duration: f32) {
        self.overlay_fade = Some(Fade::new(0.0, 255.0, duration, Easing::Power(0.25)));
        self.overlay_hold = true;
        self.death_fade = true;
    }

    /// Per-tick volume decay of the beam hum and the alarms
    pub fn fade_audio(&mut self, events: &mut Vec<LevelEvent>) {
        self.beam_loop_volume = (self.beam_loop_volume * self.volume_decay).clamp(0.0, 1.0);
        events.push(LevelEvent::SetVolume {
            sound: Sound::BeamLoop,
            volume: self.beam_loop_volume,
        });
        self.alarms.fade(self.volume_decay, events);
    }

    /// Advance all animations. Returns true on the tick the death fade completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.dust.tick(dt);
        self.shards.tick(dt);
        self.beam.tick(dt);

        if let Some((_, fade)) = self.flash.as_mut() {
            fade.advance(dt);
            if fade.is_finished() {
                self.flash = None;
            }
        }

        if std::mem::take(&mut self.overlay_hold) {
            return false;
        }
        let Some(fade) = self.overlay_fade.as_mut() else {
            return false;
        };
        self.overlay_alpha = fade.advance(dt);
        if !fade.is_finished() {
            return false;
        }
        self.overlay_fade = None;
        std::mem::take(&mut self.death_fade)
    }

    pub fn particles(&self, kind: ParticleKind) -> &ParticlePool {
        match kind {
            ParticleKind::Dust => &self.dust,
            ParticleKind::Shard => &self.shards,
            ParticleKind::Beam => &self.beam,
        }
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.overlay_alpha
    }

    /// Current flash colour, alpha included
    pub fn flash(&self) -> Option<Rgba> {
        self.flash
            .as_ref()
            .map(|(color, fade)| color.with_alpha(fade.value()))
    }

    pub fn alarms(&self) -> &AlarmBank {
        &self.alarms
    }

    pub fn beam_loop_volume(&self) -> f32 {
        self.beam_loop_volume
    }
}
