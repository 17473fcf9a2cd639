//! Draw command list
//!
//! The level does not own a GPU context. Each frame it is flattened into an
//! ordered list of [`DrawCommand`]s that the host renderer plays back.
//! World-space commands are drawn with [`Frame::camera`] subtracted; the rest
//! are in view pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::effects::ParticleKind;
use crate::sim::state::LevelState;
use crate::sim::zone::{Rect, ZoneKind};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with `alpha` (0..=255, rounded and clamped)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }
}

// Palette
pub const BACKGROUND: Rgba = Rgba::new(20, 16, 36, 255);
pub const TEXT: Rgba = Rgba::new(242, 236, 218, 255);
pub const GLOW: Rgba = Rgba::new(140, 220, 255, 255);
pub const SHARD: Rgba = Rgba::new(246, 118, 5, 255);
pub const BEAM_SPARK: Rgba = Rgba::new(213, 214, 219, 120);
pub const GOAL_ZONE: Rgba = Rgba::new(255, 255, 255, 100);
pub const DAMAGING_ZONE: Rgba = Rgba::new(255, 64, 0, 60);
pub const BLOCKING_ZONE: Rgba = Rgba::new(68, 112, 45, 20);
/// One extra vignette layer per damage tier
pub const DAMAGE_VIGNETTE: Rgba = Rgba::new(0, 0, 0, 175);

/// Screen position of the timer text
pub const TIMER_TEXT_POS: Vec2 = Vec2::new(8.0, 6.0);

/// One primitive for the host renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Full-screen clear
    Background { color: Rgba },
    /// Tile layers (world space)
    Tilemap,
    /// The crystal sprite (world space); `damage` picks the cracked frame
    Target {
        center: Vec2,
        size: Vec2,
        damage: u32,
        beam_x: f32,
        beam_active: bool,
    },
    /// Pooled particle (world space)
    Particle {
        kind: ParticleKind,
        pos: Vec2,
        scale: Vec2,
        color: Rgba,
    },
    /// Translucent region (world space)
    Zone { kind: ZoneKind, rect: Rect, color: Rgba },
    /// Darkened screen edges
    Vignette { color: Rgba },
    /// Full-screen colour fill
    Overlay { color: Rgba },
    /// Text in view pixels
    Text { pos: Vec2, text: String, color: Rgba },
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Camera offset including shake
    pub camera: Vec2,
    pub commands: Vec<DrawCommand>,
}

/// HUD timer string
pub fn timer_text(timer: f32) -> String {
    format!("Time: {:.2}", timer)
}

fn particle_color(kind: ParticleKind) -> Rgba {
    match kind {
        ParticleKind::Dust => GLOW,
        ParticleKind::Shard => SHARD,
        ParticleKind::Beam => BEAM_SPARK,
    }
}

fn push_particles(commands: &mut Vec<DrawCommand>, level: &LevelState, kind: ParticleKind) {
    let color = particle_color(kind);
    for p in level.effects.particles(kind).live() {
        commands.push(DrawCommand::Particle {
            kind,
            pos: p.pos,
            scale: p.scale,
            color: color.with_alpha(p.alpha),
        });
    }
}

/// Flatten the level into draw order
pub fn build_frame(level: &LevelState) -> Frame {
    let mut commands = vec![
        DrawCommand::Background { color: BACKGROUND },
        DrawCommand::Tilemap,
    ];

    let target = &level.target;
    if target.is_alive() {
        let bounds = target.bounds();
        commands.push(DrawCommand::Target {
            center: target.position(),
            size: bounds.size,
            damage: target.damage(),
            beam_x: target.beam_x(),
            beam_active: target.beam_active(),
        });
    }
    push_particles(&mut commands, level, ParticleKind::Dust);
    push_particles(&mut commands, level, ParticleKind::Shard);
    push_particles(&mut commands, level, ParticleKind::Beam);

    if level.show_zones {
        let zones = &level.zones;
        for (zone, color) in zones
            .damaging()
            .iter()
            .map(|z| (z, DAMAGING_ZONE))
            .chain(zones.blocking().iter().map(|z| (z, BLOCKING_ZONE)))
            .chain(std::iter::once((zones.goal(), GOAL_ZONE)))
        {
            commands.push(DrawCommand::Zone {
                kind: zone.kind,
                rect: zone.rect,
                color,
            });
        }
    }

    commands.push(DrawCommand::Vignette {
        color: Rgba::BLACK,
    });
    for _ in 0..target.damage() {
        commands.push(DrawCommand::Vignette {
            color: DAMAGE_VIGNETTE,
        });
    }

    let overlay = level.effects.overlay_alpha();
    if overlay > 0.0 {
        commands.push(DrawCommand::Overlay {
            color: Rgba::BLACK.with_alpha(overlay),
        });
    }
    if let Some(flash) = level.effects.flash() {
        commands.push(DrawCommand::Overlay { color: flash });
    }

    commands.push(DrawCommand::Text {
        pos: TIMER_TEXT_POS,
        text: timer_text(level.timer()),
        color: TEXT,
    });

    Frame {
        camera: level.camera.render_offset(),
        commands,
    }
}
