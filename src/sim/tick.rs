//! Per-frame level update
//!
//! One call advances the level by the frame's elapsed time:
//! physics step → contacts → damage → effects → camera → goal → effect ticking.

use glam::Vec2;

use super::damage::DamageOutcome;
use super::lifecycle::LevelPhase;
use super::state::LevelState;
use crate::consts::{POSITION_ITERATIONS, VELOCITY_ITERATIONS};
use crate::highscores::HighscoreStore;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Mouse position in view pixels (may lie outside the view)
    pub mouse_screen: Vec2,
    /// Left mouse button held: tractor beam engaged
    pub beam_held: bool,
    /// Restart key pressed this frame
    pub restart: bool,
    /// Escape pressed this frame
    pub escape: bool,
    /// Zone overlay toggle released this frame
    pub toggle_zones: bool,
    /// Any key released this frame (skips the death fade)
    pub any_key_released: bool,
}

/// Advance the level by `elapsed` seconds
pub fn tick(
    level: &mut LevelState,
    input: &TickInput,
    elapsed: f32,
    scores: &mut dyn HighscoreStore,
) {
    let finished = match level.lifecycle.phase() {
        LevelPhase::Transitioning(_) => return,
        LevelPhase::Playing => {
            level.age += elapsed;
            tick_playing(level, input, elapsed, scores)
        }
        LevelPhase::Dead => {
            level.age += elapsed;
            tick_dead(level, input, elapsed)
        }
    };
    if finished {
        return;
    }

    if level.effects.tick(elapsed) && level.lifecycle.phase() == LevelPhase::Dead {
        level.lifecycle.restart();
    }
    level.camera.tick_shake(elapsed);
}

/// Returns true once the level has left `Playing` for good
fn tick_playing(
    level: &mut LevelState,
    input: &TickInput,
    elapsed: f32,
    scores: &mut dyn HighscoreStore,
) -> bool {
    level.lifecycle.accumulate(elapsed);

    if input.toggle_zones {
        level.show_zones = !level.show_zones;
    }
    if input.restart {
        level.lifecycle.restart();
        return true;
    }

    let mouse_world = level.camera.mouse_to_world(input.mouse_screen);
    level.target.steer(
        level.world.as_mut(),
        mouse_world,
        input.beam_held,
        &level.tuning,
        elapsed,
    );
    level.world.step(
        elapsed,
        VELOCITY_ITERATIONS,
        POSITION_ITERATIONS,
        &mut level.contacts,
    );
    level.target.sync(level.world.as_ref());

    // Contacts in the order the world reported them
    for contact in level.contacts.drain() {
        let outcome = level.damage.on_contact(
            contact.impact_speed,
            level.age,
            &mut level.target,
            &level.zones,
        );
        level.effects.on_damage(
            outcome,
            level.target.position(),
            &mut level.camera,
            &mut level.events,
        );
        if outcome == DamageOutcome::Killed && level.lifecycle.kill() {
            level.effects.stop_dust();
            level.effects.start_death_fade(level.tuning.death_fade_duration);
        }
    }

    if input.escape && level.lifecycle.quit_to_menu().is_some() {
        return true;
    }

    let alive = level.target.is_alive();
    let target_pos = level.target.position();
    level.effects.emit_beam(
        elapsed,
        input.beam_held && alive,
        level.target.beam_x(),
        target_pos.y,
    );
    level.effects.emit_dust(elapsed, target_pos);
    level
        .effects
        .update_beam_sound(level.target.beam_active(), &mut level.events);

    if !alive {
        return false;
    }

    level
        .camera
        .update(elapsed, input.mouse_screen, target_pos);

    let bounds = level.target.bounds();
    if level.zones.overlaps_goal(&bounds) {
        level.lifecycle.reach_goal(scores);
        return true;
    }
    level
        .target
        .set_vertical_beam(!level.zones.overlaps_blocking(&bounds));
    false
}

fn tick_dead(level: &mut LevelState, input: &TickInput, elapsed: f32) -> bool {
    if input.any_key_released {
        level.lifecycle.restart();
        return true;
    }

    level
        .camera
        .drift(Vec2::new(0.0, -level.tuning.scroll_speed_y * elapsed));
    level.effects.fade_audio(&mut level.events);
    false
}
