//! Sound identifiers and process-wide audio state
//!
//! The level never mixes audio itself. It emits play/stop/volume requests
//! naming a [`Sound`]; the host maps them to loaded buffers.

use serde::{Deserialize, Serialize};

/// Sound effects the level can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Crystal hits level geometry
    Collision,
    /// Damage tier 2 warning
    AlarmA,
    /// Damage tier 3 warning
    AlarmB,
    /// Damage tier 4 warning
    AlarmC,
    /// Tractor beam hum while the beam is engaged
    BeamLoop,
}

impl Sound {
    pub const ALARMS: [Sound; 3] = [Sound::AlarmA, Sound::AlarmB, Sound::AlarmC];

    /// Alarm announcing a damage tier, if that tier has one
    pub fn alarm_for_tier(tier: u32) -> Option<Self> {
        match tier {
            2 => Some(Sound::AlarmA),
            3 => Some(Sound::AlarmB),
            4 => Some(Sound::AlarmC),
            _ => None,
        }
    }
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Music {
    Ingame,
}

/// Audio state shared by every level of one application run
///
/// Owned by the application shell and lent to each level on construction.
#[derive(Debug, Default)]
pub struct AudioSession {
    music_started: bool,
}

impl AudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per session: the first caller starts the music
    pub fn start_music_once(&mut self) -> bool {
        if self.music_started {
            return false;
        }
        self.music_started = true;
        true
    }

    pub fn music_started(&self) -> bool {
        self.music_started
    }
}
