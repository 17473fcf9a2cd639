//! Level phase machine: timer, death, restart and level advance

use serde::{Deserialize, Serialize};

use crate::highscores::{HighscoreStore, record_best_time};

/// Where the application should go after this level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// Start the next level with the timer reset
    NextLevel(usize),
    /// Back to the top-level menu
    Menu,
    /// Replay `level`, starting from `timer`
    Restart { level: usize, timer: f32 },
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelPhase {
    Playing,
    /// Crystal shattered; death fade running
    Dead,
    /// Terminal for this level object
    Transitioning(Transition),
}

#[derive(Debug, Clone)]
pub struct LevelLifecycle {
    level: usize,
    level_count: usize,
    timer: f32,
    start_timer: f32,
    phase: LevelPhase,
}

impl LevelLifecycle {
    /// `timer` is carried over when a level is started from a previous attempt
    pub fn new(level: usize, level_count: usize, timer: f32) -> Self {
        Self {
            level,
            level_count,
            timer,
            start_timer: timer,
            phase: LevelPhase::Playing,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn start_timer(&self) -> f32 {
        self.start_timer
    }

    pub fn is_playing(&self) -> bool {
        self.phase == LevelPhase::Playing
    }

    pub fn transition(&self) -> Option<Transition> {
        match self.phase {
            LevelPhase::Transitioning(t) => Some(t),
            _ => None,
        }
    }

    /// Accumulate elapsed time; frozen outside `Playing`
    pub fn accumulate(&mut self, elapsed: f32) {
        if self.is_playing() {
            self.timer += elapsed;
        }
    }

    /// `Playing → Dead`. Returns true only for the call that killed the level.
    pub fn kill(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        log::info!("Level {} failed at {:.2}s", self.level, self.timer);
        self.phase = LevelPhase::Dead;
        true
    }

    /// Goal reached: record the time, then advance or return to the menu
    pub fn reach_goal(&mut self, scores: &mut dyn HighscoreStore) -> Option<Transition> {
        if !self.is_playing() {
            return None;
        }
        record_best_time(scores, self.level, self.timer);

        let next = self.level + 1;
        let transition = if next < self.level_count {
            Transition::NextLevel(next)
        } else {
            Transition::Menu
        };
        log::info!("Level {} complete in {:.2}s -> {:?}", self.level, self.timer, transition);
        self.phase = LevelPhase::Transitioning(transition);
        Some(transition)
    }

    /// Replay with the start timer. Allowed while playing or dead.
    pub fn restart(&mut self) -> Option<Transition> {
        if !matches!(self.phase, LevelPhase::Playing | LevelPhase::Dead) {
            return None;
        }
        let transition = Transition::Restart {
            level: self.level,
            timer: self.start_timer,
        };
        log::info!("Restarting level {}", self.level);
        self.phase = LevelPhase::Transitioning(transition);
        Some(transition)
    }

    /// Leave to the menu (only while playing)
    pub fn quit_to_menu(&mut self) -> Option<Transition> {
        if !self.is_playing() {
            return None;
        }
        self.phase = LevelPhase::Transitioning(Transition::Menu);
        Some(Transition::Menu)
    }
}
