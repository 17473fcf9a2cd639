//! Best completion time per level
//!
//! Lower is better. A stored time of `0.0` means the level was never finished.
//! Persisted to a JSON file natively and to LocalStorage in the browser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a highscore back-end
#[derive(Debug, Error)]
pub enum HighscoreError {
    #[error("highscore storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt highscore table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("browser storage unavailable")]
    StorageUnavailable,
}

/// Best time per level index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highscores {
    pub best: BTreeMap<usize, f32>,
}

impl Highscores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored time for a level (`0.0` when unset)
    pub fn best_time(&self, level: usize) -> f32 {
        self.best.get(&level).copied().unwrap_or(0.0)
    }

    /// Whether `time` would replace the stored time for `level`
    pub fn improves(&self, level: usize, time: f32) -> bool {
        let current = self.best_time(level);
        time < current || current == 0.0
    }

    /// Store `time` if it beats the current entry. Returns true when stored.
    pub fn record(&mut self, level: usize, time: f32) -> bool {
        if !self.improves(level, time) {
            return false;
        }
        self.best.insert(level, time);
        true
    }
}

/// Persistence back-end for [`Highscores`]
pub trait HighscoreStore {
    fn load(&self) -> Result<Highscores, HighscoreError>;
    fn save(&mut self, scores: &Highscores) -> Result<(), HighscoreError>;
}

/// Load, update and save the table for a finished level.
///
/// Storage failures are logged and swallowed: a broken store must never block
/// the level transition. A table that failed to load is never overwritten.
/// Returns true when a new best time was recorded.
pub fn record_best_time(store: &mut dyn HighscoreStore, level: usize, time: f32) -> bool {
    let mut scores = match store.load() {
        Ok(scores) => scores,
        Err(e) => {
            log::warn!("Could not load highscores, level {} time not recorded: {}", level, e);
            return false;
        }
    };
    if !scores.record(level, time) {
        log::info!(
            "Level {} finished in {:.2}s (best {:.2}s)",
            level,
            time,
            scores.best_time(level)
        );
        return false;
    }
    log::info!("New best time for level {}: {:.2}s", level, time);
    if let Err(e) = store.save(&scores) {
        log::warn!("Could not save highscores: {}", e);
    }
    true
}

/// Table kept in memory only (tests, sessions without storage)
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub scores: Highscores,
    pub saves: usize,
}

impl HighscoreStore for MemoryStore {
    fn load(&self) -> Result<Highscores, HighscoreError> {
        Ok(self.scores.clone())
    }

    fn save(&mut self, scores: &Highscores) -> Result<(), HighscoreError> {
        self.scores = scores.clone();
        self.saves += 1;
        Ok(())
    }
}

/// JSON file next to the executable
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HighscoreStore for JsonFileStore {
    fn load(&self) -> Result<Highscores, HighscoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Highscores::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, scores: &Highscores) -> Result<(), HighscoreError> {
        let json = serde_json::to_string_pretty(scores)?;
        std::fs::write(&self.path, json)?;
        log::info!("Highscores saved to {}", self.path.display());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "crystal_beam_highscores";

    fn storage() -> Result<web_sys::Storage, HighscoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(HighscoreError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl HighscoreStore for LocalStorageStore {
    fn load(&self) -> Result<Highscores, HighscoreError> {
        let storage = Self::storage()?;
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => Ok(serde_json::from_str(&json)?),
            Ok(None) => Ok(Highscores::new()),
            Err(_) => Err(HighscoreError::StorageUnavailable),
        }
    }

    fn save(&mut self, scores: &Highscores) -> Result<(), HighscoreError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(scores)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| HighscoreError::StorageUnavailable)?;
        log::info!("Highscores saved ({} levels)", scores.best.len());
        Ok(())
    }
}
