//! Crystal Beam headless runner
//!
//! Plays the configured levels with an autopilot input stream and logs every
//! level transition. The browser build starts from `wasm_start` in the library.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use crystal_beam::highscores::JsonFileStore;
    use crystal_beam::render::build_frame;
    use crystal_beam::sim::{LevelError, LevelMap, LevelState, TickInput, Transition, tick};
    use crystal_beam::{AudioSession, Settings, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a level after two minutes of play
    const MAX_FRAMES: u32 = 120 * 60;
    /// Restarts allowed per level before returning to the menu
    const MAX_RESTARTS: u32 = 3;

    enum Screen {
        Menu,
        Level { index: usize, timer: f32 },
    }

    /// Steer the beam toward the goal and keep it held
    fn autopilot(level: &LevelState) -> TickInput {
        let goal = level.zones.goal().rect.center();
        TickInput {
            mouse_screen: level.camera.to_screen(goal),
            beam_held: true,
            ..Default::default()
        }
    }

    fn play_level(
        index: usize,
        timer: f32,
        tuning: &Tuning,
        settings: &Settings,
        audio: &mut AudioSession,
        scores: &mut JsonFileStore,
    ) -> Result<Option<Transition>, LevelError> {
        let entry = tuning.levels.get(index).ok_or(LevelError::NoSuchLevel {
            index,
            count: tuning.level_count(),
        })?;
        let map = LevelMap::load(&entry.path)?;
        let mut level = LevelState::new(index, timer, &map, tuning, settings, audio)?;
        log::info!("Playing level {} \"{}\"", index, entry.name);

        for _ in 0..MAX_FRAMES {
            let input = autopilot(&level);
            tick(&mut level, &input, FRAME_DT, scores);

            for event in level.drain_events() {
                log::debug!("audio: {:?}", event);
            }
            let frame = build_frame(&level);
            log::trace!("{} draw commands", frame.commands.len());

            if let Some(transition) = level.transition() {
                return Ok(Some(transition));
            }
        }
        log::warn!("Level {} timed out at {:.2}s", index, level.timer());
        Ok(None)
    }

    pub fn run() -> Result<(), LevelError> {
        let tuning = match std::env::args().nth(1) {
            Some(path) => Tuning::load(Path::new(&path)).unwrap_or_else(|e| {
                log::warn!("Using default tuning: {}", e);
                Tuning::default()
            }),
            None => Tuning::default(),
        };
        let settings = Settings::load(Path::new("settings.json"));
        let mut scores = JsonFileStore::new("highscores.json");
        let mut audio = AudioSession::new();

        let mut screen = Screen::Level {
            index: 0,
            timer: 0.0,
        };
        let mut restarts = 0;

        while let Screen::Level { index, timer } = screen {
            let transition = play_level(index, timer, &tuning, &settings, &mut audio, &mut scores)?;
            screen = match transition {
                Some(Transition::NextLevel(next)) => {
                    restarts = 0;
                    Screen::Level {
                        index: next,
                        timer: 0.0,
                    }
                }
                Some(Transition::Restart { level, timer }) if restarts < MAX_RESTARTS => {
                    restarts += 1;
                    Screen::Level {
                        index: level,
                        timer,
                    }
                }
                _ => Screen::Menu,
            };
        }

        log::info!("Back at the menu");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Crystal Beam (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start, this is just to satisfy the compiler
}
