//! Ramen Runner entry point
//!
//! The web build is driven from JavaScript through `ramen_runner::web`. The
//! native binary runs a headless game with a simple autopilot, which is handy
//! for checking balance changes and the leaderboard file.
//!
//! Usage: `ramen-runner [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ramen_runner::audio::LogAudio;
    use ramen_runner::consts::REFERENCE_FRAME_MS;
    use ramen_runner::game::Game;
    use ramen_runner::persistence::FileStorage;
    use ramen_runner::platform::ManualClock;
    use ramen_runner::sim::{HitboxKind, RunState, Viewport};
    use ramen_runner::tuning::Tuning;

    /// Two minutes at 60 Hz
    const MAX_FRAMES: u32 = 60 * 120;
    const DATA_DIR_ENV: &str = "RAMEN_RUNNER_DATA";

    /// Jump when a ground-level hazard is about to reach the player
    fn should_jump(state: &RunState) -> bool {
        let player = &state.player;
        if player.is_jumping {
            return false;
        }
        let front = player.pos.x + player.size;
        let reach = state.obstacle_speed * 18.0;

        state
            .entities
            .iter()
            .filter(|e| e.is_hazard())
            .flat_map(|e| e.bodies())
            .filter(|b| b.hitbox == HitboxKind::Ground)
            .any(|b| b.pos.x >= front - b.size.x && b.pos.x <= front + reach)
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0)
            });

        let tuning = match args.next() {
            Some(path) => match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
            {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Could not load tuning from {}: {}, using defaults", path, e);
                    Tuning::default()
                }
            },
            None => Tuning::default(),
        };

        let data_dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| String::from("ramen-runner-data"));
        let clock = ManualClock::new(0.0);
        let mut game = Game::new(
            Viewport::fit(1280.0, 800.0),
            tuning,
            seed,
            Box::new(clock.clone()),
            Box::new(FileStorage::new(&data_dir)),
            Box::new(LogAudio),
        );
        log::info!("Headless run with seed {} (leaderboard in {})", seed, data_dir);

        let mut frames = 0;
        while frames < MAX_FRAMES && !game.state().is_game_over() {
            if should_jump(game.state()) {
                game.jump();
            }
            clock.advance(REFERENCE_FRAME_MS as f64);
            game.step();
            frames += 1;
        }

        let state = game.state();
        log::info!(
            "Run finished after {:.1} s: score {}, health {}/{}{}",
            frames as f64 * REFERENCE_FRAME_MS as f64 / 1000.0,
            state.final_score(),
            state.health,
            state.tuning.max_health,
            if state.is_game_over() { "" } else { " (frame cap)" }
        );
        for (i, score) in game.top_scores().iter().enumerate() {
            log::info!("  #{} {}", i + 1, score);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ramen Runner (native, headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is ramen_runner::web::wasm_start, this is just to satisfy the compiler
}
