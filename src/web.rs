//! Browser bindings
//!
//! The page owns the canvas, the animation-frame loop and input wiring. Each
//! frame it calls [`WebGame::frame`] and draws the returned snapshot JSON.

use wasm_bindgen::prelude::*;

use crate::audio::WebAudio;
use crate::game::Game;
use crate::persistence::LocalStorage;
use crate::platform::SystemClock;
use crate::sim::Viewport;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Ramen Runner (web) starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a game on a `width` x `height` canvas
    ///
    /// `tuning_json` may override any balance value; an invalid document is
    /// logged and the defaults are used.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, tuning_json: Option<String>) -> WebGame {
        let tuning = match tuning_json.as_deref().map(Tuning::from_json) {
            Some(Ok(tuning)) => tuning,
            Some(Err(e)) => {
                log::warn!("Invalid tuning, using defaults: {}", e);
                Tuning::default()
            }
            None => Tuning::default(),
        };
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;

        let game = Game::new(
            Viewport::fit(width, height),
            tuning,
            seed,
            Box::new(SystemClock::new()),
            Box::new(LocalStorage::new()),
            Box::new(WebAudio::new()),
        );
        WebGame { game }
    }

    /// Step one frame and return the render snapshot as JSON
    pub fn frame(&mut self) -> String {
        self.game.step();
        self.snapshot()
    }

    pub fn snapshot(&self) -> String {
        match serde_json::to_string(&self.game.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Snapshot serialization failed: {}", e);
                String::from("null")
            }
        }
    }

    pub fn jump(&mut self) {
        self.game.jump();
    }

    pub fn click(&mut self) {
        self.game.click();
    }

    pub fn toggle_pause(&mut self) {
        self.game.toggle_pause();
    }

    pub fn restart(&mut self) {
        self.game.restart();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(Viewport::fit(width, height));
    }

    pub fn toggle_debug(&mut self) {
        self.game.toggle_debug();
    }

    pub fn toggle_music(&mut self) {
        self.game.toggle_music();
    }

    pub fn music_muted(&self) -> bool {
        self.game.settings().music_muted
    }

    pub fn top_scores(&self) -> Vec<u32> {
        self.game.top_scores().to_vec()
    }
}
