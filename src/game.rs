//! Game façade
//!
//! Binds a [`RunState`] to its collaborators: the clock that times frames,
//! the storage holding the leaderboard and settings, and the audio sink that
//! turns simulation events into sound.

use crate::audio::{AudioCue, AudioSink};
use crate::highscores::{self, HighScores};
use crate::persistence::Storage;
use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{GamePhase, RunState, SimEvent, Snapshot, Viewport, step};
use crate::tuning::Tuning;

pub struct Game {
    state: RunState,
    clock: Box<dyn Clock>,
    storage: Box<dyn Storage>,
    audio: Box<dyn AudioSink>,
    high_scores: HighScores,
    settings: Settings,
    /// Clock reading at the previous frame
    last_frame_ms: Option<f64>,
    music_playing: bool,
}

impl Game {
    pub fn new(
        viewport: Viewport,
        tuning: Tuning,
        seed: u64,
        clock: Box<dyn Clock>,
        storage: Box<dyn Storage>,
        mut audio: Box<dyn AudioSink>,
    ) -> Self {
        let settings = Settings::load(storage.as_ref());
        let high_scores = HighScores::load(storage.as_ref());
        audio.set_gains(settings.sfx_gain(), settings.music_gain());

        let mut state = RunState::new(viewport, tuning, seed, clock.now_ms());
        state.show_hitboxes = settings.show_hitboxes;

        let mut game = Self {
            state,
            clock,
            storage,
            audio,
            high_scores,
            settings,
            last_frame_ms: None,
            music_playing: false,
        };
        game.start_music();
        game
    }

    /// Run one frame timed by the clock
    ///
    /// The first frame after construction sees zero elapsed time.
    pub fn step(&mut self) {
        let now = self.clock.now_ms();
        let delta = self.last_frame_ms.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame_ms = Some(now);

        step(&mut self.state, delta as f32, now);
        self.dispatch_events();
    }

    pub fn jump(&mut self) {
        self.state.jump();
        self.dispatch_events();
    }

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
        self.dispatch_events();
    }

    pub fn restart(&mut self) {
        let now = self.clock.now_ms();
        self.state.restart(now);
        self.dispatch_events();
    }

    /// Pointer/tap input: restart after game over, otherwise jump
    pub fn click(&mut self) {
        if self.state.is_game_over() {
            self.restart();
        } else {
            self.jump();
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.state.resize(viewport);
    }

    /// Show or hide hitboxes in snapshots; the choice is remembered
    pub fn toggle_debug(&mut self) {
        self.settings.show_hitboxes = !self.settings.show_hitboxes;
        self.state.show_hitboxes = self.settings.show_hitboxes;
        self.settings.save(self.storage.as_mut());
    }

    /// Mute or unmute the background music; the choice is remembered
    pub fn toggle_music(&mut self) {
        self.settings.music_muted = !self.settings.music_muted;
        self.settings.save(self.storage.as_mut());
        self.audio
            .set_gains(self.settings.sfx_gain(), self.settings.music_gain());

        if self.settings.music_muted {
            self.stop_music();
        } else if self.state.phase == GamePhase::Running {
            self.start_music();
        }
        log::info!(
            "Music {}",
            if self.settings.music_muted { "muted" } else { "unmuted" }
        );
    }

    /// Leaderboard, best first
    pub fn top_scores(&self) -> &[u32] {
        &self.high_scores.scores
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    fn start_music(&mut self) {
        if !self.music_playing && !self.settings.music_muted {
            self.music_playing = true;
            self.audio.play(AudioCue::MusicStart);
        }
    }

    fn stop_music(&mut self) {
        if self.music_playing {
            self.music_playing = false;
            self.audio.play(AudioCue::MusicStop);
        }
    }

    /// Route simulation events to audio and the leaderboard
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                SimEvent::Jumped => self.audio.play(AudioCue::Jump),
                SimEvent::Hit { .. } => self.audio.play(AudioCue::Collision),
                SimEvent::PowerUpCollected => self.audio.play(AudioCue::PowerUp),
                SimEvent::SpeedUp { .. } => {}
                SimEvent::GameOver { score } => {
                    self.high_scores = highscores::record_score(self.storage.as_mut(), score);
                    self.stop_music();
                }
                SimEvent::Paused => self.stop_music(),
                SimEvent::Resumed | SimEvent::Restarted => self.start_music(),
            }
        }
    }
}
