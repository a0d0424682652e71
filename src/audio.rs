//! Audio cues and sinks
//!
//! The game emits fire-and-forget cues; a sink decides what they sound like.
//! On the web the sink synthesizes everything with oscillators, so no audio
//! files are needed.

use std::cell::RefCell;
use std::rc::Rc;

/// Sound cues the game emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Jump or double jump
    Jump,
    /// Lost a point of health
    Collision,
    /// Picked up an invincibility power-up
    PowerUp,
    MusicStart,
    MusicStop,
}

/// Receives cues; never reports back
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);

    /// Volume preferences changed
    fn set_gains(&mut self, _sfx: f32, _music: f32) {}
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        log::debug!("Audio cue: {:?}", cue);
    }
}

/// Records cues in order
impl AudioSink for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

/// Shared sink, so the caller can keep a handle to what the game owns
impl<S: AudioSink + ?Sized> AudioSink for Rc<RefCell<S>> {
    fn play(&mut self, cue: AudioCue) {
        self.borrow_mut().play(cue);
    }

    fn set_gains(&mut self, sfx: f32, music: f32) {
        self.borrow_mut().set_gains(sfx, music);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, AudioSink};

    /// Procedural Web Audio synthesizer
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        sfx_gain: f32,
        music_gain: f32,
        music: Option<(OscillatorNode, GainNode)>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_gain: 0.8,
                music_gain: 0.56,
                music: None,
            }
        }

        /// Oscillator routed through its own gain node
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Rising chirp
        fn play_jump(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 300.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.16).ok();
        }

        /// Low falling thud
        fn play_collision(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 180.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        /// Bright ascending arpeggio
        fn play_power_up(ctx: &AudioContext, vol: f32) {
            let notes = [523.25, 659.25, 783.99, 1046.5];
            let t = ctx.current_time();

            for (i, &freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = Self::create_osc(ctx, freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let start = t + i as f64 * 0.07;

                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                    .ok();

                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.22).ok();
            }
        }

        fn start_music(&mut self) {
            if self.music.is_some() || self.music_gain <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Some((osc, gain)) = Self::create_osc(ctx, 110.0, OscillatorType::Triangle) else {
                return;
            };
            gain.gain().set_value(self.music_gain * 0.15);
            osc.start().ok();
            self.music = Some((osc, gain));
        }

        fn stop_music(&mut self) {
            if let Some((osc, _gain)) = self.music.take() {
                osc.stop().ok();
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: AudioCue) {
            match cue {
                AudioCue::MusicStart => return self.start_music(),
                AudioCue::MusicStop => return self.stop_music(),
                _ => {}
            }

            let vol = self.sfx_gain;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                AudioCue::Jump => Self::play_jump(ctx, vol),
                AudioCue::Collision => Self::play_collision(ctx, vol),
                AudioCue::PowerUp => Self::play_power_up(ctx, vol),
                AudioCue::MusicStart | AudioCue::MusicStop => {}
            }
        }

        fn set_gains(&mut self, sfx: f32, music: f32) {
            self.sfx_gain = sfx;
            self.music_gain = music;
            if let Some((_, gain)) = &self.music {
                gain.gain().set_value(music * 0.15);
            }
        }
    }
}
