//! Player preferences
//!
//! Persisted separately from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, load_json, save_json};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background music off; effects still play
    pub music_muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Debug ===
    /// Draw inset hitboxes over the sprites
    pub show_hitboxes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            show_hitboxes: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "ramenRunnerSettings";

    /// Effective gain for sound effects
    pub fn sfx_gain(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective gain for music; zero while muted
    pub fn music_gain(&self) -> f32 {
        if self.music_muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json(storage, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            music_muted: true,
            show_hitboxes: true,
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set(Settings::STORAGE_KEY, r#"{"music_muted":true}"#)
            .unwrap();
        let settings = Settings::load(&storage);
        assert!(settings.music_muted);
        assert_eq!(settings.music_volume, 0.7);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut storage = MemoryStorage::new();
        storage.set(Settings::STORAGE_KEY, "nonsense").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_muted_music_has_no_gain() {
        let mut settings = Settings::default();
        assert!((settings.music_gain() - 0.56).abs() < 1e-5);
        settings.music_muted = true;
        assert_eq!(settings.music_gain(), 0.0);
        assert!((settings.sfx_gain() - 0.8).abs() < 1e-5);
    }
}
