//! High score leaderboard
//!
//! Stored as a bare JSON array of integers, descending, top 5.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;
use crate::persistence::{Storage, load_json, save_json};

/// Leaderboard, best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub scores: Vec<u32>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highScores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { scores: Vec::new() }
    }

    /// Build from arbitrary stored values, restoring order and length
    pub fn from_scores(mut scores: Vec<u32>) -> Self {
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(MAX_HIGH_SCORES);
        Self { scores }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if self.scores.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.scores.last().is_none_or(|&lowest| score > lowest)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.scores.iter().position(|&s| score > s);
        Some(rank.unwrap_or(self.scores.len()) + 1)
    }

    /// Insert a finished run's score in rank order and drop the overflow
    ///
    /// Returns the rank achieved (1-indexed) or None if it didn't place.
    pub fn record_score(&mut self, score: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.scores.insert(rank - 1, score);
        self.scores.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.scores.first().copied()
    }

    /// Load from storage; a missing or unreadable board is empty
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<Vec<u32>>(storage, Self::STORAGE_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.len());
                Self::from_scores(scores)
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable high scores: {}", e);
                Self::new()
            }
        }
    }

    /// Write to storage; failures are logged and dropped
    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, Self::STORAGE_KEY, &self.scores) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.scores.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

/// Persistence collaborator entry point: load, insert, save
pub fn record_score(storage: &mut dyn Storage, score: u32) -> HighScores {
    let mut board = HighScores::load(storage);
    board.record_score(score);
    board.save(storage);
    board
}

/// Current board, best first; empty on any read failure
pub fn load_top_scores(storage: &dyn Storage) -> Vec<u32> {
    HighScores::load(storage).scores
}
