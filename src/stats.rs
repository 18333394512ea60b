//! Lifetime play statistics
//!
//! Persisted as a JSON blob under `gameStats`: games played, total play time
//! and the best winning score per game type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::STATS_KEY;
use crate::error::ArcadeError;
use crate::platform::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    pub games_played: u32,
    /// Milliseconds
    pub total_play_time: f64,
    /// Best score keyed by game type name
    pub high_scores: BTreeMap<String, u32>,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score beats the recorded best for `game`
    pub fn qualifies(&self, game: &str, score: u32) -> bool {
        score > 0 && self.high_scores.get(game).is_none_or(|best| score > *best)
    }

    /// Count a finished match; returns true on a new high score
    pub fn record(&mut self, game: &str, duration_ms: f64, score: u32) -> bool {
        self.games_played += 1;
        self.total_play_time += duration_ms.max(0.0);
        if self.qualifies(game, score) {
            self.high_scores.insert(game.to_string(), score);
            return true;
        }
        false
    }

    pub fn high_score(&self, game: &str) -> u32 {
        self.high_scores.get(game).copied().unwrap_or(0)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(STATS_KEY) {
            match serde_json::from_str(&json) {
                Ok(stats) => return stats,
                Err(e) => log::warn!("Ignoring stored stats: {e}"),
            }
        }
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), ArcadeError> {
        let json = serde_json::to_string(self)?;
        store.set(STATS_KEY, &json)
    }
}
