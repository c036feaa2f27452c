//! Running high score
//!
//! Loaded once when a session opens, written through to its store every time
//! the live score beats it. Storage failures are logged, never fatal.

use crate::persistence::HighScoreStore;

/// Best score plus the store it is persisted in
pub struct HighScore<S: HighScoreStore> {
    best: u64,
    store: S,
}

impl<S: HighScoreStore> HighScore<S> {
    /// Read the stored value; missing or unreadable records start at 0
    pub fn load(store: S) -> Self {
        let best = match store.load() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Could not read high score: {}", e);
                0
            }
        };
        Self { best, store }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record `score` if it beats the best; returns whether it did
    pub fn submit(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.store(score) {
            log::warn!("Could not save high score {}: {}", score, e);
        }
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
