//! Score tracking
//!
//! Scores live in memory per player and are written through to the repository on
//! every change, so a later scene (or a relaunch) picks up where this one left off.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::ScoreRepository;
use crate::score_key;

/// One player's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_id: u32,
    pub score: i64,
}

/// In-memory scores backed by a repository
#[derive(Debug)]
pub struct ScoreTracker<R: ScoreRepository> {
    repo: R,
    scores: BTreeMap<u32, i64>,
}

impl<R: ScoreRepository> ScoreTracker<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            scores: BTreeMap::new(),
        }
    }

    /// Persisted score, or 0 if none. Also primes the in-memory value.
    pub fn load(&mut self, player_id: u32) -> i64 {
        let score = self.repo.get_int(&score_key(player_id)).unwrap_or(0).max(0);
        self.scores.insert(player_id, score);
        score
    }

    /// Current in-memory score (loads on first use)
    pub fn score(&mut self, player_id: u32) -> i64 {
        match self.scores.get(&player_id) {
            Some(&score) => score,
            None => self.load(player_id),
        }
    }

    /// Add `amount` and persist. Non-positive amounts are ignored.
    /// Returns the new score.
    pub fn increment(&mut self, player_id: u32, amount: i64) -> i64 {
        let current = self.score(player_id);
        if amount <= 0 {
            return current;
        }
        let next = current.saturating_add(amount);
        self.scores.insert(player_id, next);
        self.persist(player_id, next);
        next
    }

    /// Zero the score in memory and storage
    pub fn reset(&mut self, player_id: u32) {
        self.scores.insert(player_id, 0);
        self.persist(player_id, 0);
    }

    pub fn record(&mut self, player_id: u32) -> ScoreRecord {
        ScoreRecord {
            player_id,
            score: self.score(player_id),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn persist(&mut self, player_id: u32, score: i64) {
        if let Err(err) = self.repo.set_int(&score_key(player_id), score) {
            log::warn!("Failed to persist score for player {}: {}", player_id, err);
        }
    }
}
