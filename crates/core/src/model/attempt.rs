use chrono::{DateTime, Utc};
use thiserror::Error;

use super::difficulty::Difficulty;
use super::outcome::{Outcome, percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// One completed attempt as recorded in progress history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    category: String,
    difficulty: Difficulty,
    score: u32,
    total: u32,
    completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Build the history record for a freshly scored outcome.
    #[must_use]
    pub fn from_outcome(outcome: &Outcome, completed_at: DateTime<Utc>) -> Self {
        Self {
            category: outcome.category.clone(),
            difficulty: outcome.difficulty,
            score: outcome.score,
            total: outcome.total,
            completed_at,
        }
    }

    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ScoreExceedsTotal` if the counts are inconsistent.
    pub fn from_persisted(
        category: String,
        difficulty: Difficulty,
        score: u32,
        total: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if score > total {
            return Err(AttemptError::ScoreExceedsTotal { score, total });
        }
        Ok(Self {
            category,
            difficulty,
            score,
            total,
            completed_at,
        })
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }
}
