use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Difficulty, QuestionSet};
use storage::repository::QuestionSource;

use crate::error::QuizError;

/// Fetches the question set for a category and difficulty.
#[derive(Clone)]
pub struct QuestionSetLoader {
    source: Arc<dyn QuestionSource>,
    shuffle: bool,
}

impl QuestionSetLoader {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn shuffles(&self) -> bool {
        self.shuffle
    }

    /// Load the set, preserving source order unless shuffling is enabled.
    ///
    /// An empty set is a normal result.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SourceUnavailable` when the source fails.
    pub async fn load(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<QuestionSet, QuizError> {
        let mut questions = self
            .source
            .fetch_questions(category, difficulty)
            .await
            .map_err(|err| {
                tracing::warn!(category, %difficulty, error = %err, "question source failed");
                QuizError::SourceUnavailable(err)
            })?;

        if self.shuffle {
            questions.as_mut_slice().shuffle(&mut rng());
        }

        let set = QuestionSet::new(category, difficulty, questions);
        if set.is_empty() {
            tracing::info!(category, %difficulty, "no questions available");
        } else {
            tracing::info!(
                category,
                %difficulty,
                count = set.len(),
                budget_secs = set.time_budget(),
                "question set loaded"
            );
        }
        Ok(set)
    }

    /// A shuffled copy of `set`, or a shared clone when shuffling is off.
    #[must_use]
    pub fn reshuffle(&self, set: &QuestionSet) -> QuestionSet {
        if !self.shuffle {
            return set.clone();
        }
        let mut questions = set.questions().to_vec();
        questions.as_mut_slice().shuffle(&mut rng());
        QuestionSet::new(set.category(), set.difficulty(), questions)
    }
}
