use async_trait::async_trait;
use quiz_core::model::{AttemptId, AttemptRecord, Difficulty, Question, QuestionId};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted attempt together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRow {
    pub id: AttemptId,
    pub record: AttemptRecord,
}

impl AttemptRow {
    #[must_use]
    pub fn new(id: AttemptId, record: AttemptRecord) -> Self {
        Self { id, record }
    }
}

/// Supplies the ordered questions for a quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every question for `category` at `difficulty`, in bank order.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the bank cannot be reached or read.
    async fn fetch_questions(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Records completed attempts. Best-effort from the quiz's point of view.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Persist one completed attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt could not be stored.
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError>;
}

/// Read side of the attempt history.
#[async_trait]
pub trait ProgressHistory: Send + Sync {
    /// List attempts newest first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_attempts(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError>;
}

/// Question bank maintenance: bulk insert and category listing.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Append questions to the bank, returning the identifiers assigned in order.
    ///
    /// A question whose category, difficulty and text are already in the bank
    /// is skipped and gets no identifier, so adding the same batch twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any question cannot be stored; nothing is stored then.
    async fn add_questions(&self, questions: &[Question]) -> Result<Vec<QuestionId>, StorageError>;

    /// Distinct categories present in the bank, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures.
    async fn list_categories(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    questions: Vec<Question>,
    attempts: Vec<AttemptRow>,
    next_question_id: u64,
    next_attempt_id: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_questions(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .iter()
            .filter(|q| q.category() == category && q.difficulty() == difficulty)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn add_questions(&self, questions: &[Question]) -> Result<Vec<QuestionId>, StorageError> {
        let mut guard = self.lock()?;
        let mut ids = Vec::with_capacity(questions.len());
        for question in questions {
            let duplicate = guard.questions.iter().any(|existing| {
                existing.category() == question.category()
                    && existing.difficulty() == question.difficulty()
                    && existing.text() == question.text()
            });
            if duplicate {
                continue;
            }
            guard.next_question_id += 1;
            let id = QuestionId::new(guard.next_question_id);
            guard.questions.push(question.clone().with_id(id));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn list_categories(&self) -> Result<Vec<String>, StorageError> {
        let guard = self.lock()?;
        let categories: BTreeSet<&str> = guard.questions.iter().map(Question::category).collect();
        Ok(categories.into_iter().map(str::to_owned).collect())
    }
}

#[async_trait]
impl ProgressSink for InMemoryRepository {
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.next_attempt_id += 1;
        let id = AttemptId::new(guard.next_attempt_id);
        guard.attempts.push(AttemptRow::new(id, attempt.clone()));
        Ok(())
    }
}

#[async_trait]
impl ProgressHistory for InMemoryRepository {
    async fn list_attempts(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<AttemptRow> = guard
            .attempts
            .iter()
            .filter(|row| category.is_none_or(|c| row.record.category() == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .completed_at()
                .cmp(&a.record.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

/// Aggregates the quiz repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub bank: Arc<dyn QuestionBank>,
    pub progress: Arc<dyn ProgressSink>,
    pub history: Arc<dyn ProgressHistory>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            questions: Arc::new(repo.clone()),
            bank: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            history: Arc::new(repo),
        }
    }
}
