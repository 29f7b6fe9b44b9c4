//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::engine::AnswerSheetError;
use storage::repository::StorageError;

use crate::quiz::QuizPhase;

/// Errors emitted by the quiz session controller and its orchestration.
///
/// An empty question set is not an error: it moves the session to
/// [`QuizPhase::NoContent`]. A failed progress write is not an error either;
/// it is reported as a `ProgressEvent`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question source unavailable: {0}")]
    SourceUnavailable(#[source] StorageError),
    #[error("quiz is not active (phase: {phase})")]
    NotActive { phase: QuizPhase },
    #[error("quiz is not loading (phase: {phase})")]
    NotLoading { phase: QuizPhase },
    #[error("quiz is not submitting (phase: {phase})")]
    NotSubmitting { phase: QuizPhase },
    #[error("quiz is not completed (phase: {phase})")]
    NotCompleted { phase: QuizPhase },
    #[error("question index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<AnswerSheetError> for QuizError {
    fn from(err: AnswerSheetError) -> Self {
        let AnswerSheetError::IndexOutOfRange { index, len } = err;
        QuizError::IndexOutOfRange { index, len }
    }
}

/// Errors emitted by `ProgressHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
