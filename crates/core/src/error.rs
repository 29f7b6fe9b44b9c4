use thiserror::Error;

use crate::engine::AnswerSheetError;
use crate::model::{AttemptError, QuestionError};

/// Umbrella error for the domain crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    AnswerSheet(#[from] AnswerSheetError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}
