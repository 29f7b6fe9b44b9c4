#![forbid(unsafe_code)]

pub mod error;
pub mod history;
pub mod quiz;
pub mod remote;

pub use quiz_core::Clock;

pub use error::{HistoryError, QuizError};
pub use history::{AttemptListItem, ProgressHistoryService, ProgressStats};
pub use quiz::{
    PerformanceTier, ProgressEvent, QuestionSetLoader, QuestionView, QuizCommand,
    QuizLoopService, QuizPhase, QuizResult, QuizSession, QuizTicker, QuizView, ScoreBand,
    SubmitTrigger, Submission, TickOutcome,
};
pub use remote::{RemoteConfig, RemoteQuizApi};
