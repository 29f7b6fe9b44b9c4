mod loader;
mod result;
mod session;
mod timer;
mod view;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use loader::QuestionSetLoader;
pub use result::{PerformanceTier, QuizResult, ScoreBand};
pub use session::{QuizCommand, QuizPhase, QuizSession, SubmitTrigger, Submission, TickOutcome};
pub use timer::QuizTicker;
pub use view::{format_clock, QuestionView, QuizView, LOW_TIME_THRESHOLD_SECS};
pub use workflow::{ProgressEvent, QuizLoopService};
