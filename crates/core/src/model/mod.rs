mod attempt;
mod difficulty;
mod ids;
mod outcome;
mod question;

pub use attempt::{AttemptError, AttemptRecord};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use ids::{AttemptId, ParseIdError, QuestionId};
pub use outcome::{Outcome, percentage};
pub use question::{ChoiceLabel, Question, QuestionError, QuestionSet};
