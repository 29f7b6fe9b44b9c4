use quiz_core::model::{ChoiceLabel, Difficulty};

use super::session::{QuizPhase, QuizSession};

/// Remaining time below which the clock is flagged as running low.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 300;

/// The question under the cursor, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub text: String,
    pub choices: Vec<(ChoiceLabel, String)>,
    pub selected: Option<ChoiceLabel>,
}

/// Read-only projection of a session.
///
/// Presentation-agnostic: the only pre-formatted value is the `m:ss` clock,
/// everything else is left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub phase: QuizPhase,
    pub category: String,
    pub difficulty: Difficulty,

    pub current_index: Option<usize>,
    pub total: usize,
    pub answered: Vec<bool>,
    pub answered_count: usize,

    pub remaining_seconds: u32,
    pub remaining_label: String,
    pub low_time: bool,

    /// Fraction of the way through the set, counting the current question.
    pub progress: f64,
    pub is_last: bool,
    pub question: Option<QuestionView>,
}

/// Format seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl QuizSession {
    /// Snapshot of everything a renderer needs. Never mutates the session.
    #[must_use]
    pub fn view(&self) -> QuizView {
        let total = self.questions().len();
        let current_index = self.current_index();
        let remaining_seconds = self.remaining_seconds();

        let question = current_index.and_then(|index| {
            let question = self.questions().get(index)?;
            Some(QuestionView {
                index,
                text: question.text().to_string(),
                choices: ChoiceLabel::ALL
                    .iter()
                    .map(|label| (*label, question.choice(*label).to_string()))
                    .collect(),
                selected: self.answers().selection(index),
            })
        });

        #[allow(clippy::cast_precision_loss)]
        let progress = match current_index {
            Some(index) if total > 0 => (index + 1) as f64 / total as f64,
            _ => 0.0,
        };

        QuizView {
            phase: self.phase(),
            category: self.category().to_string(),
            difficulty: self.difficulty(),
            current_index,
            total,
            answered: self.answers().answered_flags().collect(),
            answered_count: self.answers().answered_count(),
            remaining_seconds,
            remaining_label: format_clock(remaining_seconds),
            low_time: self.phase() == QuizPhase::Active
                && remaining_seconds < LOW_TIME_THRESHOLD_SECS,
            progress,
            is_last: self.is_last_question(),
            question,
        }
    }
}
