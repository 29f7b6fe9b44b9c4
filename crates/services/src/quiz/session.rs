use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::engine::{self, AnswerSheet, Countdown, CountdownTick, Navigator};
use quiz_core::model::{ChoiceLabel, Difficulty, Outcome, QuestionSet};

use crate::error::QuizError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one quiz attempt.
///
/// `Loading → {NoContent | Active} → Submitting → Completed`. `NoContent` and
/// `Completed` are terminal; leaving them means building a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    Loading,
    NoContent,
    Active,
    Submitting,
    Completed,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizPhase::Loading => "loading",
            QuizPhase::NoContent => "no content",
            QuizPhase::Active => "active",
            QuizPhase::Submitting => "submitting",
            QuizPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

/// Inputs accepted by an active session, ticks included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    Select { index: usize, label: ChoiceLabel },
    /// Select on whichever question the cursor is on when the command is applied.
    SelectCurrent(ChoiceLabel),
    Next,
    Previous,
    JumpTo(usize),
    Tick,
    Submit,
}

/// What caused the move from `Active` to `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    User,
    TimeExpired,
}

/// The single submission of a session: its scored outcome and its cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub outcome: Outcome,
    pub trigger: SubmitTrigger,
}

/// Result of delivering one tick to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    Expired(Submission),
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one timed quiz attempt.
///
/// The session owns its answer sheet, cursor and countdown; the question set
/// is shared and read-only. All mutation goes through `&mut self`, so user
/// commands and ticks are applied strictly one after another. Scoring runs at
/// most once per session, guarded by a one-shot submit latch.
pub struct QuizSession {
    phase: QuizPhase,
    category: String,
    difficulty: Difficulty,
    questions: QuestionSet,
    answers: AnswerSheet,
    navigator: Navigator,
    countdown: Countdown,
    submitted: bool,
    outcome: Option<Outcome>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// A session waiting for its question set.
    #[must_use]
    pub fn loading(category: impl Into<String>, difficulty: Difficulty) -> Self {
        let category = category.into();
        Self {
            phase: QuizPhase::Loading,
            questions: QuestionSet::empty(category.clone(), difficulty),
            category,
            difficulty,
            answers: AnswerSheet::default(),
            navigator: Navigator::default(),
            countdown: Countdown::idle(),
            submitted: false,
            outcome: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Build a session directly from an already loaded question set.
    #[must_use]
    pub fn from_questions(questions: QuestionSet, started_at: DateTime<Utc>) -> Self {
        let mut session = Self::loading(questions.category(), questions.difficulty());
        session.install(questions, started_at);
        session
    }

    /// Install the loaded question set.
    ///
    /// An empty set moves the session to `NoContent` without starting the
    /// countdown; otherwise the session becomes `Active` with every answer
    /// unset, the cursor on the first question and the full time budget.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotLoading` if the session already left `Loading`.
    pub fn load(
        &mut self,
        questions: QuestionSet,
        started_at: DateTime<Utc>,
    ) -> Result<QuizPhase, QuizError> {
        if self.phase != QuizPhase::Loading {
            return Err(QuizError::NotLoading { phase: self.phase });
        }
        self.install(questions, started_at);
        Ok(self.phase)
    }

    fn install(&mut self, questions: QuestionSet, started_at: DateTime<Utc>) {
        let len = questions.len();
        self.answers = AnswerSheet::new(len);
        self.navigator = Navigator::new(len);
        if questions.is_empty() {
            self.countdown = Countdown::idle();
            self.phase = QuizPhase::NoContent;
        } else {
            self.countdown = Countdown::start(questions.time_budget());
            self.phase = QuizPhase::Active;
            self.started_at = Some(started_at);
        }
        self.questions = questions;
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
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
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.navigator.current()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.navigator.is_last()
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Wall-clock time from start to completion, once the quiz is completed.
    #[must_use]
    pub fn time_taken(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    fn ensure_active(&self) -> Result<(), QuizError> {
        if self.phase == QuizPhase::Active {
            Ok(())
        } else {
            Err(QuizError::NotActive { phase: self.phase })
        }
    }

    /// Select `label` for question `index`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` outside `Active` and
    /// `QuizError::IndexOutOfRange` for an invalid index. Neither changes state.
    pub fn select_answer(&mut self, index: usize, label: ChoiceLabel) -> Result<(), QuizError> {
        self.ensure_active()?;
        self.answers.select(index, label)?;
        Ok(())
    }

    /// Select `label` for the question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` outside `Active`.
    pub fn select_current(&mut self, label: ChoiceLabel) -> Result<(), QuizError> {
        self.ensure_active()?;
        let index = self
            .navigator
            .current()
            .ok_or(QuizError::NotActive { phase: self.phase })?;
        self.select_answer(index, label)
    }

    /// Move to the next question. Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` outside `Active`.
    pub fn go_next(&mut self) -> Result<bool, QuizError> {
        self.ensure_active()?;
        Ok(self.navigator.next())
    }

    /// Move to the previous question. Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` outside `Active`.
    pub fn go_previous(&mut self) -> Result<bool, QuizError> {
        self.ensure_active()?;
        Ok(self.navigator.previous())
    }

    /// Jump to question `index`; out-of-range targets leave the cursor alone.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` outside `Active`.
    pub fn go_to(&mut self, index: usize) -> Result<bool, QuizError> {
        self.ensure_active()?;
        Ok(self.navigator.jump_to(index))
    }

    /// Deliver one elapsed second.
    ///
    /// The tick that exhausts the budget submits the session. Ticks outside
    /// `Active` are ignored.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != QuizPhase::Active {
            return TickOutcome::Ignored;
        }
        match self.countdown.tick() {
            CountdownTick::Running(remaining) => TickOutcome::Running { remaining },
            CountdownTick::Expired => match self.begin_submission(SubmitTrigger::TimeExpired) {
                Ok(submission) => TickOutcome::Expired(submission),
                Err(_) => TickOutcome::Ignored,
            },
            CountdownTick::Idle => TickOutcome::Ignored,
        }
    }

    /// Submit on the user's behalf. Unanswered questions score as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` if the session is not `Active`,
    /// including when it was already submitted by the timer.
    pub fn submit(&mut self) -> Result<Submission, QuizError> {
        self.begin_submission(SubmitTrigger::User)
    }

    fn begin_submission(&mut self, trigger: SubmitTrigger) -> Result<Submission, QuizError> {
        self.ensure_active()?;
        if self.submitted {
            return Err(QuizError::NotActive { phase: self.phase });
        }
        self.submitted = true;
        self.countdown.stop();
        self.phase = QuizPhase::Submitting;

        let outcome = engine::score(&self.questions, &self.answers);
        self.outcome = Some(outcome.clone());
        Ok(Submission { outcome, trigger })
    }

    /// Finish a submission, freezing the outcome.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitting` unless the session is `Submitting`.
    pub fn complete(&mut self, completed_at: DateTime<Utc>) -> Result<&Outcome, QuizError> {
        if self.phase != QuizPhase::Submitting {
            return Err(QuizError::NotSubmitting { phase: self.phase });
        }
        self.phase = QuizPhase::Completed;
        self.completed_at = Some(completed_at);
        self.outcome
            .as_ref()
            .ok_or(QuizError::NotSubmitting { phase: self.phase })
    }

    /// Start over on the same questions with fresh answers and a full budget.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotCompleted` unless the session is `Completed`.
    pub fn retake(&self, started_at: DateTime<Utc>) -> Result<QuizSession, QuizError> {
        if self.phase != QuizPhase::Completed {
            return Err(QuizError::NotCompleted { phase: self.phase });
        }
        Ok(Self::from_questions(self.questions.clone(), started_at))
    }

    /// Apply one command. Returns the submission when the command caused one.
    ///
    /// # Errors
    ///
    /// Propagates the rejection of the underlying operation.
    pub fn dispatch(&mut self, command: QuizCommand) -> Result<Option<Submission>, QuizError> {
        match command {
            QuizCommand::Select { index, label } => self.select_answer(index, label).map(|()| None),
            QuizCommand::SelectCurrent(label) => self.select_current(label).map(|()| None),
            QuizCommand::Next => self.go_next().map(|_| None),
            QuizCommand::Previous => self.go_previous().map(|_| None),
            QuizCommand::JumpTo(index) => self.go_to(index).map(|_| None),
            QuizCommand::Tick => match self.tick() {
                TickOutcome::Expired(submission) => Ok(Some(submission)),
                TickOutcome::Running { .. } | TickOutcome::Ignored => Ok(None),
            },
            QuizCommand::Submit => self.submit().map(Some),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("category", &self.category)
            .field("difficulty", &self.difficulty)
            .field("questions_len", &self.questions.len())
            .field("current", &self.navigator.current())
            .field("answered", &self.answers.answered_count())
            .field("remaining", &self.countdown.remaining())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
