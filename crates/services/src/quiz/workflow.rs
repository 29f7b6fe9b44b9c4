use std::sync::Arc;

use tokio::sync::mpsc;

use quiz_core::model::{AttemptRecord, Difficulty, Outcome};
use storage::repository::{ProgressSink, QuestionSource, StorageError};

use super::loader::QuestionSetLoader;
use super::session::{QuizCommand, QuizPhase, QuizSession, Submission, TickOutcome};
use super::timer::QuizTicker;
use crate::Clock;
use crate::error::QuizError;

/// Result of the background progress write that follows every submission.
///
/// Delivered on the optional events channel; the quiz itself never waits for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Recorded {
        outcome: Outcome,
    },
    SinkWriteFailed {
        outcome: Outcome,
        error: StorageError,
    },
}

/// Orchestrates quiz start, command handling, submission and progress writes.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    loader: QuestionSetLoader,
    progress: Arc<dyn ProgressSink>,
    events: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            clock,
            loader: QuestionSetLoader::new(questions),
            progress,
            events: None,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.loader = self.loader.with_shuffle(shuffle);
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Load the questions for `category` at `difficulty` and open a session.
    ///
    /// The returned session is `Active`, or `NoContent` when the bank has no
    /// matching questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SourceUnavailable` when the question source fails.
    pub async fn start(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<QuizSession, QuizError> {
        let mut session = QuizSession::loading(category, difficulty);
        let set = self.loader.load(category, difficulty).await?;
        session.load(set, self.clock.now())?;
        Ok(session)
    }

    /// Open a fresh session over the questions of a completed one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotCompleted` unless `session` is `Completed`.
    pub fn retake(&self, session: &QuizSession) -> Result<QuizSession, QuizError> {
        let now = self.clock.now();
        let fresh = session.retake(now)?;
        if self.loader.shuffles() {
            return Ok(QuizSession::from_questions(
                self.loader.reshuffle(fresh.questions()),
                now,
            ));
        }
        Ok(fresh)
    }

    /// Apply one command, finishing the quiz when it causes a submission.
    ///
    /// # Errors
    ///
    /// Returns the `QuizError` the session rejected the command with.
    pub fn dispatch(
        &self,
        session: &mut QuizSession,
        command: QuizCommand,
    ) -> Result<Option<Outcome>, QuizError> {
        match session.dispatch(command)? {
            Some(submission) => self.finish(session, submission).map(Some),
            None => Ok(None),
        }
    }

    /// Submit on the user's behalf.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` if the session is not `Active`.
    pub fn submit(&self, session: &mut QuizSession) -> Result<Outcome, QuizError> {
        let submission = session.submit()?;
        self.finish(session, submission)
    }

    /// Deliver one tick. Returns the outcome when the tick expired the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the expired session could not be completed.
    pub fn tick(&self, session: &mut QuizSession) -> Result<Option<Outcome>, QuizError> {
        match session.tick() {
            TickOutcome::Expired(submission) => self.finish(session, submission).map(Some),
            TickOutcome::Running { .. } | TickOutcome::Ignored => Ok(None),
        }
    }

    /// Drive an active session from a command channel and a ticker.
    ///
    /// Commands and ticks are applied one at a time; `observe` sees the
    /// session after every applied input. Rejected commands are logged and
    /// skipped. Returns the outcome once the quiz completes, or `None` when
    /// the command channel closes first, abandoning the session.
    pub async fn run<F>(
        &self,
        session: &mut QuizSession,
        commands: &mut mpsc::Receiver<QuizCommand>,
        ticker: &mut QuizTicker,
        mut observe: F,
    ) -> Option<Outcome>
    where
        F: FnMut(&QuizSession),
    {
        if session.phase() != QuizPhase::Active {
            return session.outcome().filter(|_| session.is_complete()).cloned();
        }

        loop {
            let applied = tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("command channel closed; abandoning quiz");
                        return None;
                    };
                    self.dispatch(session, command).inspect_err(|err| {
                        tracing::debug!(?command, error = %err, "command rejected");
                    })
                }
                () = ticker.tick() => self.tick(session),
            };

            match applied {
                Ok(Some(outcome)) => {
                    observe(session);
                    return Some(outcome);
                }
                Ok(None) => observe(session),
                Err(_) => {}
            }
        }
    }

    fn finish(
        &self,
        session: &mut QuizSession,
        submission: Submission,
    ) -> Result<Outcome, QuizError> {
        let completed_at = self.clock.now();
        let outcome = submission.outcome;
        tracing::info!(
            trigger = ?submission.trigger,
            category = %outcome.category,
            difficulty = %outcome.difficulty,
            score = outcome.score,
            total = outcome.total,
            "quiz submitted"
        );

        self.persist_detached(AttemptRecord::from_outcome(&outcome, completed_at), outcome.clone());
        session.complete(completed_at).cloned()
    }

    fn persist_detached(&self, record: AttemptRecord, outcome: Outcome) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(error = %err, "no async runtime; progress not recorded");
                self.emit(ProgressEvent::SinkWriteFailed {
                    outcome,
                    error: StorageError::Connection("no async runtime".into()),
                });
                return;
            }
        };

        let progress = Arc::clone(&self.progress);
        let events = self.events.clone();
        handle.spawn(async move {
            let event = match progress.record_attempt(&record).await {
                Ok(()) => {
                    tracing::debug!(category = %outcome.category, "progress recorded");
                    ProgressEvent::Recorded { outcome }
                }
                Err(error) => {
                    tracing::warn!(category = %outcome.category, error = %error, "progress write failed");
                    ProgressEvent::SinkWriteFailed { outcome, error }
                }
            };
            if let Some(events) = events {
                let _ = events.send(event);
            }
        });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
