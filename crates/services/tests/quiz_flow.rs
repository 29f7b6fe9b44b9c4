use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{AttemptRecord, ChoiceLabel, Difficulty, Question};
use quiz_core::time::fixed_clock;
use services::{
    ProgressEvent, QuizCommand, QuizError, QuizLoopService, QuizPhase, QuizResult, QuizTicker,
};
use storage::repository::{
    InMemoryRepository, ProgressHistory, ProgressSink, QuestionBank, QuestionSource, StorageError,
};
use tokio::sync::mpsc;

const JAVA_EASY_ANSWERS: [ChoiceLabel; 5] = [
    ChoiceLabel::A,
    ChoiceLabel::C,
    ChoiceLabel::B,
    ChoiceLabel::D,
    ChoiceLabel::A,
];

struct FailingSink;

#[async_trait]
impl ProgressSink for FailingSink {
    async fn record_attempt(&self, _attempt: &AttemptRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

struct DownSource;

#[async_trait]
impl QuestionSource for DownSource {
    async fn fetch_questions(
        &self,
        _category: &str,
        _difficulty: Difficulty,
    ) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Connection("unreachable".into()))
    }
}

async fn java_bank() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    let questions: Vec<Question> = JAVA_EASY_ANSWERS
        .iter()
        .enumerate()
        .map(|(i, correct)| {
            Question::new(
                format!("Java question {}", i + 1),
                ["one", "two", "three", "four"],
                *correct,
                "Java",
                Difficulty::Easy,
            )
        })
        .collect();
    repo.add_questions(&questions).await.unwrap();
    repo
}

fn service(repo: &InMemoryRepository) -> (QuizLoopService, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let service = QuizLoopService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_events(tx);
    (service, rx)
}

#[tokio::test]
async fn all_correct_answers_score_full_marks() {
    let repo = java_bank().await;
    let (service, mut events) = service(&repo);

    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();
    assert_eq!(session.phase(), QuizPhase::Active);
    assert_eq!(session.remaining_seconds(), 300);

    for (index, label) in JAVA_EASY_ANSWERS.iter().enumerate() {
        service
            .dispatch(&mut session, QuizCommand::JumpTo(index))
            .unwrap();
        service
            .dispatch(&mut session, QuizCommand::Select { index, label: *label })
            .unwrap();
    }
    let outcome = service.submit(&mut session).unwrap();
    assert_eq!((outcome.score, outcome.total), (5, 5));
    assert_eq!(session.phase(), QuizPhase::Completed);

    let result = QuizResult::from_outcome(&outcome);
    assert_eq!(result.percentage, 100);
    assert_eq!(result.share_line(), "Scored 100% in Java (Easy) quiz!");

    assert!(matches!(events.recv().await, Some(ProgressEvent::Recorded { .. })));
    let rows = repo.list_attempts(Some("Java"), 5).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.score(), 5);
}

#[tokio::test]
async fn expiry_auto_submits_unanswered_quiz() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();

    let mut outcome = None;
    for _ in 0..300 {
        if let Some(done) = service.tick(&mut session).unwrap() {
            outcome = Some(done);
        }
    }
    let outcome = outcome.unwrap();
    assert_eq!((outcome.score, outcome.total), (0, 5));
    assert_eq!(session.phase(), QuizPhase::Completed);
    assert_eq!(session.remaining_seconds(), 0);

    assert_eq!(
        service.submit(&mut session).unwrap_err(),
        QuizError::NotActive {
            phase: QuizPhase::Completed
        }
    );
    assert_eq!(session.outcome(), Some(&outcome));
}

#[tokio::test]
async fn empty_category_has_no_content() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);

    let mut session = service.start("History", Difficulty::Hard).await.unwrap();
    assert_eq!(session.phase(), QuizPhase::NoContent);
    assert!(!session.timer_running());
    assert_eq!(service.tick(&mut session).unwrap(), None);
    assert!(service.submit(&mut session).is_err());
}

#[tokio::test]
async fn source_failure_is_an_error() {
    let repo = InMemoryRepository::new();
    let service = QuizLoopService::new(fixed_clock(), Arc::new(DownSource), Arc::new(repo));
    let err = service.start("Java", Difficulty::Easy).await.unwrap_err();
    assert!(matches!(err, QuizError::SourceUnavailable(_)));
}

#[tokio::test]
async fn sink_failure_still_completes() {
    let repo = java_bank().await;
    let (tx, mut events) = mpsc::unbounded_channel();
    let service = QuizLoopService::new(fixed_clock(), Arc::new(repo), Arc::new(FailingSink))
        .with_events(tx);

    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();
    service
        .dispatch(&mut session, QuizCommand::Select { index: 0, label: ChoiceLabel::A })
        .unwrap();
    let outcome = service.submit(&mut session).unwrap();
    assert_eq!(session.phase(), QuizPhase::Completed);
    assert_eq!(outcome.score, 1);

    match events.recv().await {
        Some(ProgressEvent::SinkWriteFailed { outcome: reported, error }) => {
            assert_eq!(reported, outcome);
            assert_eq!(error, StorageError::Connection("disk full".into()));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(session.outcome(), Some(&outcome));
}

#[tokio::test]
async fn submit_and_expiry_race_scores_once() {
    let repo = java_bank().await;
    let (service, mut events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();
    for _ in 0..299 {
        service.tick(&mut session).unwrap();
    }

    let first = service.dispatch(&mut session, QuizCommand::Submit).unwrap();
    let second = service.dispatch(&mut session, QuizCommand::Tick).unwrap();
    assert!(first.is_some());
    assert_eq!(second, None);

    assert!(events.recv().await.is_some());
    assert_eq!(repo.list_attempts(None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn retake_starts_over_on_the_same_questions() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();
    service
        .dispatch(&mut session, QuizCommand::Select { index: 2, label: ChoiceLabel::B })
        .unwrap();
    service.submit(&mut session).unwrap();

    let again = service.retake(&session).unwrap();
    assert_eq!(again.phase(), QuizPhase::Active);
    assert_eq!(again.answers().answered_count(), 0);
    assert_eq!(again.remaining_seconds(), 300);
    assert!(again.questions().shares_questions_with(session.questions()));
}

#[tokio::test(start_paused = true)]
async fn run_loop_expires_on_virtual_time() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();

    let (_commands_tx, mut commands) = mpsc::channel(8);
    let mut ticker = QuizTicker::every_second();
    let started = tokio::time::Instant::now();
    let mut observed = 0;

    let outcome = service
        .run(&mut session, &mut commands, &mut ticker, |_| observed += 1)
        .await
        .unwrap();

    assert_eq!((outcome.score, outcome.total), (0, 5));
    assert_eq!(started.elapsed(), Duration::from_secs(300));
    assert_eq!(observed, 300);
    assert_eq!(session.phase(), QuizPhase::Completed);
}

#[tokio::test(start_paused = true)]
async fn run_loop_applies_commands_and_skips_rejected_ones() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();

    let (tx, mut commands) = mpsc::channel(8);
    tx.send(QuizCommand::Select { index: 9, label: ChoiceLabel::A })
        .await
        .unwrap();
    tx.send(QuizCommand::Select { index: 0, label: ChoiceLabel::A })
        .await
        .unwrap();
    tx.send(QuizCommand::Next).await.unwrap();
    tx.send(QuizCommand::Submit).await.unwrap();

    let mut ticker = QuizTicker::every_second();
    let outcome = service
        .run(&mut session, &mut commands, &mut ticker, |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.score, 1);
    assert_eq!(session.remaining_seconds(), 300);
    assert_eq!(session.current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn run_loop_ends_when_commands_close() {
    let repo = java_bank().await;
    let (service, _events) = service(&repo);
    let mut session = service.start("Java", Difficulty::Easy).await.unwrap();

    let (tx, mut commands) = mpsc::channel(8);
    drop(tx);
    let mut ticker = QuizTicker::every_second();
    let outcome = service
        .run(&mut session, &mut commands, &mut ticker, |_| {})
        .await;

    assert_eq!(outcome, None);
    assert_eq!(session.phase(), QuizPhase::Active);
    assert!(repo.list_attempts(None, 10).await.unwrap().is_empty());
}
