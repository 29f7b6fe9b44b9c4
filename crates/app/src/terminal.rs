//! Line-oriented terminal front end for a single quiz.

use quiz_core::model::{ChoiceLabel, Outcome};
use services::{QuizCommand, QuizLoopService, QuizResult, QuizSession, QuizTicker, QuizView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(QuizCommand),
    Help,
    Quit,
    Invalid(String),
}

/// Parse a line typed during a quiz.
///
/// Jump targets are typed 1-based, like the question numbers on screen.
#[must_use]
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Input::Invalid("empty input".into());
    };

    match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Command(QuizCommand::Next),
        "p" | "prev" => Input::Command(QuizCommand::Previous),
        "s" | "submit" => Input::Command(QuizCommand::Submit),
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" => Input::Quit,
        "g" | "go" => match parts.next().map(str::parse::<usize>) {
            Some(Ok(number)) if number > 0 => Input::Command(QuizCommand::JumpTo(number - 1)),
            _ => Input::Invalid(format!("expected `g <question number>`, got `{line}`")),
        },
        other => match other.parse::<ChoiceLabel>() {
            Ok(label) => Input::Command(QuizCommand::SelectCurrent(label)),
            Err(_) => Input::Invalid(format!("unknown input `{line}` (type h for help)")),
        },
    }
}

/// Forward stdin lines until EOF or until the receiver is dropped.
#[must_use]
pub fn spawn_stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Run one active session against stdin.
///
/// Returns the outcome (if the quiz completed) and the line stream, so the
/// caller can keep reading after the quiz ends. The stream is `None` only if
/// the input task failed.
pub async fn drive(
    service: &QuizLoopService,
    session: &mut QuizSession,
    mut lines: mpsc::Receiver<String>,
) -> (Option<Outcome>, Option<mpsc::Receiver<String>>) {
    let (command_tx, mut commands) = mpsc::channel(16);

    let forwarder = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = command_tx.closed() => break,
                line = lines.recv() => {
                    let Some(line) = line else { break };
                    match parse_input(&line) {
                        Input::Command(command) => {
                            if command_tx.send(command).await.is_err() {
                                break;
                            }
                        }
                        Input::Help => print_help(),
                        Input::Quit => break,
                        Input::Invalid(message) => println!("{message}"),
                    }
                }
            }
        }
        lines
    });

    print_question(&session.view());
    let mut shown = screen_key(&session.view());
    let mut ticker = QuizTicker::every_second();
    let outcome = service
        .run(session, &mut commands, &mut ticker, |session| {
            let view = session.view();
            let key = screen_key(&view);
            if key != shown {
                shown = key;
                print_question(&view);
            } else if announces_time(&view) {
                println!("  time left: {}", view.remaining_label);
            }
        })
        .await;

    drop(commands);
    (outcome, forwarder.await.ok())
}

type ScreenKey = (Option<usize>, Option<ChoiceLabel>, usize);

fn screen_key(view: &QuizView) -> ScreenKey {
    (
        view.current_index,
        view.question.as_ref().and_then(|q| q.selected),
        view.answered_count,
    )
}

fn announces_time(view: &QuizView) -> bool {
    let every = if view.low_time { 30 } else { 60 };
    view.remaining_seconds > 0 && view.remaining_seconds % every == 0
}

pub fn print_help() {
    println!("  a-d       select an answer for the current question");
    println!("  n / p     next / previous question");
    println!("  g <k>     go to question k");
    println!("  s         submit");
    println!("  q         quit without submitting");
}

pub fn print_question(view: &QuizView) {
    let Some(question) = &view.question else {
        return;
    };
    let marks: String = view
        .answered
        .iter()
        .map(|answered| if *answered { '#' } else { '.' })
        .collect();

    println!();
    println!(
        "{} ({}) | question {}/{} | answered {} [{marks}] | {}{}",
        view.category,
        view.difficulty,
        question.index + 1,
        view.total,
        view.answered_count,
        view.remaining_label,
        if view.low_time { " (hurry!)" } else { "" },
    );
    println!("{}", question.text);
    for (label, text) in &question.choices {
        let marker = if question.selected == Some(*label) { '>' } else { ' ' };
        println!(" {marker} {label}) {text}");
    }
    if view.is_last {
        println!("  last question: type s to submit");
    }
}

pub fn print_result(result: &QuizResult, taken_secs: Option<i64>) {
    println!();
    println!("{}", result.tier.message());
    println!(
        "  {} / {} correct ({}%), {} incorrect",
        result.score, result.total, result.percentage, result.incorrect
    );
    if let Some(secs) = taken_secs.and_then(|secs| u32::try_from(secs).ok()) {
        println!("  time taken: {}", services::quiz::format_clock(secs));
    }
    println!("  {}", result.share_line());
}
