mod terminal;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::Difficulty;
use services::{
    Clock, ProgressEvent, ProgressHistoryService, QuizLoopService, QuizPhase, QuizResult,
    RemoteConfig, RemoteQuizApi,
};
use storage::repository::{ProgressSink, QuestionSource, Storage};
use storage::sample::seed_sample_bank;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_CATEGORY: &str = "Java";
const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDifficulty { raw: String },
    InvalidLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value (expected Easy, Medium or Hard): {raw}")
            }
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play    [--db <sqlite_url>] [--api <base_url>] [--category <name>] [--difficulty <level>] [--shuffle]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>] [--category <name>] [--limit <n>]");
    eprintln!("  cargo run -p app -- seed    [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --category {DEFAULT_CATEGORY}");
    eprintln!("  --difficulty Easy");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_API_URL, QUIZ_API_TOKEN, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    History,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    api_url: Option<String>,
    category: Option<String>,
    difficulty: Difficulty,
    shuffle: bool,
    limit: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            api_url: None,
            category: None,
            difficulty: Difficulty::Easy,
            shuffle: false,
            limit: DEFAULT_HISTORY_LIMIT,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--api" => parsed.api_url = Some(require_value(args, "--api")?),
                "--category" => parsed.category = Some(require_value(args, "--category")?),
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    parsed.difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--shuffle" => parsed.shuffle = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// `--api` wins over `QUIZ_API_URL`; the token always comes from the environment.
    fn remote_config(&self) -> Option<RemoteConfig> {
        match &self.api_url {
            Some(url) => {
                let config = RemoteConfig::new(url.clone());
                Some(match RemoteConfig::from_env().and_then(|env| env.token) {
                    Some(token) => config.with_token(token),
                    None => config,
                })
            }
            None => RemoteConfig::from_env(),
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_storage(db_url: &str) -> Result<Storage, Box<dyn std::error::Error>> {
    prepare_sqlite_file(db_url)?;
    Ok(Storage::sqlite(db_url).await?)
}

async fn play(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (questions, progress): (Arc<dyn QuestionSource>, Arc<dyn ProgressSink>) =
        match args.remote_config() {
            Some(config) => {
                tracing::info!(base_url = %config.base_url, "using remote quiz api");
                let api = Arc::new(RemoteQuizApi::new(config));
                let source: Arc<dyn QuestionSource> = api.clone();
                (source, api)
            }
            None => {
                let storage = open_storage(&args.db_url).await?;
                (storage.questions, storage.progress)
            }
        };

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let service = QuizLoopService::new(Clock::default_clock(), questions, progress)
        .with_shuffle(args.shuffle)
        .with_events(events_tx);

    let category = args.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
    let mut session = service.start(category, args.difficulty).await?;
    if session.phase() == QuizPhase::NoContent {
        println!("No questions available for {category} ({}).", args.difficulty);
        return Ok(());
    }

    println!(
        "{category} ({}, usually {}): {} questions, {} on the clock. Type h for help.",
        args.difficulty,
        args.difficulty.profile().expected_duration,
        session.questions().len(),
        services::quiz::format_clock(session.remaining_seconds()),
    );

    let mut lines = terminal::spawn_stdin_lines();
    loop {
        let (outcome, returned) = terminal::drive(&service, &mut session, lines).await;
        let Some(outcome) = outcome else {
            println!("Quiz abandoned; nothing was recorded.");
            return Ok(());
        };

        terminal::print_result(
            &QuizResult::from_outcome(&outcome),
            session.time_taken().map(|taken| taken.num_seconds()),
        );
        report_progress(&mut events).await;

        let Some(mut returned) = returned else {
            return Ok(());
        };
        println!("Retake this quiz? [y/N]");
        match returned.recv().await {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                session = service.retake(&session)?;
                lines = returned;
            }
            _ => return Ok(()),
        }
    }
}

async fn report_progress(events: &mut mpsc::UnboundedReceiver<ProgressEvent>) {
    match tokio::time::timeout(Duration::from_secs(5), events.recv()).await {
        Ok(Some(ProgressEvent::Recorded { .. })) => println!("  progress saved"),
        Ok(Some(ProgressEvent::SinkWriteFailed { error, .. })) => {
            println!("  progress could not be saved: {error}");
        }
        Ok(None) | Err(_) => println!("  progress save still pending"),
    }
}

async fn history(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(&args.db_url).await?;
    let service = ProgressHistoryService::new(Arc::clone(&storage.history));
    let category = args.category.as_deref();

    let items = service.list(category, args.limit).await?;
    if items.is_empty() {
        println!("No quizzes taken yet.");
        return Ok(());
    }
    for item in &items {
        println!(
            "{}  {:<12} {:<6}  {:>3}/{:<3} {:>3}%  {:?}",
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.category,
            item.difficulty,
            item.score,
            item.total,
            item.percentage,
            item.band,
        );
    }

    let stats = service.stats(category).await?;
    println!();
    println!(
        "{} quizzes, average {}%, best {}%",
        stats.total_quizzes, stats.average_percent, stats.best_percent
    );
    if category.is_none() {
        println!("categories: {}", service.categories().await?.join(", "));
    }
    Ok(())
}

async fn seed(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(&args.db_url).await?;
    let ids = seed_sample_bank(storage.bank.as_ref()).await?;
    let categories = storage.bank.list_categories().await?;
    println!(
        "Seeded {} new questions into {} (categories: {})",
        ids.len(),
        args.db_url,
        categories.join(", ")
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Play => play(parsed).await,
        Command::History => history(parsed).await,
        Command::Seed => seed(parsed).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info,storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
