use std::fmt;
use std::io::{BufRead, Write as _};
use std::sync::Arc;
use std::time::Instant;

use quiz_core::model::{TestAttempt, TestId};
use quiz_core::{Clock, ClockDisplay};
use quiz_services::{ProgressService, SessionOptions, SessionService, builtin_bank};
use quiz_storage::{JsonFileStore, ProgressStore, SqliteRepository, StoreScope};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingTestId,
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingTestId => write!(f, "take requires a test id"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  cargo run -p app -- list     [--data-dir <path> | --db <sqlite_url>] [--user <id>]");
    eprintln!("  cargo run -p app -- take <test-id> [storage flags] [--shuffle]");
    eprintln!("  cargo run -p app -- progress [storage flags]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data-dir ./data   (JSON snapshot; --db switches to SQLite)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DATA_DIR, QUIZ_DB_URL, QUIZ_USER");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Take,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "take" => Some(Self::Take),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

struct Args {
    data_dir: String,
    db_url: Option<String>,
    user: Option<String>,
    test_id: Option<TestId>,
    shuffle: bool,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            data_dir: std::env::var("QUIZ_DATA_DIR").unwrap_or_else(|_| "./data".into()),
            db_url: std::env::var("QUIZ_DB_URL").ok().filter(|v| !v.is_empty()),
            user: std::env::var("QUIZ_USER").ok().filter(|v| !v.is_empty()),
            test_id: None,
            shuffle: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => parsed.data_dir = require_value(args, "--data-dir")?,
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(normalize_sqlite_url(value));
                }
                "--user" => parsed.user = Some(require_value(args, "--user")?),
                "--shuffle" => parsed.shuffle = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if !other.starts_with("--") && parsed.test_id.is_none() => {
                    parsed.test_id = Some(TestId::new(other));
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        if cmd == Command::Take && parsed.test_id.is_none() {
            return Err(ArgsError::MissingTestId);
        }
        Ok(parsed)
    }

    fn scope(&self) -> StoreScope {
        match &self.user {
            Some(id) => StoreScope::User(id.clone()),
            None => StoreScope::Device,
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

async fn build_store(args: &Args) -> Result<Arc<dyn ProgressStore>, Box<dyn std::error::Error>> {
    match &args.db_url {
        Some(url) => {
            prepare_sqlite_file(url)?;
            let repo = SqliteRepository::connect(url, args.scope()).await?;
            repo.migrate().await?;
            Ok(Arc::new(repo))
        }
        None => Ok(Arc::new(JsonFileStore::new(&args.data_dir, &args.scope()))),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let args = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let bank = Arc::new(builtin_bank()?);
    let store = build_store(&args).await?;
    tracing::debug!(scope = %args.scope(), tests = bank.len(), "progress store ready");
    let progress = Arc::new(ProgressService::load(store, &bank).await);
    let clock = Clock::default_clock();

    match cmd {
        Command::List => {
            let service = SessionService::new(bank, progress, clock);
            print_listing(&service);
            Ok(())
        }
        Command::Progress => {
            print_progress(&progress);
            Ok(())
        }
        Command::Take => {
            let mut service = SessionService::new(bank, progress, clock).with_options(
                SessionOptions {
                    shuffle_questions: args.shuffle,
                },
            );
            let Some(test_id) = args.test_id.clone() else {
                return Err(ArgsError::MissingTestId.into());
            };
            take_test(&mut service, &test_id).await
        }
    }
}

fn print_listing(service: &SessionService) {
    for test in service.bank().all() {
        let progress = service.get_test_progress(test.id());
        println!(
            "{:<16} {:<28} [{}]  {} questions, {} min",
            test.id(),
            test.title(),
            test.subject(),
            test.total_questions(),
            test.time_limit_minutes(),
        );
        println!(
            "                 status: {}, attempts: {}, best score: {}%",
            progress.status(),
            progress.attempts(),
            progress.best_score(),
        );
    }
}

fn print_progress(progress: &ProgressService) {
    let mut entries: Vec<_> = progress.all().into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

    if entries.is_empty() {
        println!("No progress recorded yet.");
        return;
    }
    for (test_id, record) in entries {
        println!(
            "{:<16} status: {:<12} attempts: {:<3} best score: {}%",
            test_id,
            record.status(),
            record.attempts(),
            record.best_score(),
        );
        if let Some(when) = record.last_attempt_date() {
            println!("                 last attempt: {}", when.format("%Y-%m-%d %H:%M UTC"));
        }
    }
}

async fn take_test(
    service: &mut SessionService,
    test_id: &TestId,
) -> Result<(), Box<dyn std::error::Error>> {
    if service.start_test(test_id).await.is_none() {
        eprintln!("test '{test_id}' not found; available tests:");
        print_listing(service);
        std::process::exit(1);
    }

    let Some(session) = service.current() else {
        println!("No result available.");
        return Ok(());
    };
    let (title, limit_secs, total) = (
        session.test().title().to_string(),
        session.remaining_secs(),
        session.total_questions() as usize,
    );
    println!("{title} — {total} questions, {}", ClockDisplay(limit_secs));
    println!("Answer with 1-4, or press Enter to skip.\n");

    let started = Instant::now();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut timed_out = false;

    for position in 0..total {
        let elapsed = started.elapsed().as_secs();
        if elapsed >= u64::from(limit_secs) {
            timed_out = true;
            break;
        }
        let remaining = limit_secs - elapsed as u32;

        let Some(question) = service.current().and_then(|s| s.question_at(position)) else {
            break;
        };
        let (question_id, prompt, options) = (
            question.id().clone(),
            question.prompt().to_string(),
            question.options().to_vec(),
        );

        println!(
            "[{}/{total}] ({} left) {prompt}",
            position + 1,
            ClockDisplay(remaining)
        );
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        if started.elapsed().as_secs() >= u64::from(limit_secs) {
            timed_out = true;
            break;
        }
        match line.trim().parse::<u32>() {
            Ok(choice) if (1..=4).contains(&choice) => {
                service.record_answer(question_id, choice - 1);
            }
            _ => println!("  (skipped)"),
        }
    }

    if timed_out {
        println!("\nTime is up — submitting automatically.");
    }

    match service.submit_test().await {
        Some(attempt) => print_results(service, &attempt),
        None => println!("No result available."),
    }
    service.reset_current_test();
    Ok(())
}

fn print_results(service: &SessionService, attempt: &TestAttempt) {
    let progress = service.get_test_progress(attempt.test_id());
    println!(
        "\nScore: {}%  ({} questions, attempt #{}, best {}%)",
        attempt.score(),
        attempt.total_questions(),
        progress.attempts(),
        progress.best_score(),
    );

    let Some(session) = service.current() else {
        return;
    };
    for question in session.test().questions() {
        let selected = attempt.answers().selected(question.id());
        let verdict = match selected {
            Some(idx) if question.is_correct(idx) => "correct",
            Some(_) => "wrong",
            None => "unanswered",
        };
        println!("\n{}: {} — {verdict}", question.id(), question.prompt());
        if let Some(idx) = selected {
            let chosen = question
                .options()
                .get(idx as usize)
                .map_or("(out of range)", String::as_str);
            println!("  your answer:    {chosen}");
        }
        let correct = &question.options()[question.correct_option() as usize];
        println!("  correct answer: {correct}");
        if let Some(explanation) = question.explanation() {
            println!("  {explanation}");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
