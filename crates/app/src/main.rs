use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use quiz_core::model::UserId;
use services::seed::{DEMO_PLAYERS, seed_demo};
use services::{AppServices, Clock, LeaderboardFilter, QuizConfig, RunnerOutcome};
use ui::ViewState;
use ui::vm::{
    LeaderboardEntryVm, ProfileVm, QuizIntent, QuizScreenVm, RankBadge, ResultScreen, SoundCue,
    TimerUrgency, filter_label, load_leaderboard, load_profile, load_recent_runs, load_result,
    save_profile, start_quiz,
};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_SEED_RUNS: u32 = 3;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    MissingUser,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "{flag} expects a positive number, got: {raw}")
            }
            ArgsError::MissingUser => write!(f, "this command requires --user <name>"),
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

fn require_number(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<u32, ArgsError> {
    let raw = require_value(args, flag)?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ArgsError::InvalidNumber { flag, raw }),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- play        [--db <url>] [--user <name>] [--difficulty <d>] [--topic <t>] [--seconds <n>]"
    );
    eprintln!("  cargo run -p app -- leaderboard [--db <url>] [--topic <t>|all]");
    eprintln!(
        "  cargo run -p app -- profile     [--db <url>] --user <name> [--rename <name>] [--avatar <image>]"
    );
    eprintln!("  cargo run -p app -- seed        [--db <url>] [--runs <n>]");
    eprintln!();
    eprintln!("Values:");
    eprintln!("  difficulty: normal, medium, hard, mixed (default normal)");
    eprintln!("  topic:      math, science, sports, gk (default math)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_QUESTION_SECS, QUIZ_LEADERBOARD_LIMIT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
    Profile,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            "profile" => Some(Self::Profile),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    db_url: String,
    user: Option<String>,
    difficulty: Option<String>,
    topic: Option<String>,
    seconds: Option<u32>,
    rename: Option<String>,
    avatar: Option<PathBuf>,
    runs: Option<u32>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .map_or_else(
                    || normalize_sqlite_url(DEFAULT_DB_URL),
                    |raw| normalize_sqlite_url(&raw),
                ),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(&value);
                }
                "--user" => parsed.user = Some(require_value(args, "--user")?),
                "--difficulty" => parsed.difficulty = Some(require_value(args, "--difficulty")?),
                "--topic" => parsed.topic = Some(require_value(args, "--topic")?),
                "--seconds" => parsed.seconds = Some(require_number(args, "--seconds")?),
                "--rename" => parsed.rename = Some(require_value(args, "--rename")?),
                "--avatar" => parsed.avatar = Some(require_value(args, "--avatar")?.into()),
                "--runs" => parsed.runs = Some(require_number(args, "--runs")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
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

    let path = Path::new(path);
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

//
// ─── PLAY ──────────────────────────────────────────────────────────────────────
//

enum Input {
    Intent(QuizIntent),
    Quit,
    Help,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "1" => Input::Intent(QuizIntent::Choose(0)),
        "2" => Input::Intent(QuizIntent::Choose(1)),
        "3" => Input::Intent(QuizIntent::Choose(2)),
        "4" => Input::Intent(QuizIntent::Choose(3)),
        "n" | "" => Input::Intent(QuizIntent::Next),
        "p" => Input::Intent(QuizIntent::Previous),
        "w" => Input::Intent(QuizIntent::Pause),
        "r" => Input::Intent(QuizIntent::Resume),
        "m" => Input::Intent(QuizIntent::ToggleSound),
        "q" => Input::Quit,
        "?" | "h" => Input::Help,
        _ => Input::Unknown,
    }
}

fn print_controls() {
    println!("  1-4 choose · n/enter next · p previous · w pause · r resume · m sound · q quit");
}

fn render_question(screen: &QuizScreenVm) {
    println!();
    println!("{}", screen.title);
    println!(
        "{} ({}%) · {}",
        screen.progress_label, screen.progress_percent, screen.timer_label
    );
    println!("{}", screen.prompt);
    for option in &screen.options {
        let marker = if option.selected { '*' } else { ' ' };
        println!(" {marker}{}. {}", option.index + 1, option.label);
    }
}

fn render_cue(cue: SoundCue) {
    let text = match cue {
        SoundCue::Click => return,
        SoundCue::Correct => "\x07correct",
        SoundCue::Incorrect => "\x07not quite",
        SoundCue::Complete => "\x07done!",
    };
    println!("  {text}");
}

async fn sign_in(
    app: &AppServices,
    user: Option<&str>,
) -> Result<Option<ProfileVm>, Box<dyn std::error::Error>> {
    let Some(name) = user else {
        return Ok(None);
    };
    app.identity().sign_in(UserId::from_local_name(name));
    app.profiles().ensure_profile(name).await?;
    Ok(Some(load_profile(&app.profiles()).await?))
}

async fn play(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if sign_in(app, args.user.as_deref()).await?.is_none() {
        println!("Playing as a guest; the result will not be saved.");
    }

    let mut vm = start_quiz(
        &app.quiz(),
        args.difficulty.as_deref(),
        args.topic.as_deref(),
    )?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = vm.settled_screen().await?;
    let mut shown: Option<String> = None;
    let mut urgency = TimerUrgency::Calm;
    print_controls();

    while !screen.finished {
        if shown.as_deref() != Some(screen.progress_label.as_str()) {
            render_question(&screen);
            shown = Some(screen.progress_label.clone());
            urgency = screen.urgency;
        } else if screen.urgency != urgency {
            urgency = screen.urgency;
            println!("  {} left", screen.timer_label);
        }

        tokio::select! {
            line = stdin.next_line() => {
                let input = line?.map_or(Input::Quit, |line| parse_input(&line));
                match input {
                    Input::Intent(intent) => {
                        if let Some(cue) = vm.dispatch(intent).await? {
                            render_cue(cue);
                        }
                    }
                    Input::Quit => {
                        vm.leave().await?;
                        println!("Quiz abandoned.");
                        return Ok(());
                    }
                    Input::Help => print_controls(),
                    Input::Unknown => println!("  unknown input, ? for help"),
                }
                let before = screen.options.iter().position(|o| o.selected);
                screen = vm.settled_screen().await?;
                if screen.options.iter().position(|o| o.selected) != before
                    && shown.as_deref() == Some(screen.progress_label.as_str())
                {
                    render_question(&screen);
                }
            }
            changed = vm.changed() => {
                screen = match changed {
                    Ok(screen) => screen,
                    Err(_) => vm.settled_screen().await?,
                };
            }
        }
    }

    if let RunnerOutcome::Submitted { persist, .. } = vm.finish().await? {
        if let Some(notice) = persist.await?.notice() {
            println!("Could not save your result: {notice}");
        }
    }

    match load_result(app.handoff())? {
        ResultScreen::Ready(result) => {
            println!();
            println!("{}", result.headline);
            println!("{}  ({})", result.score_label, result.percent_label);
            println!("Try again: {}", result.try_again_link);
        }
        ResultScreen::GoHome => println!("No result to show."),
    }
    Ok(())
}

//
// ─── LEADERBOARD / PROFILE / SEED ──────────────────────────────────────────────
//

fn badge_text(badge: RankBadge) -> String {
    match badge {
        RankBadge::Gold => "gold".into(),
        RankBadge::Silver => "silver".into(),
        RankBadge::Bronze => "bronze".into(),
        RankBadge::Number(n) => n.to_string(),
    }
}

fn render_entry(entry: &LeaderboardEntryVm) {
    println!(
        "{:>6}  {:<20} {:>5} {:>4}%  {:>5}  {} · {}",
        badge_text(entry.badge),
        entry.username,
        entry.score_label,
        entry.percent,
        entry.time_label,
        entry.topic_label,
        entry.difficulty_label,
    );
}

async fn leaderboard(app: &AppServices, args: &Args) {
    let filter = LeaderboardFilter::from_param(args.topic.as_deref());
    println!("Leaderboard - {}", filter_label(filter));
    match ViewState::from_result(load_leaderboard(&app.leaderboard(), filter).await) {
        ViewState::Ready(entries) if entries.is_empty() => println!("No results yet."),
        ViewState::Ready(entries) => entries.iter().for_each(render_entry),
        ViewState::Error(err) => println!("{}", err.message()),
        ViewState::Idle | ViewState::Loading => {}
    }
}

fn image_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn profile(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut current = sign_in(app, args.user.as_deref())
        .await?
        .ok_or(ArgsError::MissingUser)?;

    if args.rename.is_some() || args.avatar.is_some() {
        let username = args
            .rename
            .clone()
            .unwrap_or_else(|| current.username.clone());
        let upload = match &args.avatar {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some((file_name, bytes, image_content_type(path)))
            }
            None => None,
        };
        let avatar = upload
            .as_ref()
            .map(|(name, bytes, content_type)| (name.as_str(), bytes.as_slice(), *content_type));
        current = save_profile(&app.profiles(), &current, &username, avatar).await?;
    }

    println!("[{}] {}", current.initial, current.username);
    match &current.avatar_url {
        Some(url) => println!("avatar: {url}"),
        None => println!("avatar: none"),
    }

    let runs = load_recent_runs(&app.profiles()).await?;
    if runs.is_empty() {
        println!("no quizzes played yet");
    }
    for run in &runs {
        println!(
            "{:<18} {:<6} {:>5} {:>4}% {:>6}  {}",
            run.topic_label,
            run.difficulty_label,
            run.score_label,
            run.percent,
            run.time_label,
            run.completed_label
        );
    }
    Ok(())
}

async fn seed(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let report = seed_demo(
        app.storage(),
        &app.bank(),
        app.clock(),
        &mut rand::rng(),
        &DEMO_PLAYERS,
        args.runs.unwrap_or(DEFAULT_SEED_RUNS),
    )
    .await?;
    println!(
        "seeded {} profiles and {} results into {}",
        report.profiles, report.results, args.db_url
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

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

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = QuizConfig::from_env();
    if let Some(secs) = parsed.seconds {
        config = config.with_question_secs(secs);
    }

    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), config).await?;
    tracing::debug!(db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Play => play(&app, &parsed).await,
        Command::Leaderboard => {
            leaderboard(&app, &parsed).await;
            Ok(())
        }
        Command::Profile => profile(&app, &parsed).await,
        Command::Seed => seed(&app, &parsed).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
