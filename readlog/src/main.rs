//! readlog - daily reading log tracker
//!
//! Record one reading log per day and see streaks, progress and the
//! leaderboard from the terminal.

mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use readlog_core::analytics::{
    full_leaderboard, list_participants, participant_report, user_dashboard, user_progress,
    user_streaks,
};
use readlog_core::{Config, Database, Error, RawSubmission, RawUser, RequestContext, User};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "readlog")]
#[command(about = "Track daily reading, streaks and the leaderboard")]
#[command(version)]
struct Cli {
    /// Act as this user (id or email)
    #[arg(long = "as", global = true, value_name = "USER")]
    as_user: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Database file (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/readlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Record today's (or another day's) reading
    Log(LogArgs),

    /// Current and longest streak with the day calendar
    Streaks,

    /// Minutes read per day
    Chart,

    /// Streaks, progress and leaderboard in one view
    Dashboard,

    /// Everyone ranked by total minutes
    Leaderboard {
        /// Show only the first N rows
        #[arg(long)]
        top: Option<usize>,
    },

    /// Browse participants (admins only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a new user
    Add {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: String,

        /// Grant access to every participant's logs
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Args)]
struct LogArgs {
    /// Minutes read
    #[arg(long, allow_negative_numbers = true)]
    minutes: Option<i64>,

    /// Day read (YYYY-MM-DD)
    #[arg(long, conflicts_with = "at")]
    date: Option<String>,

    /// Time of day (HH:MM[:SS]); defaults to 10:30
    #[arg(long, requires = "date")]
    time: Option<String>,

    /// Exact timestamp (RFC 3339)
    #[arg(long)]
    at: Option<String>,

    #[arg(long)]
    book: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    /// What you learned
    #[arg(long)]
    learning: Option<String>,

    /// Questions the reading raised
    #[arg(long)]
    questions: Option<String>,

    /// Read the submission as JSON from a file, or `-` for stdin
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = [
            "minutes", "date", "time", "at", "book", "topic", "learning", "questions"
        ]
    )]
    json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Every participant with totals
    Participants,

    /// One participant's logs, newest first
    Logs {
        /// Participant id or email
        user: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(core) => {
                    tracing::warn!(
                        error = %core,
                        retryable = core.is_retryable(),
                        "Command failed"
                    );
                    eprintln!("Error: {}", core.user_message());
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let _log_guard = readlog_core::logging::init(&config.logging).ok();

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    let db = Database::open(&db_path)
        .context("failed to open database")?
        .with_day_boundary(config.tracking.day_boundary);
    db.migrate().context("failed to run database migrations")?;

    let boundary = db.day_boundary();
    let today = boundary.today();
    let format = cli.format;

    match cli.command {
        Command::User(UserCommand::Add { name, email, admin }) => {
            let new_user = RawUser {
                name,
                email: Some(email),
                is_admin: admin,
            }
            .validate()?;
            let user = db.register_user(&new_user)?;
            output::user_added(format, &user)
        }
        Command::Log(mut args) => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let raw = match args.json.take() {
                Some(path) => RawSubmission::from_json(&read_json(&path)?)?,
                None => args.into_raw(),
            };
            let submission = raw.validate(&user.id, boundary)?;
            let outcome = db.submit_daily_log(&submission)?;
            output::logged(format, &outcome, boundary)
        }
        Command::Streaks => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            let summary = user_streaks(&db, &ctx, &user.id, boundary, today)?;
            output::streaks(format, &summary, today)
        }
        Command::Chart => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            let series = user_progress(&db, &ctx, &user.id, boundary)?;
            output::chart(format, &series)
        }
        Command::Dashboard => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            let dashboard = user_dashboard(
                &db,
                &ctx,
                boundary,
                today,
                config.leaderboard.top,
                config.marathon.as_ref(),
            )?;
            output::dashboard(format, &dashboard, today)
        }
        Command::Leaderboard { top } => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            let board = full_leaderboard(&db, &ctx)?;
            output::leaderboard(format, &board, top)
        }
        Command::Admin(AdminCommand::Participants) => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            let rows = list_participants(&db, &ctx)?;
            output::participants(format, &rows, boundary, today)
        }
        Command::Admin(AdminCommand::Logs { user: reference }) => {
            let user = signed_in(&db, cli.as_user.as_deref())?;
            let ctx = RequestContext::for_user(&user);
            ctx.require_admin()?;
            let participant = db.resolve_user(&reference)?;
            let report = participant_report(&db, &ctx, &participant.id)?;
            output::participant_report(format, &report, boundary)
        }
    }
}

/// Resolve `--as` to a stored user.
fn signed_in(db: &Database, as_user: Option<&str>) -> Result<User> {
    let reference = as_user.ok_or_else(|| {
        Error::InvalidInput("pass --as <email-or-id> to say who you are".to_string())
    })?;
    Ok(db.resolve_user(reference)?)
}

fn read_json(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read submission from stdin")?;
        Ok(body)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read submission from {}", path.display()))
    }
}

impl LogArgs {
    fn into_raw(self) -> RawSubmission {
        RawSubmission {
            date_time: self.at,
            date: self.date,
            time: self.time,
            reading_minutes: self.minutes,
            reading_book: self.book,
            reading_topic: self.topic,
            learning: self.learning,
            questions: self.questions,
        }
    }
}
