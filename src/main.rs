//! todo-create — create a todo on a REST API from the terminal.
//!
//! This is the crate root. It declares the module tree, defines the CLI,
//! sets up file logging, and hands control to either the interactive screen
//! or the headless `create` subcommand.
//!
//! ## Module structure
//!
//! - `api`    — Payload types, the `TodoApi` trait, and the reqwest client
//! - `config` — Validated runtime configuration
//! - `error`  — `ApiError` (logged) and `FormError` (shown on the form)
//! - `form`   — Create-todo form state, validation, and submit flow
//! - `router` — "Go back" navigation collaborator
//! - `screen` — Rendering, key handling, and the interactive event loop
//! - `theme`  — Light/dark color palettes

// ── Module declarations ─────────────────────────────────────────────────────
// Each `mod` pulls in `src/<name>.rs` as a child of this crate root.
mod api;
mod config;
mod error;
mod form;
mod router;
mod screen;
mod theme;

// ── Imports ─────────────────────────────────────────────────────────────────

// `OpenOptions` is the builder behind `File::open`/`File::create`; it lets the
// log file be opened in append mode with owner-only permissions.
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

// `anyhow::Result` is `Result<T, anyhow::Error>`: any error type converts into
// it through `?`. `Context` adds a human-readable line on top of an error, and
// `bail!` returns early with a formatted error.
use anyhow::{Context, Result, bail};
// `clap::Parser` derives a CLI parser from the `Cli` struct's attributes.
use clap::Parser;
// The non-blocking log writer flushes on a background thread. Dropping its
// `WorkerGuard` flushes whatever is still buffered, so `main` holds it.
use tracing_appender::non_blocking::WorkerGuard;
// `EnvFilter` reads `RUST_LOG`-style directives. The `prelude` brings the
// `.with(...)`/`.with_filter(...)` builder methods into scope.
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use api::{DEFAULT_BASE_URL, TodoApi};
use config::Config;
use form::{CreateTodoScreen, DEFAULT_USER_ID};
use router::TerminalRouter;
use screen::{ScreenExit, run_create_todo_screen};

// ── CLI ──────────────────────────────────────────────────────────────────────

/// With no subcommand the interactive form opens.
#[derive(Parser)]
#[command(name = "todo-create", about = "Create a todo item on a REST API", version)]
struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long, env = "TODO_API_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Owner user ID pre-filled in the form
    #[arg(long, default_value = DEFAULT_USER_ID, global = true)]
    user_id: String,

    /// Directory for the log file
    #[arg(long, env = "TODO_CREATE_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create a todo without opening the form
    Create {
        /// Todo title
        #[arg(short, long)]
        title: String,
        /// Mark the todo as already completed
        #[arg(short, long)]
        completed: bool,
    },
}

// ── Main ─────────────────────────────────────────────────────────────────────

// `#[tokio::main]` wraps `main` in a multi-threaded tokio runtime so it can be
// `async` and `.await` the screen and the API.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.api_url, cli.timeout_secs, cli.log_dir, cli.user_id)?;

    // Keep the guard alive until exit so buffered log lines are flushed.
    let _log_guard = start_logging(&config);
    let api = config.api()?;
    tracing::info!(api_url = %api.base_url(), "starting");

    match cli.command {
        Some(Command::Create { title, completed }) => {
            let message = create_headless(&api, &config.user_id, title, completed).await?;
            println!("{message}");
            Ok(())
        }
        None => {
            let screen = CreateTodoScreen::with_user_id(config.user_id.clone());
            match run_create_todo_screen(Arc::new(api), screen).await? {
                ScreenExit::Created(message) => println!("{message}"),
                ScreenExit::Cancelled | ScreenExit::Aborted => {}
            }
            Ok(())
        }
    }
}

/// Drive the same form logic as the interactive screen, without a terminal UI.
///
/// Returns the confirmation message on success. Every form error (bad user
/// ID, empty result, failed request) becomes an `Err` carrying the message the
/// screen would have shown.
async fn create_headless<A: TodoApi>(
    api: &A,
    user_id: &str,
    title: String,
    completed: bool,
) -> Result<String> {
    let mut screen = CreateTodoScreen::with_user_id(user_id);
    screen.set_title(title);
    screen.set_completed(completed);

    screen.submit(api).await;

    if let Some(err) = screen.error() {
        bail!("{err}");
    }
    // `let ... else` binds on the happy path and must diverge otherwise.
    let Some(message) = screen.dialog().map(|dialog| dialog.message.clone()) else {
        bail!("no confirmation after submitting");
    };
    // Acknowledge the confirmation the way the interactive OK button does.
    screen.acknowledge_dialog(&mut TerminalRouter::new());
    Ok(message)
}

/// Set up file logging, or carry on without it.
///
/// A missing or read-only log directory must not stop a todo from being
/// created, so the failure is reported once on stderr (before the screen
/// takes over the terminal) and the program runs unlogged.
fn start_logging(config: &Config) -> Option<WorkerGuard> {
    match init_logging(config) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("todo-create: logging disabled: {err:#}");
            None
        }
    }
}

/// Log to `<log_dir>/todo-create.log` through a non-blocking writer.
///
/// Nothing is written to stdout/stderr: the interactive screen owns the
/// terminal. `RUST_LOG` overrides the default `todo_create=info` filter.
fn init_logging(config: &Config) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("cannot create log directory {}", config.log_dir.display()))?;

    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    // `#[cfg(unix)]` compiles this block only on Unix, where files carry a
    // permission mode; other platforms keep their defaults.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let log_path = config.log_file();
    let log_file = opts
        .open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(log_file);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("todo_create=info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter);

    // `try_init` so a second initialisation (tests, embedding) is not fatal.
    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CreatedTodo, TodoPayload};
    use crate::error::ApiError;

    /// Answers every request with the same record, or with no record.
    struct FixedApi(Option<i64>);

    impl TodoApi for FixedApi {
        async fn create_todo(&self, _payload: TodoPayload) -> Result<Option<CreatedTodo>, ApiError> {
            Ok(self.0.map(|id| CreatedTodo {
                id,
                title: None,
                completed: None,
                user_id: None,
            }))
        }
    }

    fn config_with_log_dir(log_dir: PathBuf) -> Config {
        Config::new(DEFAULT_BASE_URL.into(), None, Some(log_dir), DEFAULT_USER_ID.into()).unwrap()
    }

    #[tokio::test]
    async fn headless_create_returns_confirmation() {
        let message = create_headless(&FixedApi(Some(42)), "1", "Buy milk".into(), false)
            .await
            .unwrap();
        assert_eq!(message, "Todo created successfully with ID: 42");
    }

    #[tokio::test]
    async fn headless_create_rejects_non_numeric_user_id() {
        let err = create_headless(&FixedApi(Some(42)), "abc", "Buy milk".into(), false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User ID must be a number");
    }

    #[tokio::test]
    async fn headless_create_fails_on_empty_result() {
        let err = create_headless(&FixedApi(None), "1", "Buy milk".into(), true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create todo");
    }

    #[tokio::test]
    async fn headless_create_rejects_blank_title() {
        let err = create_headless(&FixedApi(Some(1)), "1", "   ".into(), false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a title and user ID");
    }

    #[test]
    fn unusable_log_dir_is_an_error() {
        // A regular file where the log directory should be.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let config = config_with_log_dir(blocker.path().join("logs"));
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn unusable_log_dir_falls_back_to_no_logging() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let config = config_with_log_dir(blocker.path().to_path_buf());
        assert!(start_logging(&config).is_none());
    }
}
