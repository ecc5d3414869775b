//! Limboole front-end: entry point.
//!
//! Runs one formula through the Limboole solver the same way the web page
//! does: the formula goes through the byte-stream bridge, the verdict is
//! printed line by line, and the share fragment for the run is printed to
//! stderr so the exact run can be reproduced with `--fragment`.
//!
//! # Usage
//!
//! ```text
//! limboole-web [OPTIONS] [INPUT]
//!
//! Arguments:
//!   [INPUT]                 Formula text (read from stdin when absent)
//!
//! Options:
//!   --config <PATH>         TOML config file [default: limboole-web.toml]
//!   --solver <PATH>         Solver executable [env: LIMBOOLE_SOLVER]
//!   --mode <INDEX>          0 validity, 1 sat, 2 QBF sat, 3 QBF validity
//!   --fragment <FRAGMENT>   Restore and run a shared `#...` fragment
//!   --file <PATH>           Load the formula from a file (like a drop)
//!   --log-level <LEVEL>     Log level when RUST_LOG is unset
//! ```
//!
//! Exactly one run happens.  With `--file` the file is the formula; a
//! `--fragment` given alongside only restores the mode and is not run.
//!
//! The process exits with the solver's status code.
//!
//! # Architecture overview
//!
//! ```text
//! terminal (stdin / stdout / stderr)
//!       ↕
//! TerminalPage ── UiController ── ProcessorWrapper × 4
//!                                        │
//!                                    Processor ── ProcessModule ── limboole
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use limboole_core::RunStatus;
use limboole_web::application::{standard_modes, DroppedFile, Page, Processor, UiController};
use limboole_web::domain::WebConfig;
use limboole_web::infrastructure::{load_config, ProcessModuleLoader, TerminalPage};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Check a propositional or QBF formula with Limboole.
#[derive(Debug, Parser)]
#[command(
    name = "limboole-web",
    about = "Run Limboole validity/satisfiability checks through the web front-end bridge",
    version
)]
struct Cli {
    /// TOML configuration file.  A missing file means defaults.
    #[arg(long, default_value = "limboole-web.toml", env = "LIMBOOLE_WEB_CONFIG")]
    config: PathBuf,

    /// Solver executable (path, or a name looked up on PATH).
    #[arg(long, env = "LIMBOOLE_SOLVER")]
    solver: Option<PathBuf>,

    /// Menu index: 0 validity, 1 satisfiability, 2 QBF satisfiability, 3 QBF validity.
    #[arg(long)]
    mode: Option<usize>,

    /// A share fragment (`#1a%20%26%20b`) to restore and run.
    #[arg(long, allow_hyphen_values = true)]
    fragment: Option<String>,

    /// Read the formula from this file, as if it was dropped onto the page.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set (overrides the config file).
    #[arg(long)]
    log_level: Option<String>,

    /// Formula text.
    input: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    fn apply_overrides(&self, mut config: WebConfig) -> WebConfig {
        if let Some(solver) = &self.solver {
            config.solver.program = solver.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        config
    }

    /// Loads the config file and applies the overrides.
    fn resolve_config(&self) -> anyhow::Result<WebConfig> {
        let config = load_config(&self.config)
            .with_context(|| format!("could not load config '{}'", self.config.display()))?;
        Ok(self.apply_overrides(config))
    }

    /// `true` when the formula has to come from stdin.
    fn needs_stdin(&self) -> bool {
        self.input.is_none() && self.fragment.is_none() && self.file.is_none()
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// A current-thread runtime with a `LocalSet`: the processor, its modes and
/// the controller are `Rc`-shared and never leave this thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // RUST_LOG wins; otherwise the configured level.  Logs go to stderr so
    // the stdout pane carries only solver output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let piped = if cli.needs_stdin() {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read the formula from stdin")?;
        Some(text)
    } else {
        None
    };

    let local = LocalSet::new();
    local.run_until(run(cli, config, piped)).await
}

async fn run(cli: Cli, config: WebConfig, piped: Option<String>) -> anyhow::Result<ExitCode> {
    info!(solver = %config.solver.program.display(), "limboole-web starting");

    let processor = Processor::spawn(
        ProcessModuleLoader::new(&config.solver),
        config.output.blank_lines,
    );
    let modes = standard_modes(&processor);

    let mut page = TerminalPage::new(std::io::stdout(), std::io::stderr());
    if let Some(mode) = cli.mode {
        page = page.with_selected_mode(mode);
    }
    if let Some(text) = cli.input.or(piped) {
        page = page.with_input(text);
    }
    if let Some(fragment) = cli.fragment {
        page = page.with_fragment(fragment);
    }

    let dropped = match cli.file {
        Some(path) => Some(read_dropped_file(&path).await?),
        None => None,
    };

    let controller = UiController::new(page, modes, processor);
    let status = run_once(&controller, dropped).await?;

    info!(status = status.code(), "limboole-web finished");
    Ok(ExitCode::from(u8::try_from(status.code()).unwrap_or(1)))
}

async fn read_dropped_file(path: &std::path::Path) -> anyhow::Result<DroppedFile> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(DroppedFile { name, contents })
}

/// Brings the page up and performs the single run of this invocation.
///
/// A dropped file replaces the fragment's automatic run, so the solver is
/// called once with the file's contents.
async fn run_once<P: Page + 'static>(
    controller: &UiController<P>,
    dropped: Option<DroppedFile>,
) -> anyhow::Result<RunStatus> {
    if let Some(file) = dropped {
        controller
            .prepare()
            .await
            .context("the solver could not be loaded")?;
        return Ok(controller.load_dropped_file(file)?);
    }

    let auto_run = controller
        .start()
        .await
        .context("the solver could not be loaded")?;
    let status = match auto_run {
        Some(result) => result?,
        None => controller.execute_selected_mode()?,
    };
    Ok(status)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
