//! Front-end configuration types.
//!
//! [`WebConfig`] is the single source of truth for runtime settings.  It is
//! deserialised from TOML, and every field has a default so that an empty
//! or partial file is valid:
//!
//! ```toml
//! [solver]
//! program = "limboole"
//! extra_args = []
//!
//! [output]
//! blank_lines = "preserve"   # or "collapse"
//!
//! [log]
//! level = "info"
//! ```

use std::path::PathBuf;

use limboole_core::BlankLinePolicy;
use serde::{Deserialize, Serialize};

/// All runtime configuration for the front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where the solver executable lives and how it is invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    /// Path to the solver, or a bare name looked up on `PATH`.
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Arguments appended after the mode flags on every run.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Output-pane behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Whether empty solver output lines are shown or collapsed.
    #[serde(default)]
    pub blank_lines: BlankLinePolicy,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_program() -> PathBuf {
    PathBuf::from("limboole")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
