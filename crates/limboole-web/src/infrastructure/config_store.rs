//! Reading [`WebConfig`] from a TOML file.
//!
//! A missing file is not an error: the front-end runs on defaults until the
//! user writes one.  A file that exists but cannot be read or parsed is
//! reported, so a typo never silently falls back to defaults.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::WebConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses configuration text.
///
/// # Errors
///
/// [`ConfigError::Parse`] if the TOML is malformed or has unknown values.
pub fn parse_config(text: &str) -> Result<WebConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads the configuration at `path`, or the defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<WebConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "loaded config file");
            parse_config(&content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(WebConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
