//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$GITPGM_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitpgm/config.toml`
//! 3. `~/.gitpgm/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitpgm::core::config::Config;
//! use gitpgm::core::env::ProcessEnv;
//!
//! let config = Config::load(&ProcessEnv).unwrap();
//! println!("program: {}", config.program_name());
//! println!("stack traces: {}", config.show_stack_trace());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::env::Environment;
use crate::core::text::Text;

/// Default program name printed in the synopsis.
pub const DEFAULT_PROGRAM_NAME: &str = "gitpgm";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from the config file (defaults if none was found)
    pub global: GlobalConfig,
    /// Path of the file that was loaded
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. A missing file is not an error.
    pub fn load(env: &dyn Environment) -> Result<Self, ConfigError> {
        match Self::locate(env) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file.
    fn locate(env: &dyn Environment) -> Option<PathBuf> {
        // 1. $GITPGM_CONFIG
        if let Some(path) = env.var("GITPGM_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        // 2. $XDG_CONFIG_HOME/gitpgm/config.toml
        if let Some(xdg_home) = env.var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitpgm/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. ~/.gitpgm/config.toml
        env.home_dir()
            .map(|home| home.join(".gitpgm/config.toml"))
            .filter(|path| path.exists())
    }

    /// Path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether failures print their full error chain by default.
    ///
    /// Defaults to `false` if not configured.
    pub fn show_stack_trace(&self) -> bool {
        self.global.show_stack_trace.unwrap_or(false)
    }

    /// Program name for the synopsis line.
    ///
    /// Defaults to `gitpgm` if not configured.
    pub fn program_name(&self) -> &str {
        self.global
            .program_name
            .as_deref()
            .unwrap_or(DEFAULT_PROGRAM_NAME)
    }

    /// The English message table with configured overrides applied.
    pub fn text(&self) -> Text {
        Text::english().with_overrides(&self.global.messages)
    }
}
