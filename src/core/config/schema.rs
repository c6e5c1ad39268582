//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are validated after parsing: message overrides may only name keys
//! the dispatcher knows, and the program name must be a single non-empty word.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::text::Text;

/// User configuration.
///
/// # Example
///
/// ```toml
/// show_stack_trace = true
/// program_name = "jgit"
///
/// [messages]
/// cant_find_git_directory = "no repository here"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default for `--show-stack-trace`
    pub show_stack_trace: Option<bool>,

    /// Name printed at the start of the synopsis line
    pub program_name: Option<String>,

    /// Message overrides, keyed by text key
    pub messages: BTreeMap<String, String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.program_name {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid program_name '{}': must be a single non-empty word",
                    name
                )));
            }
        }

        if let Some(key) = self.messages.keys().find(|k| !Text::is_known_key(k)) {
            return Err(ConfigError::InvalidValue(format!(
                "unknown message key '{}'",
                key
            )));
        }

        Ok(())
    }
}
