//! core::text
//!
//! Message lookup table.
//!
//! Every user-facing string printed by the dispatcher is addressed by an
//! opaque key. Keys resolve through a [`Text`] table that is built once per
//! process and passed to whatever needs it; there is no global bundle.
//!
//! # Example
//!
//! ```
//! use gitpgm::core::text::{keys, Text};
//!
//! let text = Text::english();
//! assert_eq!(
//!     text.format(keys::FATAL_ERROR, &["boom"]),
//!     "fatal: boom"
//! );
//!
//! // Unknown keys fall back to the key itself
//! assert_eq!(text.get("no_such_key"), "no_such_key");
//! ```

use std::collections::BTreeMap;

/// Well-known message keys.
pub mod keys {
    pub const FATAL_ERROR: &str = "fatal_error";
    pub const MOST_COMMONLY_USED_COMMANDS_ARE: &str = "most_commonly_used_commands_are";
    pub const CANT_FIND_GIT_DIRECTORY: &str = "cant_find_git_directory";
    pub const NOT_A_COMMAND: &str = "not_a_command";
    pub const COMMAND_REQUIRED: &str = "command_required";
    pub const ARGUMENT_NOT_UNICODE: &str = "argument_not_unicode";

    pub const USAGE_DISPLAY_HELP: &str = "usage_display_this_help_text";
    pub const USAGE_SHOW_STACK_TRACE: &str = "usage_display_the_stack_trace_on_errors";
    pub const USAGE_GIT_DIR: &str = "usage_set_the_git_repository_to_operate_on";

    pub const USAGE_INIT: &str = "usage_create_an_empty_git_repository";
    pub const USAGE_LOG: &str = "usage_view_commit_history";
    pub const USAGE_REV_PARSE: &str = "usage_pick_out_and_massage_parameters";
    pub const USAGE_SHOW_REF: &str = "usage_list_references_in_a_local_repository";
    pub const USAGE_VERSION: &str = "usage_display_the_version";
}

const ENGLISH: &[(&str, &str)] = &[
    (keys::FATAL_ERROR, "fatal: {0}"),
    (
        keys::MOST_COMMONLY_USED_COMMANDS_ARE,
        "The most commonly used commands are:",
    ),
    (keys::CANT_FIND_GIT_DIRECTORY, "can't find a git repository"),
    (keys::NOT_A_COMMAND, "not a gitpgm command: {0}"),
    (keys::COMMAND_REQUIRED, "argument \"command\" is required"),
    (keys::ARGUMENT_NOT_UNICODE, "argument is not valid UTF-8: {0}"),
    (keys::USAGE_DISPLAY_HELP, "display this help text"),
    (
        keys::USAGE_SHOW_STACK_TRACE,
        "display the full error chain on failures",
    ),
    (keys::USAGE_GIT_DIR, "set the git repository to operate on"),
    (keys::USAGE_INIT, "Create an empty git repository"),
    (keys::USAGE_LOG, "View commit history"),
    (
        keys::USAGE_REV_PARSE,
        "Pick out and massage parameters",
    ),
    (
        keys::USAGE_SHOW_REF,
        "List references in a local repository",
    ),
    (keys::USAGE_VERSION, "Display the version of gitpgm"),
];

/// Read-only key to message table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    messages: BTreeMap<String, String>,
}

impl Default for Text {
    fn default() -> Self {
        Self::english()
    }
}

impl Text {
    /// The built-in English table.
    pub fn english() -> Self {
        Self::from_pairs(ENGLISH.iter().copied())
    }

    /// Build a table from arbitrary pairs. Used for tests with fixed message sets.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            messages: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether `key` is defined in the built-in table.
    pub fn is_known_key(key: &str) -> bool {
        ENGLISH.iter().any(|(k, _)| *k == key)
    }

    /// Return a copy of this table with `overrides` replacing matching keys.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (key, value) in overrides {
            self.messages.insert(key.clone(), value.clone());
        }
        self
    }

    /// Look up a message, falling back to the key.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Look up a message and substitute `{0}`, `{1}`, ... placeholders.
    pub fn format(&self, key: &str, args: &[&str]) -> String {
        let mut message = self.get(key).to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }
}
