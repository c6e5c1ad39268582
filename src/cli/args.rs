//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Recognized only before the command name:
//! - `--help` / `-h`: Show help
//! - `--show-stack-trace`: Print the full error chain on failure
//! - `--git-dir <GIT_DIR>`: Repository to operate on
//!
//! The first positional token names the command. Everything after it is
//! handed to the command untouched, including tokens that look like flags.

use std::ffi::OsString;

use clap::{CommandFactory, Parser, Subcommand};
use thiserror::Error;

use crate::cli::commands::Catalog;
use crate::core::text::{keys, Text};

/// Why a token list could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed option, unknown option, or missing option value.
    #[error("{0}")]
    Syntax(String),

    /// Options were given but no command followed them.
    #[error("argument \"command\" is required")]
    MissingCommand,

    /// The command name is not in the catalog.
    #[error("not a command: {0}")]
    UnknownCommand(String),

    /// A token is not valid UTF-8. Holds a lossy rendering for display.
    #[error("argument is not valid UTF-8: {0}")]
    NotUnicode(String),
}

impl ParseError {
    /// Localized message for this error.
    pub fn message(&self, text: &Text) -> String {
        match self {
            ParseError::Syntax(message) => message.clone(),
            ParseError::MissingCommand => text.get(keys::COMMAND_REQUIRED).to_string(),
            ParseError::UnknownCommand(name) => text.format(keys::NOT_A_COMMAND, &[name]),
            ParseError::NotUnicode(lossy) => text.format(keys::ARGUMENT_NOT_UNICODE, &[lossy]),
        }
    }
}

/// The clap schema. Kept private so callers only see validated [`Invocation`]s.
#[derive(Parser, Debug)]
#[command(
    name = "gitpgm",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true,
    allow_external_subcommands = true
)]
pub(crate) struct Schema {
    #[arg(short = 'h', long, help = keys::USAGE_DISPLAY_HELP)]
    help: bool,

    #[arg(long, help = keys::USAGE_SHOW_STACK_TRACE)]
    show_stack_trace: bool,

    #[arg(long, value_name = "GIT_DIR", allow_hyphen_values = true, help = keys::USAGE_GIT_DIR)]
    git_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Remainder>,
}

#[derive(Subcommand, Debug)]
enum Remainder {
    #[command(external_subcommand)]
    Command(Vec<String>),
}

impl Schema {
    /// The clap command, for usage rendering.
    pub(crate) fn definition() -> clap::Command {
        Self::command()
    }
}

/// A parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// `--help` / `-h` was given
    pub help: bool,
    /// `--show-stack-trace` was given
    pub show_stack_trace: bool,
    /// Value of `--git-dir`
    pub git_dir: Option<String>,
    /// Catalog name of the command, if one was given
    pub command: Option<String>,
    /// Tokens after the command name, verbatim
    pub args: Vec<String>,
}

impl Invocation {
    /// Parse `tokens` (without the program name), resolving the command
    /// name against `catalog`.
    ///
    /// An empty token list parses to an empty invocation.
    ///
    /// # Example
    ///
    /// ```
    /// use gitpgm::cli::args::Invocation;
    /// use gitpgm::cli::commands::Catalog;
    ///
    /// let catalog = Catalog::builtin();
    /// let inv = Invocation::parse(
    ///     &["--git-dir", "/tmp/r", "log", "-n", "3"],
    ///     &catalog,
    /// ).unwrap();
    ///
    /// assert_eq!(inv.git_dir.as_deref(), Some("/tmp/r"));
    /// assert_eq!(inv.command.as_deref(), Some("log"));
    /// assert_eq!(inv.args, vec!["-n", "3"]);
    /// ```
    pub fn parse<S: AsRef<str>>(tokens: &[S], catalog: &Catalog) -> Result<Self, ParseError> {
        let schema = Schema::try_parse_from(tokens.iter().map(AsRef::as_ref))
            .map_err(|e| ParseError::Syntax(clap_message(&e)))?;

        let (command, args) = match schema.command {
            Some(Remainder::Command(mut rest)) if !rest.is_empty() => {
                let name = rest.remove(0);
                (Some(name), rest)
            }
            _ => (None, Vec::new()),
        };

        if let Some(name) = &command {
            if catalog.get(name).is_none() {
                return Err(ParseError::UnknownCommand(name.clone()));
            }
        } else if !tokens.is_empty() && !schema.help {
            return Err(ParseError::MissingCommand);
        }

        Ok(Self {
            help: schema.help,
            show_stack_trace: schema.show_stack_trace,
            git_dir: schema.git_dir,
            command,
            args,
        })
    }

    /// Serialize back to tokens that parse to an equal invocation.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.help {
            tokens.push("--help".to_string());
        }
        if self.show_stack_trace {
            tokens.push("--show-stack-trace".to_string());
        }
        if let Some(git_dir) = &self.git_dir {
            tokens.push(format!("--git-dir={}", git_dir));
        }
        if let Some(command) = &self.command {
            tokens.push(command.clone());
            tokens.extend(self.args.iter().cloned());
        }
        tokens
    }
}

/// Convert raw process arguments to tokens.
///
/// Tokens are never rewritten: a path that is not valid UTF-8 is rejected
/// instead of being replaced with a lossy approximation.
pub fn tokens_from_os<I>(args: I) -> Result<Vec<String>, ParseError>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| ParseError::NotUnicode(raw.to_string_lossy().into_owned()))
        })
        .collect()
}

/// Whether `--help` / `-h` appears among the leading options of `tokens`.
///
/// Used when parsing failed and no [`Invocation`] exists.
pub fn help_requested<S: AsRef<str>>(tokens: &[S]) -> bool {
    let mut iter = tokens.iter().map(AsRef::as_ref);
    while let Some(token) = iter.next() {
        match token {
            "--help" | "-h" => return true,
            "--git-dir" => {
                iter.next();
            }
            t if t.starts_with('-') => {}
            _ => return false,
        }
    }
    false
}

/// First line of a clap error without clap's `error: ` prefix.
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn empty_tokens_parse_to_empty_invocation() {
        let inv = Invocation::parse::<&str>(&[], &catalog()).unwrap();
        assert_eq!(inv, Invocation::default());
    }

    #[test]
    fn all_options() {
        let inv = Invocation::parse(
            &["-h", "--show-stack-trace", "--git-dir", "/r", "version"],
            &catalog(),
        )
        .unwrap();

        assert!(inv.help);
        assert!(inv.show_stack_trace);
        assert_eq!(inv.git_dir.as_deref(), Some("/r"));
        assert_eq!(inv.command.as_deref(), Some("version"));
        assert!(inv.args.is_empty());
    }

    #[test]
    fn equals_form_for_git_dir() {
        let inv = Invocation::parse(&["--git-dir=/r", "log"], &catalog()).unwrap();
        assert_eq!(inv.git_dir.as_deref(), Some("/r"));
    }

    #[test]
    fn git_dir_value_may_start_with_dash() {
        let inv = Invocation::parse(&["--git-dir", "-odd", "log"], &catalog()).unwrap();
        assert_eq!(inv.git_dir.as_deref(), Some("-odd"));
        assert_eq!(inv.command.as_deref(), Some("log"));
        assert!(!help_requested(&["--git-dir", "-h", "log"]));
    }

    #[test]
    fn remainder_is_opaque() {
        let inv = Invocation::parse(
            &["log", "--help", "--git-dir", "x", "-n", "2"],
            &catalog(),
        )
        .unwrap();

        assert!(!inv.help);
        assert!(inv.git_dir.is_none());
        assert_eq!(inv.args, vec!["--help", "--git-dir", "x", "-n", "2"]);
    }

    #[test]
    fn unknown_command_names_the_token() {
        let err = Invocation::parse(&["frobnicate"], &catalog()).unwrap_err();
        assert_eq!(err, ParseError::UnknownCommand("frobnicate".to_string()));
        assert!(err.message(&Text::english()).contains("frobnicate"));
    }

    #[test]
    fn unknown_option_is_syntax_error() {
        let err = Invocation::parse(&["--bogus", "log"], &catalog()).unwrap_err();
        match err {
            ParseError::Syntax(message) => assert!(message.contains("--bogus")),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn git_dir_without_value() {
        let err = Invocation::parse(&["--git-dir"], &catalog()).unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
    }

    #[test]
    fn options_without_command() {
        let err = Invocation::parse(&["--show-stack-trace"], &catalog()).unwrap_err();
        assert_eq!(err, ParseError::MissingCommand);
    }

    #[test]
    fn help_alone_is_valid() {
        let inv = Invocation::parse(&["--help"], &catalog()).unwrap();
        assert!(inv.help);
        assert!(inv.command.is_none());
    }

    #[test]
    fn to_tokens_round_trips() {
        let inv = Invocation {
            help: false,
            show_stack_trace: true,
            git_dir: Some("-odd".to_string()),
            command: Some("log".to_string()),
            args: vec!["--oneline".to_string()],
        };
        let reparsed = Invocation::parse(&inv.to_tokens(), &catalog()).unwrap();
        assert_eq!(reparsed, inv);
    }

    #[test]
    fn unicode_tokens_pass_through() {
        let tokens = tokens_from_os([OsString::from("--git-dir"), OsString::from("/r/é")]).unwrap();
        assert_eq!(tokens, vec!["--git-dir", "/r/é"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_token_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"/r/\xff".to_vec());
        let err = tokens_from_os([OsString::from("--git-dir"), raw]).unwrap_err();

        assert!(matches!(err, ParseError::NotUnicode(_)));
        assert!(err
            .message(&Text::english())
            .starts_with("argument is not valid UTF-8: /r/"));
    }

    #[test]
    fn help_scan() {
        assert!(help_requested(&["--bogus", "-h"]));
        assert!(help_requested(&["--git-dir", "x", "--help"]));
        assert!(!help_requested(&["log", "--help"]));
        assert!(!help_requested::<&str>(&[]));
    }
}
