//! cli::runner
//!
//! The dispatch controller: turns a token list into one running command.
//!
//! # Lifecycle
//!
//! 1. Parse. A parse failure (with tokens present and no help flag) is
//!    written to the error stream as `fatal: ...`.
//! 2. Help. No tokens, `--help`, or no command name prints the synopsis and
//!    either the full usage block or the common-commands listing.
//! 3. Dispatch. The command is instantiated; if it requires a repository one
//!    is opened from `--git-dir` and the environment, otherwise the raw
//!    `--git-dir` value is passed through.
//! 4. Run. The activated command executes with the remaining tokens.
//!
//! Every path ends with the buffered output and the error stream flushed
//! exactly once. Termination is reported through [`Die`]: help and the
//! failures of steps 1-3 have already been written when `execute` returns
//! ([`Die::is_reported`]); a failure of the command itself has not.

use std::io::{self, BufRead, BufWriter, Write};

use thiserror::Error;

use crate::cli::args::{help_requested, Invocation, ParseError};
use crate::cli::commands::{Catalog, InitContext, Streams, Target};
use crate::cli::usage::Usage;
use crate::core::config::DEFAULT_PROGRAM_NAME;
use crate::core::env::{Environment, ProcessEnv};
use crate::core::text::{keys, Text};
use crate::git::{GitError, Repo, RepositoryLocator};

/// Exit code for failures already written to the error stream.
pub const EXIT_REPORTED: u8 = 128;
/// Exit code for failures the caller still has to print.
pub const EXIT_FAILURE: u8 = 1;

/// Why a run did not complete normally.
#[derive(Debug, Error)]
pub enum Die {
    /// Help was displayed instead of running a command.
    #[error("help displayed")]
    HelpShown,

    /// The command line could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The repository could not be found or opened.
    #[error(transparent)]
    Repository(#[from] GitError),

    /// The command itself failed.
    #[error("{error}")]
    Run {
        error: anyhow::Error,
        /// `--show-stack-trace` was given
        show_stack_trace: bool,
    },

    /// Writing to the error stream failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl Die {
    /// Whether the message has already been written to the error stream.
    pub fn is_reported(&self) -> bool {
        matches!(self, Die::HelpShown | Die::Parse(_) | Die::Repository(_))
    }

    /// The process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        if self.is_reported() {
            EXIT_REPORTED
        } else {
            EXIT_FAILURE
        }
    }
}

/// Per-run stream wrappers; flushed exactly once, when finished or dropped.
struct Session<'a> {
    out: BufWriter<&'a mut dyn Write>,
    err: &'a mut dyn Write,
    flushed: bool,
}

impl<'a> Session<'a> {
    fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self {
            out: BufWriter::new(out),
            err,
            flushed: false,
        }
    }

    fn streams<'s>(&'s mut self, input: &'s mut dyn BufRead) -> Streams<'s> {
        Streams {
            input,
            out: &mut self.out,
            err: &mut *self.err,
        }
    }

    /// Flush both streams, surfacing the first error.
    fn finish(mut self) -> io::Result<()> {
        self.flushed = true;
        let out = self.out.flush();
        let err = self.err.flush();
        out.and(err)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.flushed {
            self.flushed = true;
            let _ = self.out.flush();
            let _ = self.err.flush();
        }
    }
}

/// Dispatches command lines against a catalog.
///
/// # Example
///
/// ```
/// use gitpgm::cli::commands::Catalog;
/// use gitpgm::cli::runner::{Die, Runner};
/// use gitpgm::core::text::Text;
///
/// let catalog = Catalog::builtin();
/// let text = Text::english();
/// let runner = Runner::new(&catalog, &text);
///
/// let mut input: &[u8] = b"";
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let result = runner.execute::<&str>(&[], &mut input, &mut out, &mut err);
///
/// assert!(matches!(result, Err(Die::HelpShown)));
/// assert!(String::from_utf8(err).unwrap().starts_with("gitpgm "));
/// ```
pub struct Runner<'a> {
    catalog: &'a Catalog,
    text: &'a Text,
    program: &'a str,
    env: &'a dyn Environment,
}

impl<'a> Runner<'a> {
    pub fn new(catalog: &'a Catalog, text: &'a Text) -> Self {
        Self {
            catalog,
            text,
            program: DEFAULT_PROGRAM_NAME,
            env: &ProcessEnv,
        }
    }

    /// Name printed at the start of the synopsis.
    pub fn program(mut self, program: &'a str) -> Self {
        self.program = program;
        self
    }

    /// Environment used for repository discovery.
    pub fn environment(mut self, env: &'a dyn Environment) -> Self {
        self.env = env;
        self
    }

    /// Parse `tokens`, then show help or run the named command.
    pub fn execute<S: AsRef<str>>(
        &self,
        tokens: &[S],
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), Die> {
        let mut session = Session::new(out, err);

        let invocation = match Invocation::parse(tokens, self.catalog) {
            Ok(invocation) => invocation,
            Err(e) if !help_requested(tokens) => {
                tracing::debug!(error = %e, "parse failed");
                self.fatal(&mut session, &e.message(self.text))?;
                return Err(Die::Parse(e));
            }
            Err(_) => Invocation {
                help: true,
                ..Invocation::default()
            },
        };
        tracing::debug!(?invocation, "parsed command line");

        let command = match invocation.command.as_deref() {
            Some(name) if !invocation.help => name,
            _ => {
                self.show_help(&mut session, &invocation)?;
                return Err(Die::HelpShown);
            }
        };

        let command = match self.catalog.get(command) {
            Some(command) => command,
            None => {
                let e = ParseError::UnknownCommand(command.to_string());
                self.fatal(&mut session, &e.message(self.text))?;
                return Err(Die::Parse(e));
            }
        };
        let builtin = command.instantiate();

        let target = if builtin.requires_repository() {
            match self.open_repository(invocation.git_dir.as_deref()) {
                Ok(repo) => Target::Repository(repo),
                Err(e) => {
                    tracing::debug!(error = %e, "repository resolution failed");
                    let message = if e.is_not_found() {
                        self.text.get(keys::CANT_FIND_GIT_DIRECTORY).to_string()
                    } else {
                        e.to_string()
                    };
                    self.fatal(&mut session, &message)?;
                    return Err(Die::Repository(e));
                }
            }
        } else {
            Target::GitDirHint(invocation.git_dir.clone())
        };

        tracing::debug!(command = command.name, "running command");
        let result = {
            let mut activated = builtin.init(InitContext {
                target,
                io: session.streams(input),
            });
            activated.execute(&invocation.args)
        };

        match result {
            Ok(()) => {
                session.finish()?;
                Ok(())
            }
            Err(error) => {
                tracing::debug!(command = command.name, "command failed");
                Err(Die::Run {
                    error,
                    show_stack_trace: invocation.show_stack_trace,
                })
            }
        }
    }

    /// Open the repository named by `--git-dir`, or discover one.
    fn open_repository(&self, git_dir: Option<&str>) -> Result<Repo, GitError> {
        RepositoryLocator::new(git_dir)
            .read_environment(self.env)
            .open()
    }

    fn fatal(&self, session: &mut Session<'_>, message: &str) -> io::Result<()> {
        writeln!(session.err, "{}", self.text.format(keys::FATAL_ERROR, &[message]))
    }

    fn show_help(&self, session: &mut Session<'_>, invocation: &Invocation) -> io::Result<()> {
        let usage = Usage::new(self.program, self.text);
        let err = &mut session.err;

        writeln!(err, "{}", usage.synopsis())?;
        if invocation.help {
            writeln!(err)?;
            write!(err, "{}", usage.full_usage())?;
            writeln!(err)?;
        } else if invocation.command.is_none() {
            writeln!(err)?;
            writeln!(err, "{}", self.text.get(keys::MOST_COMMONLY_USED_COMMANDS_ARE))?;
            write!(err, "{}", usage.common_commands(&self.catalog.common()))?;
            writeln!(err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tokens: &[&str]) -> (Result<(), Die>, String, String) {
        let catalog = Catalog::builtin();
        let text = Text::english();
        let runner = Runner::new(&catalog, &text);

        let mut input: &[u8] = b"";
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = runner.execute(tokens, &mut input, &mut out, &mut err);

        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn reported_and_unreported() {
        assert!(Die::HelpShown.is_reported());
        assert!(Die::Parse(ParseError::MissingCommand).is_reported());
        assert!(!Die::Run {
            error: anyhow::anyhow!("boom"),
            show_stack_trace: false
        }
        .is_reported());
        assert_eq!(Die::HelpShown.exit_code(), EXIT_REPORTED);
        assert_eq!(
            Die::Io(io::Error::new(io::ErrorKind::Other, "x")).exit_code(),
            EXIT_FAILURE
        );
    }

    #[test]
    fn empty_shows_common_commands() {
        let (result, out, err) = run(&[]);

        assert!(matches!(result, Err(Die::HelpShown)));
        assert!(out.is_empty());
        let lines: Vec<&str> = err.lines().collect();
        assert!(lines[0].starts_with("gitpgm [--help (-h)]"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "The most commonly used commands are:");
        assert_eq!(lines[3], "init      Create an empty git repository");
        assert_eq!(lines[4], "log       View commit history");
        assert_eq!(lines[5], "show-ref  List references in a local repository");
        assert_eq!(lines[6], "version   Display the version of gitpgm");
    }

    #[test]
    fn help_shows_full_usage_not_listing() {
        let (result, _, err) = run(&["--help", "log"]);

        assert!(matches!(result, Err(Die::HelpShown)));
        assert!(err.contains("display this help text"));
        assert!(!err.contains("most commonly used"));
    }

    #[test]
    fn help_wins_over_parse_error() {
        let (result, _, err) = run(&["-h", "--bogus"]);

        assert!(matches!(result, Err(Die::HelpShown)));
        assert!(!err.contains("fatal"));
    }

    #[test]
    fn unknown_command_is_reported() {
        let (result, _, err) = run(&["frobnicate"]);

        assert!(matches!(
            result,
            Err(Die::Parse(ParseError::UnknownCommand(_)))
        ));
        assert_eq!(err, "fatal: not a gitpgm command: frobnicate\n");
    }

    #[test]
    fn runs_command_without_repository() {
        let (result, out, err) = run(&["version"]);

        assert!(result.is_ok());
        assert!(out.starts_with("gitpgm version "));
        assert!(err.is_empty());
    }

    #[test]
    fn command_failure_is_not_reported() {
        let (result, _, err) = run(&["--show-stack-trace", "version", "extra"]);

        match result {
            Err(Die::Run {
                error,
                show_stack_trace,
            }) => {
                assert!(show_stack_trace);
                assert!(error.to_string().contains("extra"));
            }
            other => panic!("expected run failure, got {:?}", other),
        }
        assert!(err.is_empty());
    }
}
