//! cli
//!
//! Command-line interface layer for gitpgm.
//!
//! # Responsibilities
//!
//! - Parse the global options and the command name
//! - Render help and usage text
//! - Open or defer the repository, then run the command
//! - Turn the outcome into a process exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. [`runner::Runner`] owns the dispatch protocol; the
//! commands themselves live in [`commands`] and only see their own
//! arguments, their streams, and their [`commands::Target`].

pub mod args;
pub mod commands;
pub mod runner;
pub mod usage;

pub use args::{Invocation, ParseError};
pub use runner::{Die, Runner};

use std::io::{self, Write};
use std::process::ExitCode;

use crate::core::config::Config;
use crate::core::env::ProcessEnv;
use crate::core::text::{keys, Text};
use commands::Catalog;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let env = ProcessEnv;

    let config = match Config::load(&env) {
        Ok(config) => config,
        Err(e) => {
            let text = Text::english();
            eprintln!("{}", text.format(keys::FATAL_ERROR, &[&e.to_string()]));
            return ExitCode::from(runner::EXIT_REPORTED);
        }
    };

    let text = config.text();
    let catalog = Catalog::builtin();
    let runner = Runner::new(&catalog, &text)
        .program(config.program_name())
        .environment(&env);

    let tokens = match args::tokens_from_os(std::env::args_os().skip(1)) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{}", text.format(keys::FATAL_ERROR, &[&e.message(&text)]));
            return ExitCode::from(runner::EXIT_REPORTED);
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    match runner.execute(&tokens, &mut input, &mut out, &mut err) {
        Ok(()) => ExitCode::SUCCESS,
        Err(die) => {
            report(&mut err, &die, &text, config.show_stack_trace());
            ExitCode::from(die.exit_code())
        }
    }
}

/// Print a failure the runner has not already written.
///
/// With `--show-stack-trace` (or `show_stack_trace = true` in the config)
/// the whole error chain is printed.
pub fn report(err: &mut dyn Write, die: &Die, text: &Text, default_stack_trace: bool) {
    if die.is_reported() {
        return;
    }

    let message = match die {
        Die::Run {
            error,
            show_stack_trace,
        } if *show_stack_trace || default_stack_trace => format!("{:?}", error),
        Die::Run { error, .. } => error.to_string(),
        other => other.to_string(),
    };
    let _ = writeln!(err, "{}", text.format(keys::FATAL_ERROR, &[&message]));
    let _ = err.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    fn run_error() -> anyhow::Error {
        Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "inner cause"))
            .context("outer failure")
            .unwrap_err()
    }

    #[test]
    fn reported_failures_print_nothing() {
        let mut err = Vec::new();
        report(&mut err, &Die::HelpShown, &Text::english(), true);
        assert!(err.is_empty());
    }

    #[test]
    fn run_failure_prints_message_only() {
        let mut err = Vec::new();
        let die = Die::Run {
            error: run_error(),
            show_stack_trace: false,
        };
        report(&mut err, &die, &Text::english(), false);

        assert_eq!(String::from_utf8(err).unwrap(), "fatal: outer failure\n");
    }

    #[test]
    fn stack_trace_prints_chain() {
        let mut err = Vec::new();
        let die = Die::Run {
            error: run_error(),
            show_stack_trace: true,
        };
        report(&mut err, &die, &Text::english(), false);

        let printed = String::from_utf8(err).unwrap();
        assert!(printed.starts_with("fatal: outer failure"));
        assert!(printed.contains("inner cause"));
    }

    #[test]
    fn config_default_enables_chain() {
        let mut err = Vec::new();
        let die = Die::Run {
            error: run_error(),
            show_stack_trace: false,
        };
        report(&mut err, &die, &Text::english(), true);

        assert!(String::from_utf8(err).unwrap().contains("inner cause"));
    }
}
