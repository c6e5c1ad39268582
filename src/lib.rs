//! gitpgm - command dispatcher for a git toolset
//!
//! gitpgm turns a command line into one running command: it parses the
//! global options, renders help, finds the repository the command should
//! operate on, and runs the command with its own streams, flushing them on
//! every exit path.
//!
//! # Architecture
//!
//! - [`cli`] - Option schema, help rendering, command catalog, dispatch
//! - [`git`] - Single interface for all Git operations (repository discovery included)
//! - [`core`] - Configuration, environment access, message table
//!
//! # Exit Protocol
//!
//! A run either completes, or stops with a [`cli::Die`] that says whether
//! its message has already been written to the error stream. The binary maps
//! the two shapes to exit codes 128 (already reported) and 1 (printed by the
//! entry point).

pub mod cli;
pub mod core;
pub mod git;
