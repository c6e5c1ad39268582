//! cli::commands
//!
//! The command catalog and the built-in commands.
//!
//! # Architecture
//!
//! A command is a [`Builtin`]: a value built by a factory registered in the
//! [`Catalog`] under its name. The dispatcher asks it whether it needs a
//! repository, then activates it with [`Builtin::init`], which consumes the
//! unconfigured value and returns an [`Activated`] unit that owns its
//! streams and its [`Target`]. Only the activated unit can run.
//!
//! Each command parses its own arguments; the dispatcher hands them over
//! untouched.

mod init;
mod log_cmd;
mod rev_parse;
mod show_ref;
mod version;

pub use init::Init;
pub use log_cmd::Log;
pub use rev_parse::RevParse;
pub use show_ref::ShowRef;
pub use version::Version;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::core::text::keys;
use crate::git::Repo;

/// The streams a command reads from and writes to.
pub struct Streams<'io> {
    /// Standard input
    pub input: &'io mut dyn BufRead,
    /// Standard output (buffered by the dispatcher)
    pub out: &'io mut dyn Write,
    /// Standard error
    pub err: &'io mut dyn Write,
}

impl std::fmt::Debug for Streams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Streams").finish_non_exhaustive()
    }
}

/// What a command is bound to: an opened repository, or the raw
/// `--git-dir` value for commands that find their own.
#[derive(Debug)]
pub enum Target {
    /// Opened by the dispatcher
    Repository(Repo),
    /// `--git-dir` exactly as given, if it was given
    GitDirHint(Option<String>),
}

impl Target {
    /// The repository, for commands that require one.
    pub fn into_repository(self) -> Result<Repo> {
        match self {
            Target::Repository(repo) => Ok(repo),
            Target::GitDirHint(_) => Err(anyhow!("command was started without a repository")),
        }
    }
}

/// Everything a command is activated with.
#[derive(Debug)]
pub struct InitContext<'io> {
    pub target: Target,
    pub io: Streams<'io>,
}

/// A command before activation.
pub trait Builtin {
    /// Whether the dispatcher must open a repository before activation.
    fn requires_repository(&self) -> bool {
        true
    }

    /// Bind the command to its target and streams.
    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io>;
}

/// A command ready to run.
pub trait Activated {
    /// Run with the tokens that followed the command name.
    fn execute(&mut self, args: &[String]) -> Result<()>;
}

/// Factory producing a fresh command instance.
pub type Factory = Arc<dyn Fn() -> Box<dyn Builtin> + Send + Sync>;

/// A catalog entry.
#[derive(Clone)]
pub struct CommandRef {
    /// Name used on the command line
    pub name: &'static str,
    /// Text key of the one-line description
    pub usage_key: &'static str,
    /// Listed among the most commonly used commands
    pub common: bool,
    factory: Factory,
}

impl std::fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRef")
            .field("name", &self.name)
            .field("usage_key", &self.usage_key)
            .field("common", &self.common)
            .finish()
    }
}

impl CommandRef {
    pub fn new<F>(name: &'static str, usage_key: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Builtin> + Send + Sync + 'static,
    {
        Self {
            name,
            usage_key,
            common: false,
            factory: Arc::new(factory),
        }
    }

    /// Mark this entry as one of the most commonly used commands.
    pub fn common(mut self) -> Self {
        self.common = true;
        self
    }

    /// Build a new, unactivated instance.
    pub fn instantiate(&self) -> Box<dyn Builtin> {
        (self.factory)()
    }
}

/// The registry of known commands, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    commands: Vec<CommandRef>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands shipped with gitpgm.
    pub fn builtin() -> Self {
        Self::new()
            .with(CommandRef::new("init", keys::USAGE_INIT, Init::boxed).common())
            .with(CommandRef::new("log", keys::USAGE_LOG, Log::boxed).common())
            .with(CommandRef::new("rev-parse", keys::USAGE_REV_PARSE, RevParse::boxed))
            .with(CommandRef::new("show-ref", keys::USAGE_SHOW_REF, ShowRef::boxed).common())
            .with(CommandRef::new("version", keys::USAGE_VERSION, Version::boxed).common())
    }

    /// Add an entry, replacing any entry with the same name.
    pub fn with(mut self, command: CommandRef) -> Self {
        self.register(command);
        self
    }

    /// Add an entry, replacing any entry with the same name.
    pub fn register(&mut self, command: CommandRef) {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandRef> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// The most commonly used commands, in registration order.
    pub fn common(&self) -> Vec<&CommandRef> {
        self.commands.iter().filter(|c| c.common).collect()
    }

    /// Every command, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandRef> {
        self.commands.iter()
    }
}

/// Parse a command's own arguments with clap.
///
/// `--help` inside the command's arguments prints the command's help to
/// `out` and yields `None`.
pub(crate) fn parse_args<T: Parser>(
    name: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<Option<T>> {
    let argv = std::iter::once(name).chain(args.iter().map(String::as_str));
    match T::try_parse_from(argv) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => {
            write!(out, "{}", e.render())?;
            Ok(None)
        }
        Err(e) => {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            Err(anyhow!(
                "{}: {}",
                name,
                first.strip_prefix("error: ").unwrap_or(first)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_order() {
        let catalog = Catalog::builtin();
        let names: Vec<&str> = catalog.iter().map(|c| c.name).collect();
        assert_eq!(names, ["init", "log", "rev-parse", "show-ref", "version"]);

        let common: Vec<&str> = catalog.common().iter().map(|c| c.name).collect();
        assert_eq!(common, ["init", "log", "show-ref", "version"]);
    }

    #[test]
    fn register_replaces_by_name() {
        let mut catalog = Catalog::builtin();
        catalog.register(CommandRef::new("log", "other_key", Version::boxed));

        assert_eq!(catalog.iter().count(), 5);
        assert_eq!(catalog.get("log").unwrap().usage_key, "other_key");
        assert!(!catalog.get("log").unwrap().common);
    }

    #[test]
    fn repository_requirements() {
        let catalog = Catalog::builtin();
        let needs = |name: &str| catalog.get(name).unwrap().instantiate().requires_repository();

        assert!(!needs("init"));
        assert!(needs("log"));
        assert!(needs("rev-parse"));
        assert!(needs("show-ref"));
        assert!(!needs("version"));
    }

    #[test]
    fn hint_target_has_no_repository() {
        let err = Target::GitDirHint(None).into_repository().unwrap_err();
        assert!(err.to_string().contains("without a repository"));
    }
}
