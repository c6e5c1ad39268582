//! log command - Show commit history
//!
//! Walks from HEAD (or the given revision) newest first.

use std::io::Write;

use anyhow::{Context as _, Result};
use clap::Parser;

use super::{parse_args, Activated, Builtin, InitContext, Streams};
use crate::git::{CommitInfo, Repo};

#[derive(Parser, Debug)]
#[command(name = "log", about = "View commit history")]
struct LogArgs {
    /// Limit the number of commits shown
    #[arg(short = 'n', long = "max-count", value_name = "COUNT")]
    max_count: Option<usize>,

    /// One line per commit: abbreviated id and summary
    #[arg(long)]
    oneline: bool,

    /// Revision to start from (defaults to HEAD)
    revision: Option<String>,
}

/// Show commit history.
#[derive(Debug, Default)]
pub struct Log;

impl Log {
    pub fn boxed() -> Box<dyn Builtin> {
        Box::new(Self)
    }
}

impl Builtin for Log {
    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
        Box::new(LogRun {
            repo: ctx.target.into_repository(),
            io: ctx.io,
        })
    }
}

struct LogRun<'io> {
    repo: Result<Repo>,
    io: Streams<'io>,
}

impl Activated for LogRun<'_> {
    fn execute(&mut self, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<LogArgs>("log", args, self.io.out)? else {
            return Ok(());
        };
        let repo = self.repo.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;

        let start = match &args.revision {
            Some(revision) => repo
                .resolve(revision)
                .with_context(|| format!("bad revision '{}'", revision))?,
            None => repo.head_oid().context("Failed to read HEAD")?,
        };

        let commits = repo.walk(&start, args.max_count)?;
        tracing::debug!(count = commits.len(), "walked history");

        for (i, commit) in commits.iter().enumerate() {
            if args.oneline {
                writeln!(self.io.out, "{} {}", commit.oid.short(7), commit.summary)?;
            } else {
                if i > 0 {
                    writeln!(self.io.out)?;
                }
                write_full(self.io.out, commit)?;
            }
        }
        Ok(())
    }
}

/// `git log` medium format.
fn write_full(out: &mut dyn Write, commit: &CommitInfo) -> std::io::Result<()> {
    writeln!(out, "commit {}", commit.oid)?;
    writeln!(out, "Author: {} <{}>", commit.author_name, commit.author_email)?;
    writeln!(
        out,
        "Date:   {}",
        commit.author_time.format("%a %b %-d %H:%M:%S %Y %z")
    )?;
    writeln!(out)?;
    for line in commit.message.trim_end().lines() {
        writeln!(out, "    {}", line)?;
    }
    Ok(())
}
