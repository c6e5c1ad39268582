//! rev-parse command - Resolve revisions to object ids

use anyhow::{Context as _, Result};
use clap::Parser;

use super::{parse_args, Activated, Builtin, InitContext, Streams};
use crate::git::Repo;

#[derive(Parser, Debug)]
#[command(name = "rev-parse", about = "Pick out and massage parameters")]
struct RevParseArgs {
    /// Print the path of the git directory
    #[arg(long)]
    git_dir: bool,

    /// Revisions to resolve
    revisions: Vec<String>,
}

/// Resolve revisions to full object ids.
#[derive(Debug, Default)]
pub struct RevParse;

impl RevParse {
    pub fn boxed() -> Box<dyn Builtin> {
        Box::new(Self)
    }
}

impl Builtin for RevParse {
    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
        Box::new(RevParseRun {
            repo: ctx.target.into_repository(),
            io: ctx.io,
        })
    }
}

struct RevParseRun<'io> {
    repo: Result<Repo>,
    io: Streams<'io>,
}

impl Activated for RevParseRun<'_> {
    fn execute(&mut self, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<RevParseArgs>("rev-parse", args, self.io.out)? else {
            return Ok(());
        };
        let repo = self.repo.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;

        if args.git_dir {
            writeln!(self.io.out, "{}", repo.git_dir().display())?;
        }

        for revision in &args.revisions {
            let oid = repo
                .resolve(revision)
                .with_context(|| format!("ambiguous argument '{}'", revision))?;
            writeln!(self.io.out, "{}", oid)?;
        }
        Ok(())
    }
}
