//! show-ref command - List references

use anyhow::Result;
use clap::Parser;

use super::{parse_args, Activated, Builtin, InitContext, Streams};
use crate::git::Repo;

#[derive(Parser, Debug)]
#[command(name = "show-ref", about = "List references in a local repository")]
struct ShowRefArgs {
    /// Only show refs under refs/heads
    #[arg(long)]
    heads: bool,

    /// Only show refs under refs/tags
    #[arg(long)]
    tags: bool,
}

impl ShowRefArgs {
    fn wants(&self, refname: &str) -> bool {
        if !self.heads && !self.tags {
            return true;
        }
        (self.heads && refname.starts_with("refs/heads/"))
            || (self.tags && refname.starts_with("refs/tags/"))
    }
}

/// List references as `<oid> <refname>`, sorted by name.
#[derive(Debug, Default)]
pub struct ShowRef;

impl ShowRef {
    pub fn boxed() -> Box<dyn Builtin> {
        Box::new(Self)
    }
}

impl Builtin for ShowRef {
    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
        Box::new(ShowRefRun {
            repo: ctx.target.into_repository(),
            io: ctx.io,
        })
    }
}

struct ShowRefRun<'io> {
    repo: Result<Repo>,
    io: Streams<'io>,
}

impl Activated for ShowRefRun<'_> {
    fn execute(&mut self, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ShowRefArgs>("show-ref", args, self.io.out)? else {
            return Ok(());
        };
        let repo = self.repo.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;

        for entry in repo.list_refs()? {
            if args.wants(&entry.name) {
                writeln!(self.io.out, "{} {}", entry.oid, entry.name)?;
            }
        }
        Ok(())
    }
}
