//! init command - Create an empty repository
//!
//! `init` never needs an existing repository, so the dispatcher hands it the
//! raw `--git-dir` value instead of opening one. When that value is present
//! it names the git directory to create; the working tree is then the
//! directory argument, or the current directory.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;

use super::{parse_args, Activated, Builtin, InitContext, Streams, Target};
use crate::git::Repo;

#[derive(Parser, Debug)]
#[command(name = "init", about = "Create an empty git repository")]
struct InitArgs {
    /// Create a repository without a working tree
    #[arg(long)]
    bare: bool,

    /// Where to create the repository (defaults to the current directory)
    directory: Option<PathBuf>,
}

/// Create an empty repository.
#[derive(Debug, Default)]
pub struct Init;

impl Init {
    pub fn boxed() -> Box<dyn Builtin> {
        Box::new(Self)
    }
}

impl Builtin for Init {
    fn requires_repository(&self) -> bool {
        false
    }

    fn init<'io>(self: Box<Self>, ctx: InitContext<'io>) -> Box<dyn Activated + 'io> {
        let git_dir = match ctx.target {
            Target::GitDirHint(hint) => hint.map(PathBuf::from),
            Target::Repository(repo) => Some(repo.git_dir().to_path_buf()),
        };
        Box::new(InitRun {
            git_dir,
            io: ctx.io,
        })
    }
}

struct InitRun<'io> {
    git_dir: Option<PathBuf>,
    io: Streams<'io>,
}

impl Activated for InitRun<'_> {
    fn execute(&mut self, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<InitArgs>("init", args, self.io.out)? else {
            return Ok(());
        };

        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let repo = create(self.git_dir.as_deref(), args.directory.as_deref(), args.bare, &cwd)?;

        tracing::info!(git_dir = %repo.git_dir().display(), "initialized repository");
        writeln!(
            self.io.out,
            "Initialized empty Git repository in {}",
            repo.git_dir().display()
        )?;
        Ok(())
    }
}

/// Create the repository described by the hint, directory argument, and cwd.
fn create(git_dir: Option<&Path>, directory: Option<&Path>, bare: bool, cwd: &Path) -> Result<Repo> {
    let absolute = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { cwd.join(p) };

    let repo = match git_dir {
        Some(git_dir) if bare => Repo::init(&absolute(git_dir), true),
        Some(git_dir) => {
            let work_tree = directory.map(absolute).unwrap_or_else(|| cwd.to_path_buf());
            Repo::init_separate(&absolute(git_dir), &work_tree)
        }
        None => {
            let target = directory.map(absolute).unwrap_or_else(|| cwd.to_path_buf());
            Repo::init(&target, bare)
        }
    };

    repo.context("Failed to create repository")
}
