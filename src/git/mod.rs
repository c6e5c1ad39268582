//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. No other module imports
//! `git2`. Subcommands receive an opened [`Repo`] and go through its
//! methods; the dispatcher only ever calls [`RepositoryLocator::open`].
//!
//! # Responsibilities
//!
//! - Repository discovery (`--git-dir`, `GIT_DIR`, upward search)
//! - Repository creation
//! - Revision and ref reads
//! - History walks
//!
//! # Example
//!
//! ```ignore
//! use gitpgm::git::RepositoryLocator;
//! use gitpgm::core::env::ProcessEnv;
//!
//! let repo = RepositoryLocator::new(None::<&str>)
//!     .read_environment(&ProcessEnv)
//!     .open()?;
//! let head = repo.head_oid()?;
//! println!("HEAD is at {}", head.short(7));
//! ```

mod interface;
mod locator;

pub use interface::{CommitInfo, GitError, Oid, RefEntry, Repo};
pub use locator::{RepositoryLocator, GIT_CEILING_DIRECTORIES, GIT_DIR, GIT_WORK_TREE};
