//! git::interface
//!
//! Repository handle implementation using git2.
//!
//! [`Repo`] is the handle the dispatcher gives to subcommands that require a
//! repository. It exposes the few read and setup operations the built-in
//! commands need and normalizes git2 failures into [`GitError`].
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: no repository at or above the given location
//! - [`GitError::RefNotFound`]: requested ref does not exist
//! - [`GitError::ObjectNotFound`]: revision does not name an object
//! - [`GitError::UnbornHead`]: HEAD points at a branch with no commits
//! - [`GitError::Internal`]: anything else reported by libgit2

use std::path::{Path, PathBuf};

use chrono::Offset;
use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository could be found or opened at the location.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Revision does not resolve to an object.
    #[error("unknown revision: {revision}")]
    ObjectNotFound {
        /// The revision as given
        revision: String,
    },

    /// HEAD names a branch that has no commits yet.
    #[error("HEAD does not point at a commit yet")]
    UnbornHead,

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with the revision or ref being read.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                if context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        revision: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::UnbornBranch => GitError::UnbornHead,
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Whether this error means no repository was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitError::NotARepo { .. })
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// A full hexadecimal object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    fn from_git2(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }

    /// Parse a full hexadecimal object id.
    ///
    /// # Example
    ///
    /// ```
    /// use gitpgm::git::Oid;
    ///
    /// let oid = Oid::parse("0123456789abcdef0123456789abcdef01234567").unwrap();
    /// assert_eq!(oid.short(7), "0123456");
    /// assert!(Oid::parse("xyz").is_err());
    /// ```
    pub fn parse(hex: &str) -> Result<Self, GitError> {
        let oid = git2::Oid::from_str(hex).map_err(|_| GitError::ObjectNotFound {
            revision: hex.to_string(),
        })?;
        if oid.to_string() != hex.to_ascii_lowercase() {
            return Err(GitError::ObjectNotFound {
                revision: hex.to_string(),
            });
        }
        Ok(Self::from_git2(oid))
    }

    /// The full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `len` hex digits.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ref with its name and target OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// The full ref name
    pub name: String,
    /// The OID the ref points to
    pub oid: Oid,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::FixedOffset>,
}

/// An opened repository.
///
/// Only this module touches `git2`; subcommands go through these methods.
pub struct Repo {
    repo: git2::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("git_dir", &self.repo.path())
            .field("work_dir", &self.repo.workdir())
            .finish()
    }
}

impl Repo {
    // =========================================================================
    // Opening and Creation
    // =========================================================================

    /// Open the repository whose git directory (or work tree root) is exactly `path`.
    ///
    /// No upward search is performed.
    pub(crate) fn open_exact(path: &Path, ceilings: &[PathBuf]) -> Result<Self, GitError> {
        let repo = git2::Repository::open_ext(path, git2::RepositoryOpenFlags::NO_SEARCH, ceilings)
            .map_err(|e| Self::open_error(e, path))?;
        Ok(Self { repo })
    }

    /// Search `start` and its parents for a repository, stopping at `ceilings`.
    pub(crate) fn discover(start: &Path, ceilings: &[PathBuf]) -> Result<Self, GitError> {
        let repo = git2::Repository::open_ext(start, git2::RepositoryOpenFlags::empty(), ceilings)
            .map_err(|e| Self::open_error(e, start))?;
        Ok(Self { repo })
    }

    fn open_error(err: git2::Error, path: &Path) -> GitError {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::NotARepo {
                path: path.to_path_buf(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", path.display(), err.message()),
            },
        }
    }

    /// Create a new repository at `path`.
    ///
    /// With `bare`, `path` itself becomes the git directory.
    pub fn init(path: &Path, bare: bool) -> Result<Self, GitError> {
        let result = if bare {
            git2::Repository::init_bare(path)
        } else {
            git2::Repository::init(path)
        };
        let repo = result.map_err(|e| GitError::Internal {
            message: format!("{}: {}", path.display(), e.message()),
        })?;
        Ok(Self { repo })
    }

    /// Create a new repository whose git directory is exactly `git_dir` and
    /// whose working tree is `work_tree`.
    ///
    /// The working tree is recorded in `core.worktree`; no `.git` link file
    /// is written into it.
    pub fn init_separate(git_dir: &Path, work_tree: &Path) -> Result<Self, GitError> {
        let internal = |path: &Path, e: git2::Error| GitError::Internal {
            message: format!("{}: {}", path.display(), e.message()),
        };

        std::fs::create_dir_all(work_tree).map_err(|e| GitError::AccessError {
            message: format!("{}: {}", work_tree.display(), e),
        })?;
        let work_tree_str = work_tree.to_str().ok_or_else(|| GitError::AccessError {
            message: format!("{}: path is not valid UTF-8", work_tree.display()),
        })?;

        let repo = git2::Repository::init_bare(git_dir).map_err(|e| internal(git_dir, e))?;
        let mut config = repo
            .config()
            .and_then(|config| config.open_level(git2::ConfigLevel::Local))
            .map_err(|e| internal(git_dir, e))?;
        config
            .set_bool("core.bare", false)
            .and_then(|()| config.set_str("core.worktree", work_tree_str))
            .map_err(|e| internal(git_dir, e))?;

        repo.set_workdir(work_tree, false)
            .map_err(|e| internal(work_tree, e))?;
        Ok(Self { repo })
    }

    /// Use `work_tree` as the working directory of this repository.
    pub(crate) fn set_work_tree(&self, work_tree: &Path) -> Result<(), GitError> {
        self.repo
            .set_workdir(work_tree, false)
            .map_err(|e| GitError::Internal {
                message: format!("{}: {}", work_tree.display(), e.message()),
            })
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// The git directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The working directory, `None` for bare repositories.
    pub fn work_dir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Whether the repository has no working directory.
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    // =========================================================================
    // Revisions and Refs
    // =========================================================================

    /// Resolve a revision expression (`HEAD`, `main~2`, an abbreviated id, ...).
    pub fn resolve(&self, revision: &str) -> Result<Oid, GitError> {
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|e| GitError::from_git2(e, revision))?;
        Ok(Oid::from_git2(object.id()))
    }

    /// The commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnbornHead`] if HEAD is unborn (new repository)
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(Oid::from_git2(commit.id()))
    }

    /// All refs with their direct or peeled target, sorted by name.
    pub fn list_refs(&self) -> Result<Vec<RefEntry>, GitError> {
        let mut entries = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;

            let name = match reference.name() {
                Some(n) => n.to_string(),
                None => continue, // Skip refs with non-UTF8 names
            };

            let oid = match reference.resolve().ok().and_then(|r| r.target()) {
                Some(oid) => oid,
                None => continue,
            };

            entries.push(RefEntry {
                name,
                oid: Oid::from_git2(oid),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Get information about a commit.
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let commit = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let when = author.when();
        let offset = chrono::FixedOffset::east_opt(when.offset_minutes() * 60)
            .unwrap_or_else(|| chrono::Utc.fix());
        let author_time = chrono::DateTime::from_timestamp(when.seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&offset);

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
        })
    }

    /// Commits reachable from `start`, newest first, at most `limit` of them.
    pub fn walk(&self, start: &Oid, limit: Option<usize>) -> Result<Vec<CommitInfo>, GitError> {
        let git_oid = git2::Oid::from_str(start.as_str())
            .map_err(|e| GitError::from_git2(e, start.as_str()))?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk
            .push(git_oid)
            .map_err(|e| GitError::from_git2(e, start.as_str()))?;

        let mut commits = Vec::new();
        for oid in revwalk {
            if limit.is_some_and(|n| commits.len() >= n) {
                break;
            }
            commits.push(self.commit_info(&Oid::from_git2(oid?))?);
        }
        Ok(commits)
    }
}
