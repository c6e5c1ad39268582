//! git::locator
//!
//! Repository resolution for `--git-dir` and the environment.
//!
//! # Resolution Order
//!
//! 1. An explicit path (the `--git-dir` option) pins the git directory.
//! 2. Otherwise `GIT_DIR` pins it.
//! 3. Otherwise the start directory and its parents are searched, stopping
//!    at any directory listed in `GIT_CEILING_DIRECTORIES`.
//!
//! `GIT_WORK_TREE`, when set, overrides the working directory of whatever
//! repository was found. A pinned git directory is opened as-is and never
//! searched upward from. Relative pinned paths are taken relative to the
//! start directory.
//!
//! # Example
//!
//! ```no_run
//! use gitpgm::core::env::ProcessEnv;
//! use gitpgm::git::RepositoryLocator;
//!
//! let repo = RepositoryLocator::new(Some("/srv/project.git"))
//!     .read_environment(&ProcessEnv)
//!     .open()?;
//! println!("{}", repo.git_dir().display());
//! # Ok::<(), gitpgm::git::GitError>(())
//! ```

use std::path::{Path, PathBuf};

use super::interface::{GitError, Repo};
use crate::core::env::Environment;

/// Environment variable naming the git directory.
pub const GIT_DIR: &str = "GIT_DIR";
/// Environment variable naming the working tree.
pub const GIT_WORK_TREE: &str = "GIT_WORK_TREE";
/// Environment variable listing directories discovery must not ascend past.
pub const GIT_CEILING_DIRECTORIES: &str = "GIT_CEILING_DIRECTORIES";

/// Builder that collects where to look for a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryLocator {
    git_dir: Option<PathBuf>,
    work_tree: Option<PathBuf>,
    ceilings: Vec<PathBuf>,
    start: Option<PathBuf>,
}

impl RepositoryLocator {
    /// Seed the locator with an explicit git directory, if any.
    pub fn new(explicit: Option<impl AsRef<Path>>) -> Self {
        Self {
            git_dir: explicit.map(|p| p.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Fill in everything not already set from `env`.
    ///
    /// An explicit git directory is never replaced by `GIT_DIR`.
    pub fn read_environment(mut self, env: &dyn Environment) -> Self {
        if self.git_dir.is_none() {
            self.git_dir = non_empty(env.var(GIT_DIR)).map(PathBuf::from);
        }
        if self.work_tree.is_none() {
            self.work_tree = non_empty(env.var(GIT_WORK_TREE)).map(PathBuf::from);
        }
        if self.ceilings.is_empty() {
            if let Some(value) = env.var(GIT_CEILING_DIRECTORIES) {
                self.ceilings = std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect();
            }
        }
        if self.start.is_none() {
            self.start = env.current_dir();
        }
        self
    }

    /// Start discovery from `dir` instead of the current directory.
    pub fn start_from(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start = Some(dir.into());
        self
    }

    /// The pinned git directory, if any.
    pub fn git_dir(&self) -> Option<&Path> {
        self.git_dir.as_deref()
    }

    /// The pinned working tree, if any.
    pub fn work_tree(&self) -> Option<&Path> {
        self.work_tree.as_deref()
    }

    /// Ceiling directories for upward discovery.
    pub fn ceilings(&self) -> &[PathBuf] {
        &self.ceilings
    }

    /// Open the repository this locator describes.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is at the pinned location
    ///   or none was discovered
    /// - [`GitError::Internal`] if a repository was found but could not be opened
    pub fn open(&self) -> Result<Repo, GitError> {
        let repo = match (self.git_dir.as_deref(), &self.start) {
            (Some(git_dir), _) => {
                let git_dir = self.anchored(git_dir);
                if !git_dir.exists() {
                    return Err(GitError::NotARepo { path: git_dir });
                }
                tracing::debug!(git_dir = %git_dir.display(), "opening pinned repository");
                Repo::open_exact(&git_dir, &self.ceilings)?
            }
            (None, Some(start)) => {
                tracing::debug!(start = %start.display(), "discovering repository");
                Repo::discover(start, &self.ceilings)?
            }
            (None, None) => {
                return Err(GitError::NotARepo {
                    path: PathBuf::from("."),
                })
            }
        };

        if let Some(work_tree) = &self.work_tree {
            repo.set_work_tree(&self.anchored(work_tree))?;
        }

        Ok(repo)
    }

    /// Resolve a relative path against the start directory.
    fn anchored(&self, path: &Path) -> PathBuf {
        match &self.start {
            Some(start) if path.is_relative() => start.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::MapEnv;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_over_environment() {
        let env = MapEnv::new("/work").with_var(GIT_DIR, "/from/env");
        let locator = RepositoryLocator::new(Some("/explicit")).read_environment(&env);

        assert_eq!(locator.git_dir(), Some(Path::new("/explicit")));
    }

    #[test]
    fn environment_fills_gaps() {
        let env = MapEnv::new("/work")
            .with_var(GIT_DIR, "/from/env")
            .with_var(GIT_WORK_TREE, "/tree");
        let locator = RepositoryLocator::new(None::<&str>).read_environment(&env);

        assert_eq!(locator.git_dir(), Some(Path::new("/from/env")));
        assert_eq!(locator.work_tree(), Some(Path::new("/tree")));
    }

    #[test]
    fn empty_variables_are_ignored() {
        let env = MapEnv::new("/work").with_var(GIT_DIR, "");
        let locator = RepositoryLocator::new(None::<&str>).read_environment(&env);

        assert!(locator.git_dir().is_none());
    }

    #[test]
    fn ceilings_are_split() {
        let joined = std::env::join_paths(["/a", "/b"]).unwrap();
        let env = MapEnv::new("/work")
            .with_var(GIT_CEILING_DIRECTORIES, joined.to_str().unwrap());
        let locator = RepositoryLocator::new(None::<&str>).read_environment(&env);

        assert_eq!(
            locator.ceilings(),
            &[PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn missing_explicit_dir_is_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = RepositoryLocator::new(Some(&missing)).open().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn discovers_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        git2::Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let env = MapEnv::new(&nested);
        let repo = RepositoryLocator::new(None::<&str>)
            .read_environment(&env)
            .open()
            .unwrap();

        assert_eq!(
            repo.work_dir().unwrap().canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn relative_paths_resolve_against_start() {
        let temp = TempDir::new().unwrap();
        git2::Repository::init(temp.path().join("project")).unwrap();
        let tree = temp.path().join("tree");
        std::fs::create_dir_all(&tree).unwrap();

        let env = MapEnv::new(temp.path())
            .with_var(GIT_DIR, "project/.git")
            .with_var(GIT_WORK_TREE, "tree");
        let repo = RepositoryLocator::new(None::<&str>)
            .read_environment(&env)
            .open()
            .unwrap();

        assert_eq!(
            repo.git_dir().canonicalize().unwrap(),
            temp.path().join("project/.git").canonicalize().unwrap()
        );
        assert_eq!(
            repo.work_dir().unwrap().canonicalize().unwrap(),
            tree.canonicalize().unwrap()
        );
    }

    #[test]
    fn ceiling_stops_discovery() {
        let temp = TempDir::new().unwrap();
        git2::Repository::init(temp.path()).unwrap();
        let ceiling = temp.path().join("outer");
        let nested = ceiling.join("inner");
        std::fs::create_dir_all(&nested).unwrap();

        let env = MapEnv::new(&nested)
            .with_var(GIT_CEILING_DIRECTORIES, ceiling.to_str().unwrap());
        let err = RepositoryLocator::new(None::<&str>)
            .read_environment(&env)
            .open()
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
