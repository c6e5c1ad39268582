//! core::env
//!
//! Environment access for configuration and repository discovery.
//!
//! Code that consults environment variables, the working directory, or the
//! home directory takes an [`Environment`] so tests can supply a fixed view
//! instead of mutating the process environment.

use std::collections::HashMap;
use std::path::PathBuf;

/// A read-only view of the process environment.
pub trait Environment {
    /// Value of an environment variable, if set and valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;

    /// The directory discovery starts from.
    fn current_dir(&self) -> Option<PathBuf>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// A fixed environment backed by a map.
///
/// # Example
///
/// ```
/// use gitpgm::core::env::{Environment, MapEnv};
///
/// let env = MapEnv::new("/work").with_var("GIT_DIR", "/work/.git");
/// assert_eq!(env.var("GIT_DIR").as_deref(), Some("/work/.git"));
/// assert!(env.var("GIT_WORK_TREE").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    cwd: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl MapEnv {
    /// Create an environment with no variables, rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            cwd: Some(cwd.into()),
            home: None,
        }
    }

    /// Set a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the home directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.cwd.clone()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
