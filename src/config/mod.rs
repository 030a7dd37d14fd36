//! Configuration for the clientlib resolver.
//!
//! The engine is driven by a single [`ResolverConfig`]. It can be built in code,
//! taken from defaults, or loaded from a TOML file:
//!
//! ```toml
//! # clientlib.toml
//! headlib_include_script = "customheadlibs.amp.html"
//! clientlib_regex = '.*\.amp'
//! library_folder_type = "cq:ClientLibraryFolder"
//! session_subservice = "clientlibs-service"
//! max_chain_depth = 64
//! max_traversal_depth = 256
//! elevated_subtree_reads = false
//! ```
//!
//! Every key is optional. A missing key takes the default from [`crate::constants`].
//!
//! # Location Priority
//!
//! The CLI looks for a configuration file in this order:
//!
//! 1. `--config <path>`
//! 2. `CLIENTLIB_CONFIG` environment variable
//! 3. Built-in defaults
//!
//! Note that `clientlib_regex` is not validated here beyond [`ResolverConfig::validate`]
//! reporting it: an invalid pattern is tolerated at resolution time (fail-open), so a
//! broken configuration degrades asset filtering rather than breaking renders.

mod parser;

pub use parser::parse_config;

use crate::constants::{
    CLIENT_LIBRARY_FOLDER_TYPE, CONFIG_PATH_ENV, DEFAULT_CLIENTLIB_REGEX,
    DEFAULT_HEADLIB_INCLUDE_SCRIPT, DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_MAX_TRAVERSAL_DEPTH,
    DEFAULT_SESSION_SUBSERVICE,
};
use crate::core::ResolverError;
use crate::resolver::CategoryFilter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings for one resolver instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Script name looked up below each component type to find a headlib override.
    pub headlib_include_script: String,

    /// Full-match pattern a category must satisfy to be included.
    pub clientlib_regex: String,

    /// Node type that marks a client library folder.
    pub library_folder_type: String,

    /// Purpose string passed when borrowing the elevated read session.
    pub session_subservice: String,

    /// Hop limit for the type hierarchy walk.
    pub max_chain_depth: usize,

    /// Depth limit for subtree traversal below a component root.
    pub max_traversal_depth: usize,

    /// Read component subtrees through an elevated session instead of the caller's view.
    pub elevated_subtree_reads: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            headlib_include_script: DEFAULT_HEADLIB_INCLUDE_SCRIPT.to_string(),
            clientlib_regex: DEFAULT_CLIENTLIB_REGEX.to_string(),
            library_folder_type: CLIENT_LIBRARY_FOLDER_TYPE.to_string(),
            session_subservice: DEFAULT_SESSION_SUBSERVICE.to_string(),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_traversal_depth: DEFAULT_MAX_TRAVERSAL_DEPTH,
            elevated_subtree_reads: false,
        }
    }
}

impl ResolverConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// [`validate`](Self::validate) rejects a limit.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate_limits()?;
        debug!("Loaded resolver configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path, then `CLIENTLIB_CONFIG`, then fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file exists but is invalid.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        match path {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Override the category pattern.
    #[must_use]
    pub fn with_clientlib_regex(mut self, pattern: impl Into<String>) -> Self {
        self.clientlib_regex = pattern.into();
        self
    }

    /// Override the headlib override script name.
    #[must_use]
    pub fn with_headlib_include_script(mut self, script: impl Into<String>) -> Self {
        self.headlib_include_script = script.into();
        self
    }

    /// Override the hop limit of the hierarchy walker.
    #[must_use]
    pub const fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Override the depth limit of the subtree collector.
    #[must_use]
    pub const fn with_max_traversal_depth(mut self, depth: usize) -> Self {
        self.max_traversal_depth = depth;
        self
    }

    /// Read component subtrees through an elevated session.
    #[must_use]
    pub const fn with_elevated_subtree_reads(mut self, elevated: bool) -> Self {
        self.elevated_subtree_reads = elevated;
        self
    }

    /// Check every setting, including whether the category pattern compiles.
    ///
    /// Resolution itself tolerates a broken pattern; this is what `clientlib validate`
    /// reports so the problem is caught before it reaches a render.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ResolverError> {
        self.validate_limits()?;
        CategoryFilter::new(&self.clientlib_regex)?;
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), ResolverError> {
        if self.max_chain_depth == 0 {
            return Err(ResolverError::ConfigError {
                message: "max_chain_depth must be greater than zero".to_string(),
            });
        }
        if self.max_traversal_depth == 0 {
            return Err(ResolverError::ConfigError {
                message: "max_traversal_depth must be greater than zero".to_string(),
            });
        }
        let script = self.headlib_include_script.trim_matches('/');
        if script.is_empty() {
            return Err(ResolverError::ConfigError {
                message: "headlib_include_script must not be empty".to_string(),
            });
        }
        if self.library_folder_type.is_empty() {
            return Err(ResolverError::ConfigError {
                message: "library_folder_type must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The override script as a path relative to a type, without leading slashes.
    pub fn headlib_relative_path(&self) -> &str {
        self.headlib_include_script.trim_start_matches('/')
    }
}
