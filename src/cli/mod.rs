//! Command-line interface for the clientlib resolver.
//!
//! The `clientlib` binary runs the resolution engine against a content fixture so
//! overrides, library folders and category patterns can be checked without a host
//! repository.
//!
//! # Commands
//!
//! - `resolve` - Resolve include paths, categories and the page link
//! - `validate` - Check the configuration and, optionally, a content fixture
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Disable logging
//! - `--config <path>` - Resolver configuration file (also `CLIENTLIB_CONFIG`)
//!
//! # Examples
//!
//! ```bash
//! clientlib resolve --content site.toml --page /content/site/en --selector amp \
//!     --page-content /content/site/en/jcr:content
//! clientlib --config resolver.toml validate --content site.toml
//! RUST_LOG=clientlib_resolver=trace clientlib resolve --content site.toml --type site/components/teaser
//! ```

mod resolve;
mod validate;

pub use resolve::ResolveCommand;
pub use validate::ValidateCommand;

use crate::config::ResolverConfig;
use crate::constants::CONFIG_PATH_ENV;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format shared by the subcommands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    Text,
    /// Pretty-printed JSON for scripts.
    Json,
}

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging.
    pub log_level: Option<String>,

    /// Resolver configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a configuration with logging disabled and default resolver settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the level derived from the flags. Logs go to stderr so
    /// JSON output stays parseable.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Client library resolution diagnostics.
#[derive(Parser)]
#[command(
    name = "clientlib",
    about = "Resolve headlib overrides and client library categories for alternate page renderings",
    version,
    long_about = "Runs the clientlib resolver against a TOML content fixture and prints the include paths, categories and page link it would produce."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging entirely.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the resolver configuration file.
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve include paths and categories for component types or a page.
    Resolve(ResolveCommand),

    /// Validate the resolver configuration and a content fixture.
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the content fixture cannot be loaded.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the content fixture cannot be loaded.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let resolver_config = ResolverConfig::load_or_default(config.config_path.as_deref())?;

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(resolver_config).await,
            Commands::Validate(cmd) => cmd.execute(&resolver_config),
        }
    }
}
