//! Validate the resolver configuration and a content fixture.
//!
//! Checks that the depth limits and script name are usable, that the category
//! pattern compiles, and, with `--content`, that the fixture parses.
//!
//! ```bash
//! clientlib --config resolver.toml validate --content site.toml
//! clientlib validate --format json
//! ```

use super::OutputFormat;
use crate::config::ResolverConfig;
use crate::content::{LibraryRegistry, MemoryContent};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments of `clientlib validate`.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Content fixture to check as well.
    #[arg(long, value_name = "FILE")]
    pub content: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    config: &'a ResolverConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    libraries: Option<usize>,
}

impl ValidateCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn execute(self, config: &ResolverConfig) -> Result<()> {
        config.validate()?;

        let content = self.content.as_deref().map(MemoryContent::load).transpose()?;
        let nodes = content.as_ref().map(MemoryContent::node_count);
        let libraries = content.as_ref().map(|content| content.snapshot_libraries().len());

        match self.format {
            OutputFormat::Json => {
                let report = ValidationReport {
                    valid: true,
                    config,
                    nodes,
                    libraries,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                println!("{} Configuration is valid", "✓".green());
                println!("  Category pattern: {}", config.clientlib_regex);
                println!("  Headlib script: {}", config.headlib_include_script);
                if let (Some(nodes), Some(libraries)) = (nodes, libraries) {
                    println!(
                        "{} Content fixture is valid ({} nodes, {} libraries)",
                        "✓".green(),
                        nodes,
                        libraries
                    );
                }
            }
        }

        Ok(())
    }
}
