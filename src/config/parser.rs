//! Generic TOML parsing with file path context.
//!
//! Used for the resolver configuration and for content fixtures. Errors keep the
//! underlying I/O or TOML failure as their cause and name the file involved:
//!
//! ```text
//! Failed to parse config file: /path/to/clientlib.toml
//! Caused by:
//!     invalid type: string "x", expected usize
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into any `DeserializeOwned` type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use clientlib_resolver::config::{ResolverConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: ResolverConfig = parse_config(Path::new("clientlib.toml"))?;
/// println!("Filtering categories with {}", config.clientlib_regex);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
