//! Test utilities for the clientlib resolver
//!
//! Helpers shared by unit tests and the integration suite:
//! - once-only logging setup that plays well with the test harness
//! - a realistic site fixture with overrides, super types and library folders
//! - fixture files on disk for CLI tests
//!
//! # Example
//!
//! ```rust,no_run
//! use clientlib_resolver::test_utils::{init_test_logging, site_content};
//!
//! init_test_logging(None);
//! let content = site_content();
//! assert!(content.node_count() > 0);
//! ```

pub mod fixtures;

pub use fixtures::{FixtureFile, SITE_FIXTURE, site_content, type_chain};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise `RUST_LOG`,
/// otherwise stays silent.
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=clientlib_resolver=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
