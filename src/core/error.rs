//! Error handling for the clientlib resolver
//!
//! Two layers, the same way the rest of the crate reports failures:
//! 1. [`ResolverError`] - strongly-typed failures raised by the engine and its collaborators
//! 2. [`ErrorContext`] - a wrapper adding a suggestion and details for CLI users
//!
//! Most resolver failures never leave the engine: asset resolution is advisory, so
//! [`ClientlibResolver::resolve`](crate::resolver::ClientlibResolver::resolve) turns
//! them into [`ResolutionWarning`](crate::resolver::ResolutionWarning)s and keeps
//! going. The typed errors surface directly only at the edges: configuration loading,
//! fixture parsing, and the individual building blocks (walker, collector, filter,
//! session acquisition) when they are used on their own.
//!
//! # Examples
//!
//! ```rust,no_run
//! use clientlib_resolver::core::{ResolverError, user_friendly_error};
//!
//! let error = ResolverError::SessionUnavailable {
//!     purpose: "clientlibs-service".to_string(),
//!     reason: "pool exhausted".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for resolver operations.
///
/// # Error Categories
///
/// - **Sessions**: [`SessionUnavailable`]
/// - **Configuration**: [`InvalidCategoryPattern`], [`ConfigError`]
/// - **Content**: [`FixtureError`]
/// - **Control flow**: [`Cancelled`]
///
/// [`SessionUnavailable`]: ResolverError::SessionUnavailable
/// [`InvalidCategoryPattern`]: ResolverError::InvalidCategoryPattern
/// [`ConfigError`]: ResolverError::ConfigError
/// [`FixtureError`]: ResolverError::FixtureError
/// [`Cancelled`]: ResolverError::Cancelled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// An elevated read session could not be borrowed.
    ///
    /// The branch of the resolution that needed the session yields nothing. This is
    /// logged at error level by the resolver because it silently degrades the set of
    /// assets the document will load.
    #[error("Unable to acquire a scoped session for '{purpose}': {reason}")]
    SessionUnavailable {
        /// The subservice or purpose the session was requested for
        purpose: String,
        /// Why the session factory refused the request
        reason: String,
    },

    /// The configured category pattern does not compile.
    #[error("Invalid category pattern '{pattern}': {reason}")]
    InvalidCategoryPattern {
        /// The pattern as configured
        pattern: String,
        /// The regex compiler's message
        reason: String,
    },

    /// Configuration values are out of range or inconsistent.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A content fixture is malformed.
    #[error("Invalid content fixture: {message}")]
    FixtureError {
        /// Description of what is wrong with the fixture
        message: String,
    },

    /// The enclosing request was aborted while a traversal was in flight.
    #[error("Resolution cancelled")]
    Cancelled,

    /// Catch-all used by [`user_friendly_error`] for foreign errors.
    #[error("{message}")]
    Other {
        /// The full error message
        message: String,
    },
}

/// Error wrapper carrying user-facing guidance.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying resolver error
    pub error: ResolverError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ResolverError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: message in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// [`ResolverError`]s get tailored suggestions; TOML and I/O errors get format or
/// filesystem hints; everything else keeps its full `anyhow` cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(resolver_error) = error.downcast_ref::<ResolverError>() {
        return create_error_context(resolver_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ResolverError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax: quoted keys, matching brackets, and string values")
        .with_details("The configuration or fixture file could not be parsed as TOML");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(ResolverError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check that the file exists and the path is correct");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ResolverError::Other {
        message,
    })
}

fn create_error_context(error: ResolverError) -> ErrorContext {
    match &error {
        ResolverError::SessionUnavailable {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the service user exists and the session pool is not exhausted")
            .with_details("Headlib overrides are read through an elevated session"),
        ResolverError::InvalidCategoryPattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix 'clientlib_regex' in the configuration; it is matched against whole category names")
            .with_details("With an invalid pattern every discovered category is included"),
        ResolverError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'clientlib validate' to check the configuration file"),
        ResolverError::FixtureError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Every [[nodes]] entry needs an absolute 'path' and a 'type'"),
        ResolverError::Cancelled | ResolverError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
