//! Core types shared by every module: the error taxonomy and its CLI presentation.

pub mod error;

pub use error::{ErrorContext, ResolverError, user_friendly_error};
