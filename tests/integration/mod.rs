//! Integration test suite for clientlib-resolver
//!
//! End-to-end tests that drive the resolver, the page model and the `clientlib`
//! binary against TOML content fixtures.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: override lookup, library folder collection and filtering
//! - **concurrency**: the fork-join path, session release and cancellation
//! - **page_render**: alternate modes, selectors and page links
//! - **cli**: the `resolve` and `validate` commands

mod concurrency;
mod page_render;
mod resolution;
