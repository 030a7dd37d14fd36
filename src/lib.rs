//! clientlib-resolver - headlib and client library resolution for alternate page renderings
//!
//! When a page is rendered in its alternate (AMP) representation, the document head
//! needs two kinds of assets from the components on the page:
//!
//! - **Headlib overrides**: a component type, or the nearest of its super types, may
//!   ship a script (`customheadlibs.amp.html` by default) that replaces the standard
//!   head includes. Each override is included once.
//! - **Client library categories**: library folders below each component declaration
//!   carry categories; those that fully match a pattern (`.*\.amp` by default) are
//!   loaded.
//!
//! Resolution is advisory. A missing override, an unregistered library folder, a
//! cyclic type chain, an over-deep tree, a failed session, or a bad pattern never
//! fails a render; each degrades the result and is reported as a
//! [`ResolutionWarning`](resolver::ResolutionWarning).
//!
//! # Core Modules
//!
//! - [`resolver`] - hierarchy walker, subtree collector, category filter, and the
//!   [`ClientlibResolver`](resolver::ClientlibResolver) that ties them together
//! - [`page`] - alternate modes, request selectors and the page `<link>`
//! - [`content`] - traits for the content tree, type registry and library registry,
//!   plus a TOML-backed in-memory implementation
//! - [`session`] - scoped elevated sessions released on drop, and a bounded pool
//! - [`config`] - resolver settings loaded from TOML
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - the `clientlib` diagnostic command
//!
//! # Example
//!
//! ```rust,no_run
//! use clientlib_resolver::config::ResolverConfig;
//! use clientlib_resolver::content::MemoryContent;
//! use clientlib_resolver::resolver::{CancellationFlag, ClientlibResolver, ResolutionRequest};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let content = Arc::new(MemoryContent::load(Path::new("site.toml"))?);
//! let resolver = ClientlibResolver::from_repository(content, ResolverConfig::default());
//!
//! let request = ResolutionRequest::from_component_types(["site/components/teaser"]);
//! let result = resolver.resolve(&request, &CancellationFlag::new());
//!
//! for path in result.include_paths() {
//!     println!("include {path}");
//! }
//! for category in result.categories() {
//!     println!("category {category}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod content;
pub mod core;
pub mod page;
pub mod resolver;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
