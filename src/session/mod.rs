//! Scoped, elevated read sessions.
//!
//! Component declarations that hold headlib overrides are usually not readable by the
//! user rendering the page. The resolver borrows an elevated session for those reads.
//! Sessions come from a bounded pool in the host, so a session that is never returned
//! is a leak.
//!
//! [`ScopedSession`] releases its slot when dropped, the same way a file lock guard
//! unlocks on drop. Early returns, `?` propagation, cancellation and panics all run
//! `Drop`, so every exit path gives the session back.
//!
//! ```rust,no_run
//! use clientlib_resolver::session::{SessionFactory, SessionPool};
//! use clientlib_resolver::content::{ContentTree, MemoryContent};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let content = Arc::new(MemoryContent::new());
//! let pool = SessionPool::new(content.clone(), content, 4);
//!
//! {
//!     let session = pool.acquire_scoped_session("clientlibs-service")?;
//!     let _ = session.tree().get_node("core/components/teaser");
//! } // released here
//!
//! assert_eq!(pool.in_use(), 0);
//! # Ok(())
//! # }
//! ```

mod pool;

pub use pool::SessionPool;

use crate::content::{ContentTree, TypeRegistry};
use crate::core::ResolverError;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Source of scoped elevated sessions.
pub trait SessionFactory: Send + Sync {
    /// Borrow a session for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::SessionUnavailable`] when no session can be handed out.
    fn acquire_scoped_session(&self, purpose: &str) -> Result<ScopedSession, ResolverError>;
}

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// A borrowed session, released on drop.
///
/// `Send + Sync`, so one session can be shared behind an `Arc` by several workers and is
/// released when the last of them lets go.
pub struct ScopedSession {
    purpose: String,
    tree: Arc<dyn ContentTree>,
    types: Arc<dyn TypeRegistry>,
    release: Option<ReleaseFn>,
}

impl ScopedSession {
    /// Wrap a view of the repository; `release` runs exactly once when the session drops.
    pub fn new(
        purpose: impl Into<String>,
        tree: Arc<dyn ContentTree>,
        types: Arc<dyn TypeRegistry>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            purpose: purpose.into(),
            tree,
            types,
            release: Some(Box::new(release)),
        }
    }

    /// The purpose the session was borrowed for.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Content as seen through this session.
    pub fn tree(&self) -> &dyn ContentTree {
        self.tree.as_ref()
    }

    /// Type registry as seen through this session.
    pub fn types(&self) -> &dyn TypeRegistry {
        self.types.as_ref()
    }
}

impl fmt::Debug for ScopedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedSession")
            .field("purpose", &self.purpose)
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            trace!("Releasing scoped session for '{}'", self.purpose);
            release();
        }
    }
}
