//! Bounded pool of elevated sessions over a shared repository view.

use super::{ScopedSession, SessionFactory};
use crate::constants::DEFAULT_SESSION_POOL_CAPACITY;
use crate::content::{ContentTree, TypeRegistry};
use crate::core::ResolverError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Hands out at most `capacity` sessions at a time.
///
/// Acquisition never blocks: when every slot is taken the request fails with
/// [`ResolverError::SessionUnavailable`] and the caller degrades instead of stalling
/// the render.
pub struct SessionPool {
    tree: Arc<dyn ContentTree>,
    types: Arc<dyn TypeRegistry>,
    capacity: usize,
    in_use: Arc<AtomicUsize>,
}

impl SessionPool {
    /// Create a pool over `tree` and `types` with room for `capacity` sessions.
    pub fn new(tree: Arc<dyn ContentTree>, types: Arc<dyn TypeRegistry>, capacity: usize) -> Self {
        Self {
            tree,
            types,
            capacity,
            in_use: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a pool with the default capacity.
    pub fn with_default_capacity(tree: Arc<dyn ContentTree>, types: Arc<dyn TypeRegistry>) -> Self {
        Self::new(tree, types, DEFAULT_SESSION_POOL_CAPACITY)
    }

    /// Number of sessions currently borrowed.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Maximum number of concurrent sessions.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn try_reserve(&self) -> bool {
        self.in_use
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < self.capacity).then_some(current + 1)
            })
            .is_ok()
    }
}

impl SessionFactory for SessionPool {
    fn acquire_scoped_session(&self, purpose: &str) -> Result<ScopedSession, ResolverError> {
        if !self.try_reserve() {
            debug!("Session pool exhausted ({} in use) for '{}'", self.capacity, purpose);
            return Err(ResolverError::SessionUnavailable {
                purpose: purpose.to_string(),
                reason: format!("all {} sessions are in use", self.capacity),
            });
        }

        trace!("Borrowed session for '{}' ({} in use)", purpose, self.in_use());
        let in_use = Arc::clone(&self.in_use);
        Ok(ScopedSession::new(
            purpose,
            Arc::clone(&self.tree),
            Arc::clone(&self.types),
            move || {
                in_use.fetch_sub(1, Ordering::SeqCst);
            },
        ))
    }
}
