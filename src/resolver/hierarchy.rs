//! Nearest-ancestor override lookup over the component type hierarchy.
//!
//! Given a type and a relative path (the headlib override script), the walker checks
//! `type/relative` and, when nothing is there, moves to the type's parent and tries
//! again. The parent chain comes from an external [`TypeRegistry`] that guarantees
//! nothing about cycles, so the walk is an explicit loop bounded two ways:
//!
//! - a hop counter capped at `max_chain_depth`
//! - a per-walk set of visited types, which ends a cycle as soon as it closes
//!
//! Both outcomes mean "no override" for the caller.
//!
//! # Examples
//!
//! ```rust
//! use clientlib_resolver::content::MemoryContent;
//! use clientlib_resolver::resolver::{CancellationFlag, HierarchyWalker, OverrideLookup};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut content = MemoryContent::new();
//! content.add_node("/libs/core/teaser", "cq:Component")?;
//! content.add_node("/libs/core/teaser/customheadlibs.amp.html", "nt:file")?;
//! content.add_node("/apps/site/teaser", "cq:Component")?;
//! content.set_super_type("/apps/site/teaser", "core/teaser")?;
//!
//! let cancel = CancellationFlag::new();
//! let walker = HierarchyWalker::new(&content, &content, 64, &cancel);
//!
//! // The site teaser has no override of its own and inherits the core one.
//! assert_eq!(
//!     walker.resolve_override("site/teaser", "customheadlibs.amp.html").as_deref(),
//!     Some("/libs/core/teaser/customheadlibs.amp.html"),
//! );
//! assert_eq!(walker.lookup("site/title", "customheadlibs.amp.html"), OverrideLookup::NotFound);
//! # Ok(())
//! # }
//! ```

use super::cancel::CancellationFlag;
use crate::content::{ContentTree, TypeRegistry, join_path};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Outcome of one override lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideLookup {
    /// An override exists at this absolute path.
    Found(String),
    /// The chain ended without an override.
    NotFound,
    /// The hop limit was reached before the chain ended.
    ChainTooDeep,
    /// The chain revisited a type.
    Cycle {
        /// The type that was reached a second time
        type_id: String,
    },
    /// The walk was cancelled.
    Cancelled,
}

impl OverrideLookup {
    /// The override path, if one was found.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Walks type chains looking for an override resource.
pub struct HierarchyWalker<'a> {
    tree: &'a dyn ContentTree,
    types: &'a dyn TypeRegistry,
    max_chain_depth: usize,
    cancel: &'a CancellationFlag,
}

impl<'a> HierarchyWalker<'a> {
    /// Create a walker reading through `tree` and `types`.
    pub fn new(
        tree: &'a dyn ContentTree,
        types: &'a dyn TypeRegistry,
        max_chain_depth: usize,
        cancel: &'a CancellationFlag,
    ) -> Self {
        Self {
            tree,
            types,
            max_chain_depth,
            cancel,
        }
    }

    /// Path of the nearest override for `type_id`, including `type_id` itself.
    ///
    /// "Not found" is a normal outcome, including when the chain is cyclic or too deep.
    pub fn resolve_override(&self, type_id: &str, relative_path: &str) -> Option<String> {
        match self.lookup(type_id, relative_path) {
            OverrideLookup::Found(path) => Some(path),
            _ => None,
        }
    }

    /// Like [`resolve_override`](Self::resolve_override), but says why nothing was found.
    pub fn lookup(&self, type_id: &str, relative_path: &str) -> OverrideLookup {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = type_id.to_string();
        let mut hops = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                debug!("Override lookup for {} cancelled after {} hops", type_id, hops);
                return OverrideLookup::Cancelled;
            }

            if !visited.insert(current.clone()) {
                debug!("Type chain of {} cycles back to {}", type_id, current);
                return OverrideLookup::Cycle {
                    type_id: current,
                };
            }

            let candidate = join_path(&current, relative_path);
            if let Some(node) = self.tree.get_node(&candidate) {
                trace!("Override for {} found at {} ({} hops)", type_id, node.path, hops);
                return OverrideLookup::Found(node.path);
            }

            let Some(parent) = self.types.get_parent(&current) else {
                trace!("No override in the type chain of {}", type_id);
                return OverrideLookup::NotFound;
            };

            hops += 1;
            if hops > self.max_chain_depth {
                debug!(
                    "Type chain of {} exceeds {} hops, giving up at {}",
                    type_id, self.max_chain_depth, current
                );
                return OverrideLookup::ChainTooDeep;
            }

            trace!("No override at {}, moving to super type {}", current, parent);
            current = parent;
        }
    }
}
