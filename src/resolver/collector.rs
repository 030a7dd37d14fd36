//! Depth-first discovery of library folders below a component root.
//!
//! Content trees have no depth bound and may reference themselves (aliases, links),
//! so the traversal uses an explicit stack, remembers every path it has queued in the
//! current traversal, and stops descending at `max_traversal_depth`. Hitting the
//! ceiling is a truncation, logged at debug level and reported in the outcome; it is
//! never an error. Cancellation is checked before every node.
//!
//! The same traversal drives [`collect_component_types`], which enumerates the
//! component types used on a page.

use super::cancel::CancellationFlag;
use crate::content::{ContentTree, Node};
use crate::core::ResolverError;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Counters for one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Nodes handed to the visitor.
    pub visited: usize,
    /// Whether the depth ceiling cut off part of the tree.
    pub truncated: bool,
}

/// Library folders found below one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOutcome {
    /// Paths of nodes whose type is the library folder marker.
    pub folders: HashSet<String>,
    /// Whether the depth ceiling cut off part of the tree.
    pub truncated: bool,
    /// Whether cancellation stopped the walk before the tree was exhausted.
    pub cancelled: bool,
}

/// Bounded, cycle-safe subtree traversal.
pub struct SubtreeCollector<'a> {
    tree: &'a dyn ContentTree,
    marker_type: &'a str,
    max_depth: usize,
    cancel: &'a CancellationFlag,
}

impl<'a> SubtreeCollector<'a> {
    /// Create a collector reading through `tree`.
    ///
    /// `marker_type` is the node type identifying library folders; `max_depth` is the
    /// deepest level below the root that is still visited.
    pub fn new(
        tree: &'a dyn ContentTree,
        marker_type: &'a str,
        max_depth: usize,
        cancel: &'a CancellationFlag,
    ) -> Self {
        Self {
            tree,
            marker_type,
            max_depth,
            cancel,
        }
    }

    /// Paths of every library folder reachable from `root_path` without revisiting a path.
    ///
    /// A missing root yields an empty outcome. Ordering is not meaningful. Cancellation
    /// stops the walk; folders found up to that point are kept and `cancelled` is set.
    pub fn collect_library_folders(&self, root_path: &str) -> CollectOutcome {
        let mut folders = HashSet::new();
        let walked = self.walk(root_path, |node| {
            if node.type_id == self.marker_type {
                trace!("Library folder at {}", node.path);
                folders.insert(node.path.clone());
            }
        });

        match walked {
            Ok(stats) => CollectOutcome {
                folders,
                truncated: stats.truncated,
                cancelled: false,
            },
            Err(_) => CollectOutcome {
                folders,
                truncated: false,
                cancelled: true,
            },
        }
    }

    /// Visit every node reachable from `root_path`, the root included, once each.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Cancelled`] if cancellation is requested mid-walk.
    pub fn walk<F>(&self, root_path: &str, mut visit: F) -> Result<WalkStats, ResolverError>
    where
        F: FnMut(&Node),
    {
        let mut stats = WalkStats::default();
        let Some(root) = self.tree.get_node(root_path) else {
            trace!("Traversal root {} does not exist", root_path);
            return Ok(stats);
        };

        let mut queued: HashSet<String> = HashSet::new();
        queued.insert(root.path.clone());
        let mut stack: Vec<(Node, usize)> = vec![(root, 0)];

        while let Some((node, depth)) = stack.pop() {
            if self.cancel.is_cancelled() {
                debug!("Traversal of {} cancelled after {} nodes", root_path, stats.visited);
                return Err(ResolverError::Cancelled);
            }

            visit(&node);
            stats.visited += 1;

            let children = self.tree.get_children(&node.path);
            if depth >= self.max_depth {
                if children.iter().any(|child| !queued.contains(&child.path)) {
                    debug!(
                        "Traversal of {} truncated at {} (depth limit {})",
                        root_path, node.path, self.max_depth
                    );
                    stats.truncated = true;
                }
                continue;
            }

            // Reverse so children are visited in the order the tree returned them.
            for child in children.into_iter().rev() {
                if queued.insert(child.path.clone()) {
                    stack.push((child, depth + 1));
                } else {
                    trace!("Skipping already visited {}", child.path);
                }
            }
        }

        Ok(stats)
    }
}

/// Distinct component types used below `content_root`, in first-seen order.
///
/// Namespaced node types (`nt:unstructured`, `cq:ClientLibraryFolder`) are structural,
/// not component types, and are skipped.
///
/// # Errors
///
/// Returns [`ResolverError::Cancelled`] if cancellation is requested mid-walk.
pub fn collect_component_types(
    tree: &dyn ContentTree,
    content_root: &str,
    max_depth: usize,
    cancel: &CancellationFlag,
) -> Result<Vec<String>, ResolverError> {
    let collector = SubtreeCollector::new(tree, "", max_depth, cancel);
    let mut seen = HashSet::new();
    let mut types = Vec::new();

    collector.walk(content_root, |node| {
        if node.type_id.contains(':') {
            return;
        }
        if seen.insert(node.type_id.clone()) {
            types.push(node.type_id.clone());
        }
    })?;

    debug!("Found {} component types below {}", types.len(), content_root);
    Ok(types)
}
