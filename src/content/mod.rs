//! Read-only views of the content repository the resolver consumes.
//!
//! The engine never owns content. It talks to three collaborators through traits:
//!
//! - [`ContentTree`] - node lookup, children, and declared type by path
//! - [`TypeRegistry`] - the parent (super type) of a component type
//! - [`LibraryRegistry`] - the client libraries known to the host, as a snapshot
//!
//! All three are `Send + Sync` so the resolver can fan work out to blocking threads.
//! [`memory::MemoryContent`] implements every trait over a TOML fixture.

pub mod memory;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

pub use memory::MemoryContent;

/// A position in the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Absolute, unique path of the node.
    pub path: String,
    /// Declared type of the node.
    pub type_id: String,
    /// Property map of the node.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Node {
    /// Create a node with no properties.
    pub fn new(path: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_id: type_id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Read a string property.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(serde_json::Value::as_str)
    }
}

/// Node lookup over the content repository.
///
/// Relative paths are resolved by the implementation (typically against search
/// paths); returned nodes always carry their absolute path.
pub trait ContentTree: Send + Sync {
    /// Look a node up by path.
    fn get_node(&self, path: &str) -> Option<Node>;

    /// Children of the node at `path`; empty when the node does not exist.
    fn get_children(&self, path: &str) -> Vec<Node>;

    /// Declared type of the node at `path`.
    fn get_type_id(&self, path: &str) -> Option<String> {
        self.get_node(path).map(|node| node.type_id)
    }
}

/// Super type lookup for component types.
pub trait TypeRegistry: Send + Sync {
    /// Parent type of `type_id`, or `None` for a root type or an unknown type.
    fn get_parent(&self, type_id: &str) -> Option<String>;
}

/// A client library declared by a library folder node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Path of the declaring node.
    pub path: String,
    /// Category tags. Empty strings are dropped on construction.
    pub categories: BTreeSet<String>,
}

impl LibraryDescriptor {
    /// Create a descriptor, collapsing duplicate and dropping empty categories.
    pub fn new<I, S>(path: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            categories: categories
                .into_iter()
                .map(Into::into)
                .filter(|category: &String| !category.is_empty())
                .collect(),
        }
    }
}

/// Immutable view of the library registry for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    libraries: Arc<HashMap<String, LibraryDescriptor>>,
}

impl LibrarySnapshot {
    /// Index descriptors by path. A later descriptor for the same path wins.
    pub fn new(descriptors: impl IntoIterator<Item = LibraryDescriptor>) -> Self {
        let libraries = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.path.clone(), descriptor))
            .collect::<HashMap<_, _>>();
        Self {
            libraries: Arc::new(libraries),
        }
    }

    /// The descriptor registered for `path`, if any.
    pub fn get(&self, path: &str) -> Option<&LibraryDescriptor> {
        self.libraries.get(path)
    }

    /// Number of registered libraries.
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Whether the snapshot holds no libraries.
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// Source of library snapshots.
///
/// Called once per resolution run. Implementations may change between calls; the
/// snapshot a run received stays valid for that run only.
pub trait LibraryRegistry: Send + Sync {
    /// Take a snapshot of every known library.
    fn snapshot_libraries(&self) -> LibrarySnapshot;
}

/// Join a base path and a relative segment with exactly one slash.
pub(crate) fn join_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{relative}")
    }
}
