//! In-memory content repository backed by a TOML fixture.
//!
//! Implements [`ContentTree`], [`TypeRegistry`] and [`LibraryRegistry`] so the whole
//! engine can run without a host repository. The CLI and the test suites use it.
//!
//! # Fixture Format
//!
//! ```toml
//! search_paths = ["/apps", "/libs"]
//!
//! [[nodes]]
//! path = "/libs/core/components/teaser"
//! type = "cq:Component"
//!
//! [[nodes]]
//! path = "/apps/site/components/teaser"
//! type = "cq:Component"
//! super_type = "core/components/teaser"
//!
//! [[nodes]]
//! path = "/apps/site/components/teaser/clientlibs"
//! type = "cq:ClientLibraryFolder"
//! links = ["/apps/site/components/teaser"]   # extra children, may point anywhere
//!
//! [nodes.properties]
//! allowProxy = true
//!
//! [[libraries]]
//! path = "/apps/site/components/teaser/clientlibs"
//! categories = ["site.teaser.amp"]
//! ```
//!
//! Children of a node are the nodes one level below its path, followed by its `links`.
//! Links make self-referential trees expressible, which real repositories produce through
//! aliases and references.

use super::{
    ContentTree, LibraryDescriptor, LibraryRegistry, LibrarySnapshot, Node, TypeRegistry,
    join_path,
};
use crate::config::parse_config;
use crate::constants::DEFAULT_SEARCH_PATHS;
use crate::core::ResolverError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::trace;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    #[serde(default)]
    search_paths: Option<Vec<String>>,
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    libraries: Vec<LibraryRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeRecord {
    path: String,
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default)]
    super_type: Option<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

impl NodeRecord {
    fn to_node(&self) -> Node {
        Node {
            path: self.path.clone(),
            type_id: self.type_id.clone(),
            properties: self.properties.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LibraryRecord {
    path: String,
    categories: Vec<String>,
}

/// Fixture-backed content repository.
#[derive(Debug)]
pub struct MemoryContent {
    nodes: BTreeMap<String, NodeRecord>,
    search_paths: Vec<String>,
    libraries: RwLock<HashMap<String, LibraryDescriptor>>,
}

impl Default for MemoryContent {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContent {
    /// Create an empty repository with the default `/apps`, `/libs` search paths.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            search_paths: DEFAULT_SEARCH_PATHS.iter().map(ToString::to_string).collect(),
            libraries: RwLock::new(HashMap::new()),
        }
    }

    /// Parse a fixture from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a node path is not absolute.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let fixture: Fixture = toml::from_str(content).context("Failed to parse content fixture")?;
        Self::from_fixture(fixture)
    }

    /// Load a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self> {
        let fixture: Fixture = parse_config(path)?;
        Self::from_fixture(fixture)
            .with_context(|| format!("Invalid content fixture: {}", path.display()))
    }

    fn from_fixture(fixture: Fixture) -> Result<Self> {
        let mut content = Self::new();
        if let Some(search_paths) = fixture.search_paths {
            content.search_paths = search_paths;
        }
        for record in fixture.nodes {
            content.insert(record)?;
        }
        for library in fixture.libraries {
            content.register_library(LibraryDescriptor::new(library.path, library.categories));
        }
        Ok(content)
    }

    fn insert(&mut self, record: NodeRecord) -> Result<(), ResolverError> {
        if !record.path.starts_with('/') {
            return Err(ResolverError::FixtureError {
                message: format!("node path '{}' is not absolute", record.path),
            });
        }
        if record.type_id.is_empty() {
            return Err(ResolverError::FixtureError {
                message: format!("node '{}' has an empty type", record.path),
            });
        }
        let mut record = record;
        if record.path.len() > 1 {
            record.path = record.path.trim_end_matches('/').to_string();
        }
        self.nodes.insert(record.path.clone(), record);
        Ok(())
    }

    /// Replace the search paths used for relative lookups.
    #[must_use]
    pub fn with_search_paths<I, S>(mut self, search_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_paths = search_paths.into_iter().map(Into::into).collect();
        self
    }

    /// Add a node of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::FixtureError`] if the path is not absolute or the type is empty.
    pub fn add_node(&mut self, path: &str, type_id: &str) -> Result<&mut Self, ResolverError> {
        self.insert(NodeRecord {
            path: path.to_string(),
            type_id: type_id.to_string(),
            super_type: None,
            links: Vec::new(),
            properties: BTreeMap::new(),
        })?;
        Ok(self)
    }

    /// Set the super type of the component declared at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::FixtureError`] if no node exists at `path`.
    pub fn set_super_type(
        &mut self,
        path: &str,
        super_type: &str,
    ) -> Result<&mut Self, ResolverError> {
        self.record_mut(path)?.super_type = Some(super_type.to_string());
        Ok(self)
    }

    /// Add `target` as an extra child of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::FixtureError`] if no node exists at `path`.
    pub fn add_link(&mut self, path: &str, target: &str) -> Result<&mut Self, ResolverError> {
        self.record_mut(path)?.links.push(target.to_string());
        Ok(self)
    }

    /// Set a property on the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::FixtureError`] if no node exists at `path`.
    pub fn set_property(
        &mut self,
        path: &str,
        name: &str,
        value: serde_json::Value,
    ) -> Result<&mut Self, ResolverError> {
        self.record_mut(path)?.properties.insert(name.to_string(), value);
        Ok(self)
    }

    /// Register (or replace) a library descriptor.
    ///
    /// Takes `&self` so a shared repository can change between resolution runs.
    pub fn register_library(&self, descriptor: LibraryDescriptor) {
        let mut libraries = self.libraries.write().unwrap_or_else(PoisonError::into_inner);
        libraries.insert(descriptor.path.clone(), descriptor);
    }

    /// Remove a library descriptor.
    pub fn unregister_library(&self, path: &str) -> Option<LibraryDescriptor> {
        let mut libraries = self.libraries.write().unwrap_or_else(PoisonError::into_inner);
        libraries.remove(path)
    }

    /// Number of nodes in the repository.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn record_mut(&mut self, path: &str) -> Result<&mut NodeRecord, ResolverError> {
        self.nodes.get_mut(path).ok_or_else(|| ResolverError::FixtureError {
            message: format!("no node at '{path}'"),
        })
    }

    /// Resolve a path, applying search paths to relative ones.
    fn lookup(&self, path: &str) -> Option<&NodeRecord> {
        if path.starts_with('/') {
            let normalized = if path.len() > 1 {
                path.trim_end_matches('/')
            } else {
                path
            };
            return self.nodes.get(normalized);
        }

        self.search_paths.iter().find_map(|search_path| {
            let candidate = join_path(search_path, path);
            trace!("Trying {} for relative path {}", candidate, path);
            self.nodes.get(&candidate)
        })
    }
}

impl ContentTree for MemoryContent {
    fn get_node(&self, path: &str) -> Option<Node> {
        self.lookup(path).map(NodeRecord::to_node)
    }

    fn get_children(&self, path: &str) -> Vec<Node> {
        let Some(record) = self.lookup(path) else {
            return Vec::new();
        };

        let prefix = if record.path.ends_with('/') {
            record.path.clone()
        } else {
            format!("{}/", record.path)
        };

        let mut children: Vec<Node> = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .map(|(_, child)| child.to_node())
            .collect();

        children.extend(record.links.iter().filter_map(|target| self.get_node(target)));
        children
    }
}

impl TypeRegistry for MemoryContent {
    fn get_parent(&self, type_id: &str) -> Option<String> {
        self.lookup(type_id).and_then(|record| record.super_type.clone())
    }
}

impl LibraryRegistry for MemoryContent {
    fn snapshot_libraries(&self) -> LibrarySnapshot {
        let libraries = self.libraries.read().unwrap_or_else(PoisonError::into_inner);
        LibrarySnapshot::new(libraries.values().cloned())
    }
}
