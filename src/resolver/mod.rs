//! Client library and headlib resolution for one document render.
//!
//! # Overview
//!
//! For a rendered document the resolver answers two questions:
//!
//! 1. **Which headlib overrides apply?** For every component type on the document the
//!    [`HierarchyWalker`] looks for the configured override script on the type and then
//!    on each super type, and the nearest hit wins.
//! 2. **Which client library categories are required?** Below every component root the
//!    [`SubtreeCollector`] finds library folders; their categories are looked up in a
//!    [`LibrarySnapshot`] and filtered through the configured [`CategoryFilter`].
//!
//! # Resolution Flow
//!
//! ```text
//! resolve(request)
//!   ├── snapshot libraries, compile filter (once)
//!   ├── includes branch: borrow scoped session → walk each distinct type → dedupe
//!   ├── folders branch:  collect library folders below each distinct root → union
//!   └── categories_for(folders) → filter → ResolutionResult
//! ```
//!
//! The two branches share no mutable state. [`ClientlibResolver::resolve`] runs them
//! one after the other; [`ClientlibResolver::resolve_concurrent`] runs them on tokio's
//! blocking pool (fanning the folder branch out per root) and merges after both join.
//! Both produce the same result.
//!
//! # Failure Model
//!
//! Asset resolution is advisory, so `resolve` has no error path. Missing overrides and
//! unregistered folders contribute nothing. Cycles, depth limits, cancellation, a failed
//! session acquisition, and an invalid category pattern become
//! [`ResolutionWarning`]s on the result, and only the affected branch loses data.
//!
//! # Memoization
//!
//! There is none beyond a single call: the result is a local value built per call, and
//! the resolver keeps no per-document state. Call it again and everything is read afresh.

pub mod cancel;
pub mod categories;
pub mod collector;
pub mod hierarchy;
mod result;

pub use cancel::CancellationFlag;
pub use categories::{CategoryFilter, categories_for};
pub use collector::{CollectOutcome, SubtreeCollector, WalkStats, collect_component_types};
pub use hierarchy::{HierarchyWalker, OverrideLookup};
pub use result::{ResolutionResult, ResolutionWarning};

use crate::config::ResolverConfig;
use crate::content::{ContentTree, LibraryRegistry, LibrarySnapshot, TypeRegistry};
use crate::core::ResolverError;
use crate::session::{ScopedSession, SessionFactory, SessionPool};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What one document needs resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// Component types used on the document, in enumeration order.
    pub type_ids: Vec<String>,
    /// Paths below which library folders are collected.
    pub component_roots: Vec<String>,
}

impl ResolutionRequest {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use each component type both for the override walk and as a collection root.
    ///
    /// Component types are paths relative to the search paths, so a type doubles as
    /// the root of its own declaration.
    pub fn from_component_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_ids: Vec<String> = types.into_iter().map(Into::into).collect();
        Self {
            component_roots: type_ids.clone(),
            type_ids,
        }
    }

    /// Replace the component types.
    #[must_use]
    pub fn with_type_ids<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_ids = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the collection roots.
    #[must_use]
    pub fn with_component_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.component_roots = roots.into_iter().map(Into::into).collect();
        self
    }
}

/// Results of one branch plus the warnings it produced.
#[derive(Debug, Default)]
struct BranchOutcome<T> {
    value: T,
    warnings: Vec<ResolutionWarning>,
}

/// Resolves headlib includes and client library categories.
///
/// Cheap to clone; clones share collaborators and configuration.
#[derive(Clone)]
pub struct ClientlibResolver {
    content: Arc<dyn ContentTree>,
    libraries: Arc<dyn LibraryRegistry>,
    sessions: Arc<dyn SessionFactory>,
    config: Arc<ResolverConfig>,
}

impl ClientlibResolver {
    /// Create a resolver.
    ///
    /// `content` is the caller's own view, used for subtree reads unless
    /// `elevated_subtree_reads` is set; `sessions` hands out the elevated view used for
    /// override lookups.
    pub fn new(
        content: Arc<dyn ContentTree>,
        libraries: Arc<dyn LibraryRegistry>,
        sessions: Arc<dyn SessionFactory>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            content,
            libraries,
            sessions,
            config: Arc::new(config),
        }
    }

    /// Create a resolver over one repository that serves every collaborator, with a
    /// default-sized [`SessionPool`].
    pub fn from_repository<R>(repository: Arc<R>, config: ResolverConfig) -> Self
    where
        R: ContentTree + TypeRegistry + LibraryRegistry + 'static,
    {
        let sessions = SessionPool::with_default_capacity(repository.clone(), repository.clone());
        Self::new(repository.clone(), repository, Arc::new(sessions), config)
    }

    /// The configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `request` on the calling thread.
    pub fn resolve(&self, request: &ResolutionRequest, cancel: &CancellationFlag) -> ResolutionResult {
        let type_ids = distinct(&request.type_ids);
        let roots = distinct(&request.component_roots);
        debug!("Resolving {} component types and {} roots", type_ids.len(), roots.len());

        let (snapshot, filter, filter_warnings) = self.prepare();

        let includes = resolve_includes(self.sessions.as_ref(), &self.config, &type_ids, cancel);
        let folders = match self.folder_session(&roots) {
            Ok(session) => {
                let tree: &dyn ContentTree = match &session {
                    Some(session) => session.tree(),
                    None => self.content.as_ref(),
                };
                collect_folders(tree, &self.config, &roots, cancel)
            }
            Err(failed) => failed,
        };

        finish(&snapshot, filter.as_ref(), filter_warnings, includes, vec![folders])
    }

    /// Resolve `request` with both branches on tokio's blocking pool.
    ///
    /// The folder branch fans out per root over a single borrowed session, so it needs
    /// no more sessions than [`resolve`](Self::resolve) does. Results are merged after
    /// every worker has joined, in root order, so the outcome equals `resolve`.
    pub async fn resolve_concurrent(
        &self,
        request: ResolutionRequest,
        cancel: CancellationFlag,
    ) -> ResolutionResult {
        let type_ids = distinct(&request.type_ids);
        let roots = distinct(&request.component_roots);
        debug!(
            "Resolving {} component types and {} roots concurrently",
            type_ids.len(),
            roots.len()
        );

        let (snapshot, filter, filter_warnings) = self.prepare();

        let includes_task = {
            let sessions = Arc::clone(&self.sessions);
            let config = Arc::clone(&self.config);
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                resolve_includes(sessions.as_ref(), &config, &type_ids, &cancel)
            })
        };

        // One session serves every per-root worker of the folder branch.
        let (folder_tasks, session_failure) = match self.folder_session(&roots) {
            Ok(session) => {
                let session = session.map(Arc::new);
                let tasks: Vec<_> = roots
                    .into_iter()
                    .map(|root| {
                        let content = Arc::clone(&self.content);
                        let session = session.clone();
                        let config = Arc::clone(&self.config);
                        let cancel = cancel.clone();
                        tokio::task::spawn_blocking(move || {
                            let tree: &dyn ContentTree = match session.as_deref() {
                                Some(session) => session.tree(),
                                None => content.as_ref(),
                            };
                            collect_folders(tree, &config, std::slice::from_ref(&root), &cancel)
                        })
                    })
                    .collect();
                (tasks, None)
            }
            Err(failed) => (Vec::new(), Some(failed)),
        };

        let (includes, folders) =
            tokio::join!(includes_task, futures::future::join_all(folder_tasks));

        let includes = joined(includes, "include resolution");
        let mut folders: Vec<_> =
            folders.into_iter().map(|outcome| joined(outcome, "folder collection")).collect();
        folders.extend(session_failure);

        finish(&snapshot, filter.as_ref(), filter_warnings, includes, folders)
    }

    /// Take the library snapshot and compile the filter, once per run.
    fn prepare(&self) -> (LibrarySnapshot, Option<CategoryFilter>, Vec<ResolutionWarning>) {
        let snapshot = self.libraries.snapshot_libraries();
        debug!("Library snapshot holds {} libraries", snapshot.len());

        match CategoryFilter::new(&self.config.clientlib_regex) {
            Ok(filter) => (snapshot, Some(filter), Vec::new()),
            Err(e) => {
                warn!("{e}; including every discovered category");
                let warning = match e {
                    ResolverError::InvalidCategoryPattern {
                        pattern,
                        reason,
                    } => ResolutionWarning::InvalidFilter {
                        pattern,
                        reason,
                    },
                    other => ResolutionWarning::InvalidFilter {
                        pattern: self.config.clientlib_regex.clone(),
                        reason: other.to_string(),
                    },
                };
                (snapshot, None, vec![warning])
            }
        }
    }

    /// Borrow the session the folder branch reads through, if it needs one.
    ///
    /// On failure the returned outcome carries the warning and the branch is skipped.
    fn folder_session(
        &self,
        roots: &[String],
    ) -> Result<Option<ScopedSession>, BranchOutcome<HashSet<String>>> {
        if roots.is_empty() || !self.config.elevated_subtree_reads {
            return Ok(None);
        }

        match self.sessions.acquire_scoped_session(&self.config.session_subservice) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                error!("{e}; client library folders will not be collected");
                Err(BranchOutcome {
                    value: HashSet::new(),
                    warnings: vec![session_warning(e, &self.config.session_subservice)],
                })
            }
        }
    }
}

/// Distinct entries in first-seen order.
fn distinct(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items.iter().filter(|item| seen.insert(item.as_str())).cloned().collect()
}

/// Walk each type's hierarchy through an elevated session.
fn resolve_includes(
    sessions: &dyn SessionFactory,
    config: &ResolverConfig,
    type_ids: &[String],
    cancel: &CancellationFlag,
) -> BranchOutcome<Vec<String>> {
    let mut outcome = BranchOutcome::<Vec<String>>::default();
    if type_ids.is_empty() {
        return outcome;
    }

    let session = match sessions.acquire_scoped_session(&config.session_subservice) {
        Ok(session) => session,
        Err(e) => {
            error!("{e}; headlib overrides will not be included");
            outcome.warnings.push(session_warning(e, &config.session_subservice));
            return outcome;
        }
    };

    let walker =
        HierarchyWalker::new(session.tree(), session.types(), config.max_chain_depth, cancel);
    let relative_path = config.headlib_relative_path();
    let mut seen = HashSet::new();

    for type_id in type_ids {
        match walker.lookup(type_id, relative_path) {
            OverrideLookup::Found(path) => {
                if seen.insert(path.clone()) {
                    outcome.value.push(path);
                }
            }
            OverrideLookup::NotFound => {}
            OverrideLookup::ChainTooDeep => {
                outcome.warnings.push(ResolutionWarning::ChainTooDeep {
                    type_id: type_id.clone(),
                });
            }
            OverrideLookup::Cycle {
                ..
            } => {
                outcome.warnings.push(ResolutionWarning::TypeCycle {
                    type_id: type_id.clone(),
                });
            }
            OverrideLookup::Cancelled => {
                outcome.warnings.push(ResolutionWarning::Cancelled);
                break;
            }
        }
    }

    debug!("Resolved {} headlib overrides", outcome.value.len());
    outcome
}

/// Collect library folders below each root, reading through `tree`.
fn collect_folders(
    tree: &dyn ContentTree,
    config: &ResolverConfig,
    roots: &[String],
    cancel: &CancellationFlag,
) -> BranchOutcome<HashSet<String>> {
    let mut outcome = BranchOutcome::<HashSet<String>>::default();
    let collector =
        SubtreeCollector::new(tree, &config.library_folder_type, config.max_traversal_depth, cancel);

    for root in roots {
        let collected = collector.collect_library_folders(root);
        if collected.truncated {
            outcome.warnings.push(ResolutionWarning::TraversalTruncated {
                root: root.clone(),
            });
        }
        outcome.value.extend(collected.folders);
        if collected.cancelled {
            outcome.warnings.push(ResolutionWarning::Cancelled);
            break;
        }
    }

    outcome
}

fn session_warning(error: ResolverError, purpose: &str) -> ResolutionWarning {
    match error {
        ResolverError::SessionUnavailable {
            purpose,
            reason,
        } => ResolutionWarning::SessionUnavailable {
            purpose,
            reason,
        },
        other => ResolutionWarning::SessionUnavailable {
            purpose: purpose.to_string(),
            reason: other.to_string(),
        },
    }
}

fn joined<T: Default>(
    result: Result<BranchOutcome<T>, tokio::task::JoinError>,
    branch: &str,
) -> BranchOutcome<T> {
    result.unwrap_or_else(|e| {
        error!("{} worker failed: {}", branch, e);
        BranchOutcome {
            value: T::default(),
            warnings: vec![ResolutionWarning::BranchFailed {
                branch: branch.to_string(),
                reason: e.to_string(),
            }],
        }
    })
}

/// Merge branch outcomes into the final result.
fn finish(
    snapshot: &LibrarySnapshot,
    filter: Option<&CategoryFilter>,
    mut warnings: Vec<ResolutionWarning>,
    includes: BranchOutcome<Vec<String>>,
    folders: Vec<BranchOutcome<HashSet<String>>>,
) -> ResolutionResult {
    let mut push = |warning: ResolutionWarning| {
        if !warnings.contains(&warning) {
            warnings.push(warning);
        }
    };

    includes.warnings.into_iter().for_each(&mut push);

    let mut folder_paths = HashSet::new();
    for outcome in folders {
        outcome.warnings.into_iter().for_each(&mut push);
        folder_paths.extend(outcome.value);
    }

    let discovered = categories_for(snapshot, &folder_paths);
    let categories: BTreeSet<String> = match filter {
        Some(filter) => filter.filter(&discovered),
        None => discovered,
    };

    debug!(
        "Resolution produced {} includes and {} categories from {} folders",
        includes.value.len(),
        categories.len(),
        folder_paths.len()
    );

    ResolutionResult::new(includes.value, categories, warnings)
}
