//! Output of one resolution run.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A non-fatal problem encountered while resolving.
///
/// Resolution never fails; anything that made the result less complete than it could
/// have been is recorded here instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// The type chain was longer than the hop limit.
    ChainTooDeep {
        /// Type whose chain was cut
        type_id: String,
    },
    /// The type chain looped back on itself.
    TypeCycle {
        /// Type whose chain cycles
        type_id: String,
    },
    /// The traversal below a component root hit the depth ceiling.
    TraversalTruncated {
        /// Root whose subtree was cut
        root: String,
    },
    /// No elevated session could be borrowed; the affected branch is empty.
    SessionUnavailable {
        /// Purpose the session was requested for
        purpose: String,
        /// Reason reported by the session factory
        reason: String,
    },
    /// The category pattern did not compile; categories are unfiltered.
    InvalidFilter {
        /// The configured pattern
        pattern: String,
        /// The compiler's message
        reason: String,
    },
    /// A worker running one branch did not complete.
    BranchFailed {
        /// Branch name
        branch: String,
        /// Failure description
        reason: String,
    },
    /// The request was cancelled before resolution finished.
    Cancelled,
}

impl ResolutionWarning {
    /// Whether this warning means part of the content was not examined.
    pub const fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::ChainTooDeep { .. }
                | Self::TypeCycle { .. }
                | Self::TraversalTruncated { .. }
                | Self::Cancelled
        )
    }
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChainTooDeep {
                type_id,
            } => write!(f, "type chain of {type_id} exceeds the hop limit"),
            Self::TypeCycle {
                type_id,
            } => write!(f, "type chain of {type_id} is cyclic"),
            Self::TraversalTruncated {
                root,
            } => write!(f, "subtree of {root} exceeds the depth limit"),
            Self::SessionUnavailable {
                purpose,
                reason,
            } => write!(f, "no session for '{purpose}': {reason}"),
            Self::InvalidFilter {
                pattern,
                reason,
            } => write!(f, "category pattern '{pattern}' is invalid, categories unfiltered: {reason}"),
            Self::BranchFailed {
                branch,
                reason,
            } => write!(f, "{branch} did not complete: {reason}"),
            Self::Cancelled => write!(f, "resolution cancelled"),
        }
    }
}

/// Include paths and categories for one document render.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    include_paths: Vec<String>,
    categories: BTreeSet<String>,
    warnings: Vec<ResolutionWarning>,
}

impl ResolutionResult {
    pub(crate) fn new(
        include_paths: Vec<String>,
        categories: BTreeSet<String>,
        warnings: Vec<ResolutionWarning>,
    ) -> Self {
        Self {
            include_paths,
            categories,
            warnings,
        }
    }

    /// Distinct override include paths, in first-discovered order.
    pub fn include_paths(&self) -> &[String] {
        &self.include_paths
    }

    /// Distinct, filtered client library categories.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Non-fatal problems met along the way.
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    /// Whether neither includes nor categories were found.
    pub fn is_empty(&self) -> bool {
        self.include_paths.is_empty() && self.categories.is_empty()
    }

    /// Whether part of the content went unexamined.
    pub fn is_truncated(&self) -> bool {
        self.warnings.iter().any(ResolutionWarning::is_truncation)
    }

    /// The same result with include paths dropped; categories and warnings stay.
    pub(crate) fn without_include_paths(mut self) -> Self {
        self.include_paths.clear();
        self
    }
}
