//! Category aggregation and filtering.
//!
//! Library folders found below the component roots are mapped to their categories
//! through a [`LibrarySnapshot`], and the union is narrowed to the categories the
//! rendering cares about.
//!
//! # Examples
//!
//! ```rust
//! use clientlib_resolver::content::{LibraryDescriptor, LibrarySnapshot};
//! use clientlib_resolver::resolver::{CategoryFilter, categories_for};
//!
//! # fn main() -> anyhow::Result<()> {
//! let snapshot = LibrarySnapshot::new([
//!     LibraryDescriptor::new("/apps/site/teaser/clientlibs", ["site.teaser", "site.teaser.amp"]),
//!     LibraryDescriptor::new("/apps/site/title/clientlibs", ["site.title"]),
//! ]);
//! let folders = vec![
//!     "/apps/site/teaser/clientlibs".to_string(),
//!     "/apps/site/unregistered/clientlibs".to_string(),
//! ];
//!
//! let categories = categories_for(&snapshot, &folders);
//! assert_eq!(categories.len(), 2);
//!
//! let amp = CategoryFilter::new(r".*\.amp")?;
//! assert!(amp.filter(&categories).contains("site.teaser.amp"));
//! assert!(!amp.matches("site.amp.teaser"));
//! # Ok(())
//! # }
//! ```

use crate::content::LibrarySnapshot;
use crate::core::ResolverError;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::trace;

/// Union of the categories registered for `paths`.
///
/// Paths without a registered library are skipped; registries may be incomplete
/// while libraries are being deployed.
pub fn categories_for<'p, I>(snapshot: &LibrarySnapshot, paths: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'p String>,
{
    let mut categories = BTreeSet::new();
    for path in paths {
        match snapshot.get(path) {
            Some(library) => categories.extend(library.categories.iter().cloned()),
            None => trace!("No library registered for folder {}", path),
        }
    }
    categories
}

/// Full-string category pattern.
///
/// The configured pattern is anchored on both ends: `core` matches `core` but not
/// `core.wcm`.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pattern: String,
    regex: Regex,
}

impl CategoryFilter {
    /// Compile `pattern` for full-string matching.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidCategoryPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, ResolverError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ResolverError::InvalidCategoryPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether `category` matches the whole pattern.
    pub fn matches(&self, category: &str) -> bool {
        self.regex.is_match(category)
    }

    /// Keep only matching categories.
    pub fn filter(&self, categories: &BTreeSet<String>) -> BTreeSet<String> {
        categories.iter().filter(|category| self.matches(category)).cloned().collect()
    }

    /// The pattern as configured, without anchors.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
