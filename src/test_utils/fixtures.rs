//! Content fixtures.

use crate::content::MemoryContent;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small site: core components in `/libs`, site components in `/apps` extending
/// them, and one page using the site components.
///
/// Resolving the alternate rendering of `/content/site/en` yields:
/// - includes `/libs/core/wcm/components/page/v1/page/customheadlibs.amp.html`
///   (inherited by the site page) and `/apps/site/components/teaser/customheadlibs.amp.html`
///   (the teaser's own, shadowing the core one)
/// - the single category `site.teaser.amp` under the default filter
pub const SITE_FIXTURE: &str = r#"
search_paths = ["/apps", "/libs"]

[[nodes]]
path = "/libs/core/wcm/components/page/v1/page"
type = "cq:Component"

[[nodes]]
path = "/libs/core/wcm/components/page/v1/page/customheadlibs.amp.html"
type = "nt:file"

[[nodes]]
path = "/libs/core/wcm/components/teaser/v1/teaser"
type = "cq:Component"

[[nodes]]
path = "/libs/core/wcm/components/teaser/v1/teaser/customheadlibs.amp.html"
type = "nt:file"

[[nodes]]
path = "/libs/core/wcm/components/teaser/v1/teaser/clientlibs"
type = "cq:ClientLibraryFolder"

[[nodes]]
path = "/apps/site/components/page"
type = "cq:Component"
super_type = "core/wcm/components/page/v1/page"

[[nodes]]
path = "/apps/site/components/teaser"
type = "cq:Component"
super_type = "core/wcm/components/teaser/v1/teaser"

[[nodes]]
path = "/apps/site/components/teaser/customheadlibs.amp.html"
type = "nt:file"

[[nodes]]
path = "/apps/site/components/teaser/clientlibs"
type = "cq:ClientLibraryFolder"

[[nodes]]
path = "/apps/site/components/teaser/legacy"
type = "cq:ClientLibraryFolder"

[[nodes]]
path = "/apps/site/components/title"
type = "cq:Component"

[[nodes]]
path = "/content/site/en"
type = "cq:Page"

[nodes.properties]
ampMode = "paired"

[[nodes]]
path = "/content/site/en/jcr:content"
type = "site/components/page"

[[nodes]]
path = "/content/site/en/jcr:content/root"
type = "nt:unstructured"

[[nodes]]
path = "/content/site/en/jcr:content/root/teaser"
type = "site/components/teaser"

[[nodes]]
path = "/content/site/en/jcr:content/root/title"
type = "site/components/title"

[[libraries]]
path = "/libs/core/wcm/components/teaser/v1/teaser/clientlibs"
categories = ["core.wcm.components.teaser.v1.amp", "core.wcm.components.teaser.v1"]

[[libraries]]
path = "/apps/site/components/teaser/clientlibs"
categories = ["site.teaser.amp", "site.teaser"]
"#;

/// Parse [`SITE_FIXTURE`].
///
/// # Panics
///
/// Panics if the fixture does not parse.
pub fn site_content() -> MemoryContent {
    MemoryContent::from_toml_str(SITE_FIXTURE)
        .unwrap_or_else(|e| panic!("site fixture does not parse: {e:#}"))
}

/// Add a chain of `length` component types `{base}/t0 -> {base}/t1 -> ...`.
///
/// `base` must be absolute; super types are recorded relative to the first search
/// path component, so `base` should live directly under one (for example `/libs/chain`).
///
/// # Panics
///
/// Panics if `base` is not absolute.
pub fn type_chain(content: &mut MemoryContent, base: &str, length: usize) {
    let relative_base = base.trim_start_matches('/').split_once('/').map_or("", |(_, rest)| rest);
    for i in 0..length {
        let path = format!("{base}/t{i}");
        content
            .add_node(&path, "cq:Component")
            .unwrap_or_else(|e| panic!("cannot add {path}: {e}"));
        if i + 1 < length {
            content
                .set_super_type(&path, &format!("{relative_base}/t{}", i + 1))
                .unwrap_or_else(|e| panic!("cannot link {path}: {e}"));
        }
    }
}

/// A fixture or config file in its own temporary directory.
pub struct FixtureFile {
    _dir: TempDir,
    path: PathBuf,
}

impl FixtureFile {
    /// Write `contents` to `name` inside a fresh temporary directory.
    pub fn write(name: &str, contents: &str) -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temporary directory")?;
        let path = dir.path().join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write fixture: {}", path.display()))?;
        Ok(Self {
            _dir: dir,
            path,
        })
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
