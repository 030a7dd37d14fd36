//! Alternate (AMP) representation of a page.
//!
//! A page may be published in a primary and an alternate representation. The page's
//! [`AlternateMode`] decides whether the alternate one exists and how the two link to
//! each other; the request selectors decide which one is being rendered.
//!
//! Headlib overrides are only rendered for the alternate representation, so the assets
//! of a primary rendering carry categories alone. Whether a primary rendering of a
//! paired page advertises its alternate still depends on the whole resolution: an
//! override on one of the page's components is enough to make the alternate worth
//! linking to.

use crate::constants::{
    ALTERNATE_LINK_REL, ALTERNATE_MODE_PROPERTY, ALTERNATE_SELECTOR, CANONICAL_LINK_REL,
    URL_EXTENSION,
};
use crate::content::Node;
use crate::core::ResolverError;
use crate::resolver::{CancellationFlag, ClientlibResolver, ResolutionRequest, ResolutionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How a page exposes its alternate representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlternateMode {
    /// Both representations exist and link to each other.
    #[serde(rename = "paired")]
    Paired,
    /// Only the alternate representation is published.
    #[serde(rename = "amp-only")]
    AlternateOnly,
    /// No alternate representation.
    #[default]
    #[serde(rename = "no-amp")]
    Disabled,
}

impl AlternateMode {
    /// The value as stored on the page.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paired => "paired",
            Self::AlternateOnly => "amp-only",
            Self::Disabled => "no-amp",
        }
    }

    /// Read the mode stored on a page node.
    ///
    /// Missing or unrecognized values mean [`AlternateMode::Disabled`].
    pub fn from_node(node: &Node) -> Self {
        match node.property_str(ALTERNATE_MODE_PROPERTY) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                debug!("Page {}: {}", node.path, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

impl fmt::Display for AlternateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlternateMode {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "paired" => Ok(Self::Paired),
            "amp-only" => Ok(Self::AlternateOnly),
            "no-amp" => Ok(Self::Disabled),
            other => Err(ResolverError::Other {
                message: format!(
                    "Unknown alternate mode '{other}' (expected paired, amp-only or no-amp)"
                ),
            }),
        }
    }
}

/// The page being rendered and how it was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    /// Path of the page, without extension.
    pub page_path: String,
    /// Selectors of the request URL.
    pub selectors: Vec<String>,
    /// Alternate mode configured on the page.
    pub mode: AlternateMode,
}

impl DocumentRequest {
    /// A request for the primary representation of `page_path`.
    pub fn new(page_path: impl Into<String>, mode: AlternateMode) -> Self {
        Self {
            page_path: page_path.into(),
            selectors: Vec::new(),
            mode,
        }
    }

    /// Add a request selector.
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    /// Whether the alternate representation was requested.
    pub fn is_alternate_request(&self) -> bool {
        self.selectors.iter().any(|selector| selector == ALTERNATE_SELECTOR)
    }

    /// Whether the page publishes an alternate representation at all.
    pub const fn is_alternate_enabled(&self) -> bool {
        matches!(self.mode, AlternateMode::Paired | AlternateMode::AlternateOnly)
    }
}

/// A `<link>` element for the page head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Link relation.
    pub rel: String,
    /// Link target.
    pub href: String,
}

impl PageLink {
    /// Attribute map for the template.
    pub fn attrs(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([("rel", self.rel.clone()), ("href", self.href.clone())])
    }
}

/// Assets and head link of one page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRender {
    /// What the rendering loads. Include paths are empty unless the alternate
    /// representation was requested.
    #[serde(flatten)]
    pub assets: ResolutionResult,
    /// The `<link>` the page head advertises.
    pub link: PageLink,
}

/// Asset and link resolution for one page render.
pub struct AlternatePage<'a> {
    resolver: &'a ClientlibResolver,
    request: DocumentRequest,
}

impl<'a> AlternatePage<'a> {
    /// Bind `request` to a resolver.
    pub const fn new(resolver: &'a ClientlibResolver, request: DocumentRequest) -> Self {
        Self {
            resolver,
            request,
        }
    }

    /// The request being rendered.
    pub const fn request(&self) -> &DocumentRequest {
        &self.request
    }

    /// Resolve assets and the page link for the component types used on the page.
    ///
    /// Each type is also a collection root.
    pub fn resolve<I, S>(&self, component_types: I, cancel: &CancellationFlag) -> PageRender
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resolution = self.resolver.resolve(&self.resolution_request(component_types), cancel);
        self.render(resolution)
    }

    /// Same as [`resolve`](Self::resolve), on tokio's blocking pool.
    pub async fn resolve_concurrent<I, S>(
        &self,
        component_types: I,
        cancel: CancellationFlag,
    ) -> PageRender
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = self.resolution_request(component_types);
        let resolution = self.resolver.resolve_concurrent(request, cancel).await;
        self.render(resolution)
    }

    /// Override lookups run for alternate requests, and for primary requests of paired
    /// pages where they decide the link.
    fn resolution_request<I, S>(&self, component_types: I) -> ResolutionRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = ResolutionRequest::from_component_types(component_types);
        if !self.request.is_alternate_request() && self.request.mode != AlternateMode::Paired {
            debug!("{} is not an alternate request, skipping headlib overrides", self.request.page_path);
            request.type_ids.clear();
        }
        request
    }

    fn render(&self, resolution: ResolutionResult) -> PageRender {
        let link = self.page_link(&resolution);
        let assets = if self.request.is_alternate_request() {
            resolution
        } else {
            resolution.without_include_paths()
        };
        PageRender {
            assets,
            link,
        }
    }

    /// The link the page head advertises, given the full resolution for the page.
    ///
    /// A primary rendering of a paired page points at its alternate, provided the
    /// alternate rendering has anything to load: an override or a category. Everything
    /// else is canonical.
    pub fn page_link(&self, resolution: &ResolutionResult) -> PageLink {
        let path = &self.request.page_path;
        if !self.request.is_alternate_request()
            && self.request.mode == AlternateMode::Paired
            && !resolution.is_empty()
        {
            PageLink {
                rel: ALTERNATE_LINK_REL.to_string(),
                href: format!("{path}.{ALTERNATE_SELECTOR}{URL_EXTENSION}"),
            }
        } else {
            PageLink {
                rel: CANONICAL_LINK_REL.to_string(),
                href: format!("{path}{URL_EXTENSION}"),
            }
        }
    }
}
