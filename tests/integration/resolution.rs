use clientlib_resolver::config::ResolverConfig;
use clientlib_resolver::constants::CLIENT_LIBRARY_FOLDER_TYPE;
use clientlib_resolver::content::{LibraryDescriptor, MemoryContent};
use clientlib_resolver::resolver::{
    CancellationFlag, ClientlibResolver, ResolutionRequest, ResolutionWarning,
    collect_component_types,
};
use clientlib_resolver::session::SessionPool;
use clientlib_resolver::test_utils::{init_test_logging, site_content, type_chain};
use std::collections::BTreeSet;
use std::sync::Arc;

const PAGE_OVERRIDE: &str = "/libs/core/wcm/components/page/v1/page/customheadlibs.amp.html";
const TEASER_OVERRIDE: &str = "/apps/site/components/teaser/customheadlibs.amp.html";

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(ToString::to_string).collect()
}

fn site_types() -> Vec<String> {
    vec![
        "site/components/page".to_string(),
        "site/components/teaser".to_string(),
        "site/components/title".to_string(),
    ]
}

/// The page's component types are enumerated from its content subtree
#[test]
fn test_page_component_types() {
    init_test_logging(None);
    let content = site_content();

    let types = collect_component_types(
        &content,
        "/content/site/en/jcr:content",
        256,
        &CancellationFlag::new(),
    )
    .unwrap();
    assert_eq!(types, site_types());
}

/// Inherited and own overrides are both found, each once, in request order
#[test]
fn test_resolve_site_page() {
    init_test_logging(None);
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), ResolverConfig::default());

    let request = ResolutionRequest::from_component_types(site_types());
    let result = resolver.resolve(&request, &CancellationFlag::new());

    assert_eq!(result.include_paths(), [PAGE_OVERRIDE.to_string(), TEASER_OVERRIDE.to_string()]);
    assert_eq!(result.categories(), &set(&["site.teaser.amp"]));
    assert!(result.warnings().is_empty());
    assert!(!result.is_truncated());
}

/// The site teaser's own override shadows the one on its core super type
#[test]
fn test_nearest_override_shadows_super_type() {
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), ResolverConfig::default());
    let request = ResolutionRequest::new().with_type_ids(["site/components/teaser"]);

    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.include_paths(), [TEASER_OVERRIDE.to_string()]);
}

/// Categories come from the filter, which must match whole names
#[test]
fn test_category_pattern_selects_whole_names() {
    let config = ResolverConfig::default().with_clientlib_regex(r"site\..*");
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), config);
    let request = ResolutionRequest::new().with_component_roots(["/apps/site/components"]);

    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.categories(), &set(&["site.teaser", "site.teaser.amp"]));

    let config = ResolverConfig::default().with_clientlib_regex("site");
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), config);
    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert!(result.categories().is_empty());
}

/// Folders from several roots are unioned before filtering
#[test]
fn test_multiple_roots_union() {
    let config = ResolverConfig::default().with_clientlib_regex(r".*\.amp");
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), config);
    let request = ResolutionRequest::new().with_component_roots([
        "/apps/site/components/teaser",
        "/libs/core/wcm/components/teaser/v1/teaser",
        "/apps/site/components/teaser",
    ]);

    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert_eq!(
        result.categories(),
        &set(&["core.wcm.components.teaser.v1.amp", "site.teaser.amp"])
    );
}

/// A type chain longer than the hop limit yields no override and a warning
#[test]
fn test_long_chain_hits_hop_limit() {
    let mut content = MemoryContent::new();
    type_chain(&mut content, "/libs/chain", 100);
    content.add_node("/libs/chain/t99/customheadlibs.amp.html", "nt:file").unwrap();
    let content = Arc::new(content);
    let request = ResolutionRequest::new().with_type_ids(["chain/t0"]);

    let resolver = ClientlibResolver::from_repository(content.clone(), ResolverConfig::default());
    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert!(result.include_paths().is_empty());
    assert_eq!(
        result.warnings(),
        [ResolutionWarning::ChainTooDeep {
            type_id: "chain/t0".to_string()
        }]
    );
    assert!(result.is_truncated());

    let resolver = ClientlibResolver::from_repository(
        content,
        ResolverConfig::default().with_max_chain_depth(128),
    );
    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.include_paths(), ["/libs/chain/t99/customheadlibs.amp.html".to_string()]);
}

/// A cyclic chain only affects its own type
#[test]
fn test_cyclic_chain_is_isolated() {
    let mut content = site_content();
    content.add_node("/apps/loop/a", "cq:Component").unwrap();
    content.add_node("/apps/loop/b", "cq:Component").unwrap();
    content.set_super_type("/apps/loop/a", "loop/b").unwrap();
    content.set_super_type("/apps/loop/b", "loop/a").unwrap();

    let resolver = ClientlibResolver::from_repository(Arc::new(content), ResolverConfig::default());
    let request = ResolutionRequest::from_component_types(["loop/a", "site/components/teaser"]);
    let result = resolver.resolve(&request, &CancellationFlag::new());

    assert_eq!(result.include_paths(), [TEASER_OVERRIDE.to_string()]);
    assert_eq!(result.categories(), &set(&["site.teaser.amp"]));
    assert_eq!(
        result.warnings(),
        [ResolutionWarning::TypeCycle {
            type_id: "loop/a".to_string()
        }]
    );
}

/// A subtree linking back to its own root terminates with the same result
#[test]
fn test_self_referential_subtree() {
    let mut content = site_content();
    content.add_link("/apps/site/components/teaser/legacy", "/apps/site/components/teaser").unwrap();
    content.add_link("/apps/site/components/teaser/clientlibs", "/apps/site/components/teaser/clientlibs").unwrap();

    let resolver = ClientlibResolver::from_repository(Arc::new(content), ResolverConfig::default());
    let request = ResolutionRequest::new().with_component_roots(["site/components/teaser"]);
    let result = resolver.resolve(&request, &CancellationFlag::new());

    assert_eq!(result.categories(), &set(&["site.teaser.amp"]));
    assert!(result.warnings().is_empty());
}

/// Folders beyond the depth ceiling are cut off and reported
#[test]
fn test_depth_ceiling_reports_truncation() {
    let mut content = site_content();
    content.add_node("/apps/site/components/teaser/v2", "nt:folder").unwrap();
    content
        .add_node("/apps/site/components/teaser/v2/clientlibs", CLIENT_LIBRARY_FOLDER_TYPE)
        .unwrap();
    content.register_library(LibraryDescriptor::new(
        "/apps/site/components/teaser/v2/clientlibs",
        ["site.teaser.v2.amp"],
    ));
    let content = Arc::new(content);
    let request = ResolutionRequest::new().with_component_roots(["site/components/teaser"]);

    let shallow = ClientlibResolver::from_repository(
        content.clone(),
        ResolverConfig::default().with_max_traversal_depth(1),
    );
    let result = shallow.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.categories(), &set(&["site.teaser.amp"]));
    assert_eq!(
        result.warnings(),
        [ResolutionWarning::TraversalTruncated {
            root: "site/components/teaser".to_string()
        }]
    );

    let deep = ClientlibResolver::from_repository(content, ResolverConfig::default());
    let result = deep.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.categories(), &set(&["site.teaser.amp", "site.teaser.v2.amp"]));
    assert!(!result.is_truncated());
}

/// An invalid pattern includes every category instead of failing
#[test]
fn test_invalid_pattern_fails_open() {
    let config = ResolverConfig::default().with_clientlib_regex("site.(amp");
    let resolver = ClientlibResolver::from_repository(Arc::new(site_content()), config);
    let request = ResolutionRequest::from_component_types(site_types());

    let result = resolver.resolve(&request, &CancellationFlag::new());
    assert_eq!(result.categories(), &set(&["site.teaser", "site.teaser.amp"]));
    assert_eq!(result.include_paths().len(), 2);
    assert!(matches!(result.warnings(), [ResolutionWarning::InvalidFilter { pattern, .. }] if pattern == "site.(amp"));
}

/// Without a session only the include branch is empty
#[test]
fn test_exhausted_pool_only_empties_includes() {
    let content = Arc::new(site_content());
    let pool = SessionPool::new(content.clone(), content.clone(), 0);
    let resolver =
        ClientlibResolver::new(content.clone(), content, Arc::new(pool), ResolverConfig::default());

    let request = ResolutionRequest::from_component_types(site_types());
    let result = resolver.resolve(&request, &CancellationFlag::new());

    assert!(result.include_paths().is_empty());
    assert_eq!(result.categories(), &set(&["site.teaser.amp"]));
    assert!(matches!(
        result.warnings(),
        [ResolutionWarning::SessionUnavailable { purpose, .. }] if purpose == "clientlibs-service"
    ));
}

/// Each run returns its session, so a pool of one serves consecutive runs
#[test]
fn test_session_returned_after_each_run() {
    let content = Arc::new(site_content());
    let pool = Arc::new(SessionPool::new(content.clone(), content.clone(), 1));
    let resolver =
        ClientlibResolver::new(content.clone(), content, pool.clone(), ResolverConfig::default());
    let request = ResolutionRequest::from_component_types(site_types());

    for _ in 0..3 {
        let result = resolver.resolve(&request, &CancellationFlag::new());
        assert_eq!(result.include_paths().len(), 2);
        assert_eq!(pool.in_use(), 0);
    }

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let result = resolver.resolve(&request, &cancel);
    assert!(result.is_empty());
    assert_eq!(pool.in_use(), 0);
}

/// Repeated runs over unchanged content agree; registry changes show up next run
#[test]
fn test_runs_are_independent() {
    let content = Arc::new(site_content());
    let resolver = ClientlibResolver::from_repository(content.clone(), ResolverConfig::default());
    let request = ResolutionRequest::from_component_types(site_types());
    let cancel = CancellationFlag::new();

    let first = resolver.resolve(&request, &cancel);
    let second = resolver.resolve(&request, &cancel);
    assert_eq!(first, second);

    content.register_library(LibraryDescriptor::new(
        "/apps/site/components/teaser/legacy",
        ["site.legacy.amp"],
    ));
    let third = resolver.resolve(&request, &cancel);
    assert_eq!(third.categories(), &set(&["site.legacy.amp", "site.teaser.amp"]));
}
