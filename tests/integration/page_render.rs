use clientlib_resolver::config::ResolverConfig;
use clientlib_resolver::content::ContentTree;
use clientlib_resolver::page::{AlternateMode, AlternatePage, DocumentRequest};
use clientlib_resolver::resolver::{CancellationFlag, ClientlibResolver, collect_component_types};
use clientlib_resolver::test_utils::site_content;
use std::sync::Arc;

const PAGE: &str = "/content/site/en";

fn page_types(content: &dyn ContentTree) -> Vec<String> {
    collect_component_types(content, "/content/site/en/jcr:content", 256, &CancellationFlag::new())
        .unwrap()
}

fn stored_mode(content: &dyn ContentTree) -> AlternateMode {
    AlternateMode::from_node(&content.get_node(PAGE).unwrap())
}

#[test]
fn test_primary_render_of_paired_page() {
    let content = Arc::new(site_content());
    let types = page_types(content.as_ref());
    let mode = stored_mode(content.as_ref());
    assert_eq!(mode, AlternateMode::Paired);

    let resolver = ClientlibResolver::from_repository(content, ResolverConfig::default());
    let page = AlternatePage::new(&resolver, DocumentRequest::new(PAGE, mode));
    let render = page.resolve(types, &CancellationFlag::new());

    assert!(render.assets.include_paths().is_empty());
    assert!(render.assets.categories().contains("site.teaser.amp"));
    assert_eq!(render.link.rel, "amphtml");
    assert_eq!(render.link.href, "/content/site/en.amp.html");
}

#[test]
fn test_alternate_render_of_paired_page() {
    let content = Arc::new(site_content());
    let types = page_types(content.as_ref());
    let resolver = ClientlibResolver::from_repository(content, ResolverConfig::default());

    let request = DocumentRequest::new(PAGE, AlternateMode::Paired).with_selector("amp");
    assert!(request.is_alternate_request());
    let page = AlternatePage::new(&resolver, request);
    let render = page.resolve(types, &CancellationFlag::new());

    assert_eq!(
        render.assets.include_paths(),
        [
            "/libs/core/wcm/components/page/v1/page/customheadlibs.amp.html".to_string(),
            "/apps/site/components/teaser/customheadlibs.amp.html".to_string(),
        ]
    );

    let link = render.link;
    assert_eq!(link.rel, "canonical");
    assert_eq!(link.href, "/content/site/en.html");
    assert_eq!(link.attrs().get("href").map(String::as_str), Some("/content/site/en.html"));
}

#[test]
fn test_unpaired_modes_are_canonical() {
    let content = Arc::new(site_content());
    let types = page_types(content.as_ref());
    let resolver = ClientlibResolver::from_repository(content, ResolverConfig::default());

    for mode in [AlternateMode::AlternateOnly, AlternateMode::Disabled] {
        let page = AlternatePage::new(&resolver, DocumentRequest::new(PAGE, mode));
        assert_eq!(page.resolve(types.clone(), &CancellationFlag::new()).link.rel, "canonical");
    }
}

#[test]
fn test_paired_page_with_only_an_override_links_to_alternate() {
    let mut content = site_content();
    content.add_node("/apps/site/components/hero", "cq:Component").unwrap();
    content
        .add_node("/apps/site/components/hero/customheadlibs.amp.html", "nt:file")
        .unwrap();
    content.add_node("/content/site/fr", "cq:Page").unwrap();
    content.add_node("/content/site/fr/jcr:content", "site/components/hero").unwrap();

    let content = Arc::new(content);
    let types = collect_component_types(
        content.as_ref(),
        "/content/site/fr/jcr:content",
        256,
        &CancellationFlag::new(),
    )
    .unwrap();
    assert_eq!(types, vec!["site/components/hero".to_string()]);

    let resolver = ClientlibResolver::from_repository(content, ResolverConfig::default());
    let page =
        AlternatePage::new(&resolver, DocumentRequest::new("/content/site/fr", AlternateMode::Paired));
    let render = page.resolve(types.clone(), &CancellationFlag::new());

    assert!(render.assets.is_empty());
    assert_eq!(render.link.rel, "amphtml");
    assert_eq!(render.link.href, "/content/site/fr.amp.html");

    // The alternate rendering itself loads the override.
    let alternate = AlternatePage::new(
        &resolver,
        DocumentRequest::new("/content/site/fr", AlternateMode::Paired).with_selector("amp"),
    );
    let render = alternate.resolve(types, &CancellationFlag::new());
    assert_eq!(
        render.assets.include_paths(),
        ["/apps/site/components/hero/customheadlibs.amp.html".to_string()]
    );
    assert_eq!(render.link.rel, "canonical");
}

#[test]
fn test_page_without_mode_defaults_to_disabled() {
    let mut content = site_content();
    content.add_node("/content/site/de", "cq:Page").unwrap();

    let mode = AlternateMode::from_node(&content.get_node("/content/site/de").unwrap());
    assert_eq!(mode, AlternateMode::Disabled);
    assert!(!DocumentRequest::new("/content/site/de", mode).is_alternate_enabled());
}
