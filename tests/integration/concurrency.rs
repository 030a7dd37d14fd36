use clientlib_resolver::config::ResolverConfig;
use clientlib_resolver::constants::CLIENT_LIBRARY_FOLDER_TYPE;
use clientlib_resolver::content::{ContentTree, LibraryDescriptor, MemoryContent, Node};
use clientlib_resolver::resolver::{
    CancellationFlag, ClientlibResolver, ResolutionRequest, ResolutionWarning,
};
use clientlib_resolver::session::SessionPool;
use clientlib_resolver::test_utils::{init_test_logging, site_content};
use std::sync::Arc;
use std::time::Duration;

/// Many components, each with its own override and library folder.
fn wide_site(components: usize) -> MemoryContent {
    let mut content = MemoryContent::new();
    for i in 0..components {
        let base = format!("/apps/wide/c{i}");
        content.add_node(&base, "cq:Component").unwrap();
        if i % 3 == 0 {
            content.add_node(&format!("{base}/customheadlibs.amp.html"), "nt:file").unwrap();
        }
        content.add_node(&format!("{base}/clientlibs"), CLIENT_LIBRARY_FOLDER_TYPE).unwrap();
        content.register_library(LibraryDescriptor::new(
            format!("{base}/clientlibs"),
            [format!("wide.c{i}.amp"), format!("wide.c{i}"), "wide.shared.amp".to_string()],
        ));
    }
    content
}

fn wide_request(components: usize) -> ResolutionRequest {
    ResolutionRequest::from_component_types((0..components).map(|i| format!("wide/c{i}")))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_equals_sequential() {
    init_test_logging(None);
    let resolver =
        ClientlibResolver::from_repository(Arc::new(wide_site(40)), ResolverConfig::default());
    let request = wide_request(40);

    let sequential = resolver.resolve(&request, &CancellationFlag::new());
    let concurrent = resolver.resolve_concurrent(request, CancellationFlag::new()).await;

    assert_eq!(sequential, concurrent);
    assert_eq!(concurrent.include_paths().len(), 14);
    assert_eq!(concurrent.include_paths()[0], "/apps/wide/c0/customheadlibs.amp.html");
    assert_eq!(concurrent.include_paths()[1], "/apps/wide/c3/customheadlibs.amp.html");
    // 40 per-component categories plus the shared one
    assert_eq!(concurrent.categories().len(), 41);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_renders_share_one_resolver() {
    let resolver =
        ClientlibResolver::from_repository(Arc::new(site_content()), ResolverConfig::default());
    let request = ResolutionRequest::from_component_types([
        "site/components/page",
        "site/components/teaser",
    ]);
    let expected = resolver.resolve(&request, &CancellationFlag::new());

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let resolver = resolver.clone();
            let request = request.clone();
            tokio::spawn(async move {
                resolver.resolve_concurrent(request, CancellationFlag::new()).await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap(), expected);
    }
}

/// Content view whose node reads take a while, so concurrent workers overlap.
struct SlowContent {
    inner: Arc<MemoryContent>,
    delay: Duration,
}

impl ContentTree for SlowContent {
    fn get_node(&self, path: &str) -> Option<Node> {
        std::thread::sleep(self.delay);
        self.inner.get_node(path)
    }

    fn get_children(&self, path: &str) -> Vec<Node> {
        self.inner.get_children(path)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_elevated_reads_share_one_session_across_roots() {
    init_test_logging(None);
    let content = Arc::new(wide_site(12));
    let slow = Arc::new(SlowContent {
        inner: content.clone(),
        delay: Duration::from_millis(30),
    });
    let pool = Arc::new(SessionPool::with_default_capacity(slow, content.clone()));
    let config = ResolverConfig::default().with_elevated_subtree_reads(true);
    let resolver = ClientlibResolver::new(content.clone(), content, pool.clone(), config);

    let sequential = resolver.resolve(&wide_request(12), &CancellationFlag::new());
    let concurrent = resolver.resolve_concurrent(wide_request(12), CancellationFlag::new()).await;

    assert!(sequential.warnings().is_empty());
    assert_eq!(sequential.categories().len(), 13);
    assert_eq!(concurrent, sequential);
    assert_eq!(pool.in_use(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sessions_released_after_concurrent_runs() {
    let content = Arc::new(wide_site(10));
    let pool = Arc::new(SessionPool::new(content.clone(), content.clone(), 2));
    let config = ResolverConfig::default().with_elevated_subtree_reads(true);
    let resolver = ClientlibResolver::new(content.clone(), content, pool.clone(), config);

    // One session for the include branch and one for the whole folder branch.
    let concurrent = resolver.resolve_concurrent(wide_request(10), CancellationFlag::new()).await;
    assert_eq!(pool.in_use(), 0);

    let sequential = resolver.resolve(&wide_request(10), &CancellationFlag::new());
    assert_eq!(pool.in_use(), 0);

    assert!(concurrent.warnings().is_empty());
    assert_eq!(concurrent.categories().len(), 11);
    assert_eq!(concurrent, sequential);
}

#[tokio::test]
async fn test_cancelled_concurrent_run() {
    let content = Arc::new(wide_site(5));
    let pool = Arc::new(SessionPool::new(content.clone(), content.clone(), 4));
    let resolver = ClientlibResolver::new(content.clone(), content, pool.clone(), ResolverConfig::default());

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let result = resolver.resolve_concurrent(wide_request(5), cancel).await;

    assert!(result.is_empty());
    assert_eq!(result.warnings(), [ResolutionWarning::Cancelled]);
    assert_eq!(pool.in_use(), 0);
}
