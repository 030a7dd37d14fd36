//! Constants shared across the resolver.
//!
//! Defaults for [`ResolverConfig`](crate::config::ResolverConfig) live here so the
//! configuration layer, the CLI and the tests agree on a single value.

/// Node type marking a client library folder.
pub const CLIENT_LIBRARY_FOLDER_TYPE: &str = "cq:ClientLibraryFolder";

/// Script name, relative to a component type, that overrides the alternate headlibs.
pub const DEFAULT_HEADLIB_INCLUDE_SCRIPT: &str = "customheadlibs.amp.html";

/// Pattern a category must fully match to be loaded on the alternate rendering.
pub const DEFAULT_CLIENTLIB_REGEX: &str = r".*\.amp";

/// Service user the elevated read session is opened for.
pub const DEFAULT_SESSION_SUBSERVICE: &str = "clientlibs-service";

/// Maximum number of parent hops the hierarchy walker takes for one type.
///
/// Real component hierarchies rarely exceed a handful of levels; the limit only
/// exists so a cyclic or corrupted registry cannot stall a render.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

/// Maximum depth below a component root the subtree collector descends.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 256;

/// Default number of concurrently borrowed elevated sessions in a [`SessionPool`].
///
/// [`SessionPool`]: crate::session::SessionPool
pub const DEFAULT_SESSION_POOL_CAPACITY: usize = 8;

/// Selector that marks a request for the alternate representation.
pub const ALTERNATE_SELECTOR: &str = "amp";

/// Link relation advertised for the alternate representation.
pub const ALTERNATE_LINK_REL: &str = "amphtml";

/// Link relation advertised for the primary representation.
pub const CANONICAL_LINK_REL: &str = "canonical";

/// Extension appended to page paths when building links.
pub const URL_EXTENSION: &str = ".html";

/// Page property holding the alternate mode.
pub const ALTERNATE_MODE_PROPERTY: &str = "ampMode";

/// Search paths used to resolve relative type ids, in priority order.
pub const DEFAULT_SEARCH_PATHS: [&str; 2] = ["/apps", "/libs"];

/// Environment variable pointing the CLI at a configuration file.
pub const CONFIG_PATH_ENV: &str = "CLIENTLIB_CONFIG";
