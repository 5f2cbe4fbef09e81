//! # devroute router
//!
//! Client-side route resolution for hash-routed applications:
//! - Declarative nested route tables (TOML or builder API)
//! - Static, `:param`, `:param?` and `*catch_all` segments
//! - Redirects by path or by route name
//! - Lazily loaded views, memoized per entry with single-flight loading
//! - Navigation with stale-result discard, scroll reset and active-link classes
//!
//! ## Example
//!
//! ```
//! use devroute_router::{declared, loader_fn, Config, Navigator, ViewRegistry};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let registry = ViewRegistry::new()
//!     .with_view(declared::DEFAULT_CONTAINER, loader_fn(|| async { Ok("container") }))
//!     .with_view(declared::DEVICES, loader_fn(|| async { Ok("device list") }))
//!     .with_view(declared::NEWDEVICE, loader_fn(|| async { Ok("device form") }));
//!
//! let navigator = Navigator::from_config(&Config::default(), &registry).unwrap();
//!
//! let active = navigator.navigate_href("#/").await.unwrap().activated().unwrap();
//! assert_eq!(active.name, "Devices");
//! assert_eq!(active.leaf().unwrap().view, "device list");
//! assert_eq!(navigator.link_class("#/devices").await.as_deref(), Some("open active router-link-exact-active"));
//! # });
//! ```

use std::collections::BTreeMap;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod declared;
mod error;
pub mod loader;
mod location;
mod navigator;
pub mod path;
mod resolver;
pub mod route;
mod table;

pub use config::{BuildConfig, ChunkSortMode, Config, RedirectPolicy, RouterConfig, ScrollBehavior};
pub use error::{RouteError, TableError};
pub use loader::{loader_fn, LazyView, ViewLoader, ViewRegistry};
pub use location::{HistoryMode, Location};
pub use navigator::{ActiveRoute, NavigationOutcome, Navigator, ScrollPosition};
pub use path::{is_valid_path, join_paths, normalize_path, PathHierarchy};
pub use resolver::{ActivatedView, Resolution, Resolver, MAX_REDIRECTS};
pub use route::{Pattern, PatternSegment, RedirectTarget, RouteDeclaration, RouteEntry};
pub use table::{CompiledRoute, RouteId, RouteTable};

/// Path parameters (and view input properties), ordered by name
pub type Params = BTreeMap<String, String>;
