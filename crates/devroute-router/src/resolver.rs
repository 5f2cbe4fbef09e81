//! Route resolution: path → matched entry chain → loaded views

use std::fmt;
use std::sync::Arc;

use crate::error::RouteError;
use crate::location::Location;
use crate::path::join_paths;
use crate::route::{Pattern, RedirectTarget};
use crate::table::{CompiledRoute, RouteId, RouteTable};
use crate::Params;

/// Upper bound on redirect hops for a single resolution
pub const MAX_REDIRECTS: usize = 8;

/// Result of matching a location against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Final location after redirects
    pub location: Location,
    /// The matched (deepest) entry
    pub route: RouteId,
    pub name: String,
    /// Matched chain, outermost first; the last element is `route`
    pub chain: Vec<RouteId>,
    pub params: Params,
    /// The originally requested location when a redirect was followed
    pub redirected_from: Option<Location>,
}

/// A loaded view ready to hand to the rendering layer
#[derive(Debug, Clone)]
pub struct ActivatedView<V> {
    pub route: RouteId,
    pub name: String,
    pub view_id: Option<String>,
    pub view: V,
    /// Input properties; `Some` only when the entry forwards params
    pub props: Option<Params>,
}

/// Matches locations against an immutable [`RouteTable`]
///
/// # Examples
///
/// ```
/// use devroute_router::{declared, loader_fn, Resolver, RouteTable, ViewRegistry};
///
/// let registry = ViewRegistry::new()
///     .with_view(declared::DEFAULT_CONTAINER, loader_fn(|| async { Ok("container") }))
///     .with_view(declared::DEVICES, loader_fn(|| async { Ok("devices") }))
///     .with_view(declared::NEWDEVICE, loader_fn(|| async { Ok("newdevice") }));
/// let table = RouteTable::from_declarations(&declared::routes(), &registry).unwrap();
/// let resolver = Resolver::new(table);
///
/// let resolution = resolver.resolve("/").unwrap();
/// assert_eq!(resolution.name, "Devices");
/// assert_eq!(resolution.location.path, "/devices");
///
/// assert!(resolver.resolve("/nonexistent").unwrap_err().is_not_found());
/// ```
pub struct Resolver<V> {
    table: Arc<RouteTable<V>>,
    case_insensitive: bool,
}

impl<V> Resolver<V> {
    pub fn new(table: impl Into<Arc<RouteTable<V>>>) -> Self {
        Self {
            table: table.into(),
            case_insensitive: false,
        }
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn table(&self) -> &RouteTable<V> {
        &self.table
    }

    /// Resolves a bare path
    pub fn resolve(&self, path: &str) -> Result<Resolution, RouteError> {
        self.resolve_location(&Location::new(path))
    }

    /// Resolves a location, following redirects
    ///
    /// Pure: no view is loaded and nothing is logged.
    pub fn resolve_location(&self, target: &Location) -> Result<Resolution, RouteError> {
        let mut current = Location {
            path: crate::path::normalize_path(&target.path).into_owned(),
            query: target.query.clone(),
        };
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            let (id, params) = self
                .table
                .match_path(&current.path, self.case_insensitive)
                .ok_or_else(|| RouteError::NotFound {
                    path: current.path.clone(),
                })?;
            let route = self.table.get(id);

            match route.redirect() {
                Some(redirect) => {
                    let next = self.redirect_path(route, redirect, &params)?;
                    if redirected_from.is_none() {
                        redirected_from = Some(current.clone());
                    }
                    current.path = next;
                }
                None => {
                    return Ok(Resolution {
                        location: current,
                        route: id,
                        name: route.name().to_string(),
                        chain: self.table.chain(id),
                        params,
                        redirected_from,
                    });
                }
            }
        }

        Err(RouteError::RedirectLoop {
            path: target.path.clone(),
        })
    }

    /// Builds the location of a named entry from parameters
    pub fn location_for(&self, name: &str, params: &Params) -> Result<Location, RouteError> {
        let route = self.table.by_name(name).ok_or_else(|| RouteError::UnknownRoute {
            name: name.to_string(),
        })?;

        let path = route
            .pattern()
            .generate(params)
            .map_err(|param| RouteError::MissingParam {
                name: name.to_string(),
                param,
            })?;

        Ok(Location::new(path))
    }

    /// Resolves a named entry
    pub fn resolve_named(&self, name: &str, params: &Params) -> Result<Resolution, RouteError> {
        let location = self.location_for(name, params)?;
        self.resolve_location(&location)
    }

    fn redirect_path(
        &self,
        route: &CompiledRoute<V>,
        redirect: &RedirectTarget,
        params: &Params,
    ) -> Result<String, RouteError> {
        let pattern = match redirect {
            RedirectTarget::Path(path) => {
                let base = route
                    .parent()
                    .map(|parent| self.table.get(parent).pattern().as_str())
                    .unwrap_or("/");
                Pattern::parse(&join_paths(base, path))
            }
            RedirectTarget::Named { name } => match self.table.by_name(name) {
                Some(target) => target.pattern().clone(),
                None => return Err(RouteError::UnknownRoute { name: name.clone() }),
            },
        };

        pattern.generate(params).map_err(|param| RouteError::MissingParam {
            name: route.name().to_string(),
            param,
        })
    }
}

impl<V: Clone> Resolver<V> {
    /// Loads every view along the matched chain, outermost first
    ///
    /// Each view is loaded at most once per table; concurrent calls for the
    /// same entry share a single in-flight load.
    pub async fn load(&self, resolution: &Resolution) -> Result<Vec<ActivatedView<V>>, RouteError> {
        let mut views = Vec::with_capacity(resolution.chain.len());

        for id in &resolution.chain {
            let route = self.table.get(*id);
            let Some(lazy) = route.view() else {
                continue;
            };

            let view = lazy.get().await.map_err(|source| RouteError::LoadFailure {
                name: route.name().to_string(),
                source,
            })?;

            views.push(ActivatedView {
                route: *id,
                name: route.name().to_string(),
                view_id: Some(lazy.view_id().to_string()),
                view: view.clone(),
                props: route.props().then(|| resolution.params.clone()),
            });
        }

        Ok(views)
    }
}

impl<V> Clone for Resolver<V> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            case_insensitive: self.case_insensitive,
        }
    }
}

impl<V> fmt::Debug for Resolver<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("routes", &self.table.len())
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedirectPolicy;
    use crate::loader::loader_fn;
    use crate::route::RouteEntry;
    use anyhow::anyhow;

    fn leaf(path: &str, name: &'static str) -> RouteEntry<&'static str> {
        RouteEntry::new(path, name).with_loader(loader_fn(move || async move { Ok(name) }))
    }

    fn resolver() -> Resolver<&'static str> {
        let entries = vec![
            RouteEntry::new("/", "Home")
                .with_redirect("/devices")
                .with_child(leaf("devices", "Devices").with_props(true))
                .with_child(leaf("devices/:id", "Device").with_props(true))
                .with_child(leaf("stats/:id", "Stats"))
                .with_child(RouteEntry::new("dashboard", "Dashboard").with_redirect("devices")),
            RouteEntry::new("/reports", "Reports")
                .with_loader(loader_fn(|| async { Ok("reports") }))
                .with_child(leaf("daily", "Daily"))
                .with_child(RouteEntry::new("latest/:id", "Latest").with_redirect("daily")),
            RouteEntry::new("/legacy/:id", "Legacy").with_redirect("/devices/:id"),
            RouteEntry::new("/old", "Old").with_named_redirect("Devices"),
            RouteEntry::new("/ping", "Ping").with_redirect("/pong"),
            RouteEntry::new("/pong", "Pong").with_redirect("/ping"),
            RouteEntry::new("/broken", "Broken")
                .with_loader(loader_fn(|| async { Err(anyhow!("chunk 404")) })),
        ];
        let table = RouteTable::from_entries_with(entries, RedirectPolicy::Any).unwrap();
        Resolver::new(table)
    }

    #[test]
    fn test_root_redirects_to_devices() {
        let resolution = resolver().resolve("/").unwrap();
        assert_eq!(resolution.name, "Devices");
        assert_eq!(resolution.location.path, "/devices");
        assert_eq!(resolution.redirected_from, Some(Location::new("/")));
    }

    #[test]
    fn test_redirect_carries_params_and_query() {
        let target = Location::new("/legacy/r7").with_query("tab", "bgp");
        let resolution = resolver().resolve_location(&target).unwrap();
        assert_eq!(resolution.name, "Device");
        assert_eq!(resolution.location, Location::new("/devices/r7").with_query("tab", "bgp"));
    }

    #[test]
    fn test_relative_redirect_joins_parent_path() {
        let resolution = resolver().resolve("/dashboard").unwrap();
        assert_eq!(resolution.name, "Devices");
        assert_eq!(resolution.location.path, "/devices");

        let resolution = resolver().resolve("/reports/latest/r1").unwrap();
        assert_eq!(resolution.name, "Daily");
        assert_eq!(resolution.location.path, "/reports/daily");
    }

    #[test]
    fn test_named_redirect() {
        assert_eq!(resolver().resolve("/old").unwrap().name, "Devices");
    }

    #[test]
    fn test_redirect_loop() {
        let err = resolver().resolve("/ping").unwrap_err();
        assert!(matches!(err, RouteError::RedirectLoop { ref path } if path == "/ping"));
    }

    #[test]
    fn test_not_found() {
        let err = resolver().resolve("/nonexistent").unwrap_err();
        assert!(matches!(err, RouteError::NotFound { ref path } if path == "/nonexistent"));
    }

    #[test]
    fn test_named_resolution() {
        let resolver = resolver();
        let mut params = Params::new();
        params.insert("id".to_string(), "edge 1".to_string());

        let resolution = resolver.resolve_named("Device", &params).unwrap();
        assert_eq!(resolution.location.path, "/devices/edge%201");
        assert_eq!(resolution.params.get("id").map(String::as_str), Some("edge 1"));

        let err = resolver.resolve_named("Device", &Params::new()).unwrap_err();
        assert!(matches!(err, RouteError::MissingParam { ref param, .. } if param == "id"));

        let err = resolver.resolve_named("Ghost", &params).unwrap_err();
        assert!(matches!(err, RouteError::UnknownRoute { .. }));
    }

    #[test]
    fn test_case_insensitive_option() {
        assert!(resolver().resolve("/DEVICES").is_err());
        let resolution = resolver().with_case_insensitive(true).resolve("/DEVICES").unwrap();
        assert_eq!(resolution.name, "Devices");
    }

    #[tokio::test]
    async fn test_props_only_when_forwarding() {
        let resolver = resolver();

        let device = resolver.resolve("/devices/r1").unwrap();
        let views = resolver.load(&device).await.unwrap();
        assert_eq!(views.len(), 1, "Home has no view of its own");
        assert_eq!(views[0].view, "Device");
        assert_eq!(
            views[0].props.as_ref().and_then(|p| p.get("id")).map(String::as_str),
            Some("r1")
        );

        let stats = resolver.resolve("/stats/r1").unwrap();
        let views = resolver.load(&stats).await.unwrap();
        assert_eq!(views[0].props, None);
        assert_eq!(stats.params.get("id").map(String::as_str), Some("r1"));
    }

    #[tokio::test]
    async fn test_load_failure_surfaces() {
        let resolver = resolver();
        let resolution = resolver.resolve("/broken").unwrap();
        let err = resolver.load(&resolution).await.unwrap_err();
        assert!(err.is_load_failure());
        assert_eq!(err.to_string(), "failed to load view for route `Broken`");
    }
}
