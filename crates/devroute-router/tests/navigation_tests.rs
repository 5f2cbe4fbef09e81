//! Integration tests for navigation over the declared device routes
//!
//! Covers:
//! - Resolution of every declared entry and the root redirect
//! - NotFound and LoadFailure surfacing without state changes
//! - Loader memoization and single-flight loading
//! - Discarding superseded navigations
//! - Scroll reset and active-link classes

use devroute_router::*;
use anyhow::anyhow;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, PartialEq, Eq)]
struct View {
    id: &'static str,
}

type Handle = Arc<View>;

/// Per-view knobs shared between a test and its loader
#[derive(Default, Clone)]
struct Probe {
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    gate: Option<Arc<Notify>>,
}

impl Probe {
    fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    fn loader(&self, id: &'static str) -> Arc<dyn ViewLoader<Handle>> {
        let probe = self.clone();
        loader_fn(move || {
            let probe = probe.clone();
            async move {
                probe.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(gate) = &probe.gate {
                    gate.notified().await;
                }
                if probe.fail.load(Ordering::SeqCst) {
                    return Err(anyhow!("failed to fetch chunk for {}", id));
                }
                Ok(Arc::new(View { id }))
            }
        })
    }
}

struct Harness {
    navigator: Navigator<Handle>,
    probes: HashMap<&'static str, Probe>,
}

impl Harness {
    fn new() -> Self {
        Self::with(Config::default(), HashMap::new())
    }

    fn with(config: Config, overrides: HashMap<&'static str, Probe>) -> Self {
        let mut probes = overrides;
        let mut registry = ViewRegistry::new();
        for id in declared::VIEW_IDS {
            let probe = probes.entry(id).or_default().clone();
            registry.register(id, probe.loader(id));
        }

        let navigator = Navigator::from_config(&config, &registry).unwrap();
        Self { navigator, probes }
    }

    fn probe(&self, id: &str) -> &Probe {
        &self.probes[id]
    }

    async fn go(&self, href: &str) -> ActiveRoute<Handle> {
        self.navigator
            .navigate_href(href)
            .await
            .unwrap()
            .activated()
            .expect("navigation should not be superseded")
    }
}

fn view_ids(active: &ActiveRoute<Handle>) -> Vec<&'static str> {
    active.views.iter().map(|v| v.view.id).collect()
}

#[rstest]
#[case("/devices", "Devices")]
#[case("/newdevice", "Newdevice")]
#[case("/", "Devices")]
fn test_declared_paths_resolve(#[case] path: &str, #[case] expected: &str) {
    let harness = Harness::new();
    let resolution = harness.navigator.resolver().resolve(path).unwrap();
    assert_eq!(resolution.name, expected);
}

#[test]
fn test_every_non_redirecting_entry_resolves_by_full_path() {
    let harness = Harness::new();
    let table = harness.navigator.resolver().table();

    for route in table.iter().filter(|r| r.redirect().is_none()) {
        let resolution = harness
            .navigator
            .resolver()
            .resolve(route.pattern().as_str())
            .unwrap();
        assert_eq!(resolution.name, route.name());
    }
}

#[tokio::test]
async fn test_navigate_devices() {
    let harness = Harness::new();

    let active = harness.go("#/devices").await;

    assert_eq!(active.name, "Devices");
    assert_eq!(active.location.path, "/devices");
    assert_eq!(view_ids(&active), vec!["DefaultContainer", "Devices"]);
    assert_eq!(active.leaf().unwrap().props, Some(Params::new()));
    assert_eq!(harness.probe("Devices").calls(), 1);
    assert_eq!(harness.probe("Newdevice").calls(), 0);
}

#[tokio::test]
async fn test_navigate_newdevice_independent_of_devices_loader() {
    let devices = Probe::default();
    devices.fail.store(true, Ordering::SeqCst);
    let harness = Harness::with(Config::default(), HashMap::from([("Devices", devices)]));

    let err = harness.navigator.navigate_href("#/devices").await.unwrap_err();
    assert!(err.is_load_failure());

    let active = harness.go("#/newdevice").await;
    assert_eq!(active.name, "Newdevice");
    assert_eq!(harness.probe("Newdevice").calls(), 1);
    assert_eq!(harness.probe("Devices").calls(), 1);
}

#[tokio::test]
async fn test_root_is_same_as_direct_devices() {
    let harness = Harness::new();

    let via_root = harness.go("#/").await;
    let direct = harness.go("#/devices").await;

    assert_eq!(via_root.name, direct.name);
    assert_eq!(via_root.location, direct.location);
    assert_eq!(via_root.redirected_from, Some(Location::new("/")));
    assert_eq!(direct.redirected_from, None);
    assert!(Arc::ptr_eq(&via_root.leaf().unwrap().view, &direct.leaf().unwrap().view));
    assert_eq!(harness.probe("Devices").calls(), 1);
}

#[tokio::test]
async fn test_not_found_leaves_state_untouched() {
    let harness = Harness::new();
    harness.go("#/devices").await;
    harness.navigator.record_scroll(0.0, 320.0).await;

    let err = harness.navigator.navigate_href("#/nonexistent").await.unwrap_err();

    assert!(matches!(err, RouteError::NotFound { ref path } if path == "/nonexistent"));
    assert_eq!(harness.navigator.current().await.unwrap().name, "Devices");
    assert_eq!(harness.navigator.scroll_position().await.y, 320.0);
}

#[tokio::test]
async fn test_revisit_reuses_loaded_views() {
    let harness = Harness::new();

    let first = harness.go("#/devices").await;
    harness.go("#/newdevice").await;
    let second = harness.go("#/devices").await;

    assert!(Arc::ptr_eq(&first.leaf().unwrap().view, &second.leaf().unwrap().view));
    assert_eq!(harness.probe("Devices").calls(), 1);
    assert_eq!(harness.probe("DefaultContainer").calls(), 1);
}

#[tokio::test]
async fn test_scroll_resets_after_success() {
    let harness = Harness::new();
    harness.navigator.record_scroll(12.0, 900.0).await;

    harness.go("#/newdevice").await;

    assert_eq!(
        harness.navigator.scroll_position().await,
        ScrollPosition { x: 12.0, y: 0.0 }
    );
}

#[tokio::test]
async fn test_scroll_preserved_when_configured() {
    let mut config = Config::default();
    config.router.scroll_behavior = ScrollBehavior::Preserve;
    let harness = Harness::with(config, HashMap::new());
    harness.navigator.record_scroll(0.0, 450.0).await;

    harness.go("#/devices").await;

    assert_eq!(harness.navigator.scroll_position().await.y, 450.0);
}

#[tokio::test]
async fn test_concurrent_navigations_share_one_load() {
    let devices = Probe::gated();
    let harness = Harness::with(Config::default(), HashMap::from([("Devices", devices.clone())]));

    let (first, second, ()) = tokio::join!(
        harness.navigator.navigate_href("#/devices"),
        harness.navigator.navigate_href("#/devices"),
        async { devices.release() },
    );

    assert!(first.unwrap().is_superseded());
    assert_eq!(second.unwrap().activated().unwrap().name, "Devices");
    assert_eq!(devices.calls(), 1);
}

#[tokio::test]
async fn test_stale_navigation_is_discarded() {
    let devices = Probe::gated();
    let harness = Harness::with(Config::default(), HashMap::from([("Devices", devices.clone())]));

    let (stale, fresh) = tokio::join!(harness.navigator.navigate_href("#/devices"), async {
        let fresh = harness.navigator.navigate_href("#/newdevice").await;
        devices.release();
        fresh
    });

    assert!(stale.unwrap().is_superseded());
    assert_eq!(fresh.unwrap().activated().unwrap().name, "Newdevice");
    assert_eq!(harness.navigator.current().await.unwrap().name, "Newdevice");

    // The load itself completed and stays cached for the next visit
    let active = harness.go("#/devices").await;
    assert_eq!(active.leaf().unwrap().view.id, "Devices");
    assert_eq!(devices.calls(), 1);
}

#[tokio::test]
async fn test_failed_load_is_retried_on_next_navigation() {
    let devices = Probe::default();
    devices.fail.store(true, Ordering::SeqCst);
    let harness = Harness::with(Config::default(), HashMap::from([("Devices", devices.clone())]));

    let err = harness.navigator.navigate_href("#/devices").await.unwrap_err();
    assert!(matches!(err, RouteError::LoadFailure { ref name, .. } if name == "Devices"));
    assert!(harness.navigator.current().await.is_none());

    devices.fail.store(false, Ordering::SeqCst);
    let active = harness.go("#/devices").await;
    assert_eq!(active.name, "Devices");
    assert_eq!(devices.calls(), 2);
}

#[tokio::test]
async fn test_link_classes() {
    let harness = Harness::new();
    assert_eq!(harness.navigator.link_class("#/devices").await, None);

    harness.go("#/devices").await;

    assert_eq!(
        harness.navigator.link_class("#/devices").await.as_deref(),
        Some("open active router-link-exact-active")
    );
    assert_eq!(harness.navigator.link_class("#/").await.as_deref(), Some("open active"));
    assert_eq!(harness.navigator.link_class("#/newdevice").await, None);
}

#[tokio::test]
async fn test_query_survives_redirect() {
    let harness = Harness::new();

    let active = harness.go("#/?filter=core").await;

    assert_eq!(active.location.query.get("filter").map(String::as_str), Some("core"));
    assert_eq!(
        harness.navigator.current_href().await.as_deref(),
        Some("#/devices?filter=core")
    );
}

#[tokio::test]
async fn test_navigate_named() {
    let harness = Harness::new();

    let outcome = harness.navigator.navigate_named("Newdevice", &Params::new()).await.unwrap();
    assert_eq!(outcome.activated().unwrap().location.path, "/newdevice");

    let err = harness.navigator.navigate_named("Ghost", &Params::new()).await.unwrap_err();
    assert!(matches!(err, RouteError::UnknownRoute { .. }));
}
