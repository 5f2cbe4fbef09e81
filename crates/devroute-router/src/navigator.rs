//! Navigation state machine driven by the host's location changes
//!
//! Every call to [`Navigator::navigate`] takes a ticket from a generation
//! counter. A navigation only commits when its ticket is still the latest
//! once its views are loaded; otherwise its result is dropped and
//! [`NavigationOutcome::Superseded`] is returned. The ticket check and the
//! commit happen under the same write lock.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{Config, RouterConfig, ScrollBehavior};
use crate::error::{RouteError, TableError};
use crate::loader::ViewRegistry;
use crate::location::Location;
use crate::path::PathHierarchy;
use crate::resolver::{ActivatedView, Resolution, Resolver};
use crate::table::RouteTable;
use crate::Params;

/// The committed result of a navigation
#[derive(Debug, Clone)]
pub struct ActiveRoute<V> {
    pub location: Location,
    pub name: String,
    pub params: Params,
    /// Views of the matched chain, outermost first
    pub views: Vec<ActivatedView<V>>,
    pub redirected_from: Option<Location>,
}

impl<V> ActiveRoute<V> {
    /// The innermost view, the one the path actually addressed
    pub fn leaf(&self) -> Option<&ActivatedView<V>> {
        self.views.last()
    }
}

#[derive(Debug, Clone)]
pub enum NavigationOutcome<V> {
    Activated(ActiveRoute<V>),
    /// A newer navigation started before this one finished loading
    Superseded,
}

impl<V> NavigationOutcome<V> {
    pub fn activated(self) -> Option<ActiveRoute<V>> {
        match self {
            NavigationOutcome::Activated(active) => Some(active),
            NavigationOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationOutcome::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

struct State<V> {
    current: Option<ActiveRoute<V>>,
    scroll: ScrollPosition,
}

pub struct Navigator<V> {
    resolver: Resolver<V>,
    settings: RouterConfig,
    generation: AtomicU64,
    state: RwLock<State<V>>,
}

impl<V: Clone> Navigator<V> {
    pub fn new(resolver: Resolver<V>, settings: RouterConfig) -> Self {
        let resolver = resolver.with_case_insensitive(settings.case_insensitive);
        Self {
            resolver,
            settings,
            generation: AtomicU64::new(0),
            state: RwLock::new(State {
                current: None,
                scroll: ScrollPosition::default(),
            }),
        }
    }

    /// Builds the table from the config's declarations and binds it
    pub fn from_config(config: &Config, registry: &ViewRegistry<V>) -> Result<Self, TableError> {
        let table =
            RouteTable::from_declarations_with(&config.route_declarations(), registry, config.router.redirects)?;
        Ok(Self::new(Resolver::new(table), config.router.clone()))
    }

    pub fn resolver(&self) -> &Resolver<V> {
        &self.resolver
    }

    pub fn settings(&self) -> &RouterConfig {
        &self.settings
    }

    /// Navigates to an address string, parsed per the configured mode
    pub async fn navigate_href(&self, href: &str) -> Result<NavigationOutcome<V>, RouteError> {
        let location = Location::parse(href, self.settings.mode);
        self.navigate(&location).await
    }

    /// Navigates to a named entry
    pub async fn navigate_named(&self, name: &str, params: &Params) -> Result<NavigationOutcome<V>, RouteError> {
        let ticket = self.next_ticket();
        let location = self.resolver.location_for(name, params)?;
        self.run(ticket, &location).await
    }

    pub async fn navigate(&self, target: &Location) -> Result<NavigationOutcome<V>, RouteError> {
        let ticket = self.next_ticket();
        self.run(ticket, target).await
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn run(&self, ticket: u64, target: &Location) -> Result<NavigationOutcome<V>, RouteError> {
        debug!(path = %target.path, ticket, "navigation started");

        let resolution = self.resolver.resolve_location(target)?;
        let views = match self.resolver.load(&resolution).await {
            Ok(views) => views,
            Err(_) if !self.is_latest(ticket) => {
                debug!(path = %target.path, ticket, "dropping failed load of superseded navigation");
                return Ok(NavigationOutcome::Superseded);
            }
            Err(err) => return Err(err),
        };

        let mut state = self.state.write().await;
        if !self.is_latest(ticket) {
            debug!(path = %resolution.location.path, ticket, "discarding superseded navigation");
            return Ok(NavigationOutcome::Superseded);
        }

        let active = activate(resolution, views);
        state.current = Some(active.clone());
        if self.settings.scroll_behavior == ScrollBehavior::Top {
            state.scroll.y = 0.0;
        }

        info!(
            route = %active.name,
            path = %active.location.path,
            redirected = active.redirected_from.is_some(),
            "navigation committed"
        );

        Ok(NavigationOutcome::Activated(active))
    }

    pub async fn current(&self) -> Option<ActiveRoute<V>> {
        self.state.read().await.current.clone()
    }

    /// Href of the committed location in the configured mode
    pub async fn current_href(&self) -> Option<String> {
        self.state
            .read()
            .await
            .current
            .as_ref()
            .map(|active| active.location.href(self.settings.mode))
    }

    pub async fn scroll_position(&self) -> ScrollPosition {
        self.state.read().await.scroll
    }

    /// Records the host's scroll offset between navigations
    pub async fn record_scroll(&self, x: f64, y: f64) {
        self.state.write().await.scroll = ScrollPosition { x, y };
    }

    /// CSS classes for a link pointing at `to`
    ///
    /// A link is active when the current path equals its target or lies
    /// below it; an exact match also gets the exact-active class.
    pub async fn link_class(&self, to: &str) -> Option<String> {
        let state = self.state.read().await;
        let current = &state.current.as_ref()?.location.path;
        let target = Location::parse(to, self.settings.mode).path;

        if *current == target {
            return Some(join_classes(&self.settings.link_active_class, &self.settings.link_exact_active_class));
        }

        PathHierarchy::new(current)
            .any(|ancestor| ancestor == target)
            .then(|| self.settings.link_active_class.clone())
    }
}

fn activate<V>(resolution: Resolution, views: Vec<ActivatedView<V>>) -> ActiveRoute<V> {
    ActiveRoute {
        location: resolution.location,
        name: resolution.name,
        params: resolution.params,
        views,
        redirected_from: resolution.redirected_from,
    }
}

fn join_classes(active: &str, exact: &str) -> String {
    [active, exact]
        .iter()
        .filter(|class| !class.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
