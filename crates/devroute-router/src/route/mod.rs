//! Route module: declarations, bound entries and patterns
//!
//! A [`RouteDeclaration`] is plain data (serde/TOML friendly) that names its
//! view by identifier. A [`RouteEntry`] is the same record with its view
//! loader bound, ready to be compiled into a [`RouteTable`](crate::RouteTable).

pub mod pattern;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::loader::{ViewLoader, ViewRegistry};

pub use pattern::{classify_segment, Pattern, PatternSegment};

/// Where a redirecting entry sends the navigation
///
/// In TOML either `redirect = "/devices"` or `redirect = { name = "Devices" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectTarget {
    /// Absolute path, or a path relative to the parent of the redirecting entry.
    /// May contain `:param` placeholders filled from the matched params.
    Path(String),
    /// Effective path of another named entry
    Named { name: String },
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Path(path) => f.write_str(path),
            RedirectTarget::Named { name } => write!(f, "@{}", name),
        }
    }
}

/// Declarative form of a route entry
///
/// # Examples
///
/// ```
/// use devroute_router::RouteDeclaration;
///
/// let home = RouteDeclaration::new("/", "Home")
///     .with_view("DefaultContainer")
///     .with_redirect("/devices")
///     .with_child(RouteDeclaration::new("devices", "Devices").with_view("Devices").with_props(true));
///
/// assert_eq!(home.children.len(), 1);
/// assert_eq!(home.names(), vec!["Home", "Devices"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteDeclaration {
    pub path: String,
    pub name: String,

    /// View identifier looked up in a [`ViewRegistry`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectTarget>,

    /// Forward path parameters to the view as input properties
    #[serde(default)]
    pub props: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDeclaration>,
}

impl RouteDeclaration {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(RedirectTarget::Path(path.into()));
        self
    }

    pub fn with_named_redirect(mut self, name: impl Into<String>) -> Self {
        self.redirect = Some(RedirectTarget::Named { name: name.into() });
        self
    }

    pub fn with_props(mut self, props: bool) -> Self {
        self.props = props;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RouteDeclaration) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = RouteDeclaration>,
    {
        self.children.extend(children);
        self
    }

    /// Names of this entry and all its descendants, depth first
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }

    /// Binds view identifiers to loaders from the registry
    pub fn bind<V>(&self, registry: &ViewRegistry<V>) -> Result<RouteEntry<V>, TableError> {
        let loader = match &self.view {
            Some(view) => Some(registry.get(view).ok_or_else(|| TableError::UnknownView {
                name: self.name.clone(),
                view: view.clone(),
            })?),
            None => None,
        };

        let children = self
            .children
            .iter()
            .map(|child| child.bind(registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteEntry {
            path: self.path.clone(),
            name: self.name.clone(),
            view_id: self.view.clone(),
            loader,
            redirect: self.redirect.clone(),
            props: self.props,
            meta: self.meta.clone(),
            children,
        })
    }
}

/// A route entry with its view loader bound
pub struct RouteEntry<V> {
    pub path: String,
    pub name: String,
    pub view_id: Option<String>,
    pub loader: Option<Arc<dyn ViewLoader<V>>>,
    pub redirect: Option<RedirectTarget>,
    pub props: bool,
    pub meta: BTreeMap<String, String>,
    pub children: Vec<RouteEntry<V>>,
}

impl<V> RouteEntry<V> {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            view_id: None,
            loader: None,
            redirect: None,
            props: false,
            meta: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Binds a loader; the entry name doubles as the view identifier
    pub fn with_loader(mut self, loader: Arc<dyn ViewLoader<V>>) -> Self {
        if self.view_id.is_none() {
            self.view_id = Some(self.name.clone());
        }
        self.loader = Some(loader);
        self
    }

    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(RedirectTarget::Path(path.into()));
        self
    }

    pub fn with_named_redirect(mut self, name: impl Into<String>) -> Self {
        self.redirect = Some(RedirectTarget::Named { name: name.into() });
        self
    }

    pub fn with_props(mut self, props: bool) -> Self {
        self.props = props;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RouteEntry<V>) -> Self {
        self.children.push(child);
        self
    }
}

impl<V> Clone for RouteEntry<V> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            view_id: self.view_id.clone(),
            loader: self.loader.clone(),
            redirect: self.redirect.clone(),
            props: self.props,
            meta: self.meta.clone(),
            children: self.children.clone(),
        }
    }
}

impl<V> fmt::Debug for RouteEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("view_id", &self.view_id)
            .field("has_loader", &self.loader.is_some())
            .field("redirect", &self.redirect)
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}
