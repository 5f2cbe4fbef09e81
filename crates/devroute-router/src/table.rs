//! The immutable route table
//!
//! Entries are flattened depth-first into an arena indexed by [`RouteId`].
//! Each compiled route knows its parent, so a matched leaf yields the whole
//! ancestor chain without walking the tree again.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::RedirectPolicy;
use crate::error::TableError;
use crate::loader::{LazyView, ViewRegistry};
use crate::path::join_paths;
use crate::route::{Pattern, RedirectTarget, RouteDeclaration, RouteEntry};
use crate::Params;

/// Stable identity of an entry within its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

/// A route entry compiled into the table
pub struct CompiledRoute<V> {
    id: RouteId,
    name: String,
    declared_path: String,
    pattern: Pattern,
    parent: Option<RouteId>,
    depth: usize,
    redirect: Option<RedirectTarget>,
    props: bool,
    meta: BTreeMap<String, String>,
    view: Option<LazyView<V>>,
}

impl<V> CompiledRoute<V> {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path as written in the declaration, relative to the parent
    pub fn declared_path(&self) -> &str {
        &self.declared_path
    }

    /// Effective pattern: all ancestor paths concatenated
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn redirect(&self) -> Option<&RedirectTarget> {
        self.redirect.as_ref()
    }

    pub fn props(&self) -> bool {
        self.props
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn view(&self) -> Option<&LazyView<V>> {
        self.view.as_ref()
    }

    pub fn view_id(&self) -> Option<&str> {
        self.view.as_ref().map(LazyView::view_id)
    }
}

impl<V> fmt::Debug for CompiledRoute<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("parent", &self.parent)
            .field("redirect", &self.redirect)
            .field("props", &self.props)
            .field("view", &self.view)
            .finish()
    }
}

/// Immutable arena of compiled routes
///
/// # Examples
///
/// ```
/// use devroute_router::{loader_fn, RouteEntry, RouteTable};
///
/// let table = RouteTable::from_entries(vec![
///     RouteEntry::new("/", "Home")
///         .with_redirect("/devices")
///         .with_child(RouteEntry::new("devices", "Devices").with_loader(loader_fn(|| async { Ok("devices") }))),
/// ])
/// .unwrap();
///
/// assert_eq!(table.by_name("Devices").unwrap().pattern().as_str(), "/devices");
/// ```
pub struct RouteTable<V> {
    routes: Vec<CompiledRoute<V>>,
    by_name: HashMap<String, RouteId>,
    match_order: Vec<RouteId>,
}

impl<V> RouteTable<V> {
    /// Compiles bound entries, validating the invariants of the table
    ///
    /// Only the root entry may redirect; see [`RouteTable::from_entries_with`].
    pub fn from_entries(entries: Vec<RouteEntry<V>>) -> Result<Self, TableError> {
        Self::from_entries_with(entries, RedirectPolicy::Root)
    }

    pub fn from_entries_with(entries: Vec<RouteEntry<V>>, policy: RedirectPolicy) -> Result<Self, TableError> {
        let mut table = Self {
            routes: Vec::new(),
            by_name: HashMap::new(),
            match_order: Vec::new(),
        };

        for entry in entries {
            table.compile(entry, None, "/")?;
        }

        table.validate_redirects(policy)?;

        let mut order: Vec<RouteId> = table.routes.iter().map(|r| r.id).collect();
        order.sort_by_key(|id| {
            let route = &table.routes[id.0];
            (route.pattern.priority(), Reverse(route.depth), route.id)
        });
        table.match_order = order;

        Ok(table)
    }

    /// Binds declarations against a registry and compiles them
    pub fn from_declarations(
        declarations: &[RouteDeclaration],
        registry: &ViewRegistry<V>,
    ) -> Result<Self, TableError> {
        Self::from_declarations_with(declarations, registry, RedirectPolicy::Root)
    }

    pub fn from_declarations_with(
        declarations: &[RouteDeclaration],
        registry: &ViewRegistry<V>,
        policy: RedirectPolicy,
    ) -> Result<Self, TableError> {
        let entries = declarations
            .iter()
            .map(|decl| decl.bind(registry))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries_with(entries, policy)
    }

    fn compile(
        &mut self,
        entry: RouteEntry<V>,
        parent: Option<RouteId>,
        parent_path: &str,
    ) -> Result<(), TableError> {
        if self.by_name.contains_key(&entry.name) {
            return Err(TableError::DuplicateName { name: entry.name });
        }

        if entry.loader.is_none() && entry.redirect.is_none() {
            return Err(TableError::MissingLoader { name: entry.name });
        }

        let effective = join_paths(parent_path, &entry.path);
        let id = RouteId(self.routes.len());
        let depth = parent.map(|p| self.routes[p.0].depth + 1).unwrap_or(0);

        let view = entry.loader.map(|loader| {
            let view_id = entry.view_id.clone().unwrap_or_else(|| entry.name.clone());
            LazyView::new(view_id, loader)
        });

        self.by_name.insert(entry.name.clone(), id);
        self.routes.push(CompiledRoute {
            id,
            name: entry.name,
            declared_path: entry.path,
            pattern: Pattern::parse(&effective),
            parent,
            depth,
            redirect: entry.redirect,
            props: entry.props,
            meta: entry.meta,
            view,
        });

        for child in entry.children {
            self.compile(child, Some(id), &effective)?;
        }

        Ok(())
    }

    fn validate_redirects(&self, policy: RedirectPolicy) -> Result<(), TableError> {
        if policy == RedirectPolicy::Root {
            let mut redirecting = self.routes.iter().filter(|r| r.redirect.is_some());
            if let Some(first) = redirecting.next() {
                if first.parent.is_some() || first.pattern.as_str() != "/" {
                    return Err(TableError::RedirectNotAllowed { name: first.name.clone() });
                }
            }
            if let Some(second) = redirecting.next() {
                return Err(TableError::RedirectNotAllowed { name: second.name.clone() });
            }
        }

        for route in &self.routes {
            if let Some(RedirectTarget::Named { name }) = &route.redirect {
                if !self.by_name.contains_key(name) {
                    return Err(TableError::InvalidRedirect {
                        name: route.name.clone(),
                        target: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: RouteId) -> &CompiledRoute<V> {
        &self.routes[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&CompiledRoute<V>> {
        self.by_name.get(name).map(|id| &self.routes[id.0])
    }

    /// Routes in declaration order (parents before children)
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute<V>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Ancestor chain of a route, outermost first
    pub fn chain(&self, id: RouteId) -> Vec<RouteId> {
        let mut chain = Vec::with_capacity(self.routes[id.0].depth + 1);
        let mut current = Some(id);
        while let Some(id) = current {
            chain.push(id);
            current = self.routes[id.0].parent;
        }
        chain.reverse();
        chain
    }

    /// Finds the best match for a canonical path
    ///
    /// Static patterns win over dynamic ones; on equal patterns the deepest
    /// entry wins, then the first declared.
    pub fn match_path(&self, path: &str, case_insensitive: bool) -> Option<(RouteId, Params)> {
        self.match_order.iter().find_map(|id| {
            self.routes[id.0]
                .pattern
                .matches(path, case_insensitive)
                .map(|params| (*id, params))
        })
    }
}

impl<V> fmt::Debug for RouteTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}
