//! Error types for route table construction and navigation

use thiserror::Error;

/// Errors surfaced to the host when a navigation cannot be completed
#[derive(Debug, Error)]
pub enum RouteError {
    /// No entry matches the requested path
    #[error("no route matches `{path}`")]
    NotFound { path: String },

    /// The view factory of a matched entry failed
    #[error("failed to load view for route `{name}`")]
    LoadFailure {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("redirect loop while resolving `{path}`")]
    RedirectLoop { path: String },

    #[error("unknown route name `{name}`")]
    UnknownRoute { name: String },

    #[error("route `{name}` requires parameter `{param}`")]
    MissingParam { name: String, param: String },
}

impl RouteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NotFound { .. })
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(self, RouteError::LoadFailure { .. })
    }
}

/// Errors detected while building a route table from its declaration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("route name `{name}` is declared more than once")]
    DuplicateName { name: String },

    #[error("route `{name}` has neither a view loader nor a redirect")]
    MissingLoader { name: String },

    #[error("route `{name}` references unregistered view `{view}`")]
    UnknownView { name: String, view: String },

    #[error("route `{name}` redirects to unknown route `{target}`")]
    InvalidRedirect { name: String, target: String },

    /// Only the root entry may redirect unless the table allows any redirect
    #[error("route `{name}` may not declare a redirect, only the root entry can")]
    RedirectNotAllowed { name: String },
}
