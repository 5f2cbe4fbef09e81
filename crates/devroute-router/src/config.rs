// File: src/config.rs
// Purpose: Router, build and route-table configuration parsed from devroute.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::declared;
use crate::location::HistoryMode;
use crate::route::RouteDeclaration;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "devroute.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub build: BuildConfig,

    /// Route declarations; empty means the built-in device routes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteDeclaration>,
}

/// Navigation behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterConfig {
    #[serde(default)]
    pub mode: HistoryMode,

    /// Class applied to links whose target contains the current route
    #[serde(default = "default_link_active_class")]
    pub link_active_class: String,

    /// Class added when the link target is exactly the current route
    #[serde(default = "default_link_exact_active_class")]
    pub link_exact_active_class: String,

    #[serde(default)]
    pub scroll_behavior: ScrollBehavior,

    #[serde(default = "default_false")]
    pub case_insensitive: bool,

    #[serde(default)]
    pub redirects: RedirectPolicy,
}

/// What happens to the scroll offset after a successful navigation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Reset the vertical offset to 0
    #[default]
    Top,
    /// Leave the offset untouched
    Preserve,
}

/// Which entries of a table may declare a redirect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedirectPolicy {
    /// Only the top-level `/` entry, and only once
    #[default]
    Root,
    /// Any entry; a redirecting entry needs no view
    Any,
}

/// Packaging settings of the UI bundle
///
/// Recorded for completeness; none of them affect resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_false")]
    pub lint_on_save: bool,

    /// Ship the template compiler so views can use string templates
    #[serde(default = "default_true")]
    pub runtime_compiler: bool,

    #[serde(default)]
    pub chunks_sort_mode: ChunkSortMode,
}

/// Ordering of generated asset references in the HTML entry point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSortMode {
    /// Keep declaration order
    #[default]
    #[serde(rename = "none")]
    Unsorted,
    Auto,
    Manual,
}

// Default values
fn default_link_active_class() -> String {
    "open active".to_string()
}

fn default_link_exact_active_class() -> String {
    "router-link-exact-active".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: HistoryMode::Hash,
            link_active_class: default_link_active_class(),
            link_exact_active_class: default_link_exact_active_class(),
            scroll_behavior: ScrollBehavior::Top,
            case_insensitive: false,
            redirects: RedirectPolicy::Root,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            lint_on_save: false,
            runtime_compiler: true,
            chunks_sort_mode: ChunkSortMode::Unsorted,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from the default path (./devroute.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(toml::from_str(content)?)
    }

    /// Declared routes, falling back to the built-in table
    pub fn route_declarations(&self) -> Vec<RouteDeclaration> {
        if self.routes.is_empty() {
            declared::routes()
        } else {
            self.routes.clone()
        }
    }
}
