pub mod check;
pub mod resolve;
pub mod routes;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use devroute_router::{loader_fn, Config, Navigator, RouteDeclaration, ViewRegistry};
use tracing::debug;

/// Loads the config file, or `./devroute.toml` when none is given
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
            Config::load(path)
        }
        None => Config::load_default(),
    }
}

/// Every view identifier referenced by the declarations
pub fn view_ids(declarations: &[RouteDeclaration]) -> BTreeSet<String> {
    fn collect(decl: &RouteDeclaration, ids: &mut BTreeSet<String>) {
        if let Some(view) = &decl.view {
            ids.insert(view.clone());
        }
        for child in &decl.children {
            collect(child, ids);
        }
    }

    let mut ids = BTreeSet::new();
    for decl in declarations {
        collect(decl, &mut ids);
    }
    ids
}

/// Registry of stand-in loaders that resolve to the view identifier
///
/// Views listed in `fail` get loaders that always error.
pub fn stub_registry(declarations: &[RouteDeclaration], fail: &[String]) -> ViewRegistry<String> {
    let mut registry = ViewRegistry::new();

    for id in view_ids(declarations) {
        let failing = fail.contains(&id);
        let view = id.clone();
        registry.register(
            id,
            loader_fn(move || {
                let view = view.clone();
                async move {
                    debug!(view = %view, "fetching view chunk");
                    if failing {
                        anyhow::bail!("chunk for view `{}` could not be fetched", view);
                    }
                    Ok(view)
                }
            }),
        );
    }

    registry
}

/// Builds a navigator over the configured table with stub loaders
pub fn stub_navigator(config: &Config, fail: &[String]) -> Result<Navigator<String>> {
    let registry = stub_registry(&config.route_declarations(), fail);
    Navigator::from_config(config, &registry).context("invalid route table")
}
