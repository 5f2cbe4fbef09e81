use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use devroute_router::CompiledRoute;

use super::{load_config, stub_navigator};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let navigator = stub_navigator(&config, &[])?;
    let table = navigator.resolver().table();

    println!("{} routes", table.len().to_string().bold());

    for route in table.iter() {
        println!("{}", route_line(route));
    }

    Ok(())
}

fn route_line<V>(route: &CompiledRoute<V>) -> String {
    let indent = "  ".repeat(route.depth());
    let mut line = format!(
        "{}{} {}",
        indent,
        route.name().green().bold(),
        route.pattern().as_str().cyan()
    );

    if let Some(view) = route.view_id() {
        line.push_str(&format!(" view={}", view));
    }
    if let Some(redirect) = route.redirect() {
        line.push_str(&format!(" {} {}", "→".yellow(), redirect));
    }
    if route.props() {
        line.push_str(" props");
    }
    for (key, value) in route.meta() {
        line.push_str(&format!(" {}={}", key.dimmed(), value));
    }

    line
}
