use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use devroute_router::{ChunkSortMode, HistoryMode, RedirectPolicy, ScrollBehavior};

use super::{load_config, stub_navigator};

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let navigator = stub_navigator(&config, &[])?;

    let source = if config.routes.is_empty() {
        "built-in"
    } else {
        "config"
    };
    println!(
        "{} {} routes ({})",
        "✓".green(),
        navigator.resolver().table().len(),
        source
    );

    let router = &config.router;
    println!("{}", "router".bold());
    println!(
        "  mode              {}",
        match router.mode {
            HistoryMode::Hash => "hash",
            HistoryMode::History => "history",
        }
    );
    println!("  link active class \"{}\"", router.link_active_class);
    println!("  exact active class \"{}\"", router.link_exact_active_class);
    println!(
        "  scroll behavior   {}",
        match router.scroll_behavior {
            ScrollBehavior::Top => "top",
            ScrollBehavior::Preserve => "preserve",
        }
    );
    println!("  case insensitive  {}", router.case_insensitive);
    println!(
        "  redirects         {}",
        match router.redirects {
            RedirectPolicy::Root => "root",
            RedirectPolicy::Any => "any",
        }
    );

    let build = &config.build;
    println!("{}", "build".bold());
    println!("  lint on save      {}", build.lint_on_save);
    println!("  runtime compiler  {}", build.runtime_compiler);
    println!(
        "  chunk sort mode   {}",
        match build.chunks_sort_mode {
            ChunkSortMode::Unsorted => "none",
            ChunkSortMode::Auto => "auto",
            ChunkSortMode::Manual => "manual",
        }
    );

    Ok(())
}
