use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use devroute_router::{ActiveRoute, NavigationOutcome, Navigator, Params};
use serde_json::{json, Value};

use super::{load_config, stub_navigator};

pub struct Request {
    pub target: String,
    pub by_name: bool,
    pub params: Params,
    pub fail_views: Vec<String>,
    pub json: bool,
}

/// Parses a `key=value` route parameter
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{}`", raw)),
    }
}

pub async fn run(config_path: Option<&Path>, request: &Request) -> Result<()> {
    let config = load_config(config_path)?;
    let navigator = stub_navigator(&config, &request.fail_views)?;

    let outcome = if request.by_name {
        navigator.navigate_named(&request.target, &request.params).await?
    } else {
        navigator.navigate_href(&request.target).await?
    };

    let active = match outcome {
        NavigationOutcome::Activated(active) => active,
        NavigationOutcome::Superseded => anyhow::bail!("navigation was superseded"),
    };

    let report = report(&navigator, &active).await;
    if request.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Collects everything the host rendering layer would receive
async fn report(navigator: &Navigator<String>, active: &ActiveRoute<String>) -> Value {
    let mut links = serde_json::Map::new();
    for route in navigator.resolver().table().iter() {
        let href = format!("#{}", route.pattern());
        let class = navigator.link_class(&href).await;
        links.insert(route.name().to_string(), json!(class));
    }

    let views: Vec<Value> = active
        .views
        .iter()
        .map(|view| {
            json!({
                "route": view.name,
                "view": view.view,
                "props": view.props,
            })
        })
        .collect();

    json!({
        "route": active.name,
        "href": navigator.current_href().await,
        "redirected_from": active.redirected_from.as_ref().map(|loc| loc.href(navigator.settings().mode)),
        "params": active.params,
        "views": views,
        "scroll_y": navigator.scroll_position().await.y,
        "links": links,
    })
}

fn print_report(report: &Value) {
    let text = |key: &str| report[key].as_str().unwrap_or("-").to_string();

    println!("{} {}", "route".bold(), text("route").green());
    println!("{} {}", "href".bold(), text("href"));
    if let Some(from) = report["redirected_from"].as_str() {
        println!("{} {}", "redirected from".bold(), from.yellow());
    }

    println!("{}", "views".bold());
    if let Some(views) = report["views"].as_array() {
        for view in views {
            let props = match &view["props"] {
                Value::Null => "-".to_string(),
                props => props.to_string(),
            };
            println!(
                "  {} {} props={}",
                view["route"].as_str().unwrap_or("-").cyan(),
                view["view"].as_str().unwrap_or("-"),
                props
            );
        }
    }

    println!("{} {}", "scroll y".bold(), report["scroll_y"]);

    println!("{}", "links".bold());
    if let Some(links) = report["links"].as_object() {
        for (name, class) in links {
            println!("  {} {}", name, class.as_str().unwrap_or("-"));
        }
    }
}
