mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "devroute", about = "Inspect and exercise device UI route tables")]
struct Cli {
    /// Route configuration file (defaults to ./devroute.toml, then the built-in table)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log view loads and navigation steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route with its effective pattern
    Routes,
    /// Navigate to a target and print the activated views
    Resolve {
        /// Address (`#/devices`) or, with --name, a route name
        target: String,
        /// Treat TARGET as a route name
        #[arg(long)]
        name: bool,
        /// Route parameter for --name navigation (key=value)
        #[arg(long = "param", value_parser = commands::resolve::parse_param)]
        params: Vec<(String, String)>,
        /// Make the loader of this view fail
        #[arg(long = "fail-view")]
        fail_views: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the route table and show router/build settings
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Routes => commands::routes::run(config),
        Commands::Resolve {
            target,
            name,
            params,
            fail_views,
            json,
        } => {
            let request = commands::resolve::Request {
                target,
                by_name: name,
                params: params.into_iter().collect(),
                fail_views,
                json,
            };
            commands::resolve::run(config, &request).await
        }
        Commands::Check => commands::check::run(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
