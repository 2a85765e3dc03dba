use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use log::info;
use serde::Serialize;

use topograph_core::{analyze, AnalysisContext, Config, NamespacedNamer, ProjectViews, Snapshot};

#[derive(Parser)]
#[command(name = "topograph")]
#[command(about = "Inspect the resource topology of a cluster snapshot", long_about = None)]
struct Cli {
    /// Config file to use instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the topology graph as JSON
    Graph {
        /// Snapshot file (YAML or JSON)
        snapshot: PathBuf,
    },
    /// Print the pipeline views as JSON
    Views {
        /// Snapshot file (YAML or JSON)
        snapshot: PathBuf,
    },
    /// Run the diagnostic rules and print the markers as JSON
    Analyze {
        /// Snapshot file (YAML or JSON)
        snapshot: PathBuf,

        /// Reference time for windowed rules (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<String>,

        /// Namespace named without a suffix in messages
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Print the default configuration as TOML
    Config,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().wrap_err("Failed to load config")?,
    };

    match cli.command {
        Commands::Graph { snapshot } => {
            let graph = load_snapshot(&snapshot)?.build_graph();
            info!("Graph has {} nodes and {} edges", graph.node_count(), graph.edge_count());
            print_json(&graph)?;
        }
        Commands::Views { snapshot } => {
            let graph = load_snapshot(&snapshot)?.build_graph();
            print_json(&ProjectViews::build(&graph))?;
        }
        Commands::Analyze {
            snapshot,
            now,
            namespace,
        } => {
            let graph = load_snapshot(&snapshot)?.build_graph();
            let now = match now {
                Some(text) => parse_time(&text)?,
                None => Utc::now(),
            };
            let namer = NamespacedNamer::new(namespace.unwrap_or_else(|| config.namer.current_namespace.clone()));
            let ctx = AnalysisContext::from_config(now, &config);
            let markers = analyze(&graph, &namer, &ctx);
            info!("Analysis produced {} markers", markers.len());
            print_json(&markers)?;
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::from_file(path).wrap_err_with(|| format!("Failed to load snapshot {}", path.display()))
}

fn parse_time(text: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text).wrap_err_with(|| format!("Invalid --now value {text:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
