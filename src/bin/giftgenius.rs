//! GiftGenius server and command-line tools.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gift_search::ProviderConfig;
use gift_search::config::FixtureConfig;
use giftgenius::{AppConfig, GiftService, ProfileRequest, SearchHistory};
use tracing_subscriber::EnvFilter;

/// GiftGenius: personalised gift recommendations from Brazilian stores.
#[derive(Parser)]
#[command(name = "giftgenius", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Do not read or write the search history database.
    #[arg(long, global = true)]
    no_history: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Override the configured listen host.
        #[arg(long)]
        host: Option<String>,
        /// Override the configured listen port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one recommendation and print it as JSON.
    Search {
        /// Questionnaire as JSON, or `@path` to read it from a file.
        #[arg(long)]
        profile: String,
        /// Use the deterministic demo store instead of the configured ones.
        #[arg(long)]
        fixture: bool,
    },

    /// Print usage statistics as JSON.
    Stats {
        /// Also list this many recent searches.
        #[arg(long, default_value_t = 0)]
        recent: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `search` and `stats` output stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("giftgenius=info,gift_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load_or_default(&AppConfig::default_config_path())?,
    };
    if cli.no_history {
        config.history.enabled = false;
    }

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => run_serve(config, host, port).await,
        Command::Search { profile, fixture } => run_search(config, &profile, fixture).await,
        Command::Stats { recent } => run_stats(&config, recent),
    }
}

async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = GiftService::from_config(&config)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        stores = config.search.providers.len(),
        history = config.history.enabled,
        "starting GiftGenius"
    );
    giftgenius::server::serve(&config.server.bind_addr(), service).await?;
    Ok(())
}

async fn run_search(mut config: AppConfig, profile: &str, fixture: bool) -> anyhow::Result<()> {
    let raw = match profile.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading profile from {path}"))?,
        None => profile.to_owned(),
    };
    let request: ProfileRequest =
        serde_json::from_str(&raw).context("profile must be a JSON object")?;

    if fixture {
        config.search.providers = vec![ProviderConfig::Fixture(FixtureConfig {
            store_name: "Demo".to_owned(),
        })];
    }

    let service = GiftService::from_config(&config)?;
    let recommendation = service.find_gifts(&request, None).await?;
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

fn run_stats(config: &AppConfig, recent: usize) -> anyhow::Result<()> {
    if !config.history.enabled {
        anyhow::bail!("search history is disabled");
    }
    let history = SearchHistory::open(&config.history.db_path)?;
    let stats = history.statistics()?;

    let output = if recent > 0 {
        let searches = history.recent_searches(recent)?;
        serde_json::json!({
            "statistics": stats,
            "recent": searches,
        })
    } else {
        serde_json::to_value(&stats)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
