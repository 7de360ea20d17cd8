//! Phaseboard - cached rollup dashboard for a Jira initiative.
//!
//! Fetches one initiative, its phases and their tasks, rolls up progress
//! and team workload, and serves the result through a time-bound cache.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration, network or aggregation error

mod analysis;
mod cache;
mod cli;
mod config;
mod error;
mod jira;
mod models;
mod normalize;
mod report;
mod server;

use analysis::{Aggregator, AggregatorConfig};
use anyhow::{Context, Result};
use cache::SnapshotCache;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use jira::{JiraClient, JiraClientConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use models::MilestoneRule;
use server::AppState;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Phaseboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", redacted(&args));

    if let Err(e) = run(args).await {
        error!("Phaseboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .phaseboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set jira.base_url, jira.email and jira.api_token before running.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over `--verbose`/`--quiet` when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Copy of the arguments safe to log.
fn redacted(args: &Args) -> Args {
    let mut args = args.clone();
    if args.api_token.is_some() {
        args.api_token = Some("***".to_string());
    }
    args
}

/// Build the pipeline from configuration and run the selected mode.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().map_err(anyhow::Error::msg)?;

    if config.jira.email.is_empty() || config.jira.api_token.is_empty() {
        warn!("Jira email or API token not set; requests will be unauthenticated");
    }

    let cache = build_cache(&config)?;

    if args.once {
        return run_once(&args, &cache, &config.milestones).await;
    }

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host: {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    println!("📊 Tracking initiative {}", config.jira.initiative_key);
    println!("   Jira: {}", config.jira.base_url);
    println!("   Cache TTL: {}s", cache.ttl().as_secs());
    println!("   Dashboard: http://{}\n", addr);

    let state = AppState::new(cache, config.milestones.clone());
    server::serve(state, addr, Path::new(&config.server.static_dir)).await
}

/// Wire the Jira client, aggregator and cache together.
fn build_cache(config: &Config) -> Result<SnapshotCache> {
    let client = JiraClient::new(JiraClientConfig {
        base_url: config.jira.base_url.clone(),
        email: config.jira.email.clone(),
        api_token: config.jira.api_token.clone(),
        timeout_seconds: config.jira.timeout_seconds,
    })?;

    let aggregator = Aggregator::new(
        Arc::new(client),
        AggregatorConfig {
            base_url: config.jira.base_url.clone(),
            initiative_key: config.jira.initiative_key.clone(),
            page_size: config.jira.page_size,
        },
    );

    Ok(SnapshotCache::new(
        aggregator,
        Duration::from_secs(config.cache.ttl_seconds),
    ))
}

/// Handle --once: build one snapshot, render it, and write it out.
async fn run_once(
    args: &Args,
    cache: &SnapshotCache,
    milestone_rules: &[MilestoneRule],
) -> Result<()> {
    let spinner = if args.quiet || args.output.is_none() {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching initiative, phases and tasks from Jira...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = cache.get(true).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let snapshot = result.context("Failed to build dashboard snapshot")?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&snapshot)?,
        OutputFormat::Markdown => report::generate_markdown_report(&snapshot, milestone_rules),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            let kpi = &snapshot.kpi;
            println!("\n📊 {}: {}", snapshot.initiative.key, snapshot.initiative.summary);
            println!(
                "   Tasks: {} | ✅ Done: {} | 🔄 In Progress: {} | 📋 To Do: {}",
                kpi.total_tasks, kpi.done, kpi.in_progress, kpi.todo
            );
            println!(
                "   Phases done: {}/{} | Overall: {:.1}%",
                kpi.phases_done, kpi.phases_total, kpi.percent_done
            );
            println!("\n✅ Report saved to: {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
