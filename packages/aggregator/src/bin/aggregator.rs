//! Race calendar aggregator CLI
//!
//! One-shot batch commands over the race catalog, meant to be driven by
//! cron: scrape and merge the sources, publish the next race, list what is
//! coming up, prune what already happened.

use aggregator_core::config::Config;
use aggregator_core::domains::races::activities::prune::prune_past;
use aggregator_core::domains::races::activities::publish::{publish_next, PublishOutcome};
use aggregator_core::domains::races::activities::sync::{run_sync, run_sync_offline};
use aggregator_core::domains::races::models::Race;
use aggregator_core::domains::sources::all_sources;
use aggregator_core::kernel::http;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use make_webhook::WebhookClient;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aggregator")]
#[command(about = "Murcia race calendar aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every source and refresh the catalog
    Sync {
        /// Replay the last fetched snapshots instead of hitting the network
        #[arg(long)]
        offline: bool,
    },

    /// Send the next unannounced race to the Make.com webhook
    Publish,

    /// Print upcoming races from the catalog
    List,

    /// Delete races that finished more than --keep-days ago
    Prune {
        #[arg(long, default_value_t = 30)]
        keep_days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,aggregator_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = get_pool(&config).await?;

    match cli.command {
        Commands::Sync { offline } => cmd_sync(&config, offline, &pool).await,
        Commands::Publish => cmd_publish(&config, &pool).await,
        Commands::List => cmd_list(&pool).await,
        Commands::Prune { keep_days } => cmd_prune(keep_days, &pool).await,
    }
}

async fn get_pool(config: &Config) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    Race::ensure_schema(&pool).await?;
    Ok(pool)
}

async fn cmd_sync(config: &Config, offline: bool, pool: &SqlitePool) -> Result<()> {
    let summary = if offline {
        run_sync_offline(config, pool).await?
    } else {
        let client = http::build_client()?;
        let sources = all_sources(&client);
        run_sync(config, &sources, pool).await?
    };

    println!(
        "{} new, {} updated, {} duplicates merged ({} sources failed)",
        summary.inserted, summary.updated, summary.duplicates_merged, summary.sources_failed
    );

    Ok(())
}

async fn cmd_publish(config: &Config, pool: &SqlitePool) -> Result<()> {
    let webhook = config.webhook_url.clone().map(WebhookClient::new);
    let today = Utc::now().date_naive();

    match publish_next(webhook.as_ref(), today, pool).await? {
        PublishOutcome::Disabled => println!("Publication disabled: WEBHOOK_URL is not set"),
        PublishOutcome::NothingPending => println!("Nothing to publish"),
        PublishOutcome::Published { title } => println!("Published: {}", title),
        PublishOutcome::SendFailed { title } => println!("Delivery failed for: {}", title),
    }

    Ok(())
}

async fn cmd_list(pool: &SqlitePool) -> Result<()> {
    let today = Utc::now().date_naive();
    let races = Race::find_upcoming(today, pool).await?;

    if races.is_empty() {
        println!("No upcoming races.");
        return Ok(());
    }

    for race in races {
        println!(
            "{}  {}  ({})",
            race.display_date(),
            race.title,
            race.location
        );
    }

    Ok(())
}

async fn cmd_prune(keep_days: u32, pool: &SqlitePool) -> Result<()> {
    let today = Utc::now().date_naive();
    let removed = prune_past(i64::from(keep_days), today, pool).await?;
    println!("Removed {} past races", removed);
    Ok(())
}
