//! CLI administration tool for RediLink.
//!
//! Inspects and repairs store state directly, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check store connection
//! cargo run --bin admin -- ping
//!
//! # Total resolutions served
//! cargo run --bin admin -- stats
//!
//! # Show where a code points and when it expires
//! cargo run --bin admin -- link promo
//!
//! # Inspect or clear a client's quota window
//! cargo run --bin admin -- quota show 203.0.113.7
//! cargo run --bin admin -- quota reset 203.0.113.7
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB` (required)
//! - `STORE_TIMEOUT_MS` (optional, default: 1000)
//! - `API_QUOTA` (optional): shown next to a client's remaining budget

use redilink::application::services::{AnalyticsService, LinkService, QuotaService};
use redilink::config::{Config, mask_connection_string};
use redilink::domain::repositories::KeyValueStore;
use redilink::infrastructure::store::RedisStore;
use redilink::utils::denylist::Denylist;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing RediLink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Check store connection
    Ping,

    /// Show resolution statistics
    Stats,

    /// Show the target and remaining lifetime of a short code
    Link {
        /// Short code, without domain
        code: String,
    },

    /// Inspect or reset client quotas
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },
}

/// Quota subcommands.
#[derive(Subcommand)]
enum QuotaAction {
    /// Show the remaining budget of a client
    Show {
        /// Client identifier (IP address)
        client: String,
    },

    /// Drop a client's window, restoring the full budget
    Reset {
        /// Client identifier (IP address)
        client: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let redis_url = Config::load_redis_url().context("REDIS_URL or REDIS_HOST must be set")?;
    let timeout = Duration::from_millis(Config::load_store_timeout_ms()?);
    let api_quota: Option<u32> = std::env::var("API_QUOTA")
        .ok()
        .and_then(|v| v.parse().ok());

    let store: Arc<dyn KeyValueStore> = Arc::new(
        RedisStore::connect(&redis_url, timeout)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to {}",
                    mask_connection_string(&redis_url)
                )
            })?,
    );

    match cli.command {
        Commands::Ping => handle_ping(&store, &redis_url).await,
        Commands::Stats => handle_stats(store).await,
        Commands::Link { code } => handle_link(store, &code).await,
        Commands::Quota { action } => handle_quota_action(action, store, api_quota).await,
    }
}

async fn handle_ping(store: &Arc<dyn KeyValueStore>, redis_url: &str) -> Result<()> {
    println!("{}", "🔍 Checking store connection...".bright_blue());

    if !store.ping().await {
        anyhow::bail!("PING failed");
    }

    println!(
        "{} {}",
        "✅ Store connection OK:".green().bold(),
        mask_connection_string(redis_url).bright_black()
    );
    Ok(())
}

/// Displays the global resolution counter.
async fn handle_stats(store: Arc<dyn KeyValueStore>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let total = AnalyticsService::new(store)
        .total_resolutions()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read counter: {}", e))?;

    println!(
        "  Resolutions: {}",
        total.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Displays a short code's target without counting it as a resolution.
async fn handle_link(store: Arc<dyn KeyValueStore>, code: &str) -> Result<()> {
    let analytics = Arc::new(AnalyticsService::new(store.clone()));
    let links = LinkService::new(store, analytics, Denylist::default());

    let details = match links.inspect(code).await {
        Ok(details) => details,
        Err(redilink::AppError::NotFound { .. }) => {
            println!("{}", format!("⚠️  No live link for '{}'", code).yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to read link: {}", e)),
    };

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Code:    {}", details.code.cyan());
    println!("  Target:  {}", details.target.bright_white());
    println!(
        "  Expires: {}",
        details
            .expires_in
            .map_or_else(|| "never".to_string(), format_duration)
            .bright_black()
    );
    println!();

    Ok(())
}

/// Dispatches quota commands.
async fn handle_quota_action(
    action: QuotaAction,
    store: Arc<dyn KeyValueStore>,
    api_quota: Option<u32>,
) -> Result<()> {
    // The budget size only matters for opening windows, which admin never does
    let quotas = QuotaService::new(store, api_quota.unwrap_or(1));

    match action {
        QuotaAction::Show { client } => {
            let status = quotas
                .status(&client)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read quota: {}", e))?;

            println!("{}", "⏱️  Quota".bright_blue().bold());
            println!();
            println!("  Client:    {}", client.cyan());

            match status {
                Some(status) => {
                    let remaining = match api_quota {
                        Some(max) => format!("{} / {}", status.remaining, max),
                        None => status.remaining.to_string(),
                    };
                    let remaining = if status.remaining > 0 {
                        remaining.green()
                    } else {
                        remaining.red()
                    };
                    println!("  Remaining: {}", remaining.bold());
                    println!("  Resets in: {} min", status.reset_minutes);
                }
                None => {
                    println!("  {}", "No active window (full budget)".bright_black());
                }
            }
            println!();
        }
        QuotaAction::Reset { client, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Reset quota window of {}?", client))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let existed = quotas
                .reset(&client)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to reset quota: {}", e))?;

            if existed {
                println!("{}", "✅ Quota reset".green().bold());
            } else {
                println!("{}", "⚠️  No active window for this client".yellow());
            }
        }
    }

    Ok(())
}

/// Renders a lifetime as `1d 2h 3m`.
fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let (days, hours, minutes) = (total / 86_400, total % 86_400 / 3600, total % 3600 / 60);

    match (days, hours) {
        (0, 0) => format!("{}m {}s", minutes, total % 60),
        (0, _) => format!("{}h {}m", hours, minutes),
        _ => format!("{}d {}h {}m", days, hours, minutes),
    }
}
