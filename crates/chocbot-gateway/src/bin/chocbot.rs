//! chocbot binary
//!
//! Loads configuration, reads the platform auth token from the
//! environment, connects to the platform gateway, and runs the dispatch
//! loop until ctrl-c.

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use chocbot_gateway::{Bot, BotConfig, PlatformClient, TOKEN_ENV_VAR};

/// chocbot - chocolate bars for correct sums
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON config file (defaults used when absent)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the ledger directory
    #[arg(long)]
    data_dir: Option<String>,

    /// Override the platform gateway URL
    #[arg(long)]
    gateway_url: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .init();
    }

    // .env is optional; the variable itself is not.
    let _ = dotenvy::dotenv();
    let token = std::env::var(TOKEN_ENV_VAR).with_context(|| {
        format!(
            "{} is not set; export the platform auth token before starting",
            TOKEN_ENV_VAR
        )
    })?;

    let mut config = match &args.config {
        Some(path) => BotConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => BotConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = args.gateway_url {
        config = config.with_gateway_url(url);
    }

    let bot = Bot::new(config.clone());
    bot.warm_up()
        .await
        .context("Ledger storage is not usable")?;

    let client = PlatformClient::new(&config.gateway_url, &token);
    let descriptors = bot.state().commands.descriptors();
    let connection = client
        .connect(descriptors)
        .await
        .context("Failed to connect to the platform gateway")?;

    let (inbound_tx, inbound_rx) = mpsc::channel(100);
    let (outbound_tx, outbound_rx) = mpsc::channel(100);

    let pump = tokio::spawn(connection.run(inbound_tx, outbound_rx));

    tokio::select! {
        _ = bot.run(inbound_rx, outbound_tx) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl-c received, shutting down");
            bot.shutdown();
        }
    }

    pump.abort();
    Ok(())
}
