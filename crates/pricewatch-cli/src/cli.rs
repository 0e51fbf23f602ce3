use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pricewatch_core::config::{self, TrackerConfig};
use pricewatch_core::control::ShutdownToken;
use pricewatch_core::report::LogSink;
use pricewatch_core::scheduler::Scheduler;
use pricewatch_core::source::CmcSource;

/// Top-level CLI for the pricewatch price tracker.
#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Resilient cryptocurrency price tracker (CoinMarketCap API)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll the quote endpoint and report the price once per interval.
    Track {
        /// Instrument symbol to track (e.g. BTC).
        #[arg(long)]
        symbol: Option<String>,

        /// Quote currency to convert into (e.g. USD).
        #[arg(long)]
        convert: Option<String>,

        /// Polling interval in seconds.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Load global config early; `track` flags override file values.
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Track {
                symbol,
                convert,
                interval,
            } => {
                if let Some(symbol) = symbol {
                    cfg.symbol = symbol;
                }
                if let Some(convert) = convert {
                    cfg.currency = convert;
                }
                if let Some(interval) = interval {
                    cfg.interval_secs = interval;
                }
                cfg.validate().context("invalid configuration")?;

                let api_key = std::env::var("CMC_API_KEY")
                    .context("missing required environment variable: CMC_API_KEY")?;

                run_tracker(cfg, api_key).await
            }
            CliCommand::Config => {
                let toml = toml::to_string_pretty(&cfg)?;
                println!("{}", toml);
                Ok(())
            }
        }
    }
}

/// Wire up shutdown handling and run the scheduler to completion.
async fn run_tracker(cfg: TrackerConfig, api_key: String) -> Result<()> {
    let token = ShutdownToken::new();
    spawn_signal_watcher(token.clone());

    let source = Arc::new(CmcSource::new(
        cfg.api_url.clone(),
        api_key,
        cfg.request_timeout(),
    ));

    let scheduler = Scheduler::new(&cfg, source, Box::new(LogSink), token);
    scheduler.run().await;
    Ok(())
}

/// Set the shutdown token on SIGINT or, on unix, SIGTERM. Duplicate signals
/// are no-ops: the token is level-triggered and set-once.
fn spawn_signal_watcher(token: ShutdownToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received");
        token.request();
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
