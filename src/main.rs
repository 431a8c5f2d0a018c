// =============================================================================
// RSI Signal Bot — Main Entry Point
// =============================================================================
//
// Scans a list of Binance spot pairs on a fixed cadence, computes RSI and EMA
// over recent closes, and posts BUY / SELL alerts to Telegram.  A small status
// server runs alongside the scanner.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod binance;
mod indicators;
mod market_data;
mod notify;
mod runtime_config;
mod scheduler;
mod signals;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::rest::StatusInfo;
use crate::binance::BinanceClient;
use crate::runtime_config::RuntimeConfig;
use crate::scheduler::SignalScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("RSI Signal Bot — starting up");

    let config_path = std::env::var("RSI_BOT_CONFIG").unwrap_or_else(|_| "rsi_bot.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();
    config.validate().context("invalid configuration")?;

    info!(
        symbols = ?config.symbols,
        interval = %config.interval,
        rsi_period = config.rsi_period,
        ema_period = config.ema_period,
        buy = config.buy_threshold,
        sell = config.sell_threshold,
        policy = %config.policy,
        transition_only = config.notify_on_transition_only,
        "Configured scanner"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let source = Arc::new(BinanceClient::new(
        config.binance_base_url.clone(),
        config.request_timeout(),
    )?);
    let notifier = notify::from_env(&config.telegram_base_url, config.request_timeout());

    // ── 3. Status server ─────────────────────────────────────────────────
    let status = Arc::new(StatusInfo::from_config(&config, notifier.kind()));
    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid PORT value '{raw}'"))?,
        Err(_) => 8080,
    };
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind status server on {bind_addr}"))?;
    info!(addr = %bind_addr, "Status server listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api::rest::router(status)).await {
            error!(error = %e, "Status server failed");
        }
    });

    // ── 4. Scanner loop ──────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = SignalScheduler::new(config, source, notifier);
    let scan_task = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    let _ = shutdown_tx.send(true);
    if let Err(e) = scan_task.await {
        error!(error = %e, "Scanner task ended abnormally");
    }

    info!("RSI Signal Bot shut down complete.");
    Ok(())
}
