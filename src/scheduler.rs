// =============================================================================
// Signal Scheduler — periodic RSI/EMA scan across the symbol list
// =============================================================================
//
// One cycle:
//   1. For each configured symbol (in order), fetch the latest `limit` candles.
//   2. Compute RSI and EMA over the closes.
//   3. Classify the latest reading under the configured policy.
//   4. On BUY / SELL, format an alert and hand it to the notifier.
//
// Every symbol runs inside its own failure boundary: a fetch error, timeout or
// malformed series becomes a `SymbolOutcome::Failed` for that symbol and the
// cycle moves on.  After the last symbol the scheduler sleeps for the polling
// period and starts over, until the shutdown channel flips to `true`.
//
// Spawned once at startup:
//
//   tokio::spawn(async move { scheduler.run(shutdown_rx).await });
//
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::indicators::IndicatorSeries;
use crate::market_data::{self, MarketDataSource};
use crate::notify::Notifier;
use crate::runtime_config::RuntimeConfig;
use crate::signals::{classify, format_message, Evaluation, SignalTracker};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened to one symbol during one cycle.
#[derive(Debug, Clone, Serialize)]
pub enum SymbolOutcome {
    /// BUY or SELL fired and the notifier was called.
    Signalled { evaluation: Evaluation, delivered: bool },
    /// BUY or SELL fired but repeats the previous cycle's verdict.
    Suppressed { evaluation: Evaluation },
    /// Indicators were defined; no rule matched.
    NoSignal { evaluation: Evaluation },
    /// Too few candles for one of the indicator windows.
    InsufficientHistory { candles: usize },
    /// Fetch or decode failed; the symbol was skipped.
    Failed { reason: String },
}

impl std::fmt::Display for SymbolOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signalled {
                evaluation,
                delivered,
            } => write!(f, "Signalled({}, delivered={delivered})", evaluation.signal),
            Self::Suppressed { evaluation } => write!(f, "Suppressed({})", evaluation.signal),
            Self::NoSignal { .. } => write!(f, "NoSignal"),
            Self::InsufficientHistory { candles } => write!(f, "InsufficientHistory({candles})"),
            Self::Failed { reason } => write!(f, "Failed({reason})"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

/// Aggregated result of one pass over the symbol list.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Unique identifier for this cycle (UUID v4).
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub symbols: Vec<SymbolReport>,
}

impl CycleReport {
    /// Symbols whose rule fired this cycle, delivered or suppressed.
    pub fn signals(&self) -> usize {
        self.symbols
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    SymbolOutcome::Signalled { .. } | SymbolOutcome::Suppressed { .. }
                )
            })
            .count()
    }

    pub fn failures(&self) -> usize {
        self.symbols
            .iter()
            .filter(|r| matches!(r.outcome, SymbolOutcome::Failed { .. }))
            .count()
    }

    #[cfg(test)]
    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.symbols
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.outcome)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct SignalScheduler {
    config: RuntimeConfig,
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    tracker: SignalTracker,
}

impl SignalScheduler {
    pub fn new(
        config: RuntimeConfig,
        source: Arc<dyn MarketDataSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            source,
            notifier,
            tracker: SignalTracker::new(),
        }
    }

    /// Run cycles until `shutdown` becomes `true` (or its sender is dropped).
    ///
    /// Shutdown is honoured both mid-cycle and during the inter-cycle sleep.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            symbols = self.config.symbols.len(),
            interval = %self.config.interval,
            poll_secs = self.config.poll_interval_secs,
            policy = %self.config.policy,
            notifier = self.notifier.kind(),
            "Signal scheduler started"
        );

        if self.config.announce_startup {
            let text = format!(
                "🚀 RSI signal bot started: scanning {} symbols on {} candles",
                self.config.symbols.len(),
                self.config.interval
            );
            if let Err(e) = self.notify(&text).await {
                warn!(error = %e, "startup announcement failed");
            }
        }

        loop {
            tokio::select! {
                report = self.run_cycle() => log_cycle(&report),
                _ = wait_for_shutdown(&mut shutdown) => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        info!("Signal scheduler stopped");
    }

    /// Evaluate every configured symbol once.
    pub async fn run_cycle(&self) -> CycleReport {
        let id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        debug!(cycle_id = %id, "scanning RSI/EMA signals");

        let mut symbols = Vec::with_capacity(self.config.symbols.len());
        for symbol in &self.config.symbols {
            let outcome = match self.process_symbol(symbol).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let reason = format!("{e:#}");
                    error!(symbol = %symbol, error = %reason, "symbol evaluation failed");
                    SymbolOutcome::Failed { reason }
                }
            };
            debug!(symbol = %symbol, outcome = %outcome, "symbol processed");
            symbols.push(SymbolReport {
                symbol: symbol.clone(),
                outcome,
            });
        }

        CycleReport {
            id,
            started_at,
            finished_at: Utc::now(),
            symbols,
        }
    }

    async fn process_symbol(&self, symbol: &str) -> Result<SymbolOutcome> {
        match self.evaluate_symbol(symbol).await? {
            Reading::Ready(evaluation) => Ok(self.dispatch(evaluation).await),
            Reading::Short { candles } => {
                self.tracker.reset(symbol);
                Ok(SymbolOutcome::InsufficientHistory { candles })
            }
        }
    }

    /// Fetch and classify one symbol.
    async fn evaluate_symbol(&self, symbol: &str) -> Result<Reading> {
        let candles = tokio::time::timeout(
            self.config.request_timeout(),
            self.source
                .fetch_candles(symbol, &self.config.interval, self.config.limit),
        )
        .await
        .with_context(|| {
            format!(
                "market data fetch timed out after {}s",
                self.config.request_timeout_secs
            )
        })?
        .context("market data fetch failed")?;

        market_data::validate_series(&candles)?;

        let closes = market_data::closes(&candles);
        let series =
            IndicatorSeries::compute(&closes, self.config.rsi_period, self.config.ema_period);

        let (Some(rsi), Some(ema)) = (series.last_rsi(), series.last_ema()) else {
            warn!(
                symbol,
                candles = candles.len(),
                rsi_period = self.config.rsi_period,
                ema_period = self.config.ema_period,
                "insufficient history for indicators"
            );
            return Ok(Reading::Short {
                candles: candles.len(),
            });
        };

        // validate_series guarantees at least one finite close.
        let last_close = closes[closes.len() - 1];
        let signal = classify(
            self.config.policy,
            self.config.thresholds(),
            rsi,
            ema,
            last_close,
        );

        Ok(Reading::Ready(Evaluation {
            symbol: symbol.to_string(),
            last_close,
            rsi,
            ema,
            signal,
        }))
    }

    async fn dispatch(&self, evaluation: Evaluation) -> SymbolOutcome {
        let changed = self.tracker.observe(&evaluation.symbol, evaluation.signal);

        if !evaluation.signal.is_actionable() {
            return SymbolOutcome::NoSignal { evaluation };
        }

        if self.config.notify_on_transition_only && !changed {
            debug!(
                symbol = %evaluation.symbol,
                signal = %evaluation.signal,
                "repeated signal suppressed"
            );
            return SymbolOutcome::Suppressed { evaluation };
        }

        info!(
            symbol = %evaluation.symbol,
            signal = %evaluation.signal,
            price = evaluation.last_close,
            rsi = evaluation.rsi,
            ema = evaluation.ema,
            "signal fired"
        );

        let text = format_message(
            &evaluation,
            self.config.thresholds(),
            self.config.ema_period,
        );
        let delivered = match self.notify(&text).await {
            Ok(()) => true,
            Err(e) => {
                error!(symbol = %evaluation.symbol, error = %format!("{e:#}"), "notification failed");
                // Undelivered alerts must not count as the transition.
                self.tracker.reset(&evaluation.symbol);
                false
            }
        };

        SymbolOutcome::Signalled {
            evaluation,
            delivered,
        }
    }

    async fn notify(&self, text: &str) -> Result<()> {
        tokio::time::timeout(self.config.request_timeout(), self.notifier.send(text))
            .await
            .with_context(|| {
                format!(
                    "notification timed out after {}s",
                    self.config.request_timeout_secs
                )
            })?
    }
}

/// Indicator reading for a symbol whose series was fetched and validated.
enum Reading {
    Ready(Evaluation),
    /// Too short for the RSI or EMA window.
    Short { candles: usize },
}

/// Resolve once the shutdown flag is `true` or its sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

fn log_cycle(report: &CycleReport) {
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
    info!(
        cycle_id = %report.id,
        symbols = report.symbols.len(),
        signals = report.signals(),
        failures = report.failures(),
        elapsed_ms,
        "scan cycle complete"
    );
}
