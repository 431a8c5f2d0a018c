// =============================================================================
// Runtime Configuration — signal bot settings
// =============================================================================
//
// Every tunable parameter of the scanner lives here.  The struct is built once
// at startup (JSON file, then environment overrides), validated, and handed to
// the scheduler by value; nothing mutates it afterwards.
//
// All fields carry `#[serde(default)]` so that a partial (or absent) config
// file still loads.  Messaging credentials are deliberately NOT part of this
// struct: they come from the environment only and are never serialised.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::signals::Thresholds;
use crate::types::SignalPolicy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_symbols() -> Vec<String> {
    [
        "DOGEUSDT",
        "SHIBUSDT",
        "PEPEUSDT",
        "FLOKIUSDT",
        "BONKUSDT",
        "1000SATSUSDT",
        "1000FLOKIUSDT",
        "1000SHIBUSDT",
        "1000PEPEUSDT",
        "WIFUSDT",
        "MEMEUSDT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_rsi_period() -> usize {
    7
}

fn default_ema_period() -> usize {
    50
}

fn default_interval() -> String {
    "15m".to_string()
}

fn default_limit() -> u32 {
    100
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_buy_threshold() -> f64 {
    25.0
}

fn default_sell_threshold() -> f64 {
    75.0
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_binance_base_url() -> String {
    crate::binance::client::DEFAULT_BASE_URL.to_string()
}

fn default_telegram_base_url() -> String {
    crate::notify::telegram::DEFAULT_BASE_URL.to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Universe -----------------------------------------------------------

    /// Symbols scanned each cycle, in this order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Kline interval requested from the exchange (e.g. "15m").
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Number of candles fetched per symbol. Must cover the EMA window.
    #[serde(default = "default_limit")]
    pub limit: u32,

    // --- Indicators ---------------------------------------------------------

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_ema_period")]
    pub ema_period: usize,

    // --- Signal rule --------------------------------------------------------

    /// RSI at or below this level is oversold.
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,

    /// RSI at or above this level is overbought.
    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: f64,

    #[serde(default)]
    pub policy: SignalPolicy,

    /// Notify only when a symbol's signal differs from the previous cycle.
    #[serde(default)]
    pub notify_on_transition_only: bool,

    // --- Scheduling ---------------------------------------------------------

    /// Pause between the end of one cycle and the start of the next.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on each market-data fetch and each notification.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Collaborators ------------------------------------------------------

    /// Send a one-off message when the bot starts.
    #[serde(default = "default_true")]
    pub announce_startup: bool,

    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,

    #[serde(default = "default_telegram_base_url")]
    pub telegram_base_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            interval: default_interval(),
            limit: default_limit(),
            rsi_period: default_rsi_period(),
            ema_period: default_ema_period(),
            buy_threshold: default_buy_threshold(),
            sell_threshold: default_sell_threshold(),
            policy: SignalPolicy::default(),
            notify_on_transition_only: false,
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            announce_startup: true,
            binance_base_url: default_binance_base_url(),
            telegram_base_url: default_telegram_base_url(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            policy = %config.policy,
            "config loaded"
        );

        Ok(config)
    }

    /// Apply `RSI_BOT_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.  Values that fail to
    /// parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(syms) = lookup("RSI_BOT_SYMBOLS") {
            self.symbols = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(interval) = lookup("RSI_BOT_INTERVAL") {
            self.interval = interval.trim().to_string();
        }

        override_parsed(&lookup, "RSI_BOT_RSI_PERIOD", &mut self.rsi_period);
        override_parsed(&lookup, "RSI_BOT_EMA_PERIOD", &mut self.ema_period);
        override_parsed(&lookup, "RSI_BOT_LIMIT", &mut self.limit);
        override_parsed(&lookup, "RSI_BOT_POLL_SECS", &mut self.poll_interval_secs);
        override_parsed(&lookup, "RSI_BOT_BUY_THRESHOLD", &mut self.buy_threshold);
        override_parsed(&lookup, "RSI_BOT_SELL_THRESHOLD", &mut self.sell_threshold);
        override_parsed(&lookup, "RSI_BOT_POLICY", &mut self.policy);
        override_parsed(
            &lookup,
            "RSI_BOT_TRANSITION_ONLY",
            &mut self.notify_on_transition_only,
        );
    }

    /// Reject configurations the scheduler cannot run meaningfully.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            anyhow::bail!("symbol list is empty");
        }
        if self.interval.is_empty() {
            anyhow::bail!("kline interval is empty");
        }
        if self.rsi_period == 0 || self.ema_period == 0 {
            anyhow::bail!(
                "indicator periods must be positive (rsi={}, ema={})",
                self.rsi_period,
                self.ema_period
            );
        }
        if (self.limit as usize) < self.ema_period {
            anyhow::bail!(
                "limit {} is shorter than the EMA window {}",
                self.limit,
                self.ema_period
            );
        }
        if (self.limit as usize) <= self.rsi_period {
            anyhow::bail!(
                "limit {} does not cover the RSI window {}",
                self.limit,
                self.rsi_period
            );
        }
        for (name, value) in [("buy", self.buy_threshold), ("sell", self.sell_threshold)] {
            if !(0.0..=100.0).contains(&value) {
                anyhow::bail!("{name} threshold {value} is outside [0, 100]");
            }
        }
        if self.buy_threshold >= self.sell_threshold {
            anyhow::bail!(
                "buy threshold {} must be below sell threshold {}",
                self.buy_threshold,
                self.sell_threshold
            );
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll interval must be at least one second");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least one second");
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            buy: self.buy_threshold,
            sell: self.sell_threshold,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn override_parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T)
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(e) => warn!(key, value = %raw, error = %e, "ignoring unparseable override"),
    }
}
