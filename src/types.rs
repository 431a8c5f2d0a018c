// =============================================================================
// Shared types used across the signal bot
// =============================================================================

use serde::{Deserialize, Serialize};

/// Verdict of one evaluation for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    /// `true` for Buy and Sell.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Which rule turns the latest RSI / EMA reading into a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// RSI level alone.
    RsiOnly,
    /// RSI level confirmed by the close being on the right side of the EMA.
    #[default]
    RsiTrend,
}

impl std::fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RsiOnly => write!(f, "rsi_only"),
            Self::RsiTrend => write!(f, "rsi_trend"),
        }
    }
}

impl std::str::FromStr for SignalPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi_only" | "rsi" => Ok(Self::RsiOnly),
            "rsi_trend" | "rsi_ema" => Ok(Self::RsiTrend),
            other => anyhow::bail!("unknown signal policy '{other}'"),
        }
    }
}
