use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV candle as returned by the Binance klines endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

impl Candle {
    pub fn new(
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        close_time: i64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        }
    }

    /// Parse one row of the klines array-of-arrays response.
    ///
    /// Array indices:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
    ///   [6] closeTime, [7..] ignored
    pub fn from_kline_row(row: &serde_json::Value) -> Result<Self> {
        let arr = row.as_array().context("kline entry is not an array")?;
        if arr.len() < 7 {
            anyhow::bail!("malformed kline entry with {} elements", arr.len());
        }

        let open_time = arr[0].as_i64().context("kline open time is not an integer")?;
        let close_time = arr[6].as_i64().context("kline close time is not an integer")?;

        Ok(Self::new(
            open_time,
            parse_f64(&arr[1], "open")?,
            parse_f64(&arr[2], "high")?,
            parse_f64(&arr[3], "low")?,
            parse_f64(&arr[4], "close")?,
            parse_f64(&arr[5], "volume")?,
            close_time,
        ))
    }
}

/// Helper: Binance sends prices as JSON strings inside kline rows.
fn parse_f64(val: &serde_json::Value, name: &str) -> Result<f64> {
    match val {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64")),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    }
}

/// Close prices in series order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Check that a fetched series is usable: non-empty, finite closes, strictly
/// ascending open times (no duplicates).
pub fn validate_series(candles: &[Candle]) -> Result<()> {
    if candles.is_empty() {
        anyhow::bail!("empty candle series");
    }

    if let Some(bad) = candles.iter().find(|c| !c.close.is_finite()) {
        anyhow::bail!("non-finite close {} at open_time {}", bad.close, bad.open_time);
    }

    if let Some(pair) = candles.windows(2).find(|w| w[1].open_time <= w[0].open_time) {
        anyhow::bail!(
            "candles out of order: open_time {} follows {}",
            pair[1].open_time,
            pair[0].open_time
        );
    }

    Ok(())
}
