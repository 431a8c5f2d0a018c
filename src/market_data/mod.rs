pub mod candle;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the Candle struct for convenient access (e.g. `use crate::market_data::Candle`).
pub use candle::{closes, validate_series, Candle};

/// Source of recent candles for a symbol.
///
/// Implementations return the latest `limit` candles at `interval`, oldest
/// first. Any transport or decoding failure is an error.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>>;
}
