// =============================================================================
// Binance REST API Client — public market data
// =============================================================================
//
// Only the unauthenticated klines endpoint is used, so no API key or request
// signing is involved.  Every request carries a client-side timeout and is
// gated by the rate-limit tracker.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::binance::rate_limit::RateLimitTracker;
use crate::market_data::{Candle, MarketDataSource};

/// Public Binance REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Request weight of a klines call with `limit <= 100`.
const KLINES_WEIGHT: u32 = 2;

/// Binance REST API client for public market data.
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    rate_limit: RateLimitTracker,
}

impl BinanceClient {
    /// Create a new `BinanceClient` against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "BinanceClient initialised");

        Ok(Self {
            base_url,
            client,
            rate_limit: RateLimitTracker::new(),
        })
    }

    /// GET /api/v3/klines (public — no signature required).
    ///
    /// Returns the candles parsed from Binance's array-of-arrays response
    /// format, oldest first.
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        if !self.rate_limit.can_send_request(KLINES_WEIGHT) {
            anyhow::bail!(
                "klines request for {symbol} skipped: used weight {} near limit",
                self.rate_limit.used_weight()
            );
        }

        let url = format!("{}/api/v3/klines", self.base_url);
        let limit_param = limit.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit_param.as_str()),
            ])
            .send()
            .await
            .context("GET /api/v3/klines request failed")?;

        self.rate_limit.update_from_headers(resp.headers());

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse klines response")?;

        if !status.is_success() {
            anyhow::bail!("Binance GET /api/v3/klines returned {}: {}", status, body);
        }

        let candles = parse_klines(&body)?;
        debug!(symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        self.get_klines(symbol, interval, limit).await
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

/// Decode the klines body.  A single malformed row fails the whole response.
fn parse_klines(body: &serde_json::Value) -> Result<Vec<Candle>> {
    let raw = body.as_array().context("klines response is not an array")?;

    raw.iter()
        .enumerate()
        .map(|(i, row)| Candle::from_kline_row(row).with_context(|| format!("kline row {i}")))
        .collect()
}
