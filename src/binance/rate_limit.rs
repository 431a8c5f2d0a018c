// =============================================================================
// Rate-Limit Tracker — monitors Binance API usage to avoid 429s
// =============================================================================
//
// Binance enforces a request-weight budget of 1200 per minute per IP (we
// hard-cap ourselves at 1000).  The tracker reads the `X-MBX-USED-WEIGHT-1M`
// response header after every klines request and keeps an atomic counter that
// the client checks before sending the next one.  A reading older than one
// minute belongs to a window Binance has already rolled over and counts as 0.
// =============================================================================

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Hard ceiling at which we refuse to send additional requests.
pub const WEIGHT_HARD_LIMIT: u32 = 1000;
/// Soft warning threshold.
const WEIGHT_WARN_THRESHOLD: u32 = 800;

/// Header carrying the weight used in the current one-minute window.
const USED_WEIGHT_HEADER: &str = "X-MBX-USED-WEIGHT-1M";

/// Length of the Binance weight window.
const WEIGHT_WINDOW: Duration = Duration::from_secs(60);

/// Thread-safe rate-limit tracker backed by an atomic counter.
pub struct RateLimitTracker {
    used_weight_1m: AtomicU32,
    /// When the counter was last refreshed from a header.
    updated_at: Mutex<Option<Instant>>,
}

impl RateLimitTracker {
    /// Create a new tracker with the counter at zero.
    pub fn new() -> Self {
        Self {
            used_weight_1m: AtomicU32::new(0),
            updated_at: Mutex::new(None),
        }
    }

    /// Update the counter from the response headers returned by Binance.
    ///
    /// The header reports the server-side total for the current minute, so the
    /// counter is replaced rather than accumulated.  This also resets it once
    /// Binance rolls the window over.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        let Some(w) = headers
            .get(USED_WEIGHT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
        else {
            return;
        };

        let prev = self.used_weight();
        self.used_weight_1m.store(w, Ordering::Relaxed);
        *self.updated_at.lock() = Some(Instant::now());
        if w >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
            warn!(
                used_weight = w,
                hard_limit = WEIGHT_HARD_LIMIT,
                "rate-limit weight crossed warning threshold"
            );
        }
        debug!(used_weight_1m = w, "rate-limit weight updated from header");
    }

    /// Return `true` if we can afford to spend `weight` more request weight
    /// without exceeding the hard limit.
    pub fn can_send_request(&self, weight: u32) -> bool {
        let current = self.used_weight();
        let allowed = current.saturating_add(weight) <= WEIGHT_HARD_LIMIT;
        if !allowed {
            warn!(
                current_weight = current,
                requested_weight = weight,
                hard_limit = WEIGHT_HARD_LIMIT,
                "request blocked — would exceed rate-limit"
            );
        }
        allowed
    }

    /// Weight used in the current window; 0 once the last reading is stale.
    pub fn used_weight(&self) -> u32 {
        let mut updated_at = self.updated_at.lock();
        match *updated_at {
            Some(at) if at.elapsed() < WEIGHT_WINDOW => self.used_weight_1m.load(Ordering::Relaxed),
            Some(_) => {
                self.reset_1m_weight();
                *updated_at = None;
                0
            }
            None => self.used_weight_1m.load(Ordering::Relaxed),
        }
    }

    /// Clear the per-minute counter.
    pub fn reset_1m_weight(&self) {
        self.used_weight_1m.store(0, Ordering::Relaxed);
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("used_weight_1m", &self.used_weight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(weight: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(USED_WEIGHT_HEADER, HeaderValue::from_str(weight).unwrap());
        h
    }

    #[test]
    fn header_replaces_counter() {
        let tracker = RateLimitTracker::new();
        tracker.update_from_headers(&headers("120"));
        assert_eq!(tracker.used_weight(), 120);
        tracker.update_from_headers(&headers("4"));
        assert_eq!(tracker.used_weight(), 4);
    }

    #[test]
    fn garbage_header_is_ignored() {
        let tracker = RateLimitTracker::new();
        tracker.update_from_headers(&headers("50"));
        tracker.update_from_headers(&headers("n/a"));
        tracker.update_from_headers(&HeaderMap::new());
        assert_eq!(tracker.used_weight(), 50);
    }

    #[test]
    fn blocks_at_hard_limit() {
        let tracker = RateLimitTracker::new();
        assert!(tracker.can_send_request(2));
        tracker.update_from_headers(&headers("999"));
        assert!(!tracker.can_send_request(2));
        tracker.update_from_headers(&headers("998"));
        assert!(tracker.can_send_request(2));
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_tracker_reopens_after_window_rolls_over() {
        let tracker = RateLimitTracker::new();
        tracker.update_from_headers(&headers("999"));
        assert!(!tracker.can_send_request(2));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(!tracker.can_send_request(2));
        assert_eq!(tracker.used_weight(), 999);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(tracker.used_weight(), 0);
        assert!(tracker.can_send_request(2));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_header_restarts_window() {
        let tracker = RateLimitTracker::new();
        tracker.update_from_headers(&headers("999"));
        tokio::time::advance(Duration::from_secs(50)).await;
        tracker.update_from_headers(&headers("999"));
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(!tracker.can_send_request(2));
    }
}
