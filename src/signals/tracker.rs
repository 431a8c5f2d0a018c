// =============================================================================
// Signal Tracker — last verdict per symbol
// =============================================================================

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::Signal;

/// Remembers the last signal seen per symbol so a repeated verdict can be
/// suppressed when only state transitions should be notified.
pub struct SignalTracker {
    last: RwLock<HashMap<String, Signal>>,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self {
            last: RwLock::new(HashMap::new()),
        }
    }

    /// Record `signal` for `symbol` and return `true` if it differs from the
    /// previously recorded one.  A symbol with no record counts as `None`.
    pub fn observe(&self, symbol: &str, signal: Signal) -> bool {
        let prev = self
            .last
            .write()
            .insert(symbol.to_string(), signal)
            .unwrap_or(Signal::None);
        prev != signal
    }

    /// Forget the symbol, as if its last verdict had been `None`.
    pub fn reset(&self, symbol: &str) {
        self.last.write().remove(symbol);
    }
}

impl Default for SignalTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_signal_is_not_a_transition() {
        let tracker = SignalTracker::new();
        assert!(tracker.observe("DOGEUSDT", Signal::Buy));
        assert!(!tracker.observe("DOGEUSDT", Signal::Buy));
        assert!(tracker.observe("DOGEUSDT", Signal::Sell));
        assert!(tracker.observe("DOGEUSDT", Signal::None));
        assert!(tracker.observe("DOGEUSDT", Signal::Sell));
    }

    #[test]
    fn symbols_are_independent() {
        let tracker = SignalTracker::new();
        assert!(tracker.observe("DOGEUSDT", Signal::Buy));
        assert!(tracker.observe("PEPEUSDT", Signal::Buy));
        assert!(!tracker.observe("DOGEUSDT", Signal::Buy));
        assert!(tracker.observe("SHIBUSDT", Signal::Sell));
    }

    #[test]
    fn reset_rearms_symbol() {
        let tracker = SignalTracker::new();
        tracker.observe("DOGEUSDT", Signal::Sell);
        tracker.reset("DOGEUSDT");
        assert!(tracker.observe("DOGEUSDT", Signal::Sell));
    }

    #[test]
    fn first_none_is_not_a_transition() {
        let tracker = SignalTracker::new();
        assert!(!tracker.observe("DOGEUSDT", Signal::None));
    }
}
