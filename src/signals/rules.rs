// =============================================================================
// Signal Rules — RSI threshold classification and alert text
// =============================================================================
//
//   RsiOnly   BUY  when RSI <= buy
//             SELL when RSI >= sell
//
//   RsiTrend  BUY  when RSI <= buy  AND close > EMA
//             SELL when RSI >= sell AND close < EMA
//
// BUY is evaluated first; a reading that qualifies as BUY is never also SELL.
// =============================================================================

use serde::Serialize;

use crate::types::{Signal, SignalPolicy};

/// RSI levels that mark oversold (`buy`) and overbought (`sell`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub buy: f64,
    pub sell: f64,
}

/// Latest indicator reading for one symbol plus the verdict derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub symbol: String,
    pub last_close: f64,
    pub rsi: f64,
    pub ema: f64,
    pub signal: Signal,
}

/// Classify one reading under `policy`.
pub fn classify(
    policy: SignalPolicy,
    thresholds: Thresholds,
    rsi: f64,
    ema: f64,
    last_close: f64,
) -> Signal {
    let (trend_up, trend_down) = match policy {
        SignalPolicy::RsiOnly => (true, true),
        SignalPolicy::RsiTrend => (last_close > ema, last_close < ema),
    };

    if rsi <= thresholds.buy && trend_up {
        Signal::Buy
    } else if rsi >= thresholds.sell && trend_down {
        Signal::Sell
    } else {
        Signal::None
    }
}

/// Render the alert text for an actionable evaluation.
pub fn format_message(eval: &Evaluation, thresholds: Thresholds, ema_period: usize) -> String {
    let (headline, rule) = match eval.signal {
        Signal::Buy => ("🟢 BUY SIGNAL", format!("≤{}", thresholds.buy)),
        Signal::Sell => ("🔴 SELL SIGNAL", format!("≥{}", thresholds.sell)),
        Signal::None => ("⚪ NO SIGNAL", "-".to_string()),
    };

    format!(
        "{headline}\nSymbol: {}\nPrice: ${:.5}\nRSI: {:.2} ({rule})\nEMA({ema_period}): ${:.5}",
        eval.symbol, eval.last_close, eval.rsi, eval.ema
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Thresholds = Thresholds {
        buy: 25.0,
        sell: 75.0,
    };

    #[test]
    fn rsi_only_ignores_trend() {
        assert_eq!(classify(SignalPolicy::RsiOnly, T, 20.0, 2.0, 1.0), Signal::Buy);
        assert_eq!(classify(SignalPolicy::RsiOnly, T, 80.0, 1.0, 2.0), Signal::Sell);
        assert_eq!(classify(SignalPolicy::RsiOnly, T, 50.0, 1.0, 2.0), Signal::None);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(classify(SignalPolicy::RsiOnly, T, 25.0, 1.0, 1.0), Signal::Buy);
        assert_eq!(classify(SignalPolicy::RsiOnly, T, 75.0, 1.0, 1.0), Signal::Sell);
    }

    #[test]
    fn trend_filter_blocks_buy_in_downtrend() {
        // RSI alone would qualify, but the close sits below the EMA.
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 20.0, 1.10, 1.00), Signal::None);
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 20.0, 1.00, 1.10), Signal::Buy);
    }

    #[test]
    fn trend_filter_blocks_sell_in_uptrend() {
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 80.0, 1.00, 1.10), Signal::None);
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 80.0, 1.10, 1.00), Signal::Sell);
    }

    #[test]
    fn close_equal_to_ema_never_confirms() {
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 10.0, 1.0, 1.0), Signal::None);
        assert_eq!(classify(SignalPolicy::RsiTrend, T, 90.0, 1.0, 1.0), Signal::None);
    }

    #[test]
    fn buy_wins_when_both_would_match() {
        // Only reachable with overlapping thresholds, which config validation
        // rejects; the rule itself still resolves deterministically.
        let overlap = Thresholds {
            buy: 60.0,
            sell: 40.0,
        };
        assert_eq!(classify(SignalPolicy::RsiOnly, overlap, 50.0, 1.0, 1.0), Signal::Buy);
    }

    #[test]
    fn message_contains_reading() {
        let eval = Evaluation {
            symbol: "DOGEUSDT".into(),
            last_close: 0.082_512_3,
            rsi: 21.456,
            ema: 0.08,
            signal: Signal::Buy,
        };
        let msg = format_message(&eval, T, 50);
        assert!(msg.starts_with("🟢 BUY SIGNAL"));
        assert!(msg.contains("Symbol: DOGEUSDT"));
        assert!(msg.contains("Price: $0.08251"));
        assert!(msg.contains("RSI: 21.46 (≤25)"));
        assert!(msg.contains("EMA(50): $0.08000"));
    }

    #[test]
    fn sell_message_shows_sell_threshold() {
        let eval = Evaluation {
            symbol: "WIFUSDT".into(),
            last_close: 2.5,
            rsi: 81.0,
            ema: 2.7,
            signal: Signal::Sell,
        };
        let msg = format_message(&eval, T, 50);
        assert!(msg.starts_with("🔴 SELL SIGNAL"));
        assert!(msg.contains("RSI: 81.00 (≥75)"));
    }
}
