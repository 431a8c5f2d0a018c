// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The output is index-aligned with the input: close `i` maps to RSI `i`.
// =============================================================================

/// Compute the RSI series for the given `closes` and `period`.
///
/// The returned vector always has `closes.len()` elements. The first `period`
/// entries are `None` (the warm-up window consumed to seed the averages); every
/// later entry is `Some(value)` with `value` in `[0, 100]`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `closes.len() <= period` => all `None` (need at least `period` deltas)
/// - Average loss of zero with a positive average gain => 100.0
/// - Both averages zero (flat market) => 50.0
/// - A non-finite intermediate ends the defined part of the series; the
///   remaining entries stay `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return result;
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas[..period].iter().any(|d| !d.is_finite()) {
        return result;
    }

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = deltas[..period]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(g, l), &d| (g + gain(d), l + loss(d)));

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    // Delta `period - 1` ends at close `period`, which carries the first value.
    match rsi_from_averages(avg_gain, avg_loss) {
        Some(rsi) => result[period] = Some(rsi),
        None => return result,
    }

    // --- Wilder's smoothing for subsequent values ----------------------------
    for (offset, &delta) in deltas[period..].iter().enumerate() {
        if !delta.is_finite() {
            break;
        }
        avg_gain = (avg_gain * (period_f - 1.0) + gain(delta)) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss(delta)) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result[period + 1 + offset] = Some(rsi),
            None => break,
        }
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

fn gain(delta: f64) -> f64 {
    if delta > 0.0 {
        delta
    } else {
        0.0
    }
}

fn loss(delta: f64) -> f64 {
    if delta < 0.0 {
        -delta
    } else {
        0.0
    }
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // No movement at all — neutral.
    } else if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().flatten().copied().collect()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        let series = calculate_rsi(&[1.0, 2.0, 3.0], 0);
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_warm_up_is_aligned() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 7);
        assert_eq!(series.len(), closes.len());
        assert!(series[..7].iter().all(Option::is_none));
        assert!(series[7..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let values = defined(&calculate_rsi(&closes, 14));
        assert_eq!(values.len(), 16);
        for v in values {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let values = defined(&calculate_rsi(&closes, 14));
        assert!(!values.is_empty());
        for v in values {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_converges_after_mixed_start() {
        // A dip inside the seed window, then an uninterrupted rally.
        let mut closes = vec![10.0, 9.0, 10.0, 9.5, 10.5, 10.0, 11.0, 10.8];
        closes.extend((1..=200).map(|x| 11.0 + x as f64 * 0.1));
        let last = calculate_rsi(&closes, 7).last().copied().flatten().unwrap();
        assert!(last > 99.9, "expected convergence to 100, got {last}");

        let falling: Vec<f64> = closes.iter().map(|c| 100.0 - c).collect();
        let last = calculate_rsi(&falling, 7).last().copied().flatten().unwrap();
        assert!(last < 0.1, "expected convergence to 0, got {last}");
    }

    #[test]
    fn rsi_flat_market() {
        let closes = vec![100.0; 30];
        let values = defined(&calculate_rsi(&closes, 14));
        assert_eq!(values.len(), 16);
        for v in values {
            assert_eq!(v, 50.0);
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in defined(&calculate_rsi(&closes, 14)) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_wilder_reference_values() {
        let closes = [
            44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.0, 44.25, 44.75, 45.0, 44.5, 44.75,
            45.25, 45.5, 45.25,
        ];
        let series = calculate_rsi(&closes, 7);
        assert!(series[6].is_none());
        assert!((series[7].unwrap() - 54.545454545454_55).abs() < 1e-6);
        assert!((series[10].unwrap() - 54.248704663212_436).abs() < 1e-6);
        assert!((series[14].unwrap() - 62.324347874403_635).abs() < 1e-6);
    }

    #[test]
    fn rsi_is_deterministic() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 * 0.37).sin() * 3.0).collect();
        let a = calculate_rsi(&closes, 7);
        let b = calculate_rsi(&closes, 7);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.map(f64::to_bits), y.map(f64::to_bits));
        }
    }

    #[test]
    fn rsi_stops_on_non_finite() {
        let closes = vec![1.0, 2.0, 3.0, 2.0, f64::NAN, 4.0];
        let series = calculate_rsi(&closes, 3);
        assert!(series[3].is_some());
        assert!(series[4..].iter().all(Option::is_none));
    }
}
