// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes
// and sits at index `period - 1`.
// =============================================================================

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// The returned vector always has `closes.len()` elements; the first
/// `period - 1` are `None`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - `closes.len() < period` => all `None`
/// - A non-finite value ends the defined part of the series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return result;
    }
    result[period - 1] = Some(sma);

    let mut prev_ema = sma;
    for (i, &close) in closes.iter().enumerate().skip(period) {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result[i] = Some(ema);
        prev_ema = ema;
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn ema_insufficient_data() {
        let ema = calculate_ema(&[1.0, 2.0], 5);
        assert_eq!(ema.len(), 2);
        assert!(ema.iter().all(Option::is_none));
    }

    #[test]
    fn ema_period_equals_length() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 3);
        assert!(ema[0].is_none() && ema[1].is_none());
        // SMA = (2+4+6)/3 = 4.0
        assert!((ema[2].unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..10]: SMA seed 3.0, multiplier 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);
        assert!(ema[..4].iter().all(Option::is_none));

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[4].unwrap() - expected).abs() < 1e-10);
        for i in 5..10 {
            expected = closes[i] * mult + expected * (1.0 - mult);
            let got = ema[i].unwrap();
            assert!((got - expected).abs() < 1e-10, "got {got}, expected {expected}");
        }
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let ema = calculate_ema(&[0.0825; 80], 50);
        for v in ema.iter().skip(49) {
            assert!((v.unwrap() - 0.0825).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_step_response_has_no_overshoot() {
        let mut closes = vec![10.0; 20];
        closes.extend(vec![20.0; 60]);
        let ema = calculate_ema(&closes, 10);

        let mut prev = ema[9].unwrap();
        for v in ema.iter().skip(10) {
            let v = v.unwrap();
            assert!(v >= prev, "EMA moved away from the step: {prev} -> {v}");
            assert!(v <= 20.0, "EMA overshot the step: {v}");
            prev = v;
        }
        assert!(prev > 19.9);
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let closes = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        let ema = calculate_ema(&closes, 3);
        // Seed survives, the NaN close ends the series.
        assert_eq!(ema[2], Some(2.0));
        assert!(ema[3].is_none() && ema[4].is_none());
    }

    #[test]
    fn ema_is_deterministic() {
        let closes: Vec<f64> = (0..100).map(|i| 1.0 + (i as f64 * 0.11).cos()).collect();
        let a = calculate_ema(&closes, 21);
        let b = calculate_ema(&closes, 21);
        assert_eq!(
            a.iter().map(|v| v.map(f64::to_bits)).collect::<Vec<_>>(),
            b.iter().map(|v| v.map(f64::to_bits)).collect::<Vec<_>>()
        );
    }
}
