// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the signal rules
// read.  Every series is index-aligned with its input closes; positions inside
// the warm-up window are `None` so callers are forced to handle insufficient
// history.

pub mod ema;
pub mod rsi;

/// RSI and EMA series computed over one close-price sequence.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub rsi: Vec<Option<f64>>,
    pub ema: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn compute(closes: &[f64], rsi_period: usize, ema_period: usize) -> Self {
        Self {
            rsi: rsi::calculate_rsi(closes, rsi_period),
            ema: ema::calculate_ema(closes, ema_period),
        }
    }

    /// RSI at the most recent close, if defined.
    pub fn last_rsi(&self) -> Option<f64> {
        self.rsi.last().copied().flatten()
    }

    /// EMA at the most recent close, if defined.
    pub fn last_ema(&self) -> Option<f64> {
        self.ema.last().copied().flatten()
    }
}
