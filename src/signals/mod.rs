// =============================================================================
// Signals Module
// =============================================================================
//
// Turning indicator readings into alerts:
// - Threshold rules (RSI-only, RSI + EMA trend confirmation)
// - Alert message formatting
// - Per-symbol memory for transition-only notifications

pub mod rules;
pub mod tracker;

pub use rules::{classify, format_message, Evaluation, Thresholds};
pub use tracker::SignalTracker;
