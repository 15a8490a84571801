//! # Receipt Polling Schedule
//!
//! Capped exponential backoff between `eth_getTransactionReceipt` polls.
//!
//! ## Design
//!
//! - `delay = initial_ms * multiplier^(attempt-1)`, clamped to `max_ms`
//! - No overall deadline: waiting ends when the node reports inclusion
//! - Pure delay computation; no clocks, no randomness

use std::time::Duration;

/// Receipt polling configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay before the second poll (milliseconds).
    pub initial_ms: u64,
    /// Upper bound for any single delay (milliseconds).
    pub max_ms: u64,
    pub multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_ms: 500,
            max_ms: 4_000,
            multiplier: 1.5,
        }
    }
}

impl PollConfig {
    pub fn with_initial_ms(initial_ms: u64) -> Self {
        Self {
            initial_ms,
            max_ms: Self::default().max_ms.max(initial_ms),
            ..Self::default()
        }
    }

    /// Delay after the given (1-indexed) unsuccessful poll.
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base = (self.initial_ms as f64) * self.multiplier.powi(exponent);

        let max = self.max_ms as f64;
        let clamped = if base.is_nan() || base < 0.0 {
            0.0
        } else if base > max {
            max
        } else {
            base
        };

        Duration::from_millis((clamped as u64).min(self.max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_then_cap() {
        let cfg = PollConfig {
            initial_ms: 100,
            max_ms: 250,
            multiplier: 2.0,
        };
        assert_eq!(cfg.compute_delay(1), Duration::from_millis(100));
        assert_eq!(cfg.compute_delay(2), Duration::from_millis(200));
        assert_eq!(cfg.compute_delay(3), Duration::from_millis(250));
        assert_eq!(cfg.compute_delay(u32::MAX), Duration::from_millis(250));
    }

    #[test]
    fn nan_multiplier_yields_zero() {
        let cfg = PollConfig {
            initial_ms: 100,
            max_ms: 250,
            multiplier: f64::NAN,
        };
        assert_eq!(cfg.compute_delay(2), Duration::ZERO);
    }

    #[test]
    fn initial_above_default_cap_raises_cap() {
        let cfg = PollConfig::with_initial_ms(10_000);
        assert_eq!(cfg.compute_delay(1), Duration::from_millis(10_000));
    }
}
