//! Bounded retry policies for telemetry queries.

use std::time::Duration;

use crate::config::BackoffCfg;

/// How many attempts a sample gets and how long to wait after each failure.
pub trait RetryPolicy {
    /// Total query attempts per sample (>= 1).
    fn max_attempts(&self) -> u32;
    /// Delay after the `failed_attempt`-th failure (1-based).
    fn delay_after(&self, failed_attempt: u32) -> Duration;
}

/// Same delay after every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy for FixedBackoff {
    fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    fn delay_after(&self, _failed_attempt: u32) -> Duration {
        self.delay
    }
}

/// Doubling delay, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub attempts: u32,
    pub initial: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    fn delay_after(&self, failed_attempt: u32) -> Duration {
        let shift = failed_attempt.saturating_sub(1).min(31);
        self.initial
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl From<&BackoffCfg> for Box<dyn RetryPolicy> {
    fn from(c: &BackoffCfg) -> Self {
        match *c {
            BackoffCfg::Fixed { attempts, delay } => Box::new(FixedBackoff { attempts, delay }),
            BackoffCfg::Exponential {
                attempts,
                initial,
                max_delay,
            } => Box::new(ExponentialBackoff {
                attempts,
                initial,
                max_delay,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_constant() {
        let p = FixedBackoff::default();
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(p.delay_after(1), Duration::from_millis(100));
        assert_eq!(p.delay_after(3), Duration::from_millis(100));
    }

    #[test]
    fn exponential_doubles_then_caps() {
        let p = ExponentialBackoff {
            attempts: 6,
            initial: Duration::from_millis(50),
            max_delay: Duration::from_millis(300),
        };
        let got: Vec<u128> = (1..=5).map(|n| p.delay_after(n).as_millis()).collect();
        assert_eq!(got, vec![50, 100, 200, 300, 300]);
        // Large attempt counts must not overflow.
        assert_eq!(p.delay_after(u32::MAX), Duration::from_millis(300));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let p = FixedBackoff {
            attempts: 0,
            delay: Duration::ZERO,
        };
        assert_eq!(p.max_attempts(), 1);
    }
}
