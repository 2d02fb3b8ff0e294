//! Halt predicate evaluated on every acquired sample.

use crate::config::CURRENT_THRESHOLD_A;
use crate::sample::{MeasurementSample, PolePairs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Input current above the threshold.
    OverCurrent,
    /// Mechanical rpm under the floor.
    BelowFloorRpm,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverCurrent => f.write_str("current above threshold"),
            Self::BelowFloorRpm => f.write_str("rpm below floor"),
        }
    }
}

/// Halt iff `current > current_threshold_a` or `rpm < floor_rpm` (both strict).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoppingPolicy {
    pub current_threshold_a: f64,
    pub floor_rpm: f64,
}

impl StoppingPolicy {
    pub fn for_pole_pairs(pole_pairs: PolePairs) -> Self {
        Self {
            current_threshold_a: CURRENT_THRESHOLD_A,
            floor_rpm: pole_pairs.floor_rpm(),
        }
    }

    pub fn evaluate(&self, sample: &MeasurementSample) -> Option<StopReason> {
        if sample.current() > self.current_threshold_a {
            Some(StopReason::OverCurrent)
        } else if sample.rpm() < self.floor_rpm {
            Some(StopReason::BelowFloorRpm)
        } else {
            None
        }
    }

    #[inline]
    pub fn should_halt(&self, sample: &MeasurementSample) -> bool {
        self.evaluate(sample).is_some()
    }
}
