//! Runtime configuration types for the measurement pipeline.
//!
//! These are separate from the TOML-deserialized config in `effcurve_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

use crate::error::CurveError;

/// Samples used to fit the motor model.
pub const MIN_FIT_SAMPLES: usize = 10;
/// Sampling halts once input current exceeds this (A).
pub const CURRENT_THRESHOLD_A: f64 = 60.0;
/// Mechanical floor is this value divided by the pole-pair count (rpm).
pub const FLOOR_RPM_NUMERATOR: f64 = 1000.0;
pub use effcurve_config::MAX_RAMP_STEPS;

/// Duty-cycle ramp parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RampCfg {
    /// Ramp stops before commanding this duty. Range: (0, 1].
    pub target_duty: f64,
    /// Increment per step. Range: (0, 1).
    pub step: f64,
    /// Wait after each command.
    pub settle: Duration,
    /// First commanded duty. Range: [0, target_duty).
    pub start_duty: f64,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            target_duty: 0.95,
            step: 0.05,
            settle: Duration::from_millis(500),
            start_duty: 0.1,
        }
    }
}

impl RampCfg {
    pub fn validate(&self) -> Result<(), CurveError> {
        if !(self.target_duty > 0.0 && self.target_duty <= 1.0) {
            return Err(CurveError::ConfigValidation(
                "target duty must be in (0, 1]".into(),
            ));
        }
        if !(self.step > 0.0 && self.step < 1.0) {
            return Err(CurveError::ConfigValidation(
                "ramp step must be in (0, 1)".into(),
            ));
        }
        if self.settle.is_zero() {
            return Err(CurveError::ConfigValidation(
                "settle delay must be > 0".into(),
            ));
        }
        if !(self.start_duty >= 0.0 && self.start_duty < self.target_duty) {
            return Err(CurveError::ConfigValidation(
                "start duty must be in [0, target duty)".into(),
            ));
        }
        if (self.target_duty - self.start_duty) / self.step > MAX_RAMP_STEPS as f64 {
            return Err(CurveError::ConfigValidation(format!(
                "ramp step too small: more than {MAX_RAMP_STEPS} commands"
            )));
        }
        Ok(())
    }
}

/// Retry backoff selection for telemetry queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffCfg {
    Fixed {
        attempts: u32,
        delay: Duration,
    },
    Exponential {
        attempts: u32,
        initial: Duration,
        max_delay: Duration,
    },
}

impl Default for BackoffCfg {
    fn default() -> Self {
        Self::Fixed {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

/// Sampling loop parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingCfg {
    /// Delay between successful samples.
    pub cadence: Duration,
    pub backoff: BackoffCfg,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            cadence: Duration::from_millis(100),
            backoff: BackoffCfg::default(),
        }
    }
}

impl SamplingCfg {
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.cadence.is_zero() {
            return Err(CurveError::ConfigValidation("cadence must be > 0".into()));
        }
        let attempts = match &self.backoff {
            BackoffCfg::Fixed { attempts, .. } | BackoffCfg::Exponential { attempts, .. } => {
                *attempts
            }
        };
        if attempts == 0 {
            return Err(CurveError::ConfigValidation(
                "retry attempts must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
