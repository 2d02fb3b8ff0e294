//! `From` implementations bridging `effcurve_config` types to core types.

use std::time::Duration;

use crate::config::{BackoffCfg, RampCfg, SamplingCfg};
use crate::error::CurveError;
use crate::runner::RunParams;
use crate::sample::{MeasurementSample, PolePairs, SampleLog};

// ── RampCfg ──────────────────────────────────────────────────────────────────

impl From<&effcurve_config::RampCfg> for RampCfg {
    fn from(c: &effcurve_config::RampCfg) -> Self {
        Self {
            target_duty: c.target_duty,
            step: c.step,
            settle: Duration::from_millis(c.settle_ms),
            start_duty: c.start_duty,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&effcurve_config::SamplingCfg> for SamplingCfg {
    fn from(c: &effcurve_config::SamplingCfg) -> Self {
        let backoff = match c.backoff {
            effcurve_config::BackoffKind::Fixed => BackoffCfg::Fixed {
                attempts: c.retry_attempts,
                delay: Duration::from_millis(c.retry_delay_ms),
            },
            effcurve_config::BackoffKind::Exponential => BackoffCfg::Exponential {
                attempts: c.retry_attempts,
                initial: Duration::from_millis(c.retry_delay_ms),
                max_delay: Duration::from_millis(c.max_retry_delay_ms),
            },
        };
        Self {
            cadence: Duration::from_millis(c.cadence_ms),
            backoff,
        }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl TryFrom<&effcurve_config::Config> for RunParams {
    type Error = CurveError;

    fn try_from(c: &effcurve_config::Config) -> Result<Self, Self::Error> {
        let pp = c.motor.pole_pairs.ok_or_else(|| {
            CurveError::ConfigValidation("motor.pole_pairs is not set".into())
        })?;
        Ok(Self {
            pole_pairs: PolePairs::new(pp)?,
            ramp: (&c.ramp).into(),
            sampling: (&c.sampling).into(),
            stabilize: Duration::from_millis(c.ramp.stabilize_ms),
        })
    }
}

// ── Recorded logs ────────────────────────────────────────────────────────────

impl From<&effcurve_config::SampleRow> for MeasurementSample {
    fn from(r: &effcurve_config::SampleRow) -> Self {
        Self::new(r.current, r.rpm, r.voltage)
    }
}

impl From<&[effcurve_config::SampleRow]> for SampleLog {
    fn from(rows: &[effcurve_config::SampleRow]) -> Self {
        rows.iter().map(MeasurementSample::from).collect()
    }
}
