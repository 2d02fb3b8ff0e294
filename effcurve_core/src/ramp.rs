//! Open-loop duty-cycle ramp.

use effcurve_traits::{Actuator, Clock};

use crate::config::RampCfg;
use crate::error::CurveError;
use crate::hw_error::{HwSide, map_hw_error};

/// Tolerance on the step count so float noise in `(target - start) / step`
/// never adds an extra step.
const STEP_COUNT_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct RampController {
    cfg: RampCfg,
}

impl RampController {
    pub fn new(cfg: RampCfg) -> Result<Self, CurveError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Number of commands the ramp issues: ⌈(target − start) / step⌉.
    pub fn planned_steps(&self) -> usize {
        let ratio = (self.cfg.target_duty - self.cfg.start_duty) / self.cfg.step;
        (ratio - STEP_COUNT_EPS).ceil().max(1.0) as usize
    }

    /// Duty commanded at step `k` (0-based).
    #[inline]
    pub fn duty_at(&self, k: usize) -> f64 {
        self.cfg.start_duty + (k as f64) * self.cfg.step
    }

    /// Issue every ramp command, waiting the settle delay after each.
    ///
    /// Returns the commanded duties. The first actuator failure aborts the
    /// ramp with `CurveError::ActuatorCommand`.
    pub fn run<A, C>(&self, actuator: &mut A, clock: &C) -> Result<Vec<f64>, CurveError>
    where
        A: Actuator + ?Sized,
        C: Clock + ?Sized,
    {
        let n = self.planned_steps();
        let mut commanded = Vec::new();
        for k in 0..n {
            let duty = self.duty_at(k);
            tracing::info!(
                duty_pct = duty * 100.0,
                step = k + 1,
                of = n,
                "accelerating"
            );
            actuator.set_duty_cycle(duty).map_err(|e| {
                let err = map_hw_error(HwSide::Actuator, e.as_ref());
                tracing::error!(duty, error = %err, "ramp command failed");
                err
            })?;
            commanded.push(duty);
            clock.sleep(self.cfg.settle);
        }
        Ok(commanded)
    }
}
