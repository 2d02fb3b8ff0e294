//! Per-sample efficiency from a fitted motor model.

use crate::estimator::MotorModel;
use crate::sample::{MeasurementSample, SampleLog};

/// Efficiency at one sample. `efficiency` is a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfficiencyPoint {
    pub current: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EfficiencyComputer {
    model: MotorModel,
}

impl EfficiencyComputer {
    pub fn new(model: MotorModel) -> Self {
        Self { model }
    }

    /// Efficiency in percent, clamped to `[0, 100]`.
    ///
    /// Zero (or non-positive) input power yields 0; so does any non-finite
    /// intermediate.
    pub fn efficiency_of(&self, sample: &MeasurementSample) -> f64 {
        let current = sample.current();
        let input_power = sample.voltage() * current;
        let estimated_voltage = self.model.estimated_voltage(current, sample.rpm());
        let mechanical_power = (estimated_voltage * current).max(0.0);
        let eff = if input_power > 0.0 {
            100.0 * mechanical_power / input_power
        } else {
            0.0
        };
        if eff.is_finite() {
            eff.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// One point per sample over the whole log, in log order.
    pub fn compute(&self, log: &SampleLog) -> Vec<EfficiencyPoint> {
        log.iter()
            .map(|s| EfficiencyPoint {
                current: s.current(),
                efficiency: self.efficiency_of(s),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> MotorModel {
        MotorModel {
            r_ohm: 0.05,
            c: 0.0005,
        }
    }

    #[test]
    fn zero_input_power_is_zero_efficiency() {
        let c = EfficiencyComputer::new(model());
        assert_eq!(c.efficiency_of(&MeasurementSample::new(0.0, 5000.0, 24.0)), 0.0);
        assert_eq!(c.efficiency_of(&MeasurementSample::new(10.0, 5000.0, 0.0)), 0.0);
    }

    #[test]
    fn efficiency_is_clamped_high() {
        // Model voltage far above measured voltage -> > 100% before clamping.
        let c = EfficiencyComputer::new(MotorModel { r_ohm: 10.0, c: 1.0 });
        assert_eq!(c.efficiency_of(&MeasurementSample::new(5.0, 1000.0, 1.0)), 100.0);
    }

    #[test]
    fn negative_mechanical_power_is_floored() {
        let c = EfficiencyComputer::new(MotorModel { r_ohm: -1.0, c: 0.0 });
        assert_eq!(c.efficiency_of(&MeasurementSample::new(5.0, 1000.0, 24.0)), 0.0);
    }

    #[test]
    fn matches_hand_computation() {
        let c = EfficiencyComputer::new(model());
        let s = MeasurementSample::new(20.0, 6000.0, 24.0);
        let v_est = 0.05 * 20.0 + 0.0005 * std::f64::consts::TAU * 6000.0;
        let expected = 100.0 * (v_est * 20.0) / (24.0 * 20.0);
        assert!((c.efficiency_of(&s) - expected.min(100.0)).abs() < 1e-9);
    }
}
