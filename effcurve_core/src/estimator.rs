//! Least-squares fit of the linear motor-voltage model
//! `V = R·I + c·2π·rpm` over the first samples of a run.

use std::f64::consts::TAU;

use nalgebra::{DMatrix, DVector};

use crate::config::MIN_FIT_SAMPLES;
use crate::error::CurveError;
use crate::sample::SampleLog;

/// Singular values below `RCOND * σ_max` are treated as zero, giving the
/// minimum-norm solution for rank-deficient windows.
const RCOND: f64 = 1e-12;
const SVD_MAX_ITER: usize = 1_000;

/// Fitted motor parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorModel {
    /// Winding (plus wiring) resistance, Ω.
    pub r_ohm: f64,
    /// Back-EMF constant, V per (2π·rpm).
    pub c: f64,
}

impl MotorModel {
    #[inline]
    pub fn estimated_voltage(&self, current: f64, rpm: f64) -> f64 {
        self.r_ohm * current + self.c * TAU * rpm
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterEstimator {
    window: usize,
}

impl Default for ParameterEstimator {
    fn default() -> Self {
        Self {
            window: MIN_FIT_SAMPLES,
        }
    }
}

impl ParameterEstimator {
    /// Fit over the first `window` samples (at least 2).
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Fit `(R, c)` from the first `window` samples of `log`.
    ///
    /// Shorter logs yield `CurveError::InsufficientData`; a fit that is not
    /// finite yields `CurveError::DegenerateFit`. Both are non-fatal.
    pub fn estimate(&self, log: &SampleLog) -> Result<MotorModel, CurveError> {
        let have = log.len();
        if have < self.window {
            return Err(CurveError::InsufficientData {
                have,
                need: self.window,
            });
        }
        let fit = log.first_n(self.window);
        let n = fit.len();

        let a = DMatrix::from_fn(n, 2, |i, j| {
            if j == 0 {
                fit[i].current()
            } else {
                TAU * fit[i].rpm()
            }
        });
        let b = DVector::from_iterator(n, fit.iter().map(|s| s.voltage()));
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(CurveError::DegenerateFit(
                "non-finite value in fit window".into(),
            ));
        }

        let svd = a
            .try_svd(true, true, f64::EPSILON, SVD_MAX_ITER)
            .ok_or_else(|| CurveError::DegenerateFit("SVD did not converge".into()))?;
        let sigma_max = svd.singular_values.max();
        if !sigma_max.is_finite() {
            return Err(CurveError::DegenerateFit(
                "fit window overflows the solver".into(),
            ));
        }
        let eps = sigma_max * RCOND;
        let rank = svd.rank(eps);
        if rank < 2 {
            tracing::warn!(rank, "fit window is rank deficient; using minimum-norm solution");
        }
        let x = svd
            .solve(&b, eps)
            .map_err(|e| CurveError::DegenerateFit(e.to_string()))?;

        let model = MotorModel {
            r_ohm: x[0],
            c: x[1],
        };
        if !(model.r_ohm.is_finite() && model.c.is_finite()) {
            return Err(CurveError::DegenerateFit(
                "solver produced non-finite parameters".into(),
            ));
        }
        tracing::info!(r_ohm = model.r_ohm, c = model.c, "calculated parameters");
        Ok(model)
    }
}
