use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use effcurve_traits::{Actuator, AutoTrigger, Clock, MonotonicClock, Telemetry, Trigger};

use crate::builder::{Missing, RunnerBuilder};
use crate::config::{RampCfg, SamplingCfg};
use crate::efficiency::EfficiencyComputer;
use crate::error::{CurveError, Report, Result as CoreResult};
use crate::estimator::ParameterEstimator;
use crate::export::{EfficiencyCurve, Exporter};
use crate::hw_error::{HwSide, map_hw_error};
use crate::ramp::RampController;
use crate::sample::{PolePairs, SampleLog};
use crate::sampler::{SamplingEnd, SamplingLoop};
use crate::status::Phase;

/// Everything a measurement run needs besides the adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    pub pole_pairs: PolePairs,
    pub ramp: RampCfg,
    pub sampling: SamplingCfg,
    /// Wait between the end of the ramp and the start trigger.
    pub stabilize: Duration,
}

impl RunParams {
    pub fn new(pole_pairs: PolePairs) -> Self {
        Self {
            pole_pairs,
            ramp: RampCfg::default(),
            sampling: SamplingCfg::default(),
            stabilize: Duration::from_secs(2),
        }
    }
}

/// Outcome of a run that reached the export phase.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub idle_current_a: f64,
    pub ramp_duties: Vec<f64>,
    pub sampling_end: SamplingEnd,
    /// Wall time spent in the sampling loop, measured on the runner's clock.
    pub sampling_ms: u64,
    pub curve: EfficiencyCurve,
    /// Why efficiency derivation was skipped, if it was.
    pub skipped: Option<CurveError>,
    pub export_errors: Vec<CurveError>,
    /// Failure to command zero duty during shutdown.
    pub shutdown_error: Option<CurveError>,
    pub phases: Vec<Phase>,
}

/// Fit the model and derive efficiencies from a finished log.
///
/// Returns the curve and, when estimation was skipped, the non-fatal reason.
pub fn analyze(samples: SampleLog) -> (EfficiencyCurve, Option<CurveError>) {
    tracing::info!(
        samples = samples.len(),
        "fitting parameters using the first data points"
    );
    match ParameterEstimator::default().estimate(&samples) {
        Ok(model) => {
            let points = EfficiencyComputer::new(model).compute(&samples);
            (
                EfficiencyCurve {
                    samples,
                    model: Some(model),
                    points,
                },
                None,
            )
        }
        Err(e) => {
            debug_assert!(!e.is_fatal(), "estimator returned a fatal error: {e}");
            tracing::warn!(error = %e, "skipping efficiency calculation");
            (
                EfficiencyCurve {
                    samples,
                    model: None,
                    points: Vec::new(),
                },
                Some(e),
            )
        }
    }
}

/// Run every exporter; failures are logged and collected, never propagated.
pub fn export_all(exporters: &[Box<dyn Exporter>], curve: &EfficiencyCurve) -> Vec<CurveError> {
    let mut errors = Vec::new();
    for exp in exporters {
        if let Err(e) = exp.export(curve) {
            debug_assert!(!e.is_fatal(), "exporter returned a fatal error: {e}");
            tracing::warn!(exporter = exp.name(), error = %e, "export failed");
            errors.push(e);
        }
    }
    errors
}

/// Sequential measurement pipeline over one telemetry/actuator pair.
pub struct Runner<T, A, G = AutoTrigger, C = MonotonicClock> {
    pub(crate) telemetry: T,
    pub(crate) actuator: A,
    pub(crate) trigger: G,
    pub(crate) clock: C,
    pub(crate) params: RunParams,
    pub(crate) exporters: Vec<Box<dyn Exporter>>,
    pub(crate) cancel: Option<Arc<AtomicBool>>,
    pub(crate) phases: Vec<Phase>,
}

impl Runner<Missing, Missing> {
    pub fn builder() -> RunnerBuilder<Missing, Missing, AutoTrigger, MonotonicClock> {
        RunnerBuilder::default()
    }
}

impl<T, A, G, C> Runner<T, A, G, C>
where
    T: Telemetry,
    A: Actuator,
    G: Trigger,
    C: Clock,
{
    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Phases entered by the most recent `run`, in order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Execute the whole pipeline.
    ///
    /// Fatal errors skip straight to shutdown and are returned afterwards.
    /// Shutdown always attempts to command zero duty.
    pub fn run(&mut self) -> CoreResult<RunReport> {
        self.phases.clear();
        self.enter(Phase::Idle);
        let outcome = self.measure();
        self.enter(Phase::Shutdown);
        let shutdown_error = self.shutdown();
        match outcome {
            Ok(mut report) => {
                report.shutdown_error = shutdown_error;
                report.phases = self.phases.clone();
                Ok(report)
            }
            Err(e) => {
                debug_assert!(e.is_fatal(), "non-fatal error aborted the run: {e}");
                tracing::error!(error = %e, "run aborted");
                Err(Report::new(e))
            }
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(%phase, "phase");
        self.phases.push(phase);
    }

    fn check_cancel(&self) -> Result<(), CurveError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(CurveError::Interrupted),
            _ => Ok(()),
        }
    }

    fn measure(&mut self) -> Result<RunReport, CurveError> {
        self.enter(Phase::MeasuringIdleCurrent);
        let idle_current_a = self.measure_idle_current()?;

        self.check_cancel()?;
        self.enter(Phase::Ramping);
        let ramp = RampController::new(self.params.ramp.clone())?;
        tracing::info!(
            target_pct = self.params.ramp.target_duty * 100.0,
            steps = ramp.planned_steps(),
            "starting motor"
        );
        let ramp_duties = ramp.run(&mut self.actuator, &self.clock)?;

        self.check_cancel()?;
        self.enter(Phase::Stabilizing);
        tracing::info!(wait = ?self.params.stabilize, "motor running; waiting for stable ERPM");
        self.clock.sleep(self.params.stabilize);

        self.check_cancel()?;
        self.enter(Phase::AwaitingTrigger);
        self.trigger
            .wait_for_proceed()
            .map_err(|e| CurveError::Trigger(e.to_string()))?;

        self.check_cancel()?;
        self.enter(Phase::Sampling);
        tracing::info!("measurement started");
        let mut sampler = SamplingLoop::new(&self.params.sampling, self.params.pole_pairs);
        if let Some(flag) = &self.cancel {
            sampler = sampler.with_cancel(Arc::clone(flag));
        }
        let started = self.clock.now();
        let (samples, sampling_end) = sampler.run(&mut self.telemetry, &self.clock)?;
        let sampling_ms = self.clock.ms_since(started);
        tracing::info!(samples = samples.len(), sampling_ms, "sampling finished");
        self.enter(match sampling_end {
            SamplingEnd::Stopped(_) => Phase::StoppedByThreshold,
            SamplingEnd::RetryExhausted { .. } => Phase::StoppedByRetryExhaustion,
        });

        self.enter(Phase::Estimating);
        let (curve, skipped) = analyze(samples);
        self.enter(if skipped.is_none() {
            Phase::ComputingEfficiency
        } else {
            Phase::SkippedInsufficientData
        });

        self.enter(Phase::Exporting);
        let export_errors = export_all(&self.exporters, &curve);

        Ok(RunReport {
            idle_current_a,
            ramp_duties,
            sampling_end,
            sampling_ms,
            curve,
            skipped,
            export_errors,
            shutdown_error: None,
            phases: Vec::new(),
        })
    }

    fn measure_idle_current(&mut self) -> Result<f64, CurveError> {
        tracing::info!("measuring idle current");
        let idle = match self.telemetry.query() {
            Ok(Some(snap)) => snap.avg_input_current,
            Ok(None) => 0.0,
            Err(e) => return Err(map_hw_error(HwSide::Telemetry, e.as_ref())),
        };
        tracing::info!(idle_current_a = idle, "idle current measured");
        Ok(idle)
    }

    fn shutdown(&mut self) -> Option<CurveError> {
        match self.actuator.set_duty_cycle(0.0) {
            Ok(()) => {
                tracing::info!("motor stopped");
                None
            }
            Err(e) => {
                let err = map_hw_error(HwSide::Actuator, e.as_ref());
                tracing::error!(error = %err, "error stopping motor");
                Some(err)
            }
        }
    }
}
