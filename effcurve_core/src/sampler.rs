//! Fixed-cadence telemetry sampling with bounded retries.
//!
//! The loop owns the `SampleLog` while it runs and hands it back by value
//! once a stop condition or retry exhaustion ends acquisition.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use effcurve_traits::{Clock, Telemetry, TelemetrySnapshot};

use crate::backoff::RetryPolicy;
use crate::config::SamplingCfg;
use crate::error::CurveError;
use crate::hw_error::{HwSide, is_timeout, map_hw_error};
use crate::sample::{MeasurementSample, PolePairs, SampleLog};
use crate::stopping::{StopReason, StoppingPolicy};

/// Why acquisition ended. Both variants are normal completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingEnd {
    /// The stopping policy fired; the triggering sample is the last log entry.
    Stopped(StopReason),
    /// Every attempt for one sample came back empty.
    RetryExhausted { attempts: u32 },
}

impl SamplingEnd {
    /// The recoverable error this end corresponds to, if any.
    pub fn as_error(&self) -> Option<CurveError> {
        match *self {
            Self::Stopped(_) => None,
            Self::RetryExhausted { attempts } => {
                Some(CurveError::TelemetryRetryExhausted { attempts })
            }
        }
    }
}

pub struct SamplingLoop {
    cadence: Duration,
    policy: Box<dyn RetryPolicy>,
    pole_pairs: PolePairs,
    stopping: StoppingPolicy,
    cancel: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for SamplingLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingLoop")
            .field("cadence", &self.cadence)
            .field("max_attempts", &self.policy.max_attempts())
            .field("pole_pairs", &self.pole_pairs)
            .field("stopping", &self.stopping)
            .finish()
    }
}

impl SamplingLoop {
    pub fn new(cfg: &SamplingCfg, pole_pairs: PolePairs) -> Self {
        Self {
            cadence: cfg.cadence,
            policy: (&cfg.backoff).into(),
            pole_pairs,
            stopping: StoppingPolicy::for_pole_pairs(pole_pairs),
            cancel: None,
        }
    }

    /// Substitute the retry policy.
    pub fn with_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Abort with `CurveError::Interrupted` once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Query telemetry until it answers or the retry budget is spent.
    ///
    /// `Ok(None)` and `Err` both count as one failed attempt; the policy's
    /// delay is slept after every failure.
    pub fn acquire<T, C>(&self, telemetry: &mut T, clock: &C) -> Option<TelemetrySnapshot>
    where
        T: Telemetry + ?Sized,
        C: Clock + ?Sized,
    {
        let max = self.policy.max_attempts();
        for attempt in 1..=max {
            match telemetry.query() {
                Ok(Some(snap)) => return Some(snap),
                Ok(None) => {
                    tracing::warn!(attempt, max, "no telemetry received");
                }
                Err(e) => {
                    let timeout = is_timeout(e.as_ref());
                    let err = map_hw_error(HwSide::Telemetry, e.as_ref());
                    tracing::warn!(attempt, max, timeout, error = %err, "telemetry query failed");
                }
            }
            clock.sleep(self.policy.delay_after(attempt));
        }
        None
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Acquire samples until the stopping policy fires or telemetry goes silent.
    pub fn run<T, C>(
        &self,
        telemetry: &mut T,
        clock: &C,
    ) -> Result<(SampleLog, SamplingEnd), CurveError>
    where
        T: Telemetry + ?Sized,
        C: Clock + ?Sized,
    {
        let mut log = SampleLog::new();
        loop {
            if self.cancelled() {
                tracing::warn!(samples = log.len(), "sampling interrupted");
                return Err(CurveError::Interrupted);
            }

            let Some(snap) = self.acquire(telemetry, clock) else {
                let attempts = self.policy.max_attempts();
                tracing::error!(
                    attempts,
                    samples = log.len(),
                    "no data received after multiple attempts; stopping measurements"
                );
                return Ok((log, SamplingEnd::RetryExhausted { attempts }));
            };

            let sample = MeasurementSample::from_snapshot(&snap, self.pole_pairs);
            tracing::info!(
                current_a = sample.current(),
                rpm = sample.rpm(),
                voltage_v = sample.voltage(),
                "logging data"
            );
            log.push(sample);

            if let Some(reason) = self.stopping.evaluate(&sample) {
                tracing::info!(%reason, samples = log.len(), "stopping measurements");
                return Ok((log, SamplingEnd::Stopped(reason)));
            }
            clock.sleep(self.cadence);
        }
    }
}
