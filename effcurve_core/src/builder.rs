//! Type-state builder for `Runner`.
//!
//! The adapters are type parameters: `build()` only exists once telemetry and
//! actuator have been supplied. Run parameters are checked at `build()`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use effcurve_traits::{Actuator, AutoTrigger, Clock, MonotonicClock, Telemetry, Trigger};

use crate::config::{RampCfg, SamplingCfg};
use crate::error::BuildError;
use crate::export::Exporter;
use crate::runner::{RunParams, Runner};
use crate::sample::PolePairs;

/// Placeholder for an adapter not yet provided.
#[derive(Debug, Default, Clone, Copy)]
pub struct Missing;

/// Run settings carried unchanged across adapter substitutions.
struct Settings {
    pole_pairs: Option<PolePairs>,
    ramp: RampCfg,
    sampling: SamplingCfg,
    stabilize: Duration,
    exporters: Vec<Box<dyn Exporter>>,
    cancel: Option<Arc<AtomicBool>>,
}

pub struct RunnerBuilder<T, A, G, C> {
    telemetry: T,
    actuator: A,
    trigger: G,
    clock: C,
    settings: Settings,
}

impl Default for RunnerBuilder<Missing, Missing, AutoTrigger, MonotonicClock> {
    fn default() -> Self {
        Self {
            telemetry: Missing,
            actuator: Missing,
            trigger: AutoTrigger,
            clock: MonotonicClock::new(),
            settings: Settings {
                pole_pairs: None,
                ramp: RampCfg::default(),
                sampling: SamplingCfg::default(),
                stabilize: Duration::from_secs(2),
                exporters: Vec::new(),
                cancel: None,
            },
        }
    }
}

impl RunnerBuilder<Missing, Missing, AutoTrigger, MonotonicClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, A, G, C> RunnerBuilder<T, A, G, C> {
    pub fn with_telemetry<T2: Telemetry>(self, telemetry: T2) -> RunnerBuilder<T2, A, G, C> {
        RunnerBuilder {
            telemetry,
            actuator: self.actuator,
            trigger: self.trigger,
            clock: self.clock,
            settings: self.settings,
        }
    }

    pub fn with_actuator<A2: Actuator>(self, actuator: A2) -> RunnerBuilder<T, A2, G, C> {
        RunnerBuilder {
            telemetry: self.telemetry,
            actuator,
            trigger: self.trigger,
            clock: self.clock,
            settings: self.settings,
        }
    }

    /// Replace the default `AutoTrigger`.
    pub fn with_trigger<G2: Trigger>(self, trigger: G2) -> RunnerBuilder<T, A, G2, C> {
        RunnerBuilder {
            telemetry: self.telemetry,
            actuator: self.actuator,
            trigger,
            clock: self.clock,
            settings: self.settings,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> RunnerBuilder<T, A, G, C2> {
        RunnerBuilder {
            telemetry: self.telemetry,
            actuator: self.actuator,
            trigger: self.trigger,
            clock,
            settings: self.settings,
        }
    }

    pub fn with_pole_pairs(mut self, pole_pairs: PolePairs) -> Self {
        self.settings.pole_pairs = Some(pole_pairs);
        self
    }

    pub fn with_ramp(mut self, ramp: RampCfg) -> Self {
        self.settings.ramp = ramp;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingCfg) -> Self {
        self.settings.sampling = sampling;
        self
    }

    pub fn with_stabilize(mut self, wait: Duration) -> Self {
        self.settings.stabilize = wait;
        self
    }

    /// Set pole pairs, ramp, sampling and stabilize in one go.
    pub fn with_params(mut self, params: RunParams) -> Self {
        self.settings.pole_pairs = Some(params.pole_pairs);
        self.settings.ramp = params.ramp;
        self.settings.sampling = params.sampling;
        self.settings.stabilize = params.stabilize;
        self
    }

    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.settings.exporters.push(Box::new(exporter));
        self
    }

    pub fn with_boxed_exporters(mut self, exporters: Vec<Box<dyn Exporter>>) -> Self {
        self.settings.exporters.extend(exporters);
        self
    }

    /// Abort the run (through shutdown) once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.settings.cancel = Some(flag);
        self
    }
}

impl<T, A, G, C> RunnerBuilder<T, A, G, C>
where
    T: Telemetry,
    A: Actuator,
    G: Trigger,
    C: Clock,
{
    pub fn build(self) -> Result<Runner<T, A, G, C>, BuildError> {
        let s = self.settings;
        let pole_pairs = s.pole_pairs.ok_or(BuildError::MissingPolePairs)?;
        s.ramp
            .validate()
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        s.sampling
            .validate()
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        Ok(Runner {
            telemetry: self.telemetry,
            actuator: self.actuator,
            trigger: self.trigger,
            clock: self.clock,
            params: RunParams {
                pole_pairs,
                ramp: s.ramp,
                sampling: s.sampling,
                stabilize: s.stabilize,
            },
            exporters: s.exporters,
            cancel: s.cancel,
            phases: Vec::new(),
        })
    }
}
