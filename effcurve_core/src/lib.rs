#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motor efficiency-curve measurement (hardware-agnostic).
//!
//! All hardware interaction goes through the `effcurve_traits::Telemetry`,
//! `Actuator` and `Trigger` traits; every suspension point goes through
//! `effcurve_traits::Clock`.
//!
//! ## Pipeline
//!
//! - **Ramp**: open-loop duty-cycle ramp with settle delays (`ramp`)
//! - **Sampling**: fixed-cadence acquisition with bounded retries (`sampler`, `backoff`)
//! - **Stopping**: over-current / rpm-floor predicate (`stopping`)
//! - **Estimation**: least-squares fit of `V = R·I + c·2π·rpm` (`estimator`)
//! - **Efficiency**: per-sample efficiency from the fitted model (`efficiency`)
//! - **Runner**: phase state machine with an unconditional shutdown path (`runner`)

pub mod backoff;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod efficiency;
pub mod error;
pub mod estimator;
pub mod export;
pub mod hw_error;
pub mod mocks;
pub mod ramp;
pub mod runner;
pub mod sample;
pub mod sampler;
pub mod status;
pub mod stopping;

pub use backoff::{ExponentialBackoff, FixedBackoff, RetryPolicy};
pub use builder::RunnerBuilder;
pub use config::{
    BackoffCfg, CURRENT_THRESHOLD_A, FLOOR_RPM_NUMERATOR, MIN_FIT_SAMPLES, RampCfg, SamplingCfg,
};
pub use efficiency::{EfficiencyComputer, EfficiencyPoint};
pub use error::{BuildError, CurveError};
pub use estimator::{MotorModel, ParameterEstimator};
pub use export::{CsvExporter, EfficiencyCurve, Exporter};
pub use ramp::RampController;
pub use runner::{RunParams, RunReport, Runner, analyze, export_all};
pub use sample::{MeasurementSample, PolePairs, SampleLog};
pub use sampler::{SamplingEnd, SamplingLoop};
pub use status::Phase;
pub use stopping::{StopReason, StoppingPolicy};
