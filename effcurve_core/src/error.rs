use thiserror::Error;

/// Error taxonomy of a measurement run.
///
/// Each phase decides whether a variant ends the run; `is_fatal` reports the
/// default classification used by the runner.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("configuration error: {0}")]
    ConfigValidation(String),
    #[error("actuator command failed: {0}")]
    ActuatorCommand(String),
    #[error("no telemetry after {attempts} attempts")]
    TelemetryRetryExhausted { attempts: u32 },
    #[error("insufficient data: have {have} samples, need {need}")]
    InsufficientData { have: usize, need: usize },
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error("start trigger failed: {0}")]
    Trigger(String),
    #[error("run interrupted")]
    Interrupted,
}

impl CurveError {
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Connection(_)
            | Self::ConfigValidation(_)
            | Self::ActuatorCommand(_)
            | Self::Trigger(_)
            | Self::Interrupted => true,
            Self::TelemetryRetryExhausted { .. }
            | Self::InsufficientData { .. }
            | Self::DegenerateFit(_)
            | Self::Export(_) => false,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing pole pairs")]
    MissingPolePairs,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
