use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("telemetry timeout")]
    Timeout,
    #[error("link error: {0}")]
    Link(String),
    #[error("controller rejected command: {0}")]
    Rejected(String),
}
