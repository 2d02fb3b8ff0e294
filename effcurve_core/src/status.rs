//! Pipeline phases, in the order a successful run visits them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    MeasuringIdleCurrent,
    Ramping,
    /// Wait after the ramp for the rotor speed to settle.
    Stabilizing,
    AwaitingTrigger,
    Sampling,
    StoppedByThreshold,
    StoppedByRetryExhaustion,
    Estimating,
    ComputingEfficiency,
    SkippedInsufficientData,
    Exporting,
    /// Always entered last, on success or failure.
    Shutdown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::MeasuringIdleCurrent => "measuring_idle_current",
            Self::Ramping => "ramping",
            Self::Stabilizing => "stabilizing",
            Self::AwaitingTrigger => "awaiting_trigger",
            Self::Sampling => "sampling",
            Self::StoppedByThreshold => "stopped_by_threshold",
            Self::StoppedByRetryExhaustion => "stopped_by_retry_exhaustion",
            Self::Estimating => "estimating",
            Self::ComputingEfficiency => "computing_efficiency",
            Self::SkippedInsufficientData => "skipped_insufficient_data",
            Self::Exporting => "exporting",
            Self::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
