pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the adapter boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One telemetry frame as reported by the motor controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Average battery-side input current (A).
    pub avg_input_current: f64,
    /// Electrical revolutions per minute.
    pub erpm: f64,
    /// Bus (battery) voltage (V).
    pub bus_voltage: f64,
}

pub trait Telemetry {
    /// Blocking query for the latest telemetry frame.
    ///
    /// `Ok(None)` means the controller did not answer in time; callers treat it
    /// as a single failed attempt. `Err` is a link-level fault.
    fn query(&mut self) -> Result<Option<TelemetrySnapshot>, BoxError>;
}

pub trait Actuator {
    /// Command a duty cycle in `[0, 1]`.
    fn set_duty_cycle(&mut self, duty: f64) -> Result<(), BoxError>;
}

/// Synchronous "proceed" gate between ramp-up and measurement.
pub trait Trigger {
    fn wait_for_proceed(&mut self) -> Result<(), BoxError>;
}

impl<T: Telemetry + ?Sized> Telemetry for Box<T> {
    fn query(&mut self) -> Result<Option<TelemetrySnapshot>, BoxError> {
        (**self).query()
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn set_duty_cycle(&mut self, duty: f64) -> Result<(), BoxError> {
        (**self).set_duty_cycle(duty)
    }
}

impl<G: Trigger + ?Sized> Trigger for Box<G> {
    fn wait_for_proceed(&mut self) -> Result<(), BoxError> {
        (**self).wait_for_proceed()
    }
}

/// Trigger that proceeds immediately (unattended runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoTrigger;

impl Trigger for AutoTrigger {
    fn wait_for_proceed(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
