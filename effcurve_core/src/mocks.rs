//! Scripted adapters for tests and dry runs of the pipeline.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use effcurve_traits::{Actuator, BoxError, Telemetry, TelemetrySnapshot, Trigger};

/// One scripted telemetry answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Frame(TelemetrySnapshot),
    NoData,
    Fault(String),
}

impl Reply {
    pub fn frame(current: f64, erpm: f64, voltage: f64) -> Self {
        Self::Frame(TelemetrySnapshot {
            avg_input_current: current,
            erpm,
            bus_voltage: voltage,
        })
    }
}

/// Telemetry that replays a script, then answers `NoData` forever.
#[derive(Debug, Default)]
pub struct ScriptedTelemetry {
    script: VecDeque<Reply>,
    queries: usize,
}

impl ScriptedTelemetry {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: script.into_iter().collect(),
            queries: 0,
        }
    }

    pub fn queries(&self) -> usize {
        self.queries
    }
}

impl Telemetry for ScriptedTelemetry {
    fn query(&mut self) -> Result<Option<TelemetrySnapshot>, BoxError> {
        self.queries += 1;
        match self.script.pop_front() {
            Some(Reply::Frame(s)) => Ok(Some(s)),
            Some(Reply::NoData) | None => Ok(None),
            Some(Reply::Fault(msg)) => Err(msg.into()),
        }
    }
}

/// Actuator that records every command in a shared list.
///
/// `fail_on` makes the n-th (0-based) command fail after being recorded.
#[derive(Debug, Default, Clone)]
pub struct SpyActuator {
    commands: Rc<RefCell<Vec<f64>>>,
    fail_on: Option<usize>,
}

impl SpyActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::default()
        }
    }

    /// Shared handle to the command log; stays valid after the actuator moves.
    pub fn commands(&self) -> Rc<RefCell<Vec<f64>>> {
        Rc::clone(&self.commands)
    }
}

impl Actuator for SpyActuator {
    fn set_duty_cycle(&mut self, duty: f64) -> Result<(), BoxError> {
        let idx = {
            let mut c = self.commands.borrow_mut();
            c.push(duty);
            c.len() - 1
        };
        if self.fail_on == Some(idx) {
            return Err(format!("command {idx} rejected").into());
        }
        Ok(())
    }
}

/// Trigger that fails, for exercising the abort path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingTrigger;

impl Trigger for FailingTrigger {
    fn wait_for_proceed(&mut self) -> Result<(), BoxError> {
        Err("operator input closed".into())
    }
}
