//! Simulated motor test bench.
//!
//! The bench models a motor on a battery with a load that grows by a fixed
//! step on every telemetry query while the motor is driven. Both adapter
//! handles share one state cell, so commands issued through `SimActuator` are
//! visible to `SimTelemetry`.
pub mod error;

use effcurve_traits::{Actuator, BoxError, Telemetry, TelemetrySnapshot};
use error::HwError;
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

/// Physical parameters and injected faults for the simulated bench.
#[derive(Debug, Clone)]
pub struct SimParams {
    pub pole_pairs: u32,
    /// Winding resistance (Ω).
    pub winding_r_ohm: f64,
    /// Back-EMF constant (V per 2π·rpm).
    pub back_emf_c: f64,
    /// Open-circuit battery voltage (V).
    pub supply_v: f64,
    /// Battery internal resistance (Ω).
    pub battery_r_ohm: f64,
    /// Current drawn with the motor at rest (A).
    pub idle_current_a: f64,
    /// Load current added per query while driven (A).
    pub load_step_a: f64,
    /// After this many answered queries, the controller goes silent.
    pub silent_after: Option<u32>,
    /// Every n-th query is dropped (answered with no data).
    pub drop_every: Option<u32>,
    /// Reject the n-th (0-based) non-zero duty command.
    pub reject_command: Option<usize>,
    /// Reject every zero-duty command.
    pub reject_stop: bool,
    /// Every query fails with a link error.
    pub link_down: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            pole_pairs: 7,
            winding_r_ohm: 0.05,
            back_emf_c: 0.0005,
            supply_v: 25.2,
            battery_r_ohm: 0.02,
            idle_current_a: 0.8,
            load_step_a: 1.5,
            silent_after: None,
            drop_every: None,
            reject_command: None,
            reject_stop: false,
            link_down: false,
        }
    }
}

#[derive(Debug, Default)]
struct BenchState {
    duty: f64,
    load_a: f64,
    queries: u32,
    answered: u32,
    drive_commands: usize,
    commands: Vec<f64>,
}

/// Simulated controller split into a telemetry and an actuator handle.
pub struct SimulatedBench {
    params: SimParams,
    state: Rc<RefCell<BenchState>>,
}

impl SimulatedBench {
    pub fn new(params: SimParams) -> Self {
        Self {
            params,
            state: Rc::new(RefCell::new(BenchState::default())),
        }
    }

    /// Hand out the two adapter handles.
    pub fn split(&self) -> (SimTelemetry, SimActuator) {
        (
            SimTelemetry {
                params: self.params.clone(),
                state: Rc::clone(&self.state),
            },
            SimActuator {
                params: self.params.clone(),
                state: Rc::clone(&self.state),
            },
        )
    }

    /// Every duty cycle commanded so far, in order.
    pub fn commands(&self) -> Vec<f64> {
        self.state.borrow().commands.clone()
    }

    /// Currently applied duty cycle.
    pub fn duty(&self) -> f64 {
        self.state.borrow().duty
    }

    pub fn queries(&self) -> u32 {
        self.state.borrow().queries
    }
}

pub struct SimTelemetry {
    params: SimParams,
    state: Rc<RefCell<BenchState>>,
}

impl SimTelemetry {
    fn snapshot(&self, st: &BenchState) -> TelemetrySnapshot {
        let p = &self.params;
        let current = p.idle_current_a + st.load_a;
        let voltage = p.supply_v - p.battery_r_ohm * current;
        let rpm = if st.duty > 0.0 {
            ((st.duty * voltage - p.winding_r_ohm * current) / (p.back_emf_c * 2.0 * PI)).max(0.0)
        } else {
            0.0
        };
        TelemetrySnapshot {
            avg_input_current: current,
            erpm: rpm * f64::from(p.pole_pairs),
            bus_voltage: voltage,
        }
    }
}

impl Telemetry for SimTelemetry {
    fn query(&mut self) -> Result<Option<TelemetrySnapshot>, BoxError> {
        let mut st = self.state.borrow_mut();
        st.queries = st.queries.saturating_add(1);
        if self.params.link_down {
            return Err(Box::new(HwError::Link("controller not responding".into())));
        }
        if let Some(limit) = self.params.silent_after
            && st.answered >= limit
        {
            tracing::trace!(queries = st.queries, "sim controller silent");
            return Ok(None);
        }
        if let Some(n) = self.params.drop_every
            && n > 0
            && st.queries % n == 0
        {
            tracing::trace!(queries = st.queries, "sim dropped frame");
            return Ok(None);
        }
        if st.duty > 0.0 {
            st.load_a += self.params.load_step_a;
        }
        st.answered = st.answered.saturating_add(1);
        let snap = self.snapshot(&st);
        tracing::trace!(?snap, "sim telemetry");
        Ok(Some(snap))
    }
}

pub struct SimActuator {
    params: SimParams,
    state: Rc<RefCell<BenchState>>,
}

impl Actuator for SimActuator {
    fn set_duty_cycle(&mut self, duty: f64) -> Result<(), BoxError> {
        if !(0.0..=1.0).contains(&duty) {
            return Err(Box::new(HwError::Rejected(format!(
                "duty {duty} outside [0, 1]"
            ))));
        }
        let mut st = self.state.borrow_mut();
        if duty == 0.0 {
            if self.params.reject_stop {
                return Err(Box::new(HwError::Link("stop command lost".into())));
            }
        } else {
            let idx = st.drive_commands;
            st.drive_commands += 1;
            if self.params.reject_command == Some(idx) {
                return Err(Box::new(HwError::Rejected(format!(
                    "duty command #{idx} refused"
                ))));
            }
        }
        st.duty = duty;
        st.commands.push(duty);
        if duty == 0.0 {
            st.load_a = 0.0;
        }
        Ok(())
    }
}
