//! Operator start gate on standard input.

use std::io::BufRead;

use effcurve_traits::{BoxError, Trigger};

/// Blocks until a line (Enter) arrives on stdin. EOF counts as a failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinTrigger;

impl Trigger for StdinTrigger {
    fn wait_for_proceed(&mut self) -> Result<(), BoxError> {
        eprintln!("Motor is running. Press Enter to start the measurement...");
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Err("stdin closed before the measurement was started".into());
        }
        Ok(())
    }
}
