//! Maps `Box<dyn Error>` from adapter boundaries to typed `CurveError`s.
//!
//! The traits in `effcurve_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our error enum, with an optional feature-gated
//! path for `effcurve_hardware::HwError` downcasting.

use crate::error::CurveError;

/// Which adapter the error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwSide {
    Telemetry,
    Actuator,
}

/// Whether a boxed adapter error is a timeout (as opposed to a link fault).
pub fn is_timeout(e: &(dyn std::error::Error + 'static)) -> bool {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<effcurve_hardware::error::HwError>() {
            return matches!(hw, effcurve_hardware::error::HwError::Timeout);
        }
    }
    e.to_string().to_lowercase().contains("timeout")
}

/// Map an adapter error to a typed `CurveError`.
///
/// Telemetry faults map to `Connection`, actuator faults to `ActuatorCommand`.
pub fn map_hw_error(side: HwSide, e: &(dyn std::error::Error + 'static)) -> CurveError {
    let msg = {
        #[cfg(feature = "hardware-errors")]
        {
            match e.downcast_ref::<effcurve_hardware::error::HwError>() {
                Some(hw) => hw.to_string(),
                None => e.to_string(),
            }
        }
        #[cfg(not(feature = "hardware-errors"))]
        {
            e.to_string()
        }
    };
    match side {
        HwSide::Telemetry => CurveError::Connection(msg),
        HwSide::Actuator => CurveError::ActuatorCommand(msg),
    }
}
