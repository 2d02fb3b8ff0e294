//! Measurement samples and the append-only sample log.

use std::num::NonZeroU32;

use effcurve_traits::TelemetrySnapshot;

use crate::config::FLOOR_RPM_NUMERATOR;
use crate::error::CurveError;

/// Magnet pole-pair count of the motor under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolePairs(NonZeroU32);

impl PolePairs {
    pub fn new(n: i64) -> Result<Self, CurveError> {
        u32::try_from(n)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or_else(|| {
                CurveError::ConfigValidation(format!(
                    "pole pairs must be a positive integer, got {n}"
                ))
            })
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Electrical to mechanical rpm. Exact division, no smoothing.
    #[inline]
    pub fn to_mechanical_rpm(self, erpm: f64) -> f64 {
        erpm / f64::from(self.get())
    }

    /// Mechanical rpm below which sampling halts.
    #[inline]
    pub fn floor_rpm(self) -> f64 {
        FLOOR_RPM_NUMERATOR / f64::from(self.get())
    }
}

/// One acquired sample. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSample {
    current: f64,
    rpm: f64,
    voltage: f64,
}

impl MeasurementSample {
    pub fn new(current: f64, rpm: f64, voltage: f64) -> Self {
        Self {
            current,
            rpm,
            voltage,
        }
    }

    pub fn from_snapshot(snap: &TelemetrySnapshot, pole_pairs: PolePairs) -> Self {
        Self::new(
            snap.avg_input_current,
            pole_pairs.to_mechanical_rpm(snap.erpm),
            snap.bus_voltage,
        )
    }

    /// Input current (A).
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Mechanical rpm.
    #[inline]
    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    /// Bus voltage (V).
    #[inline]
    pub fn voltage(&self) -> f64 {
        self.voltage
    }
}

/// Ordered, append-only log of samples in acquisition order.
///
/// `len()` is the only sample counter in the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleLog {
    samples: Vec<MeasurementSample>,
}

impl SampleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: MeasurementSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&MeasurementSample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[MeasurementSample] {
        &self.samples
    }

    /// The first `n` samples, or fewer if the log is shorter.
    pub fn first_n(&self, n: usize) -> &[MeasurementSample] {
        &self.samples[..n.min(self.samples.len())]
    }
}

impl FromIterator<MeasurementSample> for SampleLog {
    fn from_iter<I: IntoIterator<Item = MeasurementSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SampleLog {
    type Item = &'a MeasurementSample;
    type IntoIter = std::slice::Iter<'a, MeasurementSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
