//! Result container and exporters.

use std::path::PathBuf;

use crate::efficiency::EfficiencyPoint;
use crate::error::CurveError;
use crate::estimator::MotorModel;
use crate::sample::SampleLog;

/// Everything a run produced for export.
///
/// `points` is empty when estimation was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyCurve {
    pub samples: SampleLog,
    pub model: Option<MotorModel>,
    pub points: Vec<EfficiencyPoint>,
}

impl EfficiencyCurve {
    pub fn has_efficiency(&self) -> bool {
        !self.points.is_empty()
    }

    /// Highest efficiency point, if any.
    pub fn peak(&self) -> Option<EfficiencyPoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.efficiency.total_cmp(&b.efficiency))
    }
}

/// Persists or displays a finished curve. Failures are non-fatal.
pub trait Exporter {
    fn name(&self) -> &str;
    fn export(&self, curve: &EfficiencyCurve) -> Result<(), CurveError>;
}

/// Writes `current,rpm,voltage,efficiency` rows; `efficiency` is blank when
/// no model was fitted.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Exporter for CsvExporter {
    fn name(&self) -> &str {
        "csv"
    }

    fn export(&self, curve: &EfficiencyCurve) -> Result<(), CurveError> {
        let mut wtr = csv::Writer::from_path(&self.path)
            .map_err(|e| CurveError::Export(format!("open {:?}: {e}", self.path)))?;
        wtr.write_record(["current", "rpm", "voltage", "efficiency"])
            .map_err(|e| CurveError::Export(e.to_string()))?;
        for (i, s) in curve.samples.iter().enumerate() {
            let eff = curve
                .points
                .get(i)
                .map(|p| format!("{:.3}", p.efficiency))
                .unwrap_or_default();
            wtr.write_record([
                format!("{:.4}", s.current()),
                format!("{:.3}", s.rpm()),
                format!("{:.4}", s.voltage()),
                eff,
            ])
            .map_err(|e| CurveError::Export(e.to_string()))?;
        }
        wtr.flush()
            .map_err(|e| CurveError::Export(format!("flush {:?}: {e}", self.path)))?;
        tracing::info!(path = ?self.path, rows = curve.samples.len(), "efficiency data saved");
        Ok(())
    }
}
