//! PNG efficiency plot.

use std::error::Error;
use std::path::PathBuf;
use std::sync::OnceLock;

use effcurve_core::{CurveError, EfficiencyCurve, Exporter};
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

const TITLE: &str = "Motor Efficiency vs Battery Current";
const X_DESC: &str = "Battery Current (A)";
const Y_DESC: &str = "Efficiency (%)";
const X_MAX_A: f64 = 60.0;
const Y_MAX_PCT: f64 = 100.0;
const PLOT_SIZE: (u32, u32) = (1000, 600);
const FONT_FAMILY: &str = "sans-serif";

/// Font files tried when `EFFCURVE_PLOT_FONT` is unset.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a TTF for text rendering once per process.
///
/// Returns false when no font could be loaded; the plot is then drawn
/// without title and labels.
fn ensure_font() -> bool {
    *FONT_READY.get_or_init(|| {
        let from_env = std::env::var("EFFCURVE_PLOT_FONT").ok().map(PathBuf::from);
        let candidates = from_env
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // Fonts live for the whole process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                tracing::debug!(font = ?path, "plot font registered");
                return true;
            }
        }
        tracing::warn!("no usable TTF font found; plot will have no labels");
        false
    })
}

/// Draws efficiency against battery current on fixed axes.
///
/// A curve without efficiency points still produces the empty axes, so a
/// short run leaves an image behind.
#[derive(Debug, Clone)]
pub struct PlotExporter {
    path: PathBuf,
}

impl PlotExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn draw(&self, curve: &EfficiencyCurve) -> Result<(), Box<dyn Error>> {
        let labels = ensure_font();
        let root = BitMapBackend::new(&self.path, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if labels {
            builder
                .caption(TITLE, (FONT_FAMILY, 28).into_font())
                .x_label_area_size(50)
                .y_label_area_size(60);
        }
        let mut chart = builder.build_cartesian_2d(0.0..X_MAX_A, 0.0..Y_MAX_PCT)?;

        {
            let mut mesh = chart.configure_mesh();
            if labels {
                mesh.x_desc(X_DESC)
                    .y_desc(Y_DESC)
                    .label_style((FONT_FAMILY, 16).into_font());
            } else {
                mesh.x_labels(0).y_labels(0);
            }
            mesh.draw()?;
        }

        let pts: Vec<(f64, f64)> = curve
            .points
            .iter()
            .map(|p| (p.current, p.efficiency))
            .collect();
        chart.draw_series(LineSeries::new(pts.iter().copied(), BLUE.stroke_width(2)))?;
        chart.draw_series(pts.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;

        root.present()?;
        Ok(())
    }
}

impl Exporter for PlotExporter {
    fn name(&self) -> &str {
        "plot"
    }

    fn export(&self, curve: &EfficiencyCurve) -> Result<(), CurveError> {
        if !curve.has_efficiency() {
            tracing::info!("no efficiency data; plotting empty axes");
        }
        self.draw(curve)
            .map_err(|e| CurveError::Export(format!("plot {:?}: {e}", self.path)))?;
        tracing::info!(path = ?self.path, points = curve.points.len(), "efficiency plot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_without_efficiency_still_writes_axes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.png");
        PlotExporter::new(&path)
            .export(&EfficiencyCurve::default())
            .unwrap();
        assert!(path.exists());
    }
}
