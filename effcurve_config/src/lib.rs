#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and recorded-log parsing for the efficiency bench.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - The sample-log CSV loader enforces headers so a recorded run can be
//!   re-analysed offline.
use serde::Deserialize;

/// Upper bound on the number of commands a single ramp may issue.
pub const MAX_RAMP_STEPS: usize = 10_000;

/// Recorded sample-log CSV schema.
///
/// Expected headers:
/// current,rpm,voltage
///
/// A fourth `efficiency` column (as written by the CSV exporter) is accepted
/// and ignored.
///
/// Example:
/// current,rpm,voltage
/// 2.3,6810.5,25.15
/// 3.8,6790.2,25.12
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub current: f64,
    pub rpm: f64,
    pub voltage: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MotorCfg {
    /// Magnet pole pairs; required at run time (CLI flag or config).
    /// Signed so that a non-positive value is reported by `validate()`
    /// instead of a serde type error.
    pub pole_pairs: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RampCfg {
    pub target_duty: f64,
    pub step: f64,
    /// Settling delay after each duty step (ms)
    pub settle_ms: u64,
    pub start_duty: f64,
    /// Wait after the ramp before the start trigger (ms)
    pub stabilize_ms: u64,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            target_duty: 0.95,
            step: 0.05,
            settle_ms: 500,
            start_duty: 0.1,
            stabilize_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Delay between successful samples (ms)
    pub cadence_ms: u64,
    /// Telemetry attempts per sample before the loop gives up
    pub retry_attempts: u32,
    /// Delay after a failed attempt (ms); initial delay for exponential backoff
    pub retry_delay_ms: u64,
    pub backoff: BackoffKind,
    /// Upper bound for exponential backoff delays (ms)
    pub max_retry_delay_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            cadence_ms: 100,
            retry_attempts: 3,
            retry_delay_ms: 100,
            backoff: BackoffKind::Fixed,
            max_retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportCfg {
    /// Output image path for the efficiency plot
    pub image: Option<String>,
    /// Optional CSV dump of samples and efficiencies
    pub csv: Option<String>,
}

impl Default for ExportCfg {
    fn default() -> Self {
        Self {
            image: Some("efficiency_curve.png".to_string()),
            csv: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub motor: MotorCfg,
    pub ramp: RampCfg,
    pub sampling: SamplingCfg,
    pub export: ExportCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load a recorded sample log. Headers must be exactly `current,rpm,voltage`.
pub fn load_sample_log_csv(path: &std::path::Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open sample log CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["current", "rpm", "voltage"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    // Files written by the CSV exporter carry a trailing efficiency column.
    let exported =
        actual.len() == 4 && actual[..3] == expected && actual[3] == "efficiency";
    if actual != expected && !exported {
        eyre::bail!(
            "sample log CSV must have headers 'current,rpm,voltage', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !(row.current.is_finite() && row.rpm.is_finite() && row.voltage.is_finite()) {
                    eyre::bail!("non-finite value in CSV row {}", idx + 2);
                }
                if row.current < 0.0 || row.voltage < 0.0 {
                    eyre::bail!("negative current or voltage in CSV row {}", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Motor
        if let Some(pp) = self.motor.pole_pairs
            && pp <= 0
        {
            eyre::bail!("motor.pole_pairs must be > 0");
        }

        // Ramp
        let r = &self.ramp;
        if !(r.target_duty > 0.0 && r.target_duty <= 1.0) {
            eyre::bail!("ramp.target_duty must be in (0.0, 1.0]");
        }
        if !(r.step > 0.0 && r.step < 1.0) {
            eyre::bail!("ramp.step must be in (0.0, 1.0)");
        }
        if r.settle_ms == 0 {
            eyre::bail!("ramp.settle_ms must be >= 1");
        }
        if !(r.start_duty >= 0.0 && r.start_duty < r.target_duty) {
            eyre::bail!("ramp.start_duty must be in [0.0, target_duty)");
        }
        if (r.target_duty - r.start_duty) / r.step > MAX_RAMP_STEPS as f64 {
            eyre::bail!("ramp.step is too small: ramp would exceed {MAX_RAMP_STEPS} commands");
        }
        if r.stabilize_ms > 10 * 60 * 1000 {
            eyre::bail!("ramp.stabilize_ms is unreasonably large (>10min)");
        }

        // Sampling
        let s = &self.sampling;
        if s.cadence_ms == 0 {
            eyre::bail!("sampling.cadence_ms must be >= 1");
        }
        if s.retry_attempts == 0 {
            eyre::bail!("sampling.retry_attempts must be >= 1");
        }
        if s.retry_delay_ms == 0 {
            eyre::bail!("sampling.retry_delay_ms must be >= 1");
        }
        if s.backoff == BackoffKind::Exponential && s.max_retry_delay_ms < s.retry_delay_ms {
            eyre::bail!("sampling.max_retry_delay_ms must be >= sampling.retry_delay_ms");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_toml("").expect("parse");
        assert_eq!(cfg.motor.pole_pairs, None);
        assert!((cfg.ramp.target_duty - 0.95).abs() < f64::EPSILON);
        assert!((cfg.ramp.step - 0.05).abs() < f64::EPSILON);
        assert_eq!(cfg.ramp.settle_ms, 500);
        assert_eq!(cfg.sampling.cadence_ms, 100);
        assert_eq!(cfg.sampling.retry_attempts, 3);
        assert_eq!(cfg.sampling.retry_delay_ms, 100);
        cfg.validate().expect("defaults are valid");
    }
}
