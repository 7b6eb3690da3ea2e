#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and sample CSV parsing for the measurement generator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The sample CSV loader enforces headers, finite values and time ordering.
use serde::Deserialize;

/// Sample CSV schema.
///
/// Expected headers:
/// timestamp_s,fx,fy,fz,bx,by,bz
/// or, with a gyroscope:
/// timestamp_s,fx,fy,fz,bx,by,bz,wx,wy,wz
///
/// Specific force in m/s², flux density in Tesla, angular rate in rad/s.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub timestamp_s: f64,
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub bx: f64,
    pub by: f64,
    pub bz: f64,
    #[serde(default)]
    pub wx: Option<f64>,
    #[serde(default)]
    pub wy: Option<f64>,
    #[serde(default)]
    pub wz: Option<f64>,
}

impl SampleRow {
    fn values(&self) -> [f64; 7] {
        [
            self.timestamp_s,
            self.fx,
            self.fy,
            self.fz,
            self.bx,
            self.by,
            self.bz,
        ]
    }
}

const BASE_HEADERS: [&str; 7] = ["timestamp_s", "fx", "fy", "fz", "bx", "by", "bz"];
const GYRO_HEADERS: [&str; 3] = ["wx", "wy", "wz"];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DetectorCfg {
    /// Samples gathered before the base noise level is estimated
    pub initial_static_samples: usize,
    /// Sliding window length used after initialization
    pub window_size: usize,
    /// Window std-dev above `threshold_factor * base` means motion
    pub threshold_factor: f64,
    /// Single-sample deviation above `factor * base` means motion
    pub instantaneous_noise_level_factor: f64,
    /// Initialization fails when the base noise level exceeds this (m/s²)
    pub base_noise_level_absolute_threshold: f64,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            initial_static_samples: 50,
            window_size: 31,
            threshold_factor: 2.0,
            instantaneous_noise_level_factor: 3.0,
            base_noise_level_absolute_threshold: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Sensor {
    #[default]
    Flux,
    SpecificForce,
    AngularRate,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorCfg {
    /// Static runs shorter than this are skipped (0 disables skipping)
    pub min_static_samples: usize,
    /// Dynamic runs longer than this are flagged as skipped
    pub max_dynamic_samples: usize,
    /// Which triad the generator measures
    pub sensor: Sensor,
}

impl Default for GeneratorCfg {
    fn default() -> Self {
        Self {
            min_static_samples: 25,
            max_dynamic_samples: 500,
            sensor: Sensor::Flux,
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
    pub detector: DetectorCfg,
    pub generator: GeneratorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_samples_csv(path: &std::path::Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open sample CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    let with_gyro: Vec<&str> = BASE_HEADERS.iter().chain(GYRO_HEADERS.iter()).copied().collect();
    if actual != BASE_HEADERS && actual != with_gyro {
        eyre::bail!(
            "sample CSV must have headers '{}' (optionally followed by ',{}'), got: {}",
            BASE_HEADERS.join(","),
            GYRO_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows: Vec<SampleRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        let line = idx + 2;
        let row = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", line, e),
        };
        if row.values().iter().any(|v| !v.is_finite()) {
            eyre::bail!("non-finite value in CSV row {}", line);
        }
        if let Some(prev) = rows.last()
            && row.timestamp_s < prev.timestamp_s
        {
            eyre::bail!(
                "sample timestamps must be non-decreasing (row {} goes back in time)",
                line
            );
        }
        rows.push(row);
    }

    if rows.is_empty() {
        eyre::bail!("sample CSV {:?} contains no rows", path);
    }
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Detector
        if self.detector.initial_static_samples < 2 {
            eyre::bail!("detector.initial_static_samples must be >= 2");
        }
        if self.detector.window_size < 2 {
            eyre::bail!("detector.window_size must be >= 2");
        }
        if !(self.detector.threshold_factor.is_finite() && self.detector.threshold_factor > 0.0) {
            eyre::bail!("detector.threshold_factor must be > 0");
        }
        if !(self.detector.instantaneous_noise_level_factor.is_finite()
            && self.detector.instantaneous_noise_level_factor > 0.0)
        {
            eyre::bail!("detector.instantaneous_noise_level_factor must be > 0");
        }
        if !(self.detector.base_noise_level_absolute_threshold.is_finite()
            && self.detector.base_noise_level_absolute_threshold > 0.0)
        {
            eyre::bail!("detector.base_noise_level_absolute_threshold must be > 0");
        }

        // Generator
        if self.generator.max_dynamic_samples == 0 {
            eyre::bail!("generator.max_dynamic_samples must be >= 1");
        }
        if self.generator.min_static_samples > 1_000_000 {
            eyre::bail!("generator.min_static_samples is unreasonably large (>1e6)");
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
    fn empty_toml_uses_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.detector.initial_static_samples, 50);
        assert_eq!(cfg.detector.window_size, 31);
        assert_eq!(cfg.generator.min_static_samples, 25);
        assert_eq!(cfg.generator.sensor, Sensor::Flux);
        cfg.validate().unwrap();
    }

    #[test]
    fn sensor_names_are_kebab_case() {
        let cfg = load_toml("[generator]\nsensor = \"angular-rate\"\n").unwrap();
        assert_eq!(cfg.generator.sensor, Sensor::AngularRate);
        let cfg = load_toml("[generator]\nsensor = \"specific-force\"\n").unwrap();
        assert_eq!(cfg.generator.sensor, Sensor::SpecificForce);
        assert!(load_toml("[generator]\nsensor = \"barometer\"\n").is_err());
    }
}
