//! Conversions bridging `magcal_config` types to `magcal_core` types.
//!
//! `Sample` and `SampleRow` both live outside this crate, so rows go through
//! [`sample_from_row`] instead of a `From` impl.

use magcal_traits::{Sample, Triad};

use crate::config::{DetectorCfg, GeneratorCfg};
use crate::types::SensorKind;

// ── DetectorCfg ──────────────────────────────────────────────────────────────

impl From<&magcal_config::DetectorCfg> for DetectorCfg {
    fn from(c: &magcal_config::DetectorCfg) -> Self {
        Self {
            initial_static_samples: c.initial_static_samples,
            window_size: c.window_size,
            threshold_factor: c.threshold_factor,
            instantaneous_noise_level_factor: c.instantaneous_noise_level_factor,
            base_noise_level_absolute_threshold: c.base_noise_level_absolute_threshold,
        }
    }
}

// ── GeneratorCfg ─────────────────────────────────────────────────────────────

impl From<&magcal_config::GeneratorCfg> for GeneratorCfg {
    fn from(c: &magcal_config::GeneratorCfg) -> Self {
        Self {
            min_static_samples: c.min_static_samples,
            max_dynamic_samples: c.max_dynamic_samples,
        }
    }
}

// ── SensorKind ───────────────────────────────────────────────────────────────

impl From<magcal_config::Sensor> for SensorKind {
    fn from(s: magcal_config::Sensor) -> Self {
        match s {
            magcal_config::Sensor::Flux => Self::FluxDensity,
            magcal_config::Sensor::SpecificForce => Self::SpecificForce,
            magcal_config::Sensor::AngularRate => Self::AngularRate,
        }
    }
}

// ── Sample ───────────────────────────────────────────────────────────────────

/// Rows without gyroscope columns map to a zero angular rate.
pub fn sample_from_row(r: &magcal_config::SampleRow) -> Sample {
    let gyro = Triad::new(
        r.wx.unwrap_or(0.0),
        r.wy.unwrap_or(0.0),
        r.wz.unwrap_or(0.0),
    );
    Sample::new(
        r.timestamp_s,
        Triad::new(r.fx, r.fy, r.fz),
        Triad::new(r.bx, r.by, r.bz),
    )
    .with_angular_rate(gyro)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_map_to_runtime_defaults() {
        let cfg = magcal_config::Config::default();
        assert_eq!(DetectorCfg::from(&cfg.detector), DetectorCfg::default());
        assert_eq!(GeneratorCfg::from(&cfg.generator), GeneratorCfg::default());
        assert_eq!(SensorKind::from(cfg.generator.sensor), SensorKind::FluxDensity);
    }

    #[test]
    fn row_without_gyro_has_zero_angular_rate() {
        let row = magcal_config::SampleRow {
            timestamp_s: 0.5,
            fx: 0.0,
            fy: 0.1,
            fz: -9.8,
            bx: 2e-5,
            by: 0.0,
            bz: -4e-5,
            wx: None,
            wy: Some(0.01),
            wz: None,
        };
        let s = sample_from_row(&row);
        assert_eq!(s.timestamp_s, 0.5);
        assert_eq!(s.specific_force, Triad::new(0.0, 0.1, -9.8));
        assert_eq!(s.flux_density, Triad::new(2e-5, 0.0, -4e-5));
        assert_eq!(s.angular_rate, Triad::new(0.0, 0.01, 0.0));
    }
}
