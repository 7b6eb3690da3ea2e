//! Runtime configuration types for the measurement generator.
//!
//! These are the structs consumed by `StaticIntervalDetector` and
//! `MeasurementGenerator`. They are separate from the TOML-deserialized
//! config in `magcal_config`.

/// Static/dynamic interval detector tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorCfg {
    /// Samples gathered before the base noise level is estimated.
    pub initial_static_samples: usize,
    /// Sliding window length used once initialization completed.
    pub window_size: usize,
    /// A window std-dev norm above `threshold_factor * base_noise_level` means motion.
    pub threshold_factor: f64,
    /// A single sample further than `instantaneous_noise_level_factor * base_noise_level`
    /// from the window mean means motion.
    pub instantaneous_noise_level_factor: f64,
    /// Initialization fails when the base noise level exceeds this value (m/s²).
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

impl DetectorCfg {
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if self.initial_static_samples < 2 {
            return Err("initial_static_samples must be >= 2");
        }
        if self.window_size < 2 {
            return Err("window_size must be >= 2");
        }
        if !(self.threshold_factor.is_finite() && self.threshold_factor > 0.0) {
            return Err("threshold_factor must be > 0");
        }
        if !(self.instantaneous_noise_level_factor.is_finite()
            && self.instantaneous_noise_level_factor > 0.0)
        {
            return Err("instantaneous_noise_level_factor must be > 0");
        }
        if !(self.base_noise_level_absolute_threshold.is_finite()
            && self.base_noise_level_absolute_threshold > 0.0)
        {
            return Err("base_noise_level_absolute_threshold must be > 0");
        }
        Ok(())
    }
}

/// Skip policy applied by the generator driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCfg {
    /// Static runs holding fewer samples than this are skipped. 0 never skips.
    pub min_static_samples: usize,
    /// Dynamic runs holding more samples than this are flagged as skipped.
    pub max_dynamic_samples: usize,
}

impl Default for GeneratorCfg {
    fn default() -> Self {
        Self {
            min_static_samples: 25,
            max_dynamic_samples: 500,
        }
    }
}
