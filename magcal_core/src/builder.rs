//! Type-state builder for `MeasurementGenerator`.
//!
//! The builder enforces at compile time that a sensor kind is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use magcal_traits::{IntervalClassifier, NoiseAccumulator};

use crate::accumulator::RunningTriadStats;
use crate::config::{DetectorCfg, GeneratorCfg};
use crate::detector::StaticIntervalDetector;
use crate::error::{BuildError, Report, Result};
use crate::generator::MeasurementGenerator;
use crate::handler::SensorHandler;
use crate::listener::MeasurementListener;
use crate::types::SensorKind;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `MeasurementGenerator`. All fields are validated on `build()`.
///
/// Defaults when not supplied:
/// - classifier: `StaticIntervalDetector` over `with_detector_cfg` (or its defaults)
/// - accumulator: `RunningTriadStats`
/// - generator config: `GeneratorCfg::default()`
/// - listener: none
pub struct GeneratorBuilder<K> {
    sensor: Option<SensorKind>,
    classifier: Option<Box<dyn IntervalClassifier>>,
    detector: Option<DetectorCfg>,
    accumulator: Option<Box<dyn NoiseAccumulator>>,
    generator: Option<GeneratorCfg>,
    listener: Option<Box<dyn MeasurementListener>>,
    _k: PhantomData<K>,
}

impl Default for GeneratorBuilder<Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            classifier: None,
            detector: None,
            accumulator: None,
            generator: None,
            listener: None,
            _k: PhantomData,
        }
    }
}

impl<K> GeneratorBuilder<K> {
    /// Select the sensor triad the generator measures.
    pub fn with_sensor(self, kind: SensorKind) -> GeneratorBuilder<Set> {
        GeneratorBuilder {
            sensor: Some(kind),
            classifier: self.classifier,
            detector: self.detector,
            accumulator: self.accumulator,
            generator: self.generator,
            listener: self.listener,
            _k: PhantomData,
        }
    }

    /// Use a custom classifier instead of the built-in detector.
    pub fn with_classifier(mut self, classifier: Box<dyn IntervalClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Tune the built-in detector. Ignored when a custom classifier is set.
    pub fn with_detector_cfg(mut self, cfg: DetectorCfg) -> Self {
        self.detector = Some(cfg);
        self
    }

    pub fn with_accumulator(mut self, accumulator: Box<dyn NoiseAccumulator>) -> Self {
        self.accumulator = Some(accumulator);
        self
    }

    pub fn with_generator_cfg(mut self, cfg: GeneratorCfg) -> Self {
        self.generator = Some(cfg);
        self
    }

    pub fn with_listener(mut self, listener: Box<dyn MeasurementListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Validate and build; available in any type state.
    pub fn try_build(self) -> Result<MeasurementGenerator> {
        let kind = self
            .sensor
            .ok_or_else(|| Report::new(BuildError::MissingSensor))?;

        let generator = self.generator.unwrap_or_default();
        if generator.max_dynamic_samples == 0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "max_dynamic_samples must be >= 1",
            )));
        }

        let classifier: Box<dyn IntervalClassifier> = match (self.classifier, self.detector) {
            (Some(c), detector) => {
                if detector.is_some() {
                    tracing::debug!("custom classifier supplied; detector config ignored");
                }
                c
            }
            (None, detector) => {
                let cfg = detector.unwrap_or_default();
                cfg.check()
                    .map_err(|msg| Report::new(BuildError::InvalidConfig(msg)))?;
                Box::new(StaticIntervalDetector::new(cfg))
            }
        };

        let accumulator = self
            .accumulator
            .unwrap_or_else(|| Box::new(RunningTriadStats::new()));

        tracing::debug!(
            sensor = kind.as_str(),
            min_static_samples = generator.min_static_samples,
            max_dynamic_samples = generator.max_dynamic_samples,
            "generator built"
        );
        Ok(MeasurementGenerator::from_parts(
            classifier,
            SensorHandler::new(kind, accumulator),
            self.listener,
            generator,
        ))
    }
}

impl GeneratorBuilder<Set> {
    /// Build once the sensor kind is known.
    pub fn build(self) -> Result<MeasurementGenerator> {
        self.try_build()
    }
}
