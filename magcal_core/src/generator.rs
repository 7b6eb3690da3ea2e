//! Per-sample driver of the measurement generator.
//!
//! For each sample the driver:
//! 1. feeds the motion triad to the classifier
//! 2. dispatches the resulting lifecycle event (if any) to the sensor handler,
//!    delivering a measurement to the listener on static→dynamic boundaries
//! 3. updates the static/dynamic run counters behind the skip policy
//! 4. lets the handler ingest the sample under the status just reported
//!
//! All mutating operations check the `running` flag first and fail with
//! `GeneratorError::Busy` while a sample is mid-processing.

use magcal_traits::{GeneratorStatus, IntervalClassifier, IntervalEvent, Sample, Triad};

use crate::boundary::{Boundary, map_boundary_error};
use crate::builder::{GeneratorBuilder, Missing};
use crate::config::GeneratorCfg;
use crate::error::{GeneratorError, Report, Result};
use crate::extractor::motion_triad;
use crate::handler::{SensorHandler, TransitionHandler};
use crate::listener::MeasurementListener;
use crate::types::{Measurement, SensorKind};

pub struct MeasurementGenerator {
    classifier: Box<dyn IntervalClassifier>,
    handler: SensorHandler,
    listener: Option<Box<dyn MeasurementListener>>,
    cfg: GeneratorCfg,
    running: bool,
    // Samples in the current static run (initializing or static status)
    static_run_samples: usize,
    // Samples in the current dynamic run
    dynamic_run_samples: usize,
    processed: u64,
    emitted: u64,
    skipped_static: u64,
}

impl core::fmt::Debug for MeasurementGenerator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MeasurementGenerator")
            .field("sensor", &self.handler.kind())
            .field("status", &self.classifier.status())
            .field("running", &self.running)
            .field("static_run_samples", &self.static_run_samples)
            .field("dynamic_run_samples", &self.dynamic_run_samples)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl MeasurementGenerator {
    /// Start building a generator.
    pub fn builder() -> GeneratorBuilder<Missing> {
        GeneratorBuilder::default()
    }

    pub(crate) fn from_parts(
        classifier: Box<dyn IntervalClassifier>,
        handler: SensorHandler,
        listener: Option<Box<dyn MeasurementListener>>,
        cfg: GeneratorCfg,
    ) -> Self {
        Self {
            classifier,
            handler,
            listener,
            cfg,
            running: false,
            static_run_samples: 0,
            dynamic_run_samples: 0,
            processed: 0,
            emitted: 0,
            skipped_static: 0,
        }
    }

    /// Process one sample, returning the status the classifier reported for it.
    ///
    /// Fails with `Busy` when called from inside a listener callback.
    pub fn process(&mut self, sample: &Sample) -> Result<GeneratorStatus> {
        self.enter()?;
        let res = self.process_inner(sample);
        self.running = false;
        res
    }

    fn process_inner(&mut self, sample: &Sample) -> Result<GeneratorStatus> {
        let event = self
            .classifier
            .process(motion_triad(sample))
            .map_err(|e| Report::new(map_boundary_error(Boundary::Classifier, &*e)))?;
        let status = self.classifier.status();
        self.processed = self.processed.saturating_add(1);
        tracing::trace!(
            t = sample.timestamp_s,
            status = status.as_str(),
            "sample classified"
        );

        let init_failed = matches!(event, Some(IntervalEvent::InitializationFailed { .. }));
        if let Some(ev) = event {
            self.dispatch(ev);
        }

        if status.is_accumulating() {
            self.static_run_samples = self.static_run_samples.saturating_add(1);
        } else {
            self.static_run_samples = 0;
        }
        if status == GeneratorStatus::DynamicInterval {
            self.dynamic_run_samples = self.dynamic_run_samples.saturating_add(1);
        } else {
            self.dynamic_run_samples = 0;
        }

        match self.handler.ingest(sample, status) {
            // The failed-initialization hook already swallowed a reset error;
            // its retry during ingestion gets the same treatment.
            Err(e) if init_failed => {
                tracing::debug!(error = %e, "ignoring accumulator reset failure");
            }
            res => res?,
        }
        Ok(status)
    }

    fn dispatch(&mut self, event: IntervalEvent) {
        match event {
            IntervalEvent::InitializationCompleted { base_noise_level } => {
                self.handler.on_initialization_completed();
                tracing::debug!(
                    base_noise_level,
                    noise_floor = self.handler.noise_floor(),
                    "initialization completed"
                );
            }
            IntervalEvent::InitializationFailed { base_noise_level } => {
                self.handler.on_initialization_failed();
                tracing::warn!(base_noise_level, "initialization failed");
            }
            IntervalEvent::StaticIntervalDetected => {
                if self.is_dynamic_interval_skipped() {
                    tracing::debug!(
                        samples = self.dynamic_run_samples,
                        max = self.cfg.max_dynamic_samples,
                        "dynamic interval too long; flagged skipped"
                    );
                }
                self.handler.on_dynamic_to_static();
            }
            IntervalEvent::DynamicIntervalDetected { stats } => {
                let skipped = self.is_static_interval_skipped();
                match self.handler.on_static_to_dynamic(&stats, skipped) {
                    Some(m) => self.deliver(m),
                    None => {
                        self.skipped_static = self.skipped_static.saturating_add(1);
                        tracing::debug!(
                            samples = self.static_run_samples,
                            min = self.cfg.min_static_samples,
                            "static interval skipped"
                        );
                    }
                }
            }
        }
    }

    fn deliver(&mut self, m: Measurement) {
        self.emitted = self.emitted.saturating_add(1);
        tracing::debug!(
            kind = m.kind.as_str(),
            x = m.triad.x,
            y = m.triad.y,
            z = m.triad.z,
            std_dev = m.std_dev,
            samples = m.samples,
            "measurement generated"
        );
        // Listener is taken out for the call so it can receive `&mut self`;
        // the running flag keeps it from replacing itself meanwhile.
        if let Some(mut listener) = self.listener.take() {
            listener.on_measurement_generated(self, &m);
            self.listener = Some(listener);
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.running {
            return Err(Report::new(GeneratorError::Busy));
        }
        self.running = true;
        Ok(())
    }

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter()?;
        let res = f(self);
        self.running = false;
        res
    }

    /// Full reset: accumulator, running average, noise floor, classifier and
    /// the static/dynamic run lengths.
    ///
    /// The lifetime totals (`processed_samples`, `emitted_measurements`,
    /// `skipped_static_intervals`) are kept. A failed accumulator reset leaves
    /// every piece of state untouched.
    pub fn reset(&mut self) -> Result<()> {
        self.guarded(|g| {
            g.handler.reset()?;
            g.classifier.reset();
            g.static_run_samples = 0;
            g.dynamic_run_samples = 0;
            tracing::debug!("generator reset");
            Ok(())
        })
    }

    pub fn set_listener(&mut self, listener: Box<dyn MeasurementListener>) -> Result<()> {
        self.guarded(|g| {
            g.listener = Some(listener);
            Ok(())
        })
    }

    pub fn clear_listener(&mut self) -> Result<()> {
        self.guarded(|g| {
            g.listener = None;
            Ok(())
        })
    }

    pub fn set_min_static_samples(&mut self, n: usize) -> Result<()> {
        self.guarded(|g| {
            g.cfg.min_static_samples = n;
            Ok(())
        })
    }

    pub fn set_max_dynamic_samples(&mut self, n: usize) -> Result<()> {
        self.guarded(|g| {
            if n == 0 {
                return Err(Report::new(GeneratorError::InvalidSetting(
                    "max_dynamic_samples must be >= 1",
                )));
            }
            g.cfg.max_dynamic_samples = n;
            Ok(())
        })
    }

    pub fn status(&self) -> GeneratorStatus {
        self.classifier.status()
    }

    /// True while a sample is mid-processing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current static run holds fewer than `min_static_samples` samples.
    pub fn is_static_interval_skipped(&self) -> bool {
        self.static_run_samples < self.cfg.min_static_samples
    }

    /// Current dynamic run holds more than `max_dynamic_samples` samples.
    pub fn is_dynamic_interval_skipped(&self) -> bool {
        self.dynamic_run_samples > self.cfg.max_dynamic_samples
    }

    pub fn running_average(&self) -> Triad {
        self.handler.running_average()
    }

    pub fn noise_floor(&self) -> f64 {
        self.handler.noise_floor()
    }

    /// Samples currently held by the accumulator.
    pub fn accumulated_samples(&self) -> usize {
        self.handler.accumulated_samples()
    }

    pub fn base_noise_level(&self) -> f64 {
        self.classifier.base_noise_level()
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.handler.kind()
    }

    pub fn cfg(&self) -> &GeneratorCfg {
        &self.cfg
    }

    pub fn static_run_samples(&self) -> usize {
        self.static_run_samples
    }

    pub fn dynamic_run_samples(&self) -> usize {
        self.dynamic_run_samples
    }

    pub fn processed_samples(&self) -> u64 {
        self.processed
    }

    pub fn emitted_measurements(&self) -> u64 {
        self.emitted
    }

    pub fn skipped_static_intervals(&self) -> u64 {
        self.skipped_static
    }
}
