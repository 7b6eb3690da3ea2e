//! Reaction logic to classifier-driven lifecycle events.
//!
//! Every sensor variant implements [`TransitionHandler`]; the driver calls the
//! hooks in sample order and never branches on the variant itself.
//!
//! Hook order for one sample:
//! 1. at most one transition hook (`on_*`), fired by the classifier event
//! 2. `ingest`, with the status the classifier reported for this sample
//!
//! Because a transition hook runs before the sample is ingested, a
//! static→dynamic measurement sees exactly the static run that just ended.

use eyre::WrapErr;
use magcal_traits::{GeneratorStatus, IntervalStats, NoiseAccumulator, Sample, Triad};

use crate::accumulator::RunningTriadStats;
use crate::boundary::{Boundary, map_boundary_error};
use crate::error::Result;
use crate::extractor::SampleTriad;
use crate::types::{Measurement, SensorKind};

/// Capability set shared by all sensor variants.
pub trait TransitionHandler {
    fn kind(&self) -> SensorKind;

    /// Called once per sample after classification.
    fn ingest(&mut self, sample: &Sample, status: GeneratorStatus) -> Result<()>;

    /// End of a static run. Returns the measurement to deliver, if any.
    fn on_static_to_dynamic(
        &mut self,
        stats: &IntervalStats,
        skipped: bool,
    ) -> Option<Measurement>;

    /// Start of a new static run.
    fn on_dynamic_to_static(&mut self);

    fn on_initialization_completed(&mut self);

    /// Must not fail: the driver is already on a failure path.
    fn on_initialization_failed(&mut self);

    /// Clear accumulator, running average and noise floor.
    fn reset(&mut self) -> Result<()>;

    fn running_average(&self) -> Triad;
    fn noise_floor(&self) -> f64;
    fn accumulated_samples(&self) -> usize;
}

/// Bookkeeping of the current static run: accumulator, running average and
/// the noise floor frozen at initialization.
pub struct StaticRunAccumulator {
    accumulator: Box<dyn NoiseAccumulator>,
    running_average: Triad,
    noise_floor: f64,
}

impl std::fmt::Debug for StaticRunAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticRunAccumulator")
            .field("samples", &self.accumulator.count())
            .field("running_average", &self.running_average)
            .field("noise_floor", &self.noise_floor)
            .finish()
    }
}

impl Default for StaticRunAccumulator {
    fn default() -> Self {
        Self::new(Box::new(RunningTriadStats::new()))
    }
}

impl StaticRunAccumulator {
    pub fn new(accumulator: Box<dyn NoiseAccumulator>) -> Self {
        Self {
            accumulator,
            running_average: Triad::ZERO,
            noise_floor: 0.0,
        }
    }

    /// Accumulate while static/initializing, otherwise discard partial statistics.
    /// The running average keeps the last static run's value after a discard.
    pub fn ingest(&mut self, triad: Triad, status: GeneratorStatus) -> Result<()> {
        if status.is_accumulating() {
            self.accumulator.add_sample(triad);
            self.running_average = self.accumulator.average();
            Ok(())
        } else {
            self.reset_accumulator()
                .wrap_err("discarding static statistics")
        }
    }

    pub fn freeze_noise_floor(&mut self) {
        self.noise_floor = self.accumulator.standard_deviation_norm();
        tracing::debug!(
            noise_floor = self.noise_floor,
            samples = self.accumulator.count(),
            "noise floor frozen"
        );
    }

    /// Forced reset on a failure path; errors are logged and dropped.
    pub fn discard(&mut self) {
        if let Err(e) = self.reset_accumulator() {
            tracing::debug!(error = %e, "ignoring accumulator reset failure");
        }
    }

    /// Full reset of all three pieces of state.
    pub fn clear(&mut self) -> Result<()> {
        self.reset_accumulator().wrap_err("resetting accumulator")?;
        self.running_average = Triad::ZERO;
        self.noise_floor = 0.0;
        Ok(())
    }

    pub fn measurement(&self, kind: SensorKind) -> Measurement {
        Measurement {
            kind,
            triad: self.running_average,
            std_dev: self.noise_floor,
            samples: self.accumulator.count(),
        }
    }

    pub fn running_average(&self) -> Triad {
        self.running_average
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    pub fn samples(&self) -> usize {
        self.accumulator.count()
    }

    fn reset_accumulator(&mut self) -> Result<()> {
        self.accumulator
            .reset()
            .map_err(|e| eyre::Report::new(map_boundary_error(Boundary::Accumulator, &*e)))
    }
}

/// Averaged magnetic flux density per static run, stamped with the noise floor.
#[derive(Debug, Default)]
pub struct FluxDensityHandler {
    run: StaticRunAccumulator,
}

impl FluxDensityHandler {
    pub fn new(accumulator: Box<dyn NoiseAccumulator>) -> Self {
        Self {
            run: StaticRunAccumulator::new(accumulator),
        }
    }
}

impl TransitionHandler for FluxDensityHandler {
    fn kind(&self) -> SensorKind {
        SensorKind::FluxDensity
    }

    fn ingest(&mut self, sample: &Sample, status: GeneratorStatus) -> Result<()> {
        self.run
            .ingest(SampleTriad::FluxDensity.extract(sample), status)
    }

    fn on_static_to_dynamic(
        &mut self,
        _stats: &IntervalStats,
        skipped: bool,
    ) -> Option<Measurement> {
        if skipped {
            return None;
        }
        Some(self.run.measurement(SensorKind::FluxDensity))
    }

    fn on_dynamic_to_static(&mut self) {}

    fn on_initialization_completed(&mut self) {
        self.run.freeze_noise_floor();
    }

    fn on_initialization_failed(&mut self) {
        self.run.discard();
    }

    fn reset(&mut self) -> Result<()> {
        self.run.clear()
    }

    fn running_average(&self) -> Triad {
        self.run.running_average()
    }

    fn noise_floor(&self) -> f64 {
        self.run.noise_floor()
    }

    fn accumulated_samples(&self) -> usize {
        self.run.samples()
    }
}

/// Averaged angular rate per static run (gyroscope bias estimates).
#[derive(Debug, Default)]
pub struct AngularRateHandler {
    run: StaticRunAccumulator,
}

impl AngularRateHandler {
    pub fn new(accumulator: Box<dyn NoiseAccumulator>) -> Self {
        Self {
            run: StaticRunAccumulator::new(accumulator),
        }
    }
}

impl TransitionHandler for AngularRateHandler {
    fn kind(&self) -> SensorKind {
        SensorKind::AngularRate
    }

    fn ingest(&mut self, sample: &Sample, status: GeneratorStatus) -> Result<()> {
        self.run
            .ingest(SampleTriad::AngularRate.extract(sample), status)
    }

    fn on_static_to_dynamic(
        &mut self,
        _stats: &IntervalStats,
        skipped: bool,
    ) -> Option<Measurement> {
        (!skipped).then(|| self.run.measurement(SensorKind::AngularRate))
    }

    fn on_dynamic_to_static(&mut self) {}

    fn on_initialization_completed(&mut self) {
        self.run.freeze_noise_floor();
    }

    fn on_initialization_failed(&mut self) {
        self.run.discard();
    }

    fn reset(&mut self) -> Result<()> {
        self.run.clear()
    }

    fn running_average(&self) -> Triad {
        self.run.running_average()
    }

    fn noise_floor(&self) -> f64 {
        self.run.noise_floor()
    }

    fn accumulated_samples(&self) -> usize {
        self.run.samples()
    }
}

/// Specific force per static run, taken from the classifier's own interval
/// statistics. The std-dev is the norm of the per-axis interval std-dev.
#[derive(Debug, Default)]
pub struct SpecificForceHandler {
    run: StaticRunAccumulator,
}

impl SpecificForceHandler {
    pub fn new(accumulator: Box<dyn NoiseAccumulator>) -> Self {
        Self {
            run: StaticRunAccumulator::new(accumulator),
        }
    }
}

impl TransitionHandler for SpecificForceHandler {
    fn kind(&self) -> SensorKind {
        SensorKind::SpecificForce
    }

    fn ingest(&mut self, sample: &Sample, status: GeneratorStatus) -> Result<()> {
        self.run
            .ingest(SampleTriad::SpecificForce.extract(sample), status)
    }

    fn on_static_to_dynamic(
        &mut self,
        stats: &IntervalStats,
        skipped: bool,
    ) -> Option<Measurement> {
        if skipped {
            return None;
        }
        Some(Measurement {
            kind: SensorKind::SpecificForce,
            triad: stats.mean,
            std_dev: stats.std_dev.norm(),
            samples: stats.samples,
        })
    }

    fn on_dynamic_to_static(&mut self) {}

    fn on_initialization_completed(&mut self) {
        self.run.freeze_noise_floor();
    }

    fn on_initialization_failed(&mut self) {
        self.run.discard();
    }

    fn reset(&mut self) -> Result<()> {
        self.run.clear()
    }

    fn running_average(&self) -> Triad {
        self.run.running_average()
    }

    fn noise_floor(&self) -> f64 {
        self.run.noise_floor()
    }

    fn accumulated_samples(&self) -> usize {
        self.run.samples()
    }
}

/// Closed set of sensor variants, selected at construction.
#[derive(Debug)]
pub enum SensorHandler {
    FluxDensity(FluxDensityHandler),
    SpecificForce(SpecificForceHandler),
    AngularRate(AngularRateHandler),
}

impl SensorHandler {
    pub fn new(kind: SensorKind, accumulator: Box<dyn NoiseAccumulator>) -> Self {
        match kind {
            SensorKind::FluxDensity => Self::FluxDensity(FluxDensityHandler::new(accumulator)),
            SensorKind::SpecificForce => {
                Self::SpecificForce(SpecificForceHandler::new(accumulator))
            }
            SensorKind::AngularRate => Self::AngularRate(AngularRateHandler::new(accumulator)),
        }
    }

    fn inner(&self) -> &dyn TransitionHandler {
        match self {
            Self::FluxDensity(h) => h,
            Self::SpecificForce(h) => h,
            Self::AngularRate(h) => h,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TransitionHandler {
        match self {
            Self::FluxDensity(h) => h,
            Self::SpecificForce(h) => h,
            Self::AngularRate(h) => h,
        }
    }
}

impl TransitionHandler for SensorHandler {
    fn kind(&self) -> SensorKind {
        self.inner().kind()
    }

    fn ingest(&mut self, sample: &Sample, status: GeneratorStatus) -> Result<()> {
        self.inner_mut().ingest(sample, status)
    }

    fn on_static_to_dynamic(
        &mut self,
        stats: &IntervalStats,
        skipped: bool,
    ) -> Option<Measurement> {
        self.inner_mut().on_static_to_dynamic(stats, skipped)
    }

    fn on_dynamic_to_static(&mut self) {
        self.inner_mut().on_dynamic_to_static();
    }

    fn on_initialization_completed(&mut self) {
        self.inner_mut().on_initialization_completed();
    }

    fn on_initialization_failed(&mut self) {
        self.inner_mut().on_initialization_failed();
    }

    fn reset(&mut self) -> Result<()> {
        self.inner_mut().reset()
    }

    fn running_average(&self) -> Triad {
        self.inner().running_average()
    }

    fn noise_floor(&self) -> f64 {
        self.inner().noise_floor()
    }

    fn accumulated_samples(&self) -> usize {
        self.inner().accumulated_samples()
    }
}
