pub mod types;

pub use types::{GeneratorStatus, IntervalEvent, IntervalStats, Sample, Triad};

/// Decides static/dynamic status from the motion triad of each sample.
pub trait IntervalClassifier {
    fn process(
        &mut self,
        triad: Triad,
    ) -> Result<Option<IntervalEvent>, Box<dyn std::error::Error + Send + Sync>>;
    fn status(&self) -> GeneratorStatus;
    /// Base noise level estimated during initialization (0 before it completes).
    fn base_noise_level(&self) -> f64;
    fn reset(&mut self);
}

/// Running mean / standard deviation of a triad.
pub trait NoiseAccumulator {
    fn add_sample(&mut self, triad: Triad);
    fn reset(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn average(&self) -> Triad;
    fn standard_deviation_norm(&self) -> f64;
    fn count(&self) -> usize;
}

/// Pull-based stream of time-ordered samples. `Ok(None)` ends the stream.
pub trait SampleSource {
    fn next_sample(&mut self) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>>;
}
