//! Test and helper mocks for magcal_core

use std::collections::VecDeque;

use magcal_traits::{
    GeneratorStatus, IntervalClassifier, IntervalEvent, IntervalStats, NoiseAccumulator, Triad,
};

use crate::accumulator::RunningTriadStats;

/// Classifier that replays a fixed status/event script, ignoring its input.
///
/// Once the script is exhausted the last status repeats without events.
/// `reset()` rewinds to the start of the script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClassifier {
    script: Vec<(GeneratorStatus, Option<IntervalEvent>)>,
    pos: usize,
    status: GeneratorStatus,
    base_noise_level: f64,
    resets: usize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, status: GeneratorStatus, event: Option<IntervalEvent>, n: usize) -> Self {
        for i in 0..n {
            self.script.push((status, if i == 0 { event } else { None }));
        }
        self
    }

    /// `n` samples of initialization, completing on the last one.
    pub fn init_completed(self, n: usize, base_noise_level: f64) -> Self {
        let this = self.push(GeneratorStatus::Initializing, None, n.saturating_sub(1));
        this.push(
            GeneratorStatus::StaticInterval,
            Some(IntervalEvent::InitializationCompleted { base_noise_level }),
            1,
        )
    }

    /// `n` samples of initialization, failing on the last one.
    pub fn init_failed(self, n: usize, base_noise_level: f64) -> Self {
        let this = self.push(GeneratorStatus::Initializing, None, n.saturating_sub(1));
        this.push(
            GeneratorStatus::Failed,
            Some(IntervalEvent::InitializationFailed { base_noise_level }),
            1,
        )
    }

    /// `n` further static samples without events.
    pub fn static_run(self, n: usize) -> Self {
        self.push(GeneratorStatus::StaticInterval, None, n)
    }

    /// Static→dynamic transition followed by `n - 1` further dynamic samples.
    pub fn enter_dynamic(self, n: usize) -> Self {
        self.enter_dynamic_with(n, IntervalStats::default())
    }

    pub fn enter_dynamic_with(self, n: usize, stats: IntervalStats) -> Self {
        self.push(
            GeneratorStatus::DynamicInterval,
            Some(IntervalEvent::DynamicIntervalDetected { stats }),
            n,
        )
    }

    /// Dynamic→static transition followed by `n - 1` further static samples.
    pub fn enter_static(self, n: usize) -> Self {
        self.push(
            GeneratorStatus::StaticInterval,
            Some(IntervalEvent::StaticIntervalDetected),
            n,
        )
    }

    pub fn failed(self, n: usize) -> Self {
        self.push(GeneratorStatus::Failed, None, n)
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl IntervalClassifier for ScriptedClassifier {
    fn process(
        &mut self,
        _triad: Triad,
    ) -> Result<Option<IntervalEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(&(status, event)) = self.script.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        self.status = status;
        if let Some(
            IntervalEvent::InitializationCompleted { base_noise_level }
            | IntervalEvent::InitializationFailed { base_noise_level },
        ) = event
        {
            self.base_noise_level = base_noise_level;
        }
        Ok(event)
    }

    fn status(&self) -> GeneratorStatus {
        self.status
    }

    fn base_noise_level(&self) -> f64 {
        self.base_noise_level
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.status = GeneratorStatus::Idle;
        self.base_noise_level = 0.0;
        self.resets += 1;
    }
}

/// Classifier whose `process` always errors with the given message.
#[derive(Debug, Clone)]
pub struct FailingClassifier(pub &'static str);

impl IntervalClassifier for FailingClassifier {
    fn process(
        &mut self,
        _triad: Triad,
    ) -> Result<Option<IntervalEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Err(self.0.into())
    }

    fn status(&self) -> GeneratorStatus {
        GeneratorStatus::Idle
    }

    fn base_noise_level(&self) -> f64 {
        0.0
    }

    fn reset(&mut self) {}
}

/// Accumulator whose first `n` resets fail; statistics otherwise behave like
/// `RunningTriadStats`. A failed reset leaves the statistics untouched.
#[derive(Debug, Clone, Default)]
pub struct FailingAccumulator {
    inner: RunningTriadStats,
    failures_left: usize,
    reset_calls: usize,
}

impl FailingAccumulator {
    pub fn failing_resets(n: usize) -> Self {
        Self {
            inner: RunningTriadStats::new(),
            failures_left: n,
            reset_calls: 0,
        }
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls
    }
}

impl NoiseAccumulator for FailingAccumulator {
    fn add_sample(&mut self, triad: Triad) {
        self.inner.push(triad);
    }

    fn reset(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.reset_calls += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err("accumulator storage unavailable".into());
        }
        self.inner.clear();
        Ok(())
    }

    fn average(&self) -> Triad {
        self.inner.mean()
    }

    fn standard_deviation_norm(&self) -> f64 {
        self.inner.std_dev_norm()
    }

    fn count(&self) -> usize {
        self.inner.len()
    }
}

/// In-memory `SampleSource` over a queue of samples.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    samples: VecDeque<magcal_traits::Sample>,
}

impl VecSource {
    pub fn new(samples: impl IntoIterator<Item = magcal_traits::Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl magcal_traits::SampleSource for VecSource {
    fn next_sample(
        &mut self,
    ) -> Result<Option<magcal_traits::Sample>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.samples.pop_front())
    }
}
