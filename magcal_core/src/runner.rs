use magcal_traits::{GeneratorStatus, Sample, SampleSource};

use crate::boundary::{Boundary, map_boundary_error};
use crate::error::{GeneratorError, Report, Result as CoreResult};
use crate::generator::MeasurementGenerator;

/// Outcome of driving a generator over a whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed_samples: u64,
    pub emitted_measurements: u64,
    pub skipped_static_intervals: u64,
    pub final_status: GeneratorStatus,
}

struct Baseline {
    processed: u64,
    emitted: u64,
    skipped: u64,
}

impl Baseline {
    fn of(g: &MeasurementGenerator) -> Self {
        Self {
            processed: g.processed_samples(),
            emitted: g.emitted_measurements(),
            skipped: g.skipped_static_intervals(),
        }
    }

    fn summary(&self, g: &MeasurementGenerator) -> RunSummary {
        RunSummary {
            processed_samples: g.processed_samples().saturating_sub(self.processed),
            emitted_measurements: g.emitted_measurements().saturating_sub(self.emitted),
            skipped_static_intervals: g.skipped_static_intervals().saturating_sub(self.skipped),
            final_status: g.status(),
        }
    }
}

/// Feed one sample; stops the run with a typed error once initialization failed.
fn step(generator: &mut MeasurementGenerator, sample: &Sample) -> CoreResult<()> {
    match generator.process(sample)? {
        GeneratorStatus::Failed => {
            let base = generator.base_noise_level();
            tracing::error!(base_noise_level = base, "run aborted: initialization failed");
            Err(Report::new(GeneratorError::InitializationFailed {
                base_noise_level: base,
            }))
        }
        _ => Ok(()),
    }
}

/// Drive `source` to exhaustion through `generator`.
pub fn run<S>(source: &mut S, generator: &mut MeasurementGenerator) -> CoreResult<RunSummary>
where
    S: SampleSource + ?Sized,
{
    let base = Baseline::of(generator);
    tracing::info!(sensor = generator.sensor_kind().as_str(), "run start");
    loop {
        let next = source
            .next_sample()
            .map_err(|e| Report::new(map_boundary_error(Boundary::Source, &*e)))?;
        match next {
            Some(sample) => step(generator, &sample)?,
            None => break,
        }
    }
    let summary = base.summary(generator);
    tracing::info!(
        processed = summary.processed_samples,
        emitted = summary.emitted_measurements,
        skipped = summary.skipped_static_intervals,
        status = summary.final_status.as_str(),
        "run complete"
    );
    Ok(summary)
}

/// Same as [`run`] for an in-memory sample sequence.
pub fn run_samples<I>(samples: I, generator: &mut MeasurementGenerator) -> CoreResult<RunSummary>
where
    I: IntoIterator<Item = Sample>,
{
    let base = Baseline::of(generator);
    tracing::info!(sensor = generator.sensor_kind().as_str(), "run start");
    for sample in samples {
        step(generator, &sample)?;
    }
    let summary = base.summary(generator);
    tracing::info!(
        processed = summary.processed_samples,
        emitted = summary.emitted_measurements,
        skipped = summary.skipped_static_intervals,
        status = summary.final_status.as_str(),
        "run complete"
    );
    Ok(summary)
}
