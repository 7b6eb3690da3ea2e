use magcal_core::mocks::{ScriptedClassifier, VecSource};
use magcal_core::{
    GeneratorCfg, GeneratorError, GeneratorStatus, MeasurementGenerator, Sample, SensorKind,
    Triad, run,
};

struct BrokenSource {
    left: usize,
}

impl magcal_traits::SampleSource for BrokenSource {
    fn next_sample(
        &mut self,
    ) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>> {
        if self.left == 0 {
            return Err("serial link dropped".into());
        }
        self.left -= 1;
        Ok(Some(Sample::default()))
    }
}

fn samples(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            Sample::new(
                i as f64 * 0.01,
                Triad::new(0.0, 0.0, -9.81),
                Triad::new(2e-5, 0.0, -4e-5),
            )
        })
        .collect()
}

fn scripted(script: ScriptedClassifier) -> MeasurementGenerator {
    MeasurementGenerator::builder()
        .with_sensor(SensorKind::FluxDensity)
        .with_classifier(Box::new(script))
        .with_generator_cfg(GeneratorCfg {
            min_static_samples: 3,
            ..GeneratorCfg::default()
        })
        .build()
        .unwrap()
}

#[test]
fn run_drains_source_and_summarizes() {
    let script = ScriptedClassifier::new()
        .init_completed(5, 0.01)
        .enter_dynamic(3)
        .enter_static(2)
        .enter_dynamic(2)
        .enter_static(4)
        .enter_dynamic(1);
    let mut g = scripted(script);
    let mut source = VecSource::new(samples(17));

    let summary = run(&mut source, &mut g).unwrap();
    assert_eq!(summary.processed_samples, 17);
    assert_eq!(summary.emitted_measurements, 2);
    assert_eq!(summary.skipped_static_intervals, 1);
    assert_eq!(summary.final_status, GeneratorStatus::DynamicInterval);
}

#[test]
fn run_stops_on_initialization_failure() {
    let script = ScriptedClassifier::new().init_failed(4, 2.5).failed(10);
    let mut g = scripted(script);
    let mut source = VecSource::new(samples(14));

    let err = run(&mut source, &mut g).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GeneratorError>(),
        Some(&GeneratorError::InitializationFailed {
            base_noise_level: 2.5
        })
    );
    assert_eq!(g.processed_samples(), 4);
}

#[test]
fn source_errors_are_typed() {
    let script = ScriptedClassifier::new().init_completed(2, 0.01);
    let mut g = scripted(script);
    let mut source = BrokenSource { left: 3 };

    let err = run(&mut source, &mut g).unwrap_err();
    match err.downcast_ref::<GeneratorError>() {
        Some(GeneratorError::Source(msg)) => assert!(msg.contains("serial link")),
        other => panic!("expected Source error, got {other:?}"),
    }
    assert_eq!(g.processed_samples(), 3);
}

#[test]
fn summaries_are_per_run() {
    let script = ScriptedClassifier::new()
        .init_completed(4, 0.01)
        .enter_dynamic(2)
        .enter_static(4)
        .enter_dynamic(1);
    let mut g = scripted(script);

    let first = magcal_core::run_samples(samples(6), &mut g).unwrap();
    assert_eq!(first.emitted_measurements, 1);
    let second = magcal_core::run_samples(samples(5), &mut g).unwrap();
    assert_eq!(second.processed_samples, 5);
    assert_eq!(second.emitted_measurements, 1);
    assert_eq!(g.emitted_measurements(), 2);
}
