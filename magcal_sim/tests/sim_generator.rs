use magcal_core::{
    ChannelListener, GeneratorStatus, Measurement, MeasurementGenerator, SensorKind, run,
};
use magcal_sim::{Phase, SimCfg, SimulatedImu};
use rstest::rstest;

fn run_sim(
    kind: SensorKind,
    sim: &mut SimulatedImu,
) -> (magcal_core::RunSummary, Vec<Measurement>) {
    let (listener, rx) = ChannelListener::unbounded();
    let mut g = MeasurementGenerator::builder()
        .with_sensor(kind)
        .with_listener(Box::new(listener))
        .build()
        .unwrap();
    let summary = run(sim, &mut g).unwrap();
    (summary, rx.try_iter().collect())
}

#[test]
fn one_flux_measurement_per_static_pose() {
    let mut sim = SimulatedImu::cycles(4, 150, 40, SimCfg::default()).unwrap();
    let expected: Vec<_> = (0..4).map(|k| sim.static_field(k)).collect();
    let total = sim.total_samples() as u64;

    let (summary, got) = run_sim(SensorKind::FluxDensity, &mut sim);
    assert_eq!(summary.processed_samples, total);
    assert_eq!(summary.emitted_measurements, 4);
    assert_eq!(summary.final_status, GeneratorStatus::DynamicInterval);
    assert_eq!(got.len(), 4);

    let floor = got[0].std_dev;
    assert!(floor > 0.0 && floor < 2e-7);
    for (m, field) in got.iter().zip(&expected) {
        assert_eq!(m.kind, SensorKind::FluxDensity);
        assert!((m.triad - *field).norm() < 5e-8, "{:?} vs {:?}", m.triad, field);
        assert_eq!(m.std_dev, floor);
        assert!(m.samples >= 100);
    }
}

#[test]
fn angular_rate_measurements_estimate_gyro_bias() {
    let cfg = SimCfg::default();
    let bias = cfg.gyro_bias;
    let mut sim = SimulatedImu::cycles(3, 150, 40, cfg).unwrap();
    let (_, got) = run_sim(SensorKind::AngularRate, &mut sim);
    assert_eq!(got.len(), 3);
    for m in got {
        assert!((m.triad - bias).norm() < 3e-4, "{:?}", m.triad);
    }
}

#[test]
fn specific_force_measurements_see_gravity() {
    let mut sim = SimulatedImu::cycles(3, 150, 40, SimCfg::default()).unwrap();
    let (_, got) = run_sim(SensorKind::SpecificForce, &mut sim);
    assert_eq!(got.len(), 3);
    for m in got {
        assert!((m.triad.norm() - 9.81).abs() < 0.01);
        assert!(m.std_dev < 0.02);
    }
}

#[rstest]
#[case::all_runs_too_short(200, 0, 4)]
#[case::all_runs_long_enough(25, 4, 0)]
fn skip_threshold_applies_to_simulated_runs(
    #[case] min_static: usize,
    #[case] emitted: u64,
    #[case] skipped: u64,
) {
    let mut sim = SimulatedImu::cycles(4, 150, 40, SimCfg::default()).unwrap();
    let mut g = MeasurementGenerator::builder()
        .with_sensor(SensorKind::FluxDensity)
        .build()
        .unwrap();
    g.set_min_static_samples(min_static).unwrap();
    let summary = run(&mut sim, &mut g).unwrap();
    assert_eq!(summary.emitted_measurements, emitted);
    assert_eq!(summary.skipped_static_intervals, skipped);
}

#[test]
fn trailing_static_phase_emits_nothing() {
    let script = vec![Phase::Static(150), Phase::Dynamic(40), Phase::Static(150)];
    let mut sim = SimulatedImu::new(script, SimCfg::default()).unwrap();
    let (summary, got) = run_sim(SensorKind::FluxDensity, &mut sim);
    assert_eq!(got.len(), 1);
    assert_eq!(summary.final_status, GeneratorStatus::StaticInterval);
}
