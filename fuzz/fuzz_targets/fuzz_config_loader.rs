#![no_main]
use libfuzzer_sys::fuzz_target;
use magcal_core::{DetectorCfg, MeasurementGenerator, SensorKind};

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = magcal_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // Anything that validates must also build.
    let detector: DetectorCfg = (&cfg.detector).into();
    let built = MeasurementGenerator::builder()
        .with_sensor(SensorKind::from(cfg.generator.sensor))
        .with_detector_cfg(detector)
        .with_generator_cfg((&cfg.generator).into())
        .try_build();
    assert!(built.is_ok(), "validated config failed to build: {:?}", built.err());
});
