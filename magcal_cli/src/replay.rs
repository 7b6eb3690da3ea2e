//! Command execution: config mapping, source assembly, and generator runs.

use std::path::Path;

use eyre::WrapErr;
use magcal_config::Config;
use magcal_core::conversions::sample_from_row;
use magcal_core::{
    DetectorCfg, GeneratorCfg, Measurement, MeasurementGenerator, RunSummary, SensorKind,
};
use magcal_sim::{SimCfg, SimulatedImu};

use crate::cli::SensorArg;

/// Samples per phase for `self-check`; long enough for the default detector.
const SELF_CHECK_STATIC: usize = 150;
const SELF_CHECK_DYNAMIC: usize = 40;

fn measurement_line(m: &Measurement, json: bool) -> String {
    if json {
        serde_json::json!({
            "kind": m.kind.as_str(),
            "x": m.triad.x,
            "y": m.triad.y,
            "z": m.triad.z,
            "std_dev": m.std_dev,
            "samples": m.samples,
        })
        .to_string()
    } else {
        format!(
            "measurement kind={} x={:.6e} y={:.6e} z={:.6e} std_dev={:.3e} samples={}",
            m.kind.as_str(),
            m.triad.x,
            m.triad.y,
            m.triad.z,
            m.std_dev,
            m.samples
        )
    }
}

fn summary_line(s: &RunSummary, json: bool) -> String {
    if json {
        serde_json::json!({
            "summary": {
                "processed_samples": s.processed_samples,
                "emitted_measurements": s.emitted_measurements,
                "skipped_static_intervals": s.skipped_static_intervals,
                "final_status": s.final_status.as_str(),
            }
        })
        .to_string()
    } else {
        format!(
            "{} measurements from {} samples ({} static intervals skipped, final status {})",
            s.emitted_measurements,
            s.processed_samples,
            s.skipped_static_intervals,
            s.final_status.as_str()
        )
    }
}

/// Build a generator from the config; `sensor` overrides `generator.sensor`.
/// With `print` set, every measurement is written to stdout as it is emitted.
pub fn build_generator(
    cfg: &Config,
    sensor: Option<SensorArg>,
    json: bool,
    print: bool,
) -> eyre::Result<MeasurementGenerator> {
    // Builder/config mapping via the From impls in magcal_core::conversions
    let detector: DetectorCfg = (&cfg.detector).into();
    let generator: GeneratorCfg = (&cfg.generator).into();
    let kind: SensorKind = sensor.map_or_else(|| cfg.generator.sensor.into(), Into::into);

    let mut builder = MeasurementGenerator::builder()
        .with_sensor(kind)
        .with_detector_cfg(detector)
        .with_generator_cfg(generator);
    if print {
        builder = builder.with_listener(Box::new(
            move |_: &mut MeasurementGenerator, m: &Measurement| {
                println!("{}", measurement_line(m, json));
            },
        ));
    }
    builder.build()
}

pub fn run_replay(
    cfg: &Config,
    samples: &Path,
    sensor: Option<SensorArg>,
    json: bool,
) -> eyre::Result<RunSummary> {
    let rows = magcal_config::load_samples_csv(samples)?;
    tracing::info!(rows = rows.len(), path = %samples.display(), "samples loaded");
    let mut generator = build_generator(cfg, sensor, json, true)?;
    let summary = magcal_core::run_samples(rows.iter().map(sample_from_row), &mut generator)
        .wrap_err_with(|| format!("replaying {}", samples.display()))?;
    println!("{}", summary_line(&summary, json));
    Ok(summary)
}

pub fn run_simulate(
    cfg: &Config,
    cycles: usize,
    static_samples: usize,
    dynamic_samples: usize,
    sensor: Option<SensorArg>,
    seed: Option<u32>,
    json: bool,
) -> eyre::Result<RunSummary> {
    let defaults = SimCfg::default();
    let sim_cfg = SimCfg {
        seed: seed.unwrap_or(defaults.seed),
        ..defaults
    };
    let mut sim = SimulatedImu::cycles(cycles, static_samples, dynamic_samples, sim_cfg)?;
    tracing::info!(
        cycles,
        static_samples,
        dynamic_samples,
        total = sim.total_samples(),
        "simulation start"
    );
    let mut generator = build_generator(cfg, sensor, json, true)?;
    let summary = magcal_core::run(&mut sim, &mut generator).wrap_err("simulated session")?;
    println!("{}", summary_line(&summary, json));
    Ok(summary)
}

/// Build from config and run a short simulated session; at least one
/// measurement must come out.
pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let mut generator = build_generator(cfg, None, json, false)?;
    let static_samples = SELF_CHECK_STATIC
        .max(cfg.detector.initial_static_samples + cfg.generator.min_static_samples);
    let mut sim =
        SimulatedImu::cycles(2, static_samples, SELF_CHECK_DYNAMIC, SimCfg::default())?;
    let summary = magcal_core::run(&mut sim, &mut generator).wrap_err("self-check session")?;
    if summary.emitted_measurements == 0 {
        eyre::bail!(
            "self-check produced no measurements ({} samples, {} static intervals skipped)",
            summary.processed_samples,
            summary.skipped_static_intervals
        );
    }
    if json {
        println!(
            "{}",
            serde_json::json!({
                "self_check": "ok",
                "sensor": generator.sensor_kind().as_str(),
                "measurements": summary.emitted_measurements,
            })
        );
    } else {
        println!(
            "OK: {} measurements from {} simulated samples",
            summary.emitted_measurements, summary.processed_samples
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use magcal_core::{GeneratorStatus, Triad};

    #[test]
    fn measurement_json_has_stable_keys() {
        let m = Measurement {
            kind: SensorKind::FluxDensity,
            triad: Triad::new(1e-5, 2e-5, -1e-5),
            std_dev: 1e-7,
            samples: 42,
        };
        let v: serde_json::Value = serde_json::from_str(&measurement_line(&m, true)).unwrap();
        assert_eq!(v["kind"], "flux-density");
        assert_eq!(v["samples"], 42);
        for k in ["x", "y", "z", "std_dev"] {
            assert!(v[k].is_f64(), "{k}");
        }
    }

    #[test]
    fn summary_text_mentions_counts() {
        let s = RunSummary {
            processed_samples: 760,
            emitted_measurements: 4,
            skipped_static_intervals: 0,
            final_status: GeneratorStatus::DynamicInterval,
        };
        assert_eq!(
            summary_line(&s, false),
            "4 measurements from 760 samples (0 static intervals skipped, final status dynamic)"
        );
    }

    #[test]
    fn sensor_flag_overrides_config() {
        let cfg = Config::default();
        let g = build_generator(&cfg, Some(SensorArg::AngularRate), false, false).unwrap();
        assert_eq!(g.sensor_kind(), SensorKind::AngularRate);
        let g = build_generator(&cfg, None, false, false).unwrap();
        assert_eq!(g.sensor_kind(), SensorKind::FluxDensity);
    }
}
