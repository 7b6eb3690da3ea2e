#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Calibration-measurement generator (sensor-agnostic).
//!
//! This crate turns a stream of inertial/magnetic samples into discrete
//! calibration measurements. All collaborators are reached through the
//! `magcal_traits` interfaces: `IntervalClassifier`, `NoiseAccumulator`
//! and `SampleSource`.
//!
//! ## Architecture
//!
//! - **Extraction**: motion and measured triads pulled out of a sample (`extractor`)
//! - **Detection**: static/dynamic classification (`detector::StaticIntervalDetector`)
//! - **Accumulation**: Welford running statistics (`accumulator::RunningTriadStats`)
//! - **Transitions**: per-sensor reaction to lifecycle events (`handler`)
//! - **Driver**: per-sample sequencing, skip policy, reentrancy guard (`generator`)
//! - **Runner**: whole-stream helpers returning a `RunSummary` (`runner`)
//!
//! ## Lifecycle
//!
//! Static runs accumulate the measured triad; the accumulator is reset by the
//! first sample seen outside a static run. The noise floor is frozen once when
//! initialization completes and stamps every measurement emitted afterwards.
//! A measurement is emitted when a static run ends, unless the run was too
//! short (`GeneratorCfg::min_static_samples`).

pub mod accumulator;
pub mod boundary;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod handler;
pub mod listener;
pub mod mocks;
pub mod runner;
pub mod types;

pub use accumulator::RunningTriadStats;
pub use builder::{GeneratorBuilder, Missing, Set};
pub use config::{DetectorCfg, GeneratorCfg};
pub use detector::StaticIntervalDetector;
pub use error::{BuildError, GeneratorError, Report, Result};
pub use generator::MeasurementGenerator;
pub use handler::{SensorHandler, TransitionHandler};
pub use listener::{ChannelListener, MeasurementListener};
pub use runner::{RunSummary, run, run_samples};
pub use types::{Measurement, SensorKind};

pub use magcal_traits::{GeneratorStatus, IntervalEvent, IntervalStats, Sample, Triad};
