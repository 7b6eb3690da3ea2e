//! Measurement consumers.
//!
//! A listener is invoked synchronously from inside `MeasurementGenerator::process`,
//! so it sees the generator mid-sample: reads are fine, every mutating call
//! returns `GeneratorError::Busy`.

use crossbeam_channel::{Receiver, Sender};

use crate::generator::MeasurementGenerator;
use crate::types::Measurement;

pub trait MeasurementListener {
    fn on_measurement_generated(
        &mut self,
        generator: &mut MeasurementGenerator,
        measurement: &Measurement,
    );
}

impl<F> MeasurementListener for F
where
    F: FnMut(&mut MeasurementGenerator, &Measurement),
{
    fn on_measurement_generated(
        &mut self,
        generator: &mut MeasurementGenerator,
        measurement: &Measurement,
    ) {
        self(generator, measurement);
    }
}

/// Forwards every measurement over a crossbeam channel.
///
/// Send failures (receiver dropped) are logged and otherwise ignored; the
/// generator keeps running without a consumer.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: Sender<Measurement>,
}

impl ChannelListener {
    pub fn new(tx: Sender<Measurement>) -> Self {
        Self { tx }
    }

    /// Listener plus the receiving end of a fresh unbounded channel.
    pub fn unbounded() -> (Self, Receiver<Measurement>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl MeasurementListener for ChannelListener {
    fn on_measurement_generated(
        &mut self,
        _generator: &mut MeasurementGenerator,
        measurement: &Measurement,
    ) {
        if self.tx.send(*measurement).is_err() {
            tracing::debug!("measurement receiver dropped; discarding measurement");
        }
    }
}
