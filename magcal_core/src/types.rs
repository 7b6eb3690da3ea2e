use magcal_traits::Triad;

/// Sensor triad a generator produces measurements for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    FluxDensity,
    SpecificForce,
    AngularRate,
}

impl SensorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FluxDensity => "flux-density",
            Self::SpecificForce => "specific-force",
            Self::AngularRate => "angular-rate",
        }
    }
}

/// Calibration measurement emitted at a static→dynamic boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub kind: SensorKind,
    /// Averaged triad of the finished static run.
    pub triad: Triad,
    /// Noise-floor standard deviation stamped on the measurement.
    pub std_dev: f64,
    /// Number of samples averaged into `triad`.
    pub samples: usize,
}
