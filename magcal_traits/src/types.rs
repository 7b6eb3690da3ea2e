use std::ops::{Add, Sub};

/// Three-axis vector quantity (flux density, specific force or angular rate).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Triad {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triad {
    pub const ZERO: Triad = Triad::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Triad {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Triad {
    type Output = Triad;
    fn add(self, rhs: Triad) -> Triad {
        Triad::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Triad {
    type Output = Triad;
    fn sub(self, rhs: Triad) -> Triad {
        Triad::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// One time-ordered reading from the inertial/magnetic sensor package.
///
/// - `specific_force`: accelerometer triad in m/s² (drives interval detection)
/// - `flux_density`: magnetometer triad in Tesla
/// - `angular_rate`: gyroscope triad in rad/s (zero when unavailable)
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp_s: f64,
    pub specific_force: Triad,
    pub flux_density: Triad,
    pub angular_rate: Triad,
}

impl Sample {
    pub fn new(timestamp_s: f64, specific_force: Triad, flux_density: Triad) -> Self {
        Self {
            timestamp_s,
            specific_force,
            flux_density,
            angular_rate: Triad::ZERO,
        }
    }

    pub fn with_angular_rate(mut self, angular_rate: Triad) -> Self {
        self.angular_rate = angular_rate;
        self
    }
}

/// Status reported by an interval classifier after each processed sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    /// Nothing processed since construction or the last reset.
    #[default]
    Idle,
    /// Gathering the initial static samples used to estimate base noise.
    Initializing,
    /// Platform held still.
    StaticInterval,
    /// Platform moving.
    DynamicInterval,
    /// Initialization aborted; terminal until reset.
    Failed,
}

impl GeneratorStatus {
    /// Statuses during which static statistics may be accumulated.
    #[inline]
    pub fn is_accumulating(self) -> bool {
        matches!(self, Self::Initializing | Self::StaticInterval)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::StaticInterval => "static",
            Self::DynamicInterval => "dynamic",
            Self::Failed => "failed",
        }
    }
}

/// Per-axis mean and standard deviation of the specific force accumulated by
/// the classifier over a finished static interval.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IntervalStats {
    pub mean: Triad,
    pub std_dev: Triad,
    pub samples: usize,
}

/// Lifecycle transitions reported by an [`crate::IntervalClassifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalEvent {
    InitializationCompleted { base_noise_level: f64 },
    InitializationFailed { base_noise_level: f64 },
    /// Dynamic run ended; a static run starts with the current sample.
    StaticIntervalDetected,
    /// Static run ended; carries that run's specific-force statistics.
    DynamicIntervalDetected { stats: IntervalStats },
}
