//! Running mean / standard deviation of a triad.
//!
//! Welford's online update per axis; no sample history is kept, so memory is
//! constant regardless of how long a static run lasts.

use magcal_traits::{NoiseAccumulator, Triad};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisStats {
    mean: f64,
    m2: f64,
}

impl AxisStats {
    #[inline]
    fn push(&mut self, x: f64, n: usize) {
        let delta = x - self.mean;
        self.mean += delta / n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Unbiased variance; 0 with fewer than two samples.
    #[inline]
    fn variance(&self, n: usize) -> f64 {
        if n < 2 {
            0.0
        } else {
            (self.m2 / (n - 1) as f64).max(0.0)
        }
    }
}

/// Reference [`NoiseAccumulator`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTriadStats {
    n: usize,
    x: AxisStats,
    y: AxisStats,
    z: AxisStats,
}

impl RunningTriadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, t: Triad) {
        self.n += 1;
        self.x.push(t.x, self.n);
        self.y.push(t.y, self.n);
        self.z.push(t.z, self.n);
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn mean(&self) -> Triad {
        Triad::new(self.x.mean, self.y.mean, self.z.mean)
    }

    /// Per-axis standard deviation.
    pub fn std_dev(&self) -> Triad {
        Triad::new(
            self.x.variance(self.n).sqrt(),
            self.y.variance(self.n).sqrt(),
            self.z.variance(self.n).sqrt(),
        )
    }

    /// sqrt(σx² + σy² + σz²)
    pub fn std_dev_norm(&self) -> f64 {
        (self.x.variance(self.n) + self.y.variance(self.n) + self.z.variance(self.n)).sqrt()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl NoiseAccumulator for RunningTriadStats {
    fn add_sample(&mut self, triad: Triad) {
        self.push(triad);
    }

    fn reset(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.clear();
        Ok(())
    }

    fn average(&self) -> Triad {
        self.mean()
    }

    fn standard_deviation_norm(&self) -> f64 {
        self.std_dev_norm()
    }

    fn count(&self) -> usize {
        self.n
    }
}
