//! Triad extraction from raw samples.

use magcal_traits::{Sample, Triad};

/// Which triad of a [`Sample`] to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTriad {
    SpecificForce,
    FluxDensity,
    AngularRate,
}

impl SampleTriad {
    #[inline]
    pub fn extract(self, sample: &Sample) -> Triad {
        match self {
            Self::SpecificForce => sample.specific_force,
            Self::FluxDensity => sample.flux_density,
            Self::AngularRate => sample.angular_rate,
        }
    }
}

/// Triad fed to the interval classifier. Motion is always judged on specific
/// force, whichever triad the generator measures.
#[inline]
pub fn motion_triad(sample: &Sample) -> Triad {
    SampleTriad::SpecificForce.extract(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_requested_triad() {
        let s = Sample::new(
            0.5,
            Triad::new(0.0, 0.0, -9.81),
            Triad::new(1e-5, 2e-5, -1e-5),
        )
        .with_angular_rate(Triad::new(0.1, 0.2, 0.3));
        assert_eq!(motion_triad(&s), Triad::new(0.0, 0.0, -9.81));
        assert_eq!(SampleTriad::FluxDensity.extract(&s), Triad::new(1e-5, 2e-5, -1e-5));
        assert_eq!(SampleTriad::AngularRate.extract(&s), Triad::new(0.1, 0.2, 0.3));
    }
}
