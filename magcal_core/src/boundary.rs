//! Maps `Box<dyn Error>` from trait boundaries to typed `GeneratorError`.
//!
//! The traits in `magcal_traits` use `Box<dyn Error + Send + Sync>` so that
//! collaborators stay free of this crate's types; this module converts those
//! to our typed error enum.

use crate::error::GeneratorError;

/// Collaborator an error came from.
#[derive(Debug, Clone, Copy)]
pub enum Boundary {
    Classifier,
    Accumulator,
    Source,
}

/// Map a trait-boundary error to a typed `GeneratorError`.
///
/// Errors that already are `GeneratorError` pass through unchanged, then
/// string-based detection catches reentrancy reports from foreign types.
pub fn map_boundary_error(
    boundary: Boundary,
    e: &(dyn std::error::Error + 'static),
) -> GeneratorError {
    if let Some(ge) = e.downcast_ref::<GeneratorError>() {
        return ge.clone();
    }

    let s = e.to_string();
    if s.to_lowercase().contains("busy") {
        return GeneratorError::Busy;
    }
    match boundary {
        Boundary::Classifier => GeneratorError::Classifier(s),
        Boundary::Accumulator => GeneratorError::Accumulator(s),
        Boundary::Source => GeneratorError::Source(s),
    }
}
