use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    /// A mutating call arrived while a sample is mid-processing.
    #[error("generator busy: a sample is currently being processed")]
    Busy,
    #[error("classifier error: {0}")]
    Classifier(String),
    #[error("accumulator error: {0}")]
    Accumulator(String),
    #[error("sample source error: {0}")]
    Source(String),
    /// A runtime setter was given an out-of-range value.
    #[error("invalid setting: {0}")]
    InvalidSetting(&'static str),
    #[error("initialization failed: base noise level {base_noise_level:.6} is above threshold")]
    InitializationFailed { base_noise_level: f64 },
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor kind")]
    MissingSensor,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
