use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid simulation script: {0}")]
    InvalidScript(&'static str),
    #[error("invalid simulation parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = std::result::Result<T, SimError>;
