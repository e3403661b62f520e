use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A NaN turned up where a number was required.
    #[error("{0} is not a number")]
    NotNumeric(String),

    /// Two sequences that must be the same length aren't.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("train ratio {0} must be strictly between 0 and 1")]
    RatioOutOfRange(f64),

    /// Input fed to a neuron (or layer) has the wrong number of elements.
    #[error("dimension mismatch: neuron has {expected} weights, input has {actual} elements")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
