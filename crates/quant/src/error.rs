//! Quantization error types

use thiserror::Error;

use crate::dtype::TensorType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantError {
    #[error("Invalid scale: {0} (must be finite and > 0)")]
    InvalidScale(f32),

    #[error("Zero point {zero_point} outside {dtype} range [{min}, {max}]")]
    ZeroPointOutOfRange {
        zero_point: i32,
        dtype: TensorType,
        min: i32,
        max: i32,
    },

    #[error("Cannot quantize non-finite value: {0}")]
    NonFinite(f32),

    #[error("Buffer too short: need {need} bytes, have {have}")]
    BufferTooShort { need: usize, have: usize },

    #[error("Unknown rounding mode: {0}")]
    UnknownRoundingMode(String),
}

pub type Result<T> = std::result::Result<T, QuantError>;
