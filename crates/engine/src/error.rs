//! Engine error types

use thiserror::Error;

use crate::ops::Operator;
use crate::tensor::TensorRole;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Arena exhausted: requested {requested} bytes, {available} available")]
    ArenaExhausted { requested: usize, available: usize },

    #[error("Invalid alignment: {0} (must be a power of two)")]
    InvalidAlignment(usize),

    #[error("Operator not registered: {0}")]
    UnsupportedOperator(Operator),

    #[error("Operator registered twice: {0}")]
    DuplicateOperator(Operator),

    #[error("Operator registry full: capacity {capacity}")]
    RegistryFull { capacity: usize },

    #[error("Model schema version {got} not supported by runtime (expects {expected})")]
    SchemaMismatch { expected: u32, got: u32 },

    #[error("Tensors not allocated")]
    TensorsNotAllocated,

    #[error("Unknown {role} tensor at index {index}")]
    UnknownTensor { role: TensorRole, index: usize },

    #[error("Element index {index} out of range for tensor of {len} elements")]
    ElementOutOfRange { index: usize, len: usize },

    #[error("Tensor allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Invoke failed: {0}")]
    InvokeFailed(String),

    #[error("Quantization error: {0}")]
    Quant(#[from] microcheck_quant::QuantError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
