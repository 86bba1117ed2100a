//! Harness error types

use thiserror::Error;

use microcheck_engine::{EngineError, TensorRole};

use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Model schema version mismatch: expected {expected}, got {got}")]
    ModelVersionMismatch { expected: u32, got: u32 },

    #[error("Engine initialization failed: {0}")]
    EngineInit(#[source] EngineError),

    #[error("Engine reported no {role} tensor after allocation")]
    NullTensorHandle { role: TensorRole },

    #[error("Unsupported {role} tensor: {reason}")]
    UnsupportedTensor { role: TensorRole, reason: String },

    #[error(
        "Tolerance exceeded at vector {index} (input {input}): \
         expected {expected}, got {actual}, difference {difference} > {tolerance}"
    )]
    ToleranceExceeded {
        index: usize,
        input: f32,
        expected: f32,
        actual: f32,
        difference: f32,
        tolerance: f32,
    },

    #[error("Non-deterministic output at vector {index}: {first} then {second}")]
    NonDeterministicOutput { index: usize, first: i32, second: i32 },

    #[error("Invoke failed: {0}")]
    Invoke(#[source] EngineError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Model error: {0}")]
    Model(#[from] microcheck_model::ModelError),

    #[error("Quantization error: {0}")]
    Quant(#[from] microcheck_quant::QuantError),

    #[error("Operation not allowed in session state {0:?}")]
    InvalidState(SessionState),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
