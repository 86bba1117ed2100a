//! Tensor descriptors

use microcheck_quant::{QuantParams, TensorType};

use crate::arena::ArenaRegion;

/// Which side of the graph a tensor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorRole {
    Input,
    Output,
}

impl std::fmt::Display for TensorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TensorRole::Input => f.write_str("input"),
            TensorRole::Output => f.write_str("output"),
        }
    }
}

/// Shape and quantization an engine declares for one of its tensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorSpec {
    pub dtype: TensorType,
    pub elements: usize,
    pub quant: QuantParams,
}

impl TensorSpec {
    /// Single-element tensor
    pub fn scalar(dtype: TensorType, quant: QuantParams) -> Self {
        Self {
            dtype,
            elements: 1,
            quant,
        }
    }

    /// Storage size in bytes
    pub fn byte_len(&self) -> usize {
        self.dtype.width() * self.elements
    }
}

/// Handle to an allocated tensor living in the engine's arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorHandle {
    pub role: TensorRole,
    pub index: usize,
    pub spec: TensorSpec,
    pub region: ArenaRegion,
}

impl TensorHandle {
    pub fn dtype(&self) -> TensorType {
        self.spec.dtype
    }

    pub fn quant(&self) -> QuantParams {
        self.spec.quant
    }

    pub fn elements(&self) -> usize {
        self.spec.elements
    }
}
