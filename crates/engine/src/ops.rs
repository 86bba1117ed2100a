//! Operator registry

use std::str::FromStr;

use crate::error::{EngineError, Result};

/// Operator kinds an engine can be asked to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    FullyConnected,
    Relu,
    Logistic,
    Tanh,
    Quantize,
    Dequantize,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::FullyConnected => "FULLY_CONNECTED",
            Operator::Relu => "RELU",
            Operator::Logistic => "LOGISTIC",
            Operator::Tanh => "TANH",
            Operator::Quantize => "QUANTIZE",
            Operator::Dequantize => "DEQUANTIZE",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULLY_CONNECTED" => Ok(Operator::FullyConnected),
            "RELU" => Ok(Operator::Relu),
            "LOGISTIC" => Ok(Operator::Logistic),
            "TANH" => Ok(Operator::Tanh),
            "QUANTIZE" => Ok(Operator::Quantize),
            "DEQUANTIZE" => Ok(Operator::Dequantize),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}

/// Fixed-capacity set of operators an engine is allowed to use.
///
/// Declare exactly what the model needs; resolving anything else fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpResolver {
    ops: Vec<Operator>,
    capacity: usize,
}

impl OpResolver {
    /// Empty registry that can hold `capacity` operators
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Register an operator
    pub fn add(&mut self, op: Operator) -> Result<()> {
        if self.ops.contains(&op) {
            return Err(EngineError::DuplicateOperator(op));
        }
        if self.ops.len() >= self.capacity {
            return Err(EngineError::RegistryFull {
                capacity: self.capacity,
            });
        }
        self.ops.push(op);
        Ok(())
    }

    pub fn add_fully_connected(&mut self) -> Result<()> {
        self.add(Operator::FullyConnected)
    }

    /// Whether `op` is registered
    pub fn contains(&self, op: Operator) -> bool {
        self.ops.contains(&op)
    }

    /// Resolve an operator, failing if it was not registered
    pub fn resolve(&self, op: Operator) -> Result<Operator> {
        if self.contains(op) {
            Ok(op)
        } else {
            Err(EngineError::UnsupportedOperator(op))
        }
    }

    /// Resolve every operator in `required`
    pub fn resolve_all(&self, required: &[Operator]) -> Result<()> {
        for &op in required {
            self.resolve(op)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = Operator> + '_ {
        self.ops.iter().copied()
    }
}
