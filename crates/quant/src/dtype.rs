//! Quantized tensor element types

use serde::{Deserialize, Serialize};

use crate::error::{QuantError, Result};

/// Integer element type of a quantized tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorType {
    Int8,
    UInt8,
    Int16,
    Int32,
}

impl TensorType {
    /// Size of one element in bytes
    pub fn width(self) -> usize {
        match self {
            TensorType::Int8 | TensorType::UInt8 => 1,
            TensorType::Int16 => 2,
            TensorType::Int32 => 4,
        }
    }

    /// Smallest representable value
    pub fn min(self) -> i32 {
        match self {
            TensorType::Int8 => i8::MIN as i32,
            TensorType::UInt8 => u8::MIN as i32,
            TensorType::Int16 => i16::MIN as i32,
            TensorType::Int32 => i32::MIN,
        }
    }

    /// Largest representable value
    pub fn max(self) -> i32 {
        match self {
            TensorType::Int8 => i8::MAX as i32,
            TensorType::UInt8 => u8::MAX as i32,
            TensorType::Int16 => i16::MAX as i32,
            TensorType::Int32 => i32::MAX,
        }
    }

    /// Check whether `value` fits in this type
    pub fn contains(self, value: i32) -> bool {
        (self.min()..=self.max()).contains(&value)
    }

    /// Clamp a rounded real value into this type's range.
    /// NaN saturates to zero, matching Rust's float-to-int casts.
    pub fn saturate(self, value: f32) -> i32 {
        if value.is_nan() {
            return 0;
        }
        let clamped = (value as f64).clamp(self.min() as f64, self.max() as f64);
        clamped as i32
    }

    /// Write a single element (little-endian) into the front of `buf`.
    /// Values outside the type's range saturate.
    pub fn encode(self, value: i32, buf: &mut [u8]) -> Result<()> {
        let need = self.width();
        if buf.len() < need {
            return Err(QuantError::BufferTooShort {
                need,
                have: buf.len(),
            });
        }

        let value = value.clamp(self.min(), self.max());
        match self {
            TensorType::Int8 => buf[0] = (value as i8) as u8,
            TensorType::UInt8 => buf[0] = value as u8,
            TensorType::Int16 => buf[..2].copy_from_slice(&(value as i16).to_le_bytes()),
            TensorType::Int32 => buf[..4].copy_from_slice(&value.to_le_bytes()),
        }
        Ok(())
    }

    /// Read a single element (little-endian) from the front of `buf`
    pub fn decode(self, buf: &[u8]) -> Result<i32> {
        let need = self.width();
        if buf.len() < need {
            return Err(QuantError::BufferTooShort {
                need,
                have: buf.len(),
            });
        }

        let value = match self {
            TensorType::Int8 => buf[0] as i8 as i32,
            TensorType::UInt8 => buf[0] as i32,
            TensorType::Int16 => i16::from_le_bytes([buf[0], buf[1]]) as i32,
            TensorType::Int32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        };
        Ok(value)
    }
}

impl std::fmt::Display for TensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TensorType::Int8 => "int8",
            TensorType::UInt8 => "uint8",
            TensorType::Int16 => "int16",
            TensorType::Int32 => "int32",
        };
        f.write_str(name)
    }
}
