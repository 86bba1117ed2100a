//! Affine quantization parameters

use serde::{Deserialize, Serialize};

use crate::dtype::TensorType;
use crate::error::{QuantError, Result};
use crate::rounding::RoundingMode;

/// Scale and zero point of one quantized tensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantParams {
    /// Real value of one quantization step
    pub scale: f32,
    /// Integer that represents real zero
    pub zero_point: i32,
}

impl QuantParams {
    /// Create parameters, rejecting zero, negative and non-finite scales
    pub fn new(scale: f32, zero_point: i32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(QuantError::InvalidScale(scale));
        }
        Ok(Self { scale, zero_point })
    }

    /// Check that these parameters are usable with `dtype`
    pub fn validate_for(&self, dtype: TensorType) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(QuantError::InvalidScale(self.scale));
        }
        if !dtype.contains(self.zero_point) {
            return Err(QuantError::ZeroPointOutOfRange {
                zero_point: self.zero_point,
                dtype,
                min: dtype.min(),
                max: dtype.max(),
            });
        }
        Ok(())
    }

    /// Quantize a real value into `dtype`.
    ///
    /// The zero point is added before rounding, so `TowardZero` reproduces a
    /// plain truncating cast of `x / scale + zero_point`.
    pub fn quantize(&self, value: f32, dtype: TensorType, mode: RoundingMode) -> Result<i32> {
        if !value.is_finite() {
            return Err(QuantError::NonFinite(value));
        }
        let scaled = value / self.scale + self.zero_point as f32;
        Ok(dtype.saturate(mode.apply(scaled)))
    }

    /// Recover the approximate real value of a quantized integer
    pub fn dequantize(&self, quantized: i32) -> f32 {
        (quantized as i64 - self.zero_point as i64) as f32 * self.scale
    }

    /// Real-valued interval covered by `dtype` under these parameters
    pub fn representable_range(&self, dtype: TensorType) -> (f32, f32) {
        (self.dequantize(dtype.min()), self.dequantize(dtype.max()))
    }
}

impl std::fmt::Display for QuantParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scale={:.6} zero_point={}", self.scale, self.zero_point)
    }
}
