//! Microcheck Quantization
//!
//! Affine quantization between real values and the narrow integer tensors
//! used by on-device inference engines:
//!
//! ```text
//! q = round(x / scale + zero_point)      (saturated to the element type)
//! x = (q - zero_point) * scale
//! ```

mod dtype;
mod error;
mod params;
mod rounding;

pub use dtype::TensorType;
pub use error::{QuantError, Result};
pub use params::QuantParams;
pub use rounding::RoundingMode;
