//! Microcheck Verification Harness
//!
//! Drives a black-box inference engine through an acceptance test: quantize
//! each test input, invoke, dequantize the output and compare it to a
//! reference value within a tolerance.

mod acceptance;
mod config;
mod error;
mod report;
mod session;
mod vector;

pub use config::{HarnessConfig, RunMode, RunOptions};
pub use error::{HarnessError, Result};
pub use report::{TestReport, VectorResult, Verdict};
pub use session::{IoQuantization, Session, SessionState};
pub use vector::{sine_vectors, Reference, TestVector};
