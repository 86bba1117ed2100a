//! Acceptance test report

use serde::Serialize;

use crate::config::RunMode;
use crate::error::{HarnessError, Result};

/// Outcome of one test vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorResult {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub input: f32,
    pub quantized_input: i32,
    pub quantized_output: i32,
    pub prediction: f32,
    pub reference: f32,
    pub difference: f32,
    pub passed: bool,
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Verdict {
    /// Every vector within tolerance
    Passed,
    /// All vectors ran, some failed
    Failed { failures: usize },
    /// Run stopped at the first failure
    Aborted { at: usize },
}

/// Ordered per-vector results plus summary statistics
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub verdict: Verdict,
    pub mode: RunMode,
    pub tolerance: f32,
    pub total_vectors: usize,
    pub max_abs_error: f32,
    pub mean_abs_error: f32,
    pub results: Vec<VectorResult>,
}

impl TestReport {
    pub(crate) fn new(
        results: Vec<VectorResult>,
        total_vectors: usize,
        tolerance: f32,
        mode: RunMode,
        aborted: bool,
    ) -> Self {
        let failures = results.iter().filter(|r| !r.passed).count();
        let verdict = if aborted {
            Verdict::Aborted {
                at: results.last().map_or(0, |r| r.index),
            }
        } else if failures > 0 {
            Verdict::Failed { failures }
        } else {
            Verdict::Passed
        };

        // f32::max would hide a NaN difference
        let max_abs_error = results.iter().map(|r| r.difference).fold(0.0f32, |acc, d| {
            if acc.is_nan() || d.is_nan() {
                f32::NAN
            } else {
                acc.max(d)
            }
        });
        let mean_abs_error = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.difference).sum::<f32>() / results.len() as f32
        };

        Self {
            verdict,
            mode,
            tolerance,
            total_vectors,
            max_abs_error,
            mean_abs_error,
            results,
        }
    }

    /// True when every vector passed
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    /// Vectors that actually ran
    pub fn executed(&self) -> usize {
        self.results.len()
    }

    /// Failing results in supplied order
    pub fn failures(&self) -> impl Iterator<Item = &VectorResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Turn the first failing vector into [`HarnessError::ToleranceExceeded`]
    pub fn ensure_passed(&self) -> Result<()> {
        match self.failures().next() {
            None => Ok(()),
            Some(r) => Err(HarnessError::ToleranceExceeded {
                index: r.index,
                input: r.input,
                expected: r.reference,
                actual: r.prediction,
                difference: r.difference,
                tolerance: self.tolerance,
            }),
        }
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
