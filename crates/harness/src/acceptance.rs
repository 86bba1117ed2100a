//! Acceptance run: quantize, invoke, dequantize, compare

use microcheck_engine::Interpreter;

use crate::config::{RunMode, RunOptions};
use crate::error::{HarnessError, Result};
use crate::report::{TestReport, VectorResult};
use crate::session::{IoBinding, Session, SessionState};
use crate::vector::TestVector;

impl<I: Interpreter> Session<I> {
    /// Run `vectors` in order with the session's configured options
    pub fn run(&mut self, vectors: &[TestVector]) -> Result<TestReport> {
        let options = self.config.run_options();
        self.run_acceptance_test(vectors, &options)
    }

    /// Run `vectors` in order and compare each dequantized output to its
    /// reference.
    ///
    /// Engine failures, missing tensor handles and non-deterministic outputs
    /// abort the session and return an error. Vectors that completed before
    /// the error stay available through [`Session::completed_results`].
    ///
    /// A vector outside tolerance aborts the run in [`RunMode::FailFast`]
    /// (the report's verdict is `Aborted`) and is only recorded in
    /// [`RunMode::CollectAll`].
    pub fn run_acceptance_test(
        &mut self,
        vectors: &[TestVector],
        options: &RunOptions,
    ) -> Result<TestReport> {
        match self.state {
            SessionState::Allocated | SessionState::Done => {}
            state => return Err(HarnessError::InvalidState(state)),
        }
        options.validate()?;
        if vectors.is_empty() {
            return Err(HarnessError::InvalidConfig("no test vectors".into()));
        }

        self.completed.clear();

        // Null handles fail here, before any invoke
        let io = match self.io_binding() {
            Ok(io) => io,
            Err(e) => {
                self.state = SessionState::Aborted;
                tracing::error!(error = %e, "Acceptance run aborted before first vector");
                return Err(e);
            }
        };

        self.state = SessionState::Invoking;
        let mut results = Vec::with_capacity(vectors.len());
        let mut aborted = false;

        for (index, vector) in vectors.iter().enumerate() {
            let result = match self.run_vector(index, vector, io, options) {
                Ok(result) => result,
                Err(e) => {
                    self.state = SessionState::Aborted;
                    tracing::error!(
                        index,
                        completed = results.len(),
                        error = %e,
                        "Acceptance run aborted"
                    );
                    self.completed = results;
                    return Err(e);
                }
            };

            let passed = result.passed;
            results.push(result);

            if !passed && options.mode == RunMode::FailFast {
                aborted = true;
                break;
            }
        }

        self.state = if aborted {
            SessionState::Aborted
        } else {
            SessionState::Done
        };

        let report = TestReport::new(
            results,
            vectors.len(),
            options.tolerance,
            options.mode,
            aborted,
        );
        if report.passed() {
            tracing::info!(
                vectors = report.executed(),
                max_abs_error = report.max_abs_error,
                "all correct"
            );
        } else {
            tracing::warn!(
                verdict = ?report.verdict,
                executed = report.executed(),
                total = report.total_vectors,
                "Acceptance test failed"
            );
        }
        Ok(report)
    }

    fn run_vector(
        &mut self,
        index: usize,
        vector: &TestVector,
        io: IoBinding,
        options: &RunOptions,
    ) -> Result<VectorResult> {
        let q_in = io
            .input
            .quant()
            .quantize(vector.input, io.input.dtype(), options.rounding)?;
        tracing::debug!(index, input = vector.input, quantized_input = q_in, "Quantized input");

        let q_out = self.invoke_once(&io, q_in)?;
        if options.check_determinism {
            let again = self.invoke_once(&io, q_in)?;
            if again != q_out {
                return Err(HarnessError::NonDeterministicOutput {
                    index,
                    first: q_out,
                    second: again,
                });
            }
        }

        let prediction = io.output.quant().dequantize(q_out);
        let reference = vector.expected();
        let difference = (reference - prediction).abs();
        // NaN compares false, so it fails
        let passed = difference <= options.tolerance;

        tracing::info!(
            index,
            label = vector.label.as_deref().unwrap_or(""),
            input = vector.input,
            quantized_input = q_in,
            quantized_output = q_out,
            prediction,
            reference,
            difference,
            passed,
            "Vector checked"
        );
        if !passed {
            tracing::warn!(
                index,
                difference,
                tolerance = options.tolerance,
                "Difference exceeds tolerance"
            );
        }

        Ok(VectorResult {
            index,
            label: vector.label.clone(),
            input: vector.input,
            quantized_input: q_in,
            quantized_output: q_out,
            prediction,
            reference,
            difference,
            passed,
        })
    }

    /// Overwrite the input element, invoke, read the output element
    fn invoke_once(&mut self, io: &IoBinding, q_in: i32) -> Result<i32> {
        self.interpreter.write_element(&io.input, 0, q_in)?;
        self.interpreter.invoke().map_err(HarnessError::Invoke)?;
        Ok(self.interpreter.read_element(&io.output, 0)?)
    }
}
