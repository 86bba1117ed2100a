//! Verification session lifecycle

use microcheck_engine::{Interpreter, MemoryArena, OpResolver, Runtime, TensorHandle, TensorRole};
use microcheck_model::ModelArtifact;
use microcheck_quant::QuantParams;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::report::VectorResult;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Engine bound, tensors not yet allocated
    Uninitialized,
    /// Tensors allocated, ready to run
    Allocated,
    /// Acceptance run in progress
    Invoking,
    /// Last run completed every vector
    Done,
    /// Last run stopped on a fatal check; no further runs
    Aborted,
}

/// Quantization parameters of the model's input and output tensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IoQuantization {
    pub input: QuantParams,
    pub output: QuantParams,
}

impl IoQuantization {
    /// `(input_scale, input_zero_point, output_scale, output_zero_point)`
    pub fn into_tuple(self) -> (f32, i32, f32, i32) {
        (
            self.input.scale,
            self.input.zero_point,
            self.output.scale,
            self.output.zero_point,
        )
    }
}

/// Input and output handles, fetched once after allocation
#[derive(Debug, Clone, Copy)]
pub(crate) struct IoBinding {
    pub input: TensorHandle,
    pub output: TensorHandle,
}

/// One model bound to one engine and one arena
#[derive(Debug)]
pub struct Session<I> {
    pub(crate) interpreter: I,
    pub(crate) state: SessionState,
    pub(crate) config: HarnessConfig,
    pub(crate) io: Option<IoBinding>,
    /// Results of the last run that ended in an error
    pub(crate) completed: Vec<VectorResult>,
}

impl<I: Interpreter> Session<I> {
    /// Check the model, bind it to `runtime` and allocate tensors.
    ///
    /// The schema version is checked before the engine is touched. The
    /// first `config.arena_size` bytes of `arena` are lent to the engine
    /// for the session's lifetime.
    pub fn initialize<'a, R>(
        runtime: &'a R,
        model_bytes: &'a [u8],
        resolver: OpResolver,
        arena: &'a mut [u8],
        config: HarnessConfig,
    ) -> Result<Self>
    where
        R: Runtime<Interpreter<'a> = I>,
    {
        config.validate()?;

        let model = ModelArtifact::parse(model_bytes)?;
        tracing::info!(
            schema_version = model.schema_version(),
            model_bytes = model.len(),
            "Model loaded"
        );
        if model.schema_version() != config.required_schema_version {
            return Err(HarnessError::ModelVersionMismatch {
                expected: config.required_schema_version,
                got: model.schema_version(),
            });
        }

        if config.arena_size > arena.len() {
            return Err(HarnessError::InvalidConfig(format!(
                "arena size {} exceeds supplied buffer of {} bytes",
                config.arena_size,
                arena.len()
            )));
        }
        let arena = MemoryArena::new(&mut arena[..config.arena_size]);

        tracing::debug!(
            runtime = runtime.name(),
            arena_bytes = arena.capacity(),
            ops = ?resolver.iter().collect::<Vec<_>>(),
            "Binding engine"
        );
        let interpreter = runtime
            .load(model, resolver, arena)
            .map_err(HarnessError::EngineInit)?;

        let mut session = Self {
            interpreter,
            state: SessionState::Uninitialized,
            config,
            io: None,
            completed: Vec::new(),
        };
        session.allocate()?;
        Ok(session)
    }

    fn allocate(&mut self) -> Result<()> {
        self.interpreter
            .allocate_tensors()
            .map_err(HarnessError::EngineInit)?;
        self.state = SessionState::Allocated;
        tracing::info!(arena_used = self.interpreter.arena_used(), "Tensors allocated");
        Ok(())
    }

    /// Read input and output quantization parameters.
    ///
    /// Handles are fetched from the engine on the first call and reused.
    pub fn io_quantization(&mut self) -> Result<IoQuantization> {
        let io = self.io_binding()?;
        Ok(IoQuantization {
            input: io.input.quant(),
            output: io.output.quant(),
        })
    }

    pub(crate) fn io_binding(&mut self) -> Result<IoBinding> {
        if let Some(io) = self.io {
            return Ok(io);
        }
        if self.state == SessionState::Uninitialized {
            return Err(HarnessError::InvalidState(self.state));
        }

        let input = self.interpreter.input(0).ok_or(HarnessError::NullTensorHandle {
            role: TensorRole::Input,
        })?;
        let output = self.interpreter.output(0).ok_or(HarnessError::NullTensorHandle {
            role: TensorRole::Output,
        })?;
        check_scalar(&input)?;
        check_scalar(&output)?;

        tracing::info!(
            input_scale = input.quant().scale,
            input_zero_point = input.quant().zero_point,
            output_scale = output.quant().scale,
            output_zero_point = output.quant().zero_point,
            "Quantization parameters"
        );

        let io = IoBinding { input, output };
        self.io = Some(io);
        Ok(io)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The engine interpreter, for inspection
    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Vectors that completed before the last run failed with an error.
    /// Empty after a run that returned a report.
    pub fn completed_results(&self) -> &[VectorResult] {
        &self.completed
    }

    pub fn arena_used(&self) -> usize {
        self.interpreter.arena_used()
    }
}

fn check_scalar(handle: &TensorHandle) -> Result<()> {
    if handle.elements() != 1 {
        return Err(HarnessError::UnsupportedTensor {
            role: handle.role,
            reason: format!("expected 1 element, found {}", handle.elements()),
        });
    }
    handle
        .quant()
        .validate_for(handle.dtype())
        .map_err(|e| HarnessError::UnsupportedTensor {
            role: handle.role,
            reason: e.to_string(),
        })
}
