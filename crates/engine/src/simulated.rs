//! Simulated reference engine
//!
//! Stands in for a real graph executor: tensors and an intermediate scratch
//! buffer are placed in the arena exactly as a real engine would, but invoke
//! evaluates a transfer function on the dequantized input and requantizes
//! the result.

use microcheck_model::{ModelArtifact, SCHEMA_VERSION};
use microcheck_quant::{QuantParams, RoundingMode, TensorType};

use crate::arena::{ArenaRegion, MemoryArena, DEFAULT_ALIGNMENT};
use crate::error::{EngineError, Result};
use crate::ops::{OpResolver, Operator};
use crate::runtime::{Interpreter, Runtime};
use crate::tensor::{TensorHandle, TensorRole, TensorSpec};

/// Scratch space of the three-layer sine network (16-wide hidden layers)
const SINE_SCRATCH_BYTES: usize = 1024;

/// Runtime that simulates a single-input, single-output quantized model
#[derive(Debug, Clone)]
pub struct SimulatedRuntime {
    schema_version: u32,
    input: TensorSpec,
    output: TensorSpec,
    required_ops: Vec<Operator>,
    scratch_bytes: usize,
    rounding: RoundingMode,
    transfer: fn(f32) -> f32,
}

impl SimulatedRuntime {
    pub fn new(input: TensorSpec, output: TensorSpec, transfer: fn(f32) -> f32) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            input,
            output,
            required_ops: vec![Operator::FullyConnected],
            scratch_bytes: 0,
            rounding: RoundingMode::default(),
            transfer,
        }
    }

    /// The int8 sine model: input over [0, 2π], output over [-1, 1]
    pub fn sine() -> Self {
        let input = TensorSpec::scalar(
            TensorType::Int8,
            QuantParams {
                scale: 0.024573976,
                zero_point: -128,
            },
        );
        let output = TensorSpec::scalar(
            TensorType::Int8,
            QuantParams {
                scale: 0.008472034,
                zero_point: 4,
            },
        );
        Self::new(input, output, f32::sin).with_scratch(SINE_SCRATCH_BYTES)
    }

    pub fn requiring(mut self, ops: &[Operator]) -> Self {
        self.required_ops = ops.to_vec();
        self
    }

    pub fn with_scratch(mut self, bytes: usize) -> Self {
        self.scratch_bytes = bytes;
        self
    }

    /// Rounding used when requantizing outputs
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn required_ops(&self) -> &[Operator] {
        &self.required_ops
    }

    /// Arena bytes needed for tensors and scratch
    pub fn arena_requirement(&self) -> usize {
        let align = |n: usize| (n + DEFAULT_ALIGNMENT - 1) & !(DEFAULT_ALIGNMENT - 1);
        align(self.input.byte_len()) + align(self.output.byte_len()) + self.scratch_bytes
    }
}

impl Runtime for SimulatedRuntime {
    type Interpreter<'a> = SimulatedInterpreter<'a>;

    fn name(&self) -> &str {
        "simulated"
    }

    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn load<'a>(
        &'a self,
        model: ModelArtifact<'a>,
        resolver: OpResolver,
        arena: MemoryArena<'a>,
    ) -> Result<SimulatedInterpreter<'a>> {
        if model.schema_version() != self.schema_version {
            return Err(EngineError::SchemaMismatch {
                expected: self.schema_version,
                got: model.schema_version(),
            });
        }
        self.input.quant.validate_for(self.input.dtype)?;
        self.output.quant.validate_for(self.output.dtype)?;

        tracing::debug!(
            model_bytes = model.len(),
            arena_bytes = arena.capacity(),
            ops = resolver.len(),
            "Simulated runtime loaded model"
        );

        Ok(SimulatedInterpreter {
            runtime: self,
            resolver,
            arena,
            input: None,
            output: None,
            scratch: None,
        })
    }
}

/// Interpreter produced by [`SimulatedRuntime`]
#[derive(Debug)]
pub struct SimulatedInterpreter<'a> {
    runtime: &'a SimulatedRuntime,
    resolver: OpResolver,
    arena: MemoryArena<'a>,
    input: Option<TensorHandle>,
    output: Option<TensorHandle>,
    scratch: Option<ArenaRegion>,
}

impl SimulatedInterpreter<'_> {
    fn allocated(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }
}

impl Interpreter for SimulatedInterpreter<'_> {
    fn allocate_tensors(&mut self) -> Result<()> {
        let runtime = self.runtime;
        self.resolver.resolve_all(&runtime.required_ops)?;

        self.arena.reset();
        self.input = None;
        self.output = None;

        let input = self
            .arena
            .allocate(runtime.input.byte_len(), DEFAULT_ALIGNMENT)?;
        let output = self
            .arena
            .allocate(runtime.output.byte_len(), DEFAULT_ALIGNMENT)?;
        let scratch = self
            .arena
            .allocate(runtime.scratch_bytes, DEFAULT_ALIGNMENT)?;

        self.input = Some(TensorHandle {
            role: TensorRole::Input,
            index: 0,
            spec: runtime.input,
            region: input,
        });
        self.output = Some(TensorHandle {
            role: TensorRole::Output,
            index: 0,
            spec: runtime.output,
            region: output,
        });
        self.scratch = Some(scratch);

        tracing::debug!(
            used = self.arena.used(),
            capacity = self.arena.capacity(),
            "Tensors allocated"
        );
        Ok(())
    }

    fn input(&self, index: usize) -> Option<TensorHandle> {
        self.input.filter(|_| index == 0)
    }

    fn output(&self, index: usize) -> Option<TensorHandle> {
        self.output.filter(|_| index == 0)
    }

    fn tensor_data(&self, handle: &TensorHandle) -> Result<&[u8]> {
        if !self.allocated() {
            return Err(EngineError::TensorsNotAllocated);
        }
        self.arena.slice(handle.region)
    }

    fn tensor_data_mut(&mut self, handle: &TensorHandle) -> Result<&mut [u8]> {
        if !self.allocated() {
            return Err(EngineError::TensorsNotAllocated);
        }
        self.arena.slice_mut(handle.region)
    }

    fn invoke(&mut self) -> Result<()> {
        let (Some(input), Some(output)) = (self.input, self.output) else {
            return Err(EngineError::TensorsNotAllocated);
        };
        let runtime = self.runtime;

        for i in 0..input.elements().min(output.elements()) {
            let x = input.quant().dequantize(self.read_element(&input, i)?);
            let y = (runtime.transfer)(x);
            if !y.is_finite() {
                return Err(EngineError::InvokeFailed(format!(
                    "transfer produced {} for input {}",
                    y, x
                )));
            }

            // Keep the last activation in scratch like a real intermediate buffer
            if let Some(scratch) = self.scratch.filter(|r| r.len >= 4) {
                self.arena.slice_mut(scratch)?[..4].copy_from_slice(&y.to_le_bytes());
            }

            let q = output.quant().quantize(y, output.dtype(), runtime.rounding)?;
            self.write_element(&output, i, q)?;
        }
        Ok(())
    }

    fn arena_used(&self) -> usize {
        self.arena.used()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microcheck_model::ModelHeader;

    fn resolver() -> OpResolver {
        let mut resolver = OpResolver::with_capacity(1);
        resolver.add_fully_connected().unwrap();
        resolver
    }

    #[test]
    fn test_sine_fits_default_arena() {
        assert!(SimulatedRuntime::sine().arena_requirement() <= 3000);
    }

    #[test]
    fn test_sine_invoke() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = SimulatedRuntime::sine();
        let mut buf = vec![0u8; 3000];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        interp.allocate_tensors().unwrap();

        let input = interp.input(0).unwrap();
        let output = interp.output(0).unwrap();

        // x = (-64 + 128) * 0.024573976 = 1.5727, sin(x) ≈ 1.0
        interp.write_element(&input, 0, -64).unwrap();
        interp.invoke().unwrap();
        assert_eq!(interp.read_element(&output, 0).unwrap(), 122);

        // x = 0, sin(x) = 0 → zero point
        interp.write_element(&input, 0, -128).unwrap();
        interp.invoke().unwrap();
        assert_eq!(interp.read_element(&output, 0).unwrap(), 4);
    }

    #[test]
    fn test_missing_operator() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime =
            SimulatedRuntime::sine().requiring(&[Operator::FullyConnected, Operator::Relu]);
        let mut buf = vec![0u8; 3000];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        assert!(matches!(
            interp.allocate_tensors(),
            Err(EngineError::UnsupportedOperator(Operator::Relu))
        ));
        assert!(interp.input(0).is_none());
    }

    #[test]
    fn test_arena_too_small() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = SimulatedRuntime::sine();
        let mut buf = vec![0u8; 512];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        assert!(matches!(
            interp.allocate_tensors(),
            Err(EngineError::ArenaExhausted { .. })
        ));
    }

    #[test]
    fn test_non_finite_transfer() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let spec = TensorSpec::scalar(TensorType::Int8, QuantParams::new(0.1, 0).unwrap());
        let runtime = SimulatedRuntime::new(spec, spec, |x| 1.0 / (x - x));
        let mut buf = vec![0u8; 64];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        interp.allocate_tensors().unwrap();
        assert!(matches!(interp.invoke(), Err(EngineError::InvokeFailed(_))));
    }
}
