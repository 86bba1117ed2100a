//! Scripted mock engine
//!
//! Produces quantized outputs from a script instead of running a graph, and
//! counts every load, allocation and invocation so tests can assert which
//! engine calls happened.

use std::cell::Cell;
use std::sync::Arc;

use microcheck_model::{ModelArtifact, SCHEMA_VERSION};

use crate::arena::{MemoryArena, DEFAULT_ALIGNMENT};
use crate::error::{EngineError, Result};
use crate::ops::{OpResolver, Operator};
use crate::runtime::{Interpreter, Runtime};
use crate::tensor::{TensorHandle, TensorRole, TensorSpec};

/// Where scripted outputs come from
#[derive(Clone)]
pub enum Script {
    /// Output is a pure function of the quantized input
    Map(Arc<dyn Fn(i32) -> i32 + Send + Sync>),
    /// Outputs are replayed in order, one per invocation
    Sequence(Vec<i32>),
}

impl Script {
    pub fn map(f: impl Fn(i32) -> i32 + Send + Sync + 'static) -> Self {
        Script::Map(Arc::new(f))
    }

    pub fn sequence(values: impl Into<Vec<i32>>) -> Self {
        Script::Sequence(values.into())
    }

    /// Echo the quantized input
    pub fn identity() -> Self {
        Self::map(|q| q)
    }
}

impl std::fmt::Debug for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Script::Map(_) => f.write_str("Script::Map(..)"),
            Script::Sequence(values) => f.debug_tuple("Script::Sequence").field(values).finish(),
        }
    }
}

/// Mock runtime with scripted outputs and failure knobs
#[derive(Debug)]
pub struct ScriptedRuntime {
    schema_version: u32,
    input: Option<TensorSpec>,
    output: Option<TensorSpec>,
    required_ops: Vec<Operator>,
    scratch_bytes: usize,
    script: Script,
    fail_allocation: Option<String>,
    fail_invoke_at: Option<usize>,
    loads: Cell<usize>,
    allocations: Cell<usize>,
    invocations: Cell<usize>,
}

impl ScriptedRuntime {
    /// Single-input, single-output runtime requiring only a fully-connected op
    pub fn new(input: TensorSpec, output: TensorSpec, script: Script) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            input: Some(input),
            output: Some(output),
            required_ops: vec![Operator::FullyConnected],
            scratch_bytes: 0,
            script,
            fail_allocation: None,
            fail_invoke_at: None,
            loads: Cell::new(0),
            allocations: Cell::new(0),
            invocations: Cell::new(0),
        }
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    /// Report no input tensor after allocation
    pub fn without_input(mut self) -> Self {
        self.input = None;
        self
    }

    /// Report no output tensor after allocation
    pub fn without_output(mut self) -> Self {
        self.output = None;
        self
    }

    /// Replace the operators the model needs
    pub fn requiring(mut self, ops: &[Operator]) -> Self {
        self.required_ops = ops.to_vec();
        self
    }

    /// Extra arena bytes taken by intermediate buffers
    pub fn with_scratch(mut self, bytes: usize) -> Self {
        self.scratch_bytes = bytes;
        self
    }

    pub fn failing_allocation(mut self, reason: impl Into<String>) -> Self {
        self.fail_allocation = Some(reason.into());
        self
    }

    /// Fail the `n`-th invocation (0-based)
    pub fn failing_invoke_at(mut self, n: usize) -> Self {
        self.fail_invoke_at = Some(n);
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.get()
    }

    pub fn invoke_count(&self) -> usize {
        self.invocations.get()
    }
}

impl Runtime for ScriptedRuntime {
    type Interpreter<'a> = ScriptedInterpreter<'a>;

    fn name(&self) -> &str {
        "scripted"
    }

    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn load<'a>(
        &'a self,
        model: ModelArtifact<'a>,
        resolver: OpResolver,
        arena: MemoryArena<'a>,
    ) -> Result<ScriptedInterpreter<'a>> {
        self.loads.set(self.loads.get() + 1);
        if model.schema_version() != self.schema_version {
            return Err(EngineError::SchemaMismatch {
                expected: self.schema_version,
                got: model.schema_version(),
            });
        }

        Ok(ScriptedInterpreter {
            runtime: self,
            resolver,
            arena,
            input: None,
            output: None,
            allocated: false,
            cursor: 0,
            invocations: 0,
            last_input: None,
        })
    }
}

/// Interpreter produced by [`ScriptedRuntime`]
#[derive(Debug)]
pub struct ScriptedInterpreter<'a> {
    runtime: &'a ScriptedRuntime,
    resolver: OpResolver,
    arena: MemoryArena<'a>,
    input: Option<TensorHandle>,
    output: Option<TensorHandle>,
    allocated: bool,
    cursor: usize,
    invocations: usize,
    last_input: Option<i32>,
}

impl<'a> ScriptedInterpreter<'a> {
    /// Invocations made through this interpreter
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    /// Quantized input seen by the most recent invocation
    pub fn last_input(&self) -> Option<i32> {
        self.last_input
    }

    fn place(
        &mut self,
        role: TensorRole,
        spec: Option<TensorSpec>,
    ) -> Result<Option<TensorHandle>> {
        let Some(spec) = spec else {
            return Ok(None);
        };
        let region = self.arena.allocate(spec.byte_len(), DEFAULT_ALIGNMENT)?;
        Ok(Some(TensorHandle {
            role,
            index: 0,
            spec,
            region,
        }))
    }
}

impl Interpreter for ScriptedInterpreter<'_> {
    fn allocate_tensors(&mut self) -> Result<()> {
        let runtime = self.runtime;
        runtime.allocations.set(runtime.allocations.get() + 1);

        if let Some(reason) = &runtime.fail_allocation {
            return Err(EngineError::AllocationFailed(reason.clone()));
        }
        self.resolver.resolve_all(&runtime.required_ops)?;

        self.arena.reset();
        self.allocated = false;
        self.input = self.place(TensorRole::Input, runtime.input)?;
        self.output = self.place(TensorRole::Output, runtime.output)?;
        if runtime.scratch_bytes > 0 {
            self.arena.allocate(runtime.scratch_bytes, DEFAULT_ALIGNMENT)?;
        }
        self.allocated = true;
        Ok(())
    }

    fn input(&self, index: usize) -> Option<TensorHandle> {
        self.input.filter(|_| index == 0)
    }

    fn output(&self, index: usize) -> Option<TensorHandle> {
        self.output.filter(|_| index == 0)
    }

    fn tensor_data(&self, handle: &TensorHandle) -> Result<&[u8]> {
        if !self.allocated {
            return Err(EngineError::TensorsNotAllocated);
        }
        self.arena.slice(handle.region)
    }

    fn tensor_data_mut(&mut self, handle: &TensorHandle) -> Result<&mut [u8]> {
        if !self.allocated {
            return Err(EngineError::TensorsNotAllocated);
        }
        self.arena.slice_mut(handle.region)
    }

    fn invoke(&mut self) -> Result<()> {
        if !self.allocated {
            return Err(EngineError::TensorsNotAllocated);
        }
        let runtime = self.runtime;
        let n = self.invocations;
        self.invocations += 1;
        runtime.invocations.set(runtime.invocations.get() + 1);

        if runtime.fail_invoke_at == Some(n) {
            return Err(EngineError::InvokeFailed(format!(
                "scripted failure at invocation {}",
                n
            )));
        }

        let q_in = match self.input {
            Some(input) => self.read_element(&input, 0)?,
            None => 0,
        };
        self.last_input = Some(q_in);

        let q_out = match &runtime.script {
            Script::Map(f) => f(q_in),
            Script::Sequence(values) => {
                let value = values.get(self.cursor).copied().ok_or_else(|| {
                    EngineError::InvokeFailed(format!(
                        "script exhausted after {} outputs",
                        values.len()
                    ))
                })?;
                self.cursor += 1;
                value
            }
        };

        if let Some(output) = self.output {
            self.write_element(&output, 0, q_out)?;
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
    use microcheck_quant::{QuantParams, TensorType};

    fn spec() -> TensorSpec {
        TensorSpec::scalar(TensorType::Int8, QuantParams::new(0.1, 0).unwrap())
    }

    fn resolver() -> OpResolver {
        let mut resolver = OpResolver::with_capacity(1);
        resolver.add_fully_connected().unwrap();
        resolver
    }

    #[test]
    fn test_map_script() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = ScriptedRuntime::new(spec(), spec(), Script::map(|q| q * 2));
        let mut buf = [0u8; 64];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        interp.allocate_tensors().unwrap();

        let input = interp.input(0).unwrap();
        let output = interp.output(0).unwrap();
        interp.write_element(&input, 0, 21).unwrap();
        interp.invoke().unwrap();

        assert_eq!(interp.read_element(&output, 0).unwrap(), 42);
        assert_eq!(interp.last_input(), Some(21));
        assert_eq!(runtime.invoke_count(), 1);
        assert!(interp.input(1).is_none());
    }

    #[test]
    fn test_sequence_exhausted() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = ScriptedRuntime::new(spec(), spec(), Script::sequence([5]));
        let mut buf = [0u8; 64];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        interp.allocate_tensors().unwrap();
        interp.invoke().unwrap();
        assert!(matches!(interp.invoke(), Err(EngineError::InvokeFailed(_))));
    }

    #[test]
    fn test_invoke_before_allocate() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = ScriptedRuntime::new(spec(), spec(), Script::identity());
        let mut buf = [0u8; 64];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        assert!(matches!(
            interp.invoke(),
            Err(EngineError::TensorsNotAllocated)
        ));
    }

    #[test]
    fn test_scratch_exhausts_arena() {
        let blob = ModelHeader::new(SCHEMA_VERSION).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime =
            ScriptedRuntime::new(spec(), spec(), Script::identity()).with_scratch(4096);
        let mut buf = [0u8; 256];

        let mut interp = runtime
            .load(model, resolver(), MemoryArena::new(&mut buf))
            .unwrap();
        assert!(matches!(
            interp.allocate_tensors(),
            Err(EngineError::ArenaExhausted { requested: 4096, .. })
        ));
    }

    #[test]
    fn test_schema_mismatch_on_load() {
        let blob = ModelHeader::new(1).encode().unwrap();
        let model = ModelArtifact::parse(&blob).unwrap();
        let runtime = ScriptedRuntime::new(spec(), spec(), Script::identity());
        let mut buf = [0u8; 64];

        assert!(matches!(
            runtime.load(model, resolver(), MemoryArena::new(&mut buf)),
            Err(EngineError::SchemaMismatch { expected: 3, got: 1 })
        ));
    }
}
