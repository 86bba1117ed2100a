//! Engine capability traits

use microcheck_model::ModelArtifact;

use crate::arena::MemoryArena;
use crate::error::{EngineError, Result};
use crate::ops::OpResolver;
use crate::tensor::TensorHandle;

/// An inference runtime able to bind a model to an arena
pub trait Runtime {
    /// Interpreter borrowing the model bytes and arena for `'a`
    type Interpreter<'a>: Interpreter
    where
        Self: 'a;

    /// Short name for diagnostics
    fn name(&self) -> &str;

    /// Model schema version this runtime understands
    fn schema_version(&self) -> u32;

    /// Bind a model, an operator registry and an arena into an interpreter.
    /// No tensors are allocated yet.
    fn load<'a>(
        &'a self,
        model: ModelArtifact<'a>,
        resolver: OpResolver,
        arena: MemoryArena<'a>,
    ) -> Result<Self::Interpreter<'a>>;
}

/// A loaded model ready for tensor allocation and invocation
pub trait Interpreter {
    /// Plan and place every tensor in the arena
    fn allocate_tensors(&mut self) -> Result<()>;

    /// Input tensor at `index`, if it exists after allocation
    fn input(&self, index: usize) -> Option<TensorHandle>;

    /// Output tensor at `index`, if it exists after allocation
    fn output(&self, index: usize) -> Option<TensorHandle>;

    /// Raw bytes of an allocated tensor
    fn tensor_data(&self, handle: &TensorHandle) -> Result<&[u8]>;

    /// Mutable raw bytes of an allocated tensor
    fn tensor_data_mut(&mut self, handle: &TensorHandle) -> Result<&mut [u8]>;

    /// Run the graph once. Blocks until done.
    fn invoke(&mut self) -> Result<()>;

    /// Arena bytes in use
    fn arena_used(&self) -> usize;

    /// Read one quantized element
    fn read_element(&self, handle: &TensorHandle, index: usize) -> Result<i32> {
        let start = element_start(handle, index)?;
        let data = self.tensor_data(handle)?;
        Ok(handle.dtype().decode(&data[start..])?)
    }

    /// Overwrite one quantized element
    fn write_element(&mut self, handle: &TensorHandle, index: usize, value: i32) -> Result<()> {
        let start = element_start(handle, index)?;
        let data = self.tensor_data_mut(handle)?;
        Ok(handle.dtype().encode(value, &mut data[start..])?)
    }
}

fn element_start(handle: &TensorHandle, index: usize) -> Result<usize> {
    if index >= handle.elements() {
        return Err(EngineError::ElementOutOfRange {
            index,
            len: handle.elements(),
        });
    }
    Ok(index * handle.dtype().width())
}
