//! Microcheck Engine Interface
//!
//! The inference engine is an external capability. This crate defines the
//! seams the harness drives it through ([`Runtime`] and [`Interpreter`]),
//! the fixed-capacity [`MemoryArena`] lent to it, the [`OpResolver`] it is
//! bound to, and two in-tree engines: a [`ScriptedRuntime`] mock with
//! scripted outputs and a [`SimulatedRuntime`] that evaluates a transfer
//! function on dequantized values.

mod arena;
mod error;
mod ops;
mod runtime;
mod scripted;
mod simulated;
mod tensor;

pub use arena::{ArenaRegion, MemoryArena, DEFAULT_ALIGNMENT};
pub use error::{EngineError, Result};
pub use ops::{OpResolver, Operator};
pub use runtime::{Interpreter, Runtime};
pub use scripted::{Script, ScriptedInterpreter, ScriptedRuntime};
pub use simulated::{SimulatedInterpreter, SimulatedRuntime};
pub use tensor::{TensorHandle, TensorRole, TensorSpec};
