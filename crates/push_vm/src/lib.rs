//! Push VM - an embeddable virtual machine for the Push language.
//!
//! # Architecture
//!
//! - `Interpreter`: owning host handle; `run`, `step`, `interrupt`, state
//!   import and export
//! - `Machine`: the execution state behind the handle, handed to native
//!   operations, interrupt handlers and step hooks
//! - `SharedCollector`: mark-and-sweep heap shared by any number of
//!   interpreters
//! - `InstructionTable` / `NativeOp`: per-interpreter native operations
//! - `ValueTree` / `MachineImage`: heap-independent copies used at the
//!   snapshot boundary
//!
//! # Example
//!
//! ```
//! use push_vm::{Interpreter, StackKind, ValueTree};
//!
//! let interp = Interpreter::new();
//! let program = ValueTree::Code(vec![
//!     ValueTree::Int(2),
//!     ValueTree::Int(3),
//!     ValueTree::instruction("INTEGER.+"),
//! ]);
//! interp.push_tree(StackKind::Exec, &program).unwrap();
//! interp.run(0);
//!
//! let image = interp.image();
//! assert_eq!(image.stack(StackKind::Integer), &[ValueTree::Int(5)]);
//! ```

pub mod builtins;
mod errors;
mod gc;
mod instruction;
mod interpreter;
mod recursion;
mod stack;
mod symbols;
mod tree;
mod value;

pub use errors::{VmError, VmResult};
pub use gc::{CollectStats, SharedCollector, GC_THRESHOLD};
pub use instruction::{Instruction, InstructionTable, NativeOp, SharedOp};
pub use interpreter::{
    keys, Interpreter, InterpreterBuilder, InterruptHandle, InterruptHandler, Machine, MachineId,
    StepControl, StepHook, StepOutcome,
};
pub use push_ir::{InternError, Name, NameInterner, ValueKind};
pub use recursion::ensure_sufficient_stack;
pub use stack::{Stack, StackKind, Stacks};
pub use symbols::SymbolTable;
pub use tree::{MachineImage, ValueTree};
pub use value::{Code, Value, ValueRef};
