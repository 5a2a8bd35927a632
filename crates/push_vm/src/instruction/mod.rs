//! Native instructions and the per-interpreter instruction table.
//!
//! An instruction is a capability object with a single `apply` operation.
//! Anything an instruction needs beyond the machine (counters, buffers, host
//! handles) is captured by the object itself, and released when the last
//! reference to it goes away.

use std::fmt;
use std::sync::Arc;

use push_ir::Name;
use rustc_hash::FxHashMap;

use crate::interpreter::Machine;

/// A native operation callable from Push code.
///
/// Operations may read and write any stack, redefine bindings, or schedule
/// more work on the exec stack. They run to completion; interrupts are only
/// observed between steps.
pub trait NativeOp: Send + Sync {
    /// Apply the operation to the machine.
    fn apply(&self, machine: &mut Machine);
}

impl<F> NativeOp for F
where
    F: Fn(&mut Machine) + Send + Sync,
{
    fn apply(&self, machine: &mut Machine) {
        self(machine);
    }
}

/// Shared handle to a native operation.
pub type SharedOp = Arc<dyn NativeOp>;

/// A registered instruction: its interned name plus the operation.
#[derive(Clone)]
pub struct Instruction {
    name: Name,
    op: SharedOp,
}

impl Instruction {
    /// Create an instruction from an operation.
    pub fn new(name: Name, op: impl NativeOp + 'static) -> Self {
        Instruction {
            name,
            op: Arc::new(op),
        }
    }

    /// Create an instruction sharing an existing operation.
    pub fn from_shared(name: Name, op: SharedOp) -> Self {
        Instruction { name, op }
    }

    /// Interned name in the owning interpreter.
    pub fn name(&self) -> Name {
        self.name
    }

    /// The underlying operation.
    pub fn op(&self) -> &SharedOp {
        &self.op
    }

    /// Invoke the operation.
    #[inline]
    pub fn apply(&self, machine: &mut Machine) {
        self.op.apply(machine);
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.op, &other.op)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Instruction table keyed by interned name.
#[derive(Default)]
pub struct InstructionTable {
    entries: FxHashMap<Name, Instruction>,
}

impl InstructionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instruction` under its name.
    ///
    /// Returns the entry it replaced, if any. Dropping that entry releases
    /// whatever its operation captured once no value refers to it anymore.
    pub fn register(&mut self, instruction: Instruction) -> Option<Instruction> {
        self.entries.insert(instruction.name, instruction)
    }

    /// Look up an instruction by name.
    pub fn get(&self, name: Name) -> Option<&Instruction> {
        self.entries.get(&name)
    }

    /// Whether an instruction is registered under `name`.
    pub fn contains(&self, name: Name) -> bool {
        self.entries.contains_key(&name)
    }

    /// Iterate over all registered instructions.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Only done at interpreter teardown.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for InstructionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionTable")
            .field("len", &self.entries.len())
            .finish()
    }
}
