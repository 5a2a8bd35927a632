//! Push interpreter.
//!
//! # Architecture
//!
//! - [`Machine`] is the execution state: six stacks, bindings, configuration,
//!   instruction table, name arena, random stream, hooks and user data.
//!   Native operations receive `&mut Machine`.
//! - [`Interpreter`] is the owning host handle. It keeps the machine behind
//!   the execution lock and the interrupt flag outside it, so `interrupt` never
//!   waits on a running `run`.
//!
//! Every value a machine creates is tracked by its [`SharedCollector`]. The
//! machine's stacks, bindings and configuration are the collector's roots.
//! A handle held anywhere else (a local in a native operation, a host
//! variable) is only safe while the machine lock is held or after the value
//! has been stored in a root.

mod builder;
mod config;
mod copy;
mod engine;
mod image;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use push_ir::{Name, NameInterner, ValueKind};
use rustc_hash::FxHashSet;

use crate::errors::{VmError, VmResult};
use crate::gc::{CollectStats, SharedCollector};
use crate::instruction::{Instruction, InstructionTable, NativeOp};
use crate::stack::{Stack, StackKind, Stacks};
use crate::symbols::SymbolTable;
use crate::value::{Code, Value, ValueRef};

pub use builder::InterpreterBuilder;
pub use config::keys;
pub use engine::{StepControl, StepOutcome};

/// Callback invoked when a step observes a positive interrupt flag.
pub type InterruptHandler = Arc<dyn Fn(&mut Machine, i64) + Send + Sync>;

/// Callback consulted after every step; `Stop` ends the current run.
pub type StepHook = Arc<dyn Fn(&mut Machine) -> StepControl + Send + Sync>;

/// Process-unique interpreter identity.
///
/// Also fixes the order in which a collector locks interpreters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineId(u64);

impl MachineId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MachineId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Shared interrupt flag.
///
/// 0 means no interrupt. A positive flag is delivered to the interrupt
/// handler; a negative flag stops the run silently. Writes never block, and
/// take effect at the next step boundary.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle(Arc<AtomicI64>);

impl InterruptHandle {
    /// Request that the running loop stop with `flag`.
    pub fn interrupt(&self, flag: i64) {
        self.0.store(flag, Ordering::Release);
    }

    /// Currently pending flag.
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Execution state of one interpreter.
pub struct Machine {
    id: MachineId,
    stacks: Stacks,
    bindings: SymbolTable,
    config: SymbolTable,
    instructions: InstructionTable,
    names: NameInterner,
    rng: fastrand::Rng,
    interrupt: InterruptHandle,
    interrupt_handler: Option<InterruptHandler>,
    step_hook: Option<StepHook>,
    userdata: Option<Box<dyn Any + Send>>,
    collector: SharedCollector,
}

impl Machine {
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// The collector that owns this machine's values.
    pub fn collector(&self) -> &SharedCollector {
        &self.collector
    }

    // Names

    /// Intern `text` in this machine's arena.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32` capacity; see `try_intern`.
    pub fn intern(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    pub fn try_intern(&mut self, text: &str) -> VmResult<Name> {
        Ok(self.names.try_intern(text)?)
    }

    /// Text of a name interned here.
    pub fn name_text(&self, name: Name) -> &str {
        self.names.lookup(name)
    }

    pub fn names(&self) -> &NameInterner {
        &self.names
    }

    // Values

    /// Create a value owned by this machine's collector.
    pub fn alloc(&self, value: Value) -> ValueRef {
        self.collector.track_owned(value, self.id)
    }

    /// Resolve a handle. `None` if it is stale.
    pub fn value(&self, r: ValueRef) -> Option<Value> {
        self.collector.get(r)
    }

    /// Kind of the value behind a handle.
    pub fn kind(&self, r: ValueRef) -> Option<ValueKind> {
        self.collector.kind(r)
    }

    /// Children of a code value.
    pub fn code(&self, r: ValueRef) -> Option<Code> {
        match self.value(r)? {
            Value::Code(code) => Some(code),
            _ => None,
        }
    }

    // Stacks

    pub fn stacks(&self) -> &Stacks {
        &self.stacks
    }

    pub fn stack(&self, kind: StackKind) -> &Stack {
        self.stacks.get(kind)
    }

    pub fn stack_mut(&mut self, kind: StackKind) -> &mut Stack {
        self.stacks.get_mut(kind)
    }

    #[inline]
    pub fn push(&mut self, kind: StackKind, r: ValueRef) {
        self.stacks.get_mut(kind).push(r);
    }

    #[inline]
    pub fn pop(&mut self, kind: StackKind) -> Option<ValueRef> {
        self.stacks.get_mut(kind).pop()
    }

    #[inline]
    pub fn peek(&self, kind: StackKind) -> Option<ValueRef> {
        self.stacks.get(kind).peek()
    }

    /// Allocate `value` and push it.
    pub fn push_value(&mut self, kind: StackKind, value: Value) -> ValueRef {
        let r = self.alloc(value);
        self.push(kind, r);
        r
    }

    pub fn push_bool(&mut self, b: bool) {
        self.push_value(StackKind::Boolean, Value::Bool(b));
    }

    pub fn push_int(&mut self, n: i64) {
        self.push_value(StackKind::Integer, Value::Int(n));
    }

    pub fn push_real(&mut self, r: f64) {
        self.push_value(StackKind::Real, Value::Real(r));
    }

    pub fn push_name(&mut self, name: Name) {
        self.push_value(StackKind::Name, Value::Name(name));
    }

    /// Pop the top of `kind` if `extract` accepts its value.
    ///
    /// Leaves the stack untouched when it is empty or the top does not
    /// match, so native operations can fail soft.
    fn pop_with<T>(&mut self, kind: StackKind, extract: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let top = self.peek(kind)?;
        let out = extract(&self.value(top)?)?;
        self.pop(kind);
        Some(out)
    }

    pub fn pop_bool(&mut self) -> Option<bool> {
        self.pop_with(StackKind::Boolean, Value::as_bool)
    }

    pub fn pop_int(&mut self) -> Option<i64> {
        self.pop_with(StackKind::Integer, Value::as_int)
    }

    pub fn pop_real(&mut self) -> Option<f64> {
        self.pop_with(StackKind::Real, Value::as_real)
    }

    pub fn pop_name(&mut self) -> Option<Name> {
        self.pop_with(StackKind::Name, Value::as_name)
    }

    /// Flush all six stacks and remove every binding.
    ///
    /// Configuration and instructions are kept.
    pub fn reset(&mut self) {
        self.stacks.flush_all();
        self.bindings.clear();
    }

    /// Whether the exec stack is empty.
    pub fn done(&self) -> bool {
        self.stacks.get(StackKind::Exec).is_empty()
    }

    // Bindings

    /// Bind `name` to `value`, replacing any previous binding.
    ///
    /// Rejected when following name-to-name bindings from `value` leads back
    /// to `name`, since executing the name would then expand forever. Code
    /// that mentions its own name is accepted: that recursion consumes steps
    /// and stays interruptible.
    pub fn define(&mut self, name: Name, value: ValueRef) -> VmResult<()> {
        if !self.names.contains(name) {
            tracing::warn!(?name, "define with a name from another interpreter");
            return Err(VmError::invalid_argument(format!(
                "{name:?} was not interned by this interpreter"
            )));
        }
        if self.value(value).is_none() {
            tracing::warn!(name = self.name_text(name), "define with stale value handle");
            return Err(VmError::StaleValue(value));
        }
        if self.resolves_back_to(&self.bindings, name, value) {
            let err = VmError::SelfReferentialBinding {
                name: self.name_text(name).to_owned(),
            };
            tracing::warn!(%err, "binding rejected");
            return Err(err);
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    /// Remove a binding if present.
    pub fn undefine(&mut self, name: Name) {
        self.bindings.remove(name);
    }

    pub fn lookup(&self, name: Name) -> Option<ValueRef> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> &SymbolTable {
        &self.bindings
    }

    /// Whether resolving `value` through `table` reaches `name` again.
    fn resolves_back_to(&self, table: &SymbolTable, name: Name, value: ValueRef) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = value;
        loop {
            let Some(Value::Name(target)) = self.value(current) else {
                return false;
            };
            if target == name || !seen.insert(target) {
                return true;
            }
            match table.get(target) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    // Instructions

    /// Register a native operation under `name`, replacing any previous one.
    pub fn register_instruction(&mut self, name: &str, op: impl NativeOp + 'static) -> Option<Instruction> {
        let name = self.intern(name);
        self.instructions.register(Instruction::new(name, op))
    }

    /// Register an already-built instruction under its own name.
    pub fn register(&mut self, instruction: Instruction) -> Option<Instruction> {
        self.instructions.register(instruction)
    }

    pub fn instruction(&self, name: Name) -> Option<&Instruction> {
        self.instructions.get(name)
    }

    /// Look up an instruction by text without interning.
    pub fn instruction_named(&self, name: &str) -> Option<&Instruction> {
        self.names.get(name).and_then(|n| self.instructions.get(n))
    }

    /// Whether an instruction is registered under `name`.
    pub fn has_instruction(&self, name: &str) -> bool {
        self.instruction_named(name).is_some()
    }

    /// Allocate an instruction value for the entry registered under `name`.
    pub fn instruction_value(&self, name: &str) -> Option<ValueRef> {
        let instruction = self.instruction_named(name)?.clone();
        Some(self.alloc(Value::Instruction(instruction)))
    }

    pub fn instructions(&self) -> &InstructionTable {
        &self.instructions
    }

    // Interrupts, hooks, user data

    /// Raise an interrupt from inside the machine (e.g. from a native op).
    pub fn interrupt(&self, flag: i64) {
        self.interrupt.interrupt(flag);
    }

    pub fn interrupt_flag(&self) -> i64 {
        self.interrupt.get()
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn set_interrupt_handler(&mut self, handler: Option<InterruptHandler>) {
        self.interrupt_handler = handler;
    }

    pub fn set_step_hook(&mut self, hook: Option<StepHook>) {
        self.step_hook = hook;
    }

    /// The machine's random stream.
    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    /// Host data attached at construction, if it has type `T`.
    pub fn userdata<T: Any>(&self) -> Option<&T> {
        self.userdata.as_deref().and_then(|data| data.downcast_ref())
    }

    pub fn userdata_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.userdata.as_deref_mut().and_then(|data| data.downcast_mut())
    }

    pub fn set_userdata(&mut self, data: impl Any + Send) {
        self.userdata = Some(Box::new(data));
    }

    // Garbage collection

    /// Collect garbage from inside this machine.
    ///
    /// Safe to call from native operations. Returns `None` if the threshold
    /// was not reached and `force` is false. Interpreters sharing the
    /// collector that are busy are left out of the cycle along with the
    /// values they own.
    pub fn collect(&self, force: bool) -> Option<CollectStats> {
        self.collector.collect_from(self, force)
    }

    /// Push every root handle of this machine.
    pub(crate) fn extend_roots(&self, roots: &mut Vec<ValueRef>) {
        roots.extend(self.stacks.iter_all());
        roots.extend(self.bindings.values());
        roots.extend(self.config.values());
    }

    fn teardown(&mut self) {
        self.stacks.flush_all();
        self.bindings.clear();
        self.config.clear();
        self.instructions.clear();
        self.interrupt_handler = None;
        self.step_hook = None;
        self.userdata = None;
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("stacks", &self.stacks)
            .field("bindings", &self.bindings.len())
            .field("config", &self.config.len())
            .field("instructions", &self.instructions.len())
            .finish_non_exhaustive()
    }
}

/// Owning handle to an interpreter.
///
/// All access to the machine goes through the execution lock, so concurrent
/// `run`, `step`, `with` and state import/export on one interpreter are
/// serialized. `interrupt` is the exception: it writes the flag directly and
/// may be called from any thread while another thread is inside `run`.
///
/// Dropping the handle deregisters the interpreter from its collector and
/// drains its stacks and tables; the values become garbage for the next
/// collection.
pub struct Interpreter {
    id: MachineId,
    machine: Arc<Mutex<Machine>>,
    interrupt: InterruptHandle,
    collector: SharedCollector,
}

impl Interpreter {
    /// Interpreter with default configuration and instructions on the
    /// process default collector.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn collector(&self) -> &SharedCollector {
        &self.collector
    }

    /// Run `f` with exclusive access to the machine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Machine) -> R) -> R {
        f(&mut self.machine.lock())
    }

    /// Like `with`, but gives up instead of waiting if the machine is busy.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut Machine) -> R) -> Option<R> {
        self.machine.try_lock().map(|mut machine| f(&mut machine))
    }

    /// Request termination of the current or next run.
    ///
    /// Does not take the execution lock. The running loop notices at its
    /// next step boundary; native operations in flight are not aborted.
    pub fn interrupt(&self, flag: i64) {
        self.interrupt.interrupt(flag);
    }

    /// A clonable handle for interrupting from other threads.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Whether the exec stack is empty.
    pub fn done(&self) -> bool {
        self.with(|machine| machine.done())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.collector.deregister(self.id);
        self.machine.lock().teardown();
        tracing::debug!(id = ?self.id, "interpreter destroyed");
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
