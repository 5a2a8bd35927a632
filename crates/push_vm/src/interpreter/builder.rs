//! Interpreter construction.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use push_ir::NameInterner;

use super::{
    Interpreter, InterruptHandle, InterruptHandler, Machine, MachineId, StepControl, StepHook,
};
use crate::builtins;
use crate::gc::SharedCollector;
use crate::instruction::InstructionTable;
use crate::stack::Stacks;
use crate::symbols::SymbolTable;

/// Builder for [`Interpreter`].
///
/// # Example
///
/// ```
/// use push_vm::{Interpreter, SharedCollector};
///
/// let collector = SharedCollector::new();
/// let interp = Interpreter::builder()
///     .collector(collector.clone())
///     .seed(7)
///     .build();
/// assert_eq!(collector.interpreter_count(), 1);
/// assert!(interp.done());
/// ```
#[must_use = "builders do nothing until `build` is called"]
pub struct InterpreterBuilder {
    pub(super) default_config: bool,
    pub(super) default_instructions: bool,
    pub(super) collector: Option<SharedCollector>,
    pub(super) interrupt_handler: Option<InterruptHandler>,
    pub(super) step_hook: Option<StepHook>,
    pub(super) userdata: Option<Box<dyn Any + Send>>,
    pub(super) seed: Option<u64>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            default_config: true,
            default_instructions: true,
            collector: None,
            interrupt_handler: None,
            step_hook: None,
            userdata: None,
            seed: None,
        }
    }

    /// Seed the configuration table with the standard keys (default: on).
    pub fn default_config(mut self, enabled: bool) -> Self {
        self.default_config = enabled;
        self
    }

    /// Register the standard instruction set (default: on).
    pub fn default_instructions(mut self, enabled: bool) -> Self {
        self.default_instructions = enabled;
        self
    }

    /// Share `collector` instead of the process default.
    pub fn collector(mut self, collector: SharedCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Called when a step observes a positive interrupt flag.
    pub fn interrupt_handler(
        mut self,
        handler: impl Fn(&mut Machine, i64) + Send + Sync + 'static,
    ) -> Self {
        self.interrupt_handler = Some(Arc::new(handler));
        self
    }

    /// Called after every step; returning `StepControl::Stop` ends the run.
    pub fn step_hook(
        mut self,
        hook: impl Fn(&mut Machine) -> StepControl + Send + Sync + 'static,
    ) -> Self {
        self.step_hook = Some(Arc::new(hook));
        self
    }

    /// Opaque host data reachable from native operations and callbacks.
    pub fn userdata(mut self, data: impl Any + Send) -> Self {
        self.userdata = Some(Box::new(data));
        self
    }

    /// Deterministic seed for the random instructions.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create the interpreter.
    ///
    /// The machine is registered with its collector and populated while its
    /// lock is held, so a concurrent collection never observes a half-built
    /// root set.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(self) -> Interpreter {
        let collector = self.collector.unwrap_or_else(SharedCollector::global);
        let id = MachineId::next();
        let interrupt = InterruptHandle::default();

        let machine = Machine {
            id,
            stacks: Stacks::new(),
            bindings: SymbolTable::new(),
            config: SymbolTable::new(),
            instructions: InstructionTable::new(),
            names: NameInterner::new(),
            rng: self
                .seed
                .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            interrupt: interrupt.clone(),
            interrupt_handler: self.interrupt_handler,
            step_hook: self.step_hook,
            userdata: self.userdata,
            collector: collector.clone(),
        };
        let machine = Arc::new(Mutex::new(machine));

        {
            let mut guard = machine.lock();
            collector.register(id, &machine);
            if self.default_config {
                guard.seed_default_config();
            }
            if self.default_instructions {
                builtins::register_defaults(&mut guard);
            }
            tracing::debug!(
                ?id,
                instructions = guard.instructions.len(),
                config = guard.config.len(),
                "interpreter created"
            );
        }

        Interpreter {
            id,
            machine,
            interrupt,
            collector,
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
