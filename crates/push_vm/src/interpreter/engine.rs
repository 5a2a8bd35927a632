//! Step and run loop.
//!
//! One step pops the top of the exec stack and dispatches it:
//!
//! | value        | effect                                              |
//! |--------------|-----------------------------------------------------|
//! | boolean      | pushed to the boolean stack                         |
//! | integer      | pushed to the integer stack                         |
//! | real         | pushed to the real stack                            |
//! | name         | bound value pushed to exec, else name to name stack |
//! | code         | children pushed to exec so the first runs next      |
//! | instruction  | native operation invoked                            |
//!
//! After dispatch the step checks the interrupt flag, then consults the step
//! hook. Both are checked even when the exec stack was empty.

use super::{Interpreter, Machine};
use crate::errors::VmError;
use crate::stack::StackKind;
use crate::value::{Value, ValueRef};

/// Step hook verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepControl {
    Continue,
    Stop,
}

/// What one step did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A value was processed and execution may continue.
    Executed,
    /// The exec stack was empty.
    Idle,
    /// An interrupt was pending after the step.
    Interrupted { flag: i64, executed: bool },
    /// The step hook asked to stop.
    Halted { executed: bool },
}

impl StepOutcome {
    /// Whether the step processed a value.
    pub fn executed(self) -> bool {
        match self {
            StepOutcome::Executed => true,
            StepOutcome::Idle => false,
            StepOutcome::Interrupted { executed, .. } | StepOutcome::Halted { executed } => executed,
        }
    }

    /// Whether a run loop should take another step.
    pub fn should_continue(self) -> bool {
        matches!(self, StepOutcome::Executed)
    }
}

impl Machine {
    /// Execute one value from the exec stack.
    pub fn step(&mut self) -> StepOutcome {
        let popped = self.pop(StackKind::Exec);
        if let Some(r) = popped {
            self.dispatch(r);
        }
        let executed = popped.is_some();

        let flag = self.interrupt.get();
        if flag != 0 {
            if flag > 0 {
                if let Some(handler) = self.interrupt_handler.clone() {
                    handler(self, flag);
                }
            }
            return StepOutcome::Interrupted { flag, executed };
        }

        if let Some(hook) = self.step_hook.clone() {
            if hook(self) == StepControl::Stop {
                return StepOutcome::Halted { executed };
            }
        }

        if executed {
            StepOutcome::Executed
        } else {
            StepOutcome::Idle
        }
    }

    /// Step until the exec stack empties, an interrupt arrives, the hook
    /// stops, or `max_steps` values were processed. `max_steps <= 0` means
    /// no limit.
    ///
    /// Clears any pending interrupt first. Returns the number of values
    /// processed, counting the one whose step was interrupted or halted.
    /// Garbage collection may run between steps.
    pub fn run(&mut self, max_steps: i64) -> u64 {
        self.interrupt.clear();
        let limit = u64::try_from(max_steps).ok().filter(|&n| n > 0);

        let mut executed = 0u64;
        loop {
            if limit.is_some_and(|limit| executed >= limit) {
                break;
            }
            let outcome = self.step();
            if outcome.executed() {
                executed += 1;
            }
            if !outcome.should_continue() {
                tracing::debug!(?outcome, executed, "run stopped");
                break;
            }
            self.collect(false);
        }
        executed
    }

    fn dispatch(&mut self, r: ValueRef) {
        let Some(value) = self.value(r) else {
            let err = VmError::UnknownValueKind(r);
            tracing::warn!(%err, "skipping exec entry");
            return;
        };
        tracing::trace!(kind = %value.kind(), "dispatch");

        match value {
            Value::Bool(_) => self.push(StackKind::Boolean, r),
            Value::Int(_) => self.push(StackKind::Integer, r),
            Value::Real(_) => self.push(StackKind::Real, r),
            Value::Name(name) => match self.bindings.get(name) {
                Some(bound) => self.push(StackKind::Exec, bound),
                None => self.push(StackKind::Name, r),
            },
            Value::Code(code) => {
                let exec = self.stacks.get_mut(StackKind::Exec);
                for child in code.iter().rev() {
                    exec.push(child);
                }
            }
            Value::Instruction(instruction) => instruction.apply(self),
        }
    }
}

impl Interpreter {
    /// Execute one step under the execution lock.
    pub fn step(&self) -> StepOutcome {
        self.with(Machine::step)
    }

    /// Run until done, interrupted, halted, or `max_steps` values were
    /// processed (`max_steps <= 0`: unbounded).
    ///
    /// Holds the execution lock for the whole run. Other threads may still
    /// call [`Interpreter::interrupt`].
    #[tracing::instrument(level = "debug", skip(self), fields(id = ?self.id))]
    pub fn run(&self, max_steps: i64) -> u64 {
        self.with(|machine| machine.run(max_steps))
    }
}

#[cfg(test)]
mod tests;
