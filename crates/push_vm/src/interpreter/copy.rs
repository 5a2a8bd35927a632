//! Structural copying between machines.

use super::{Interpreter, InterpreterBuilder, Machine};
use crate::errors::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::recursion::ensure_sufficient_stack;
use crate::stack::{Stack, StackKind};
use crate::value::{Code, Value, ValueRef};

impl Machine {
    /// Copy the value behind `r` into `target`.
    ///
    /// Names are re-interned in the target's arena. Instructions are looked
    /// up in the target by name; if the target has none under that name the
    /// source's operation is registered there.
    pub fn copy_value_to(&self, r: ValueRef, target: &mut Machine) -> VmResult<ValueRef> {
        ensure_sufficient_stack(|| {
            let value = match self.value(r).ok_or(VmError::StaleValue(r))? {
                Value::Name(name) => Value::Name(target.try_intern(self.name_text(name))?),
                Value::Instruction(instruction) => {
                    Value::Instruction(self.copy_instruction_to(&instruction, target)?)
                }
                Value::Code(code) => Value::Code(
                    code.iter()
                        .map(|child| self.copy_value_to(child, target))
                        .collect::<VmResult<Code>>()?,
                ),
                scalar => scalar,
            };
            Ok(target.alloc(value))
        })
    }

    /// Copy one stack into `target`, bottom to top. The target's own stack is
    /// not modified.
    pub fn copy_stack_to(&self, kind: StackKind, target: &mut Machine) -> VmResult<Stack> {
        self.stack(kind)
            .iter()
            .map(|r| self.copy_value_to(r, target))
            .collect()
    }

    fn copy_instruction_to(
        &self,
        instruction: &Instruction,
        target: &mut Machine,
    ) -> VmResult<Instruction> {
        let text = self.name_text(instruction.name());
        if let Some(existing) = target.instruction_named(text) {
            return Ok(existing.clone());
        }
        let name = target.try_intern(text)?;
        let copied = Instruction::from_shared(name, instruction.op().clone());
        target.register(copied.clone());
        Ok(copied)
    }
}

impl Interpreter {
    /// Create an independent interpreter with a copy of this one's state.
    ///
    /// The copy shares the collector, instruction operations, interrupt
    /// handler and step hook; user data is not copied. Stale values are
    /// skipped.
    #[deprecated(note = "use `image` and `restore`, which can cross collectors and threads")]
    pub fn copy(&self) -> Interpreter {
        self.with(|source| {
            let copy = InterpreterBuilder {
                default_config: false,
                default_instructions: false,
                collector: Some(self.collector.clone()),
                interrupt_handler: source.interrupt_handler.clone(),
                step_hook: source.step_hook.clone(),
                userdata: None,
                seed: Some(source.rng.clone().u64(..)),
            }
            .build();

            copy.with(|target| {
                for instruction in source.instructions.iter() {
                    if let Err(err) = source.copy_instruction_to(instruction, target) {
                        tracing::warn!(%err, "instruction not copied");
                    }
                }
                for (key, r) in source.config.iter() {
                    match source.copy_value_to(r, target) {
                        Ok(value) => target.config_set(source.name_text(key), value),
                        Err(err) => tracing::warn!(%err, "config entry not copied"),
                    }
                }
                for (name, r) in source.bindings.iter() {
                    match source.copy_value_to(r, target) {
                        Ok(value) => {
                            let name = target.intern(source.name_text(name));
                            target.bindings.insert(name, value);
                        }
                        Err(err) => tracing::warn!(%err, "binding not copied"),
                    }
                }
                for kind in StackKind::ALL {
                    let stack = source
                        .stack(kind)
                        .iter()
                        .filter_map(|r| source.copy_value_to(r, target).ok())
                        .collect();
                    target.stacks.replace(kind, stack);
                }
            });

            tracing::debug!(from = ?self.id, to = ?copy.id, "interpreter copied");
            copy
        })
    }
}
