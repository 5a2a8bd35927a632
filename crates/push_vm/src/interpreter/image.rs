//! Conversion between heap values and detached trees.
//!
//! `image` and `restore` are the whole-machine snapshot boundary used by
//! state serialization. `restore` validates and allocates everything before
//! touching the machine, so a rejected image leaves the interpreter exactly
//! as it was.

use super::{Interpreter, Machine};
use crate::errors::{VmError, VmResult};
use crate::recursion::ensure_sufficient_stack;
use crate::stack::{Stack, StackKind, Stacks};
use crate::symbols::SymbolTable;
use crate::tree::{MachineImage, ValueTree};
use crate::value::{Code, Value, ValueRef};

impl Machine {
    /// Detach the value behind `r`.
    ///
    /// `None` if `r` or any descendant is stale.
    pub fn tree(&self, r: ValueRef) -> Option<ValueTree> {
        ensure_sufficient_stack(|| {
            Some(match self.value(r)? {
                Value::Bool(b) => ValueTree::Bool(b),
                Value::Int(n) => ValueTree::Int(n),
                Value::Real(x) => ValueTree::Real(x),
                Value::Name(name) => ValueTree::Name(self.name_text(name).to_owned()),
                Value::Instruction(instruction) => {
                    ValueTree::Instruction(self.name_text(instruction.name()).to_owned())
                }
                Value::Code(code) => ValueTree::Code(
                    code.iter()
                        .map(|child| self.tree(child))
                        .collect::<Option<Vec<_>>>()?,
                ),
            })
        })
    }

    /// Allocate a tree in this machine.
    ///
    /// Names are interned here; instruction leaves must name an instruction
    /// registered in this machine. The result is unrooted until stored.
    pub fn alloc_tree(&mut self, tree: &ValueTree) -> VmResult<ValueRef> {
        ensure_sufficient_stack(|| {
            let value = match tree {
                ValueTree::Bool(b) => Value::Bool(*b),
                ValueTree::Int(n) => Value::Int(*n),
                ValueTree::Real(x) => Value::Real(*x),
                ValueTree::Name(text) => Value::Name(self.try_intern(text)?),
                ValueTree::Instruction(text) => {
                    let instruction = self.instruction_named(text).cloned().ok_or_else(|| {
                        VmError::UnknownInstruction { name: text.clone() }
                    })?;
                    Value::Instruction(instruction)
                }
                ValueTree::Code(children) => Value::Code(
                    children
                        .iter()
                        .map(|child| self.alloc_tree(child))
                        .collect::<VmResult<Code>>()?,
                ),
            };
            Ok(self.alloc(value))
        })
    }

    /// Allocate a tree and push it onto `kind`.
    pub fn push_tree(&mut self, kind: StackKind, tree: &ValueTree) -> VmResult<ValueRef> {
        let r = self.alloc_tree(tree)?;
        self.push(kind, r);
        Ok(r)
    }

    /// Detached copy of the stacks, bindings and configuration.
    ///
    /// Stale entries are skipped with a warning.
    pub fn image(&self) -> MachineImage {
        let mut image = MachineImage::new();
        for kind in StackKind::ALL {
            let items = image.stack_mut(kind);
            for r in self.stack(kind).iter() {
                match self.tree(r) {
                    Some(tree) => items.push(tree),
                    None => tracing::warn!(stack = %kind, ?r, "stale stack entry skipped"),
                }
            }
        }
        for (name, r) in self.bindings.iter() {
            let text = self.name_text(name);
            match self.tree(r) {
                Some(tree) => {
                    image.bindings.insert(text.to_owned(), tree);
                }
                None => tracing::warn!(name = text, "stale binding skipped"),
            }
        }
        for (key, r) in self.config.iter() {
            let text = self.name_text(key);
            match self.tree(r) {
                Some(tree) => {
                    image.config.insert(text.to_owned(), tree);
                }
                None => tracing::warn!(key = text, "stale config entry skipped"),
            }
        }
        image
    }

    /// Replace stacks, bindings and configuration with `image`.
    ///
    /// Instructions, hooks and user data are kept. On error nothing changes.
    #[tracing::instrument(level = "debug", skip_all, fields(id = ?self.id))]
    pub fn restore(&mut self, image: &MachineImage) -> VmResult<()> {
        for tree in image.trees() {
            if let Err(err) = self.check_instructions(tree) {
                tracing::warn!(%err, "image rejected");
                return Err(err);
            }
        }

        let mut stacks = Stacks::new();
        for kind in StackKind::ALL {
            let stack = image
                .stack(kind)
                .iter()
                .map(|tree| self.alloc_tree(tree))
                .collect::<VmResult<Stack>>()?;
            stacks.replace(kind, stack);
        }

        let mut bindings = SymbolTable::new();
        for (text, tree) in &image.bindings {
            let name = self.try_intern(text)?;
            let r = self.alloc_tree(tree)?;
            if self.resolves_back_to(&bindings, name, r) {
                return Err(VmError::SelfReferentialBinding { name: text.clone() });
            }
            bindings.insert(name, r);
        }

        let mut config = SymbolTable::new();
        for (text, tree) in &image.config {
            let key = self.try_intern(text)?;
            let r = self.alloc_tree(tree)?;
            config.insert(key, r);
        }

        self.stacks = stacks;
        self.bindings = bindings;
        self.config = config;
        tracing::debug!(
            bindings = self.bindings.len(),
            config = self.config.len(),
            "machine restored"
        );
        Ok(())
    }

    fn check_instructions(&self, tree: &ValueTree) -> VmResult<()> {
        ensure_sufficient_stack(|| match tree {
            ValueTree::Instruction(text) if !self.has_instruction(text) => {
                Err(VmError::UnknownInstruction { name: text.clone() })
            }
            ValueTree::Code(children) => children
                .iter()
                .try_for_each(|child| self.check_instructions(child)),
            _ => Ok(()),
        })
    }
}

impl Interpreter {
    /// Detached copy of the machine state.
    pub fn image(&self) -> MachineImage {
        self.with(|machine| machine.image())
    }

    /// Replace the machine state with `image`, all or nothing.
    pub fn restore(&self, image: &MachineImage) -> VmResult<()> {
        self.with(|machine| machine.restore(image))
    }

    /// Allocate `tree` and push it onto `kind`.
    pub fn push_tree(&self, kind: StackKind, tree: &ValueTree) -> VmResult<ValueRef> {
        self.with(|machine| machine.push_tree(kind, tree))
    }
}
