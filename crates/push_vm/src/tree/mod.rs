//! Detached value trees and whole-machine images.
//!
//! A `ValueTree` is an owned, heap-independent copy of a value: names and
//! instructions are carried as text, code as nested vectors. Trees compare
//! structurally, move freely between interpreters and threads, and are the
//! currency of state snapshots.

use std::collections::BTreeMap;

use push_ir::ValueKind;

use crate::stack::StackKind;

/// Owned structural form of a value.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueTree {
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(String),
    Code(Vec<ValueTree>),
    Instruction(String),
}

impl ValueTree {
    /// Shorthand for a name leaf.
    pub fn name(text: impl Into<String>) -> Self {
        ValueTree::Name(text.into())
    }

    /// Shorthand for an instruction leaf.
    pub fn instruction(text: impl Into<String>) -> Self {
        ValueTree::Instruction(text.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ValueTree::Bool(_) => ValueKind::Bool,
            ValueTree::Int(_) => ValueKind::Int,
            ValueTree::Real(_) => ValueKind::Real,
            ValueTree::Name(_) => ValueKind::Name,
            ValueTree::Code(_) => ValueKind::Code,
            ValueTree::Instruction(_) => ValueKind::Instruction,
        }
    }

    /// Total number of nodes, counting this one.
    pub fn points(&self) -> usize {
        match self {
            ValueTree::Code(children) => 1 + children.iter().map(ValueTree::points).sum::<usize>(),
            _ => 1,
        }
    }
}

impl From<bool> for ValueTree {
    fn from(b: bool) -> Self {
        ValueTree::Bool(b)
    }
}

impl From<i64> for ValueTree {
    fn from(n: i64) -> Self {
        ValueTree::Int(n)
    }
}

impl From<f64> for ValueTree {
    fn from(r: f64) -> Self {
        ValueTree::Real(r)
    }
}

impl From<Vec<ValueTree>> for ValueTree {
    fn from(children: Vec<ValueTree>) -> Self {
        ValueTree::Code(children)
    }
}

/// Complete detached state of a machine: stacks, bindings, configuration.
///
/// Stacks are listed bottom to top. Maps are ordered by key so images compare
/// and render deterministically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MachineImage {
    stacks: [Vec<ValueTree>; StackKind::COUNT],
    pub bindings: BTreeMap<String, ValueTree>,
    pub config: BTreeMap<String, ValueTree>,
}

impl MachineImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of one stack, bottom to top.
    pub fn stack(&self, kind: StackKind) -> &[ValueTree] {
        &self.stacks[kind.index()]
    }

    pub fn stack_mut(&mut self, kind: StackKind) -> &mut Vec<ValueTree> {
        &mut self.stacks[kind.index()]
    }

    /// Builder-style stack setter.
    #[must_use]
    pub fn with_stack(mut self, kind: StackKind, items: Vec<ValueTree>) -> Self {
        self.stacks[kind.index()] = items;
        self
    }

    /// Builder-style binding setter.
    #[must_use]
    pub fn with_binding(mut self, name: impl Into<String>, value: ValueTree) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    /// Builder-style configuration setter.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: ValueTree) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Every tree in the image: stacks, then bindings, then configuration.
    pub fn trees(&self) -> impl Iterator<Item = &ValueTree> {
        self.stacks
            .iter()
            .flatten()
            .chain(self.bindings.values())
            .chain(self.config.values())
    }
}
