//! Runtime values for the Push machine.
//!
//! # Ownership
//!
//! Every `Value` lives in the heap of a `SharedCollector`. Stacks, bindings
//! and configuration only hold `ValueRef` handles into that heap. The
//! collector is the single owner: a value stays alive while it is reachable
//! from a registered interpreter and is reclaimed by the next collection
//! otherwise.
//!
//! `ValueRef` is generational. Once a slot is swept its generation moves on,
//! so a leftover handle resolves to nothing instead of to whatever value later
//! reused the slot.

use std::fmt;
use std::sync::Arc;

pub use push_ir::{Name, ValueKind};

use crate::instruction::Instruction;

/// Handle to a value owned by a collector's heap.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ValueRef {
    index: u32,
    generation: u32,
}

impl ValueRef {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        ValueRef { index, generation }
    }

    /// Heap slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueRef({}v{})", self.index, self.generation)
    }
}

/// Ordered sequence of child values: the program-as-data form.
///
/// The sequence is persistent. Cloning shares storage, and `prepend`
/// produces a new sequence without touching the original, so any number of
/// independent traversals can run over the same code value.
#[derive(Clone, PartialEq, Eq)]
pub struct Code(Arc<[ValueRef]>);

impl Code {
    /// Build a code sequence from its children, front to back.
    pub fn new(children: impl Into<Arc<[ValueRef]>>) -> Self {
        Code(children.into())
    }

    /// The empty program.
    pub fn empty() -> Self {
        Code(Arc::from(Vec::new()))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Child at `index`, front first.
    pub fn get(&self, index: usize) -> Option<ValueRef> {
        self.0.get(index).copied()
    }

    /// First child.
    pub fn first(&self) -> Option<ValueRef> {
        self.0.first().copied()
    }

    /// Iterate children front to back.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ValueRef> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    /// A new sequence with `child` in front of the existing children.
    #[must_use]
    pub fn prepend(&self, child: ValueRef) -> Code {
        let mut children = Vec::with_capacity(self.0.len() + 1);
        children.push(child);
        children.extend_from_slice(&self.0);
        Code(children.into())
    }

    /// A new sequence without the first child.
    #[must_use]
    pub fn rest(&self) -> Code {
        match self.0.split_first() {
            Some((_, rest)) => Code(rest.into()),
            None => Code::empty(),
        }
    }

    pub(crate) fn as_slice(&self) -> &[ValueRef] {
        &self.0
    }
}

impl Default for Code {
    fn default() -> Self {
        Code::empty()
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<ValueRef> for Code {
    fn from_iter<I: IntoIterator<Item = ValueRef>>(iter: I) -> Self {
        Code(iter.into_iter().collect())
    }
}

/// A Push value.
#[derive(Clone)]
pub enum Value {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Real(f64),
    /// Interned symbol. Resolved through bindings when executed.
    Name(Name),
    /// Program fragment; executing it schedules its children.
    Code(Code),
    /// Registered native operation.
    Instruction(Instruction),
}

impl Value {
    /// Kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Real(_) => ValueKind::Real,
            Value::Name(_) => ValueKind::Name,
            Value::Code(_) => ValueKind::Code,
            Value::Instruction(_) => ValueKind::Instruction,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    #[inline]
    pub fn as_name(&self) -> Option<Name> {
        match self {
            Value::Name(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Value::Code(c) => Some(c),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Shallow equality: code values compare by child handles, instructions
    /// by name and operation identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Name(a), Value::Name(b)) => a == b,
            (Value::Code(a), Value::Code(b)) => a == b,
            (Value::Instruction(a), Value::Instruction(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Real(r) => write!(f, "Real({r:?})"),
            Value::Name(n) => write!(f, "Name({})", n.raw()),
            Value::Code(c) => write!(f, "Code({c:?})"),
            Value::Instruction(i) => write!(f, "Instruction({})", i.name().raw()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<Code> for Value {
    fn from(c: Code) -> Self {
        Value::Code(c)
    }
}

#[cfg(test)]
mod tests;
