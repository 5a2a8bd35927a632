//! The six typed stacks of a Push machine.

use std::fmt;

use push_ir::ValueKind;

use crate::value::ValueRef;

/// Which of the six stacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackKind {
    Boolean,
    Integer,
    Real,
    Name,
    Code,
    Exec,
}

impl StackKind {
    /// Number of stacks per machine.
    pub const COUNT: usize = 6;

    /// All stacks, in snapshot order.
    pub const ALL: [StackKind; StackKind::COUNT] = [
        StackKind::Exec,
        StackKind::Code,
        StackKind::Boolean,
        StackKind::Integer,
        StackKind::Real,
        StackKind::Name,
    ];

    /// Stable index for array storage.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            StackKind::Boolean => 0,
            StackKind::Integer => 1,
            StackKind::Real => 2,
            StackKind::Name => 3,
            StackKind::Code => 4,
            StackKind::Exec => 5,
        }
    }

    /// Lower-case name, as written in state documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            StackKind::Boolean => "boolean",
            StackKind::Integer => "integer",
            StackKind::Real => "real",
            StackKind::Name => "name",
            StackKind::Code => "code",
            StackKind::Exec => "exec",
        }
    }

    /// Parse the lower-case name.
    pub fn from_str_opt(s: &str) -> Option<StackKind> {
        StackKind::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// The stack a literal of `kind` is pushed to when executed.
    ///
    /// `Code` and `Instruction` have no literal stack: executing them
    /// expands or invokes instead.
    pub const fn for_literal(kind: ValueKind) -> Option<StackKind> {
        match kind {
            ValueKind::Bool => Some(StackKind::Boolean),
            ValueKind::Int => Some(StackKind::Integer),
            ValueKind::Real => Some(StackKind::Real),
            ValueKind::Name => Some(StackKind::Name),
            ValueKind::Code | ValueKind::Instruction => None,
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LIFO stack of value handles.
///
/// The top is the end of the vector. Popping an empty stack yields `None`;
/// emptiness is ordinary control flow, not an error.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Stack {
    items: Vec<ValueRef>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: ValueRef) {
        self.items.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<ValueRef> {
        self.items.pop()
    }

    /// Top of the stack without removing it.
    #[inline]
    pub fn peek(&self) -> Option<ValueRef> {
        self.items.last().copied()
    }

    /// The `depth`-th element from the top (0 is the top).
    pub fn peek_at(&self, depth: usize) -> Option<ValueRef> {
        let len = self.items.len();
        depth
            .checked_add(1)
            .and_then(|d| len.checked_sub(d))
            .map(|i| self.items[i])
    }

    /// Clear the contents, keeping the allocation.
    pub fn flush(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Swap the two topmost elements. Returns false if there are fewer than two.
    pub fn swap_top(&mut self) -> bool {
        let len = self.items.len();
        if len < 2 {
            return false;
        }
        self.items.swap(len - 1, len - 2);
        true
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ValueRef> + ExactSizeIterator + '_ {
        self.items.iter().copied()
    }

    /// Contents bottom to top.
    pub fn as_slice(&self) -> &[ValueRef] {
        &self.items
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl FromIterator<ValueRef> for Stack {
    fn from_iter<I: IntoIterator<Item = ValueRef>>(iter: I) -> Self {
        Stack {
            items: iter.into_iter().collect(),
        }
    }
}

/// The six stacks of one machine.
#[derive(Clone, Default, Debug)]
pub struct Stacks {
    stacks: [Stack; StackKind::COUNT],
}

impl Stacks {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, kind: StackKind) -> &Stack {
        &self.stacks[kind.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, kind: StackKind) -> &mut Stack {
        &mut self.stacks[kind.index()]
    }

    /// Flush all six stacks.
    pub fn flush_all(&mut self) {
        for stack in &mut self.stacks {
            stack.flush();
        }
    }

    /// Every handle on every stack.
    pub fn iter_all(&self) -> impl Iterator<Item = ValueRef> + '_ {
        self.stacks.iter().flat_map(Stack::iter)
    }

    /// Replace one stack wholesale.
    pub fn replace(&mut self, kind: StackKind, stack: Stack) -> Stack {
        std::mem::replace(&mut self.stacks[kind.index()], stack)
    }
}

#[cfg(test)]
mod tests;
