//! Operations available on every stack.

use super::stack_prefix;
use crate::instruction::NativeOp;
use crate::interpreter::Machine;
use crate::stack::StackKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StackOpKind {
    Dup,
    Pop,
    Swap,
    Flush,
    Equal,
    Depth,
}

impl StackOpKind {
    pub const ALL: [StackOpKind; 6] = [
        StackOpKind::Dup,
        StackOpKind::Pop,
        StackOpKind::Swap,
        StackOpKind::Flush,
        StackOpKind::Equal,
        StackOpKind::Depth,
    ];

    pub const fn suffix(self) -> &'static str {
        match self {
            StackOpKind::Dup => "DUP",
            StackOpKind::Pop => "POP",
            StackOpKind::Swap => "SWAP",
            StackOpKind::Flush => "FLUSH",
            StackOpKind::Equal => "=",
            StackOpKind::Depth => "STACKDEPTH",
        }
    }
}

/// A generic stack operation bound to one stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackOp {
    pub kind: StackKind,
    pub op: StackOpKind,
}

impl StackOp {
    pub fn name(&self) -> String {
        format!("{}.{}", stack_prefix(self.kind), self.op.suffix())
    }
}

impl NativeOp for StackOp {
    fn apply(&self, machine: &mut Machine) {
        let kind = self.kind;
        match self.op {
            StackOpKind::Dup => {
                if let Some(top) = machine.peek(kind) {
                    machine.push(kind, top);
                }
            }
            StackOpKind::Pop => {
                machine.pop(kind);
            }
            StackOpKind::Swap => {
                machine.stack_mut(kind).swap_top();
            }
            StackOpKind::Flush => machine.stack_mut(kind).flush(),
            StackOpKind::Equal => {
                let stack = machine.stack(kind);
                let (Some(a), Some(b)) = (stack.peek_at(1), stack.peek_at(0)) else {
                    return;
                };
                // Structural: two code values with equal contents are equal.
                let equal = match (machine.tree(a), machine.tree(b)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                machine.pop(kind);
                machine.pop(kind);
                machine.push_bool(equal);
            }
            StackOpKind::Depth => {
                let depth = i64::try_from(machine.stack(kind).len()).unwrap_or(i64::MAX);
                machine.push_int(depth);
            }
        }
    }
}
