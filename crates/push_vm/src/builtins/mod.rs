//! Standard instruction set.
//!
//! Registered under Push3 names. Every instruction is fail-soft: when its
//! operands are missing or unusable (empty stack, zero divisor, wrong kind)
//! it leaves all stacks as they were.
//!
//! The real stack is called `FLOAT` in instruction names.

mod code;
mod logic;
mod numeric;
mod random;
mod stack_ops;

use crate::interpreter::Machine;
use crate::stack::StackKind;

pub use code::CodeOp;
pub use logic::BoolOp;
pub use numeric::{FloatOp, IntOp};
pub use random::RandomOp;
pub use stack_ops::{StackOp, StackOpKind};

/// Instruction-name prefix for a stack.
pub const fn stack_prefix(kind: StackKind) -> &'static str {
    match kind {
        StackKind::Boolean => "BOOLEAN",
        StackKind::Integer => "INTEGER",
        StackKind::Real => "FLOAT",
        StackKind::Name => "NAME",
        StackKind::Code => "CODE",
        StackKind::Exec => "EXEC",
    }
}

/// Register the whole standard set.
pub fn register_defaults(machine: &mut Machine) {
    for kind in StackKind::ALL {
        for op in StackOpKind::ALL {
            let op = StackOp { kind, op };
            machine.register_instruction(&op.name(), op);
        }
    }
    for op in IntOp::ALL {
        machine.register_instruction(op.name(), op);
    }
    for op in FloatOp::ALL {
        machine.register_instruction(op.name(), op);
    }
    for op in BoolOp::ALL {
        machine.register_instruction(op.name(), op);
    }
    for op in RandomOp::ALL {
        machine.register_instruction(op.name(), op);
    }
    for op in CodeOp::ALL {
        machine.register_instruction(op.name(), op);
    }
}
