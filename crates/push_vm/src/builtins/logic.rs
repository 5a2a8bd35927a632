//! Boolean connectives.

use super::numeric::binary;
use crate::instruction::NativeOp;
use crate::interpreter::Machine;
use crate::stack::StackKind;
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    pub const ALL: [BoolOp; 3] = [BoolOp::And, BoolOp::Or, BoolOp::Not];

    pub const fn name(self) -> &'static str {
        match self {
            BoolOp::And => "BOOLEAN.AND",
            BoolOp::Or => "BOOLEAN.OR",
            BoolOp::Not => "BOOLEAN.NOT",
        }
    }
}

impl NativeOp for BoolOp {
    fn apply(&self, machine: &mut Machine) {
        match self {
            BoolOp::And => binary(machine, StackKind::Boolean, Value::as_bool, |a, b| {
                Some(Value::Bool(a && b))
            }),
            BoolOp::Or => binary(machine, StackKind::Boolean, Value::as_bool, |a, b| {
                Some(Value::Bool(a || b))
            }),
            BoolOp::Not => {
                if let Some(b) = machine.pop_bool() {
                    machine.push_bool(!b);
                }
            }
        }
    }
}
