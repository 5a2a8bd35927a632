//! Integer and float arithmetic.
//!
//! Binary operations take the second item as the left operand and the top
//! as the right one, so `3 5 INTEGER.-` leaves `-2`. Integer arithmetic
//! wraps on overflow. Comparisons push to the boolean stack.

use crate::instruction::NativeOp;
use crate::interpreter::Machine;
use crate::stack::StackKind;
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
}

impl IntOp {
    pub const ALL: [IntOp; 7] = [
        IntOp::Add,
        IntOp::Sub,
        IntOp::Mul,
        IntOp::Div,
        IntOp::Rem,
        IntOp::Lt,
        IntOp::Gt,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            IntOp::Add => "INTEGER.+",
            IntOp::Sub => "INTEGER.-",
            IntOp::Mul => "INTEGER.*",
            IntOp::Div => "INTEGER./",
            IntOp::Rem => "INTEGER.%",
            IntOp::Lt => "INTEGER.<",
            IntOp::Gt => "INTEGER.>",
        }
    }

    /// `None` for a zero divisor.
    fn eval(self, a: i64, b: i64) -> Option<Value> {
        Some(match self {
            IntOp::Add => Value::Int(a.wrapping_add(b)),
            IntOp::Sub => Value::Int(a.wrapping_sub(b)),
            IntOp::Mul => Value::Int(a.wrapping_mul(b)),
            IntOp::Div if b == 0 => return None,
            IntOp::Div => Value::Int(a.wrapping_div(b)),
            IntOp::Rem if b == 0 => return None,
            IntOp::Rem => Value::Int(a.wrapping_rem(b)),
            IntOp::Lt => Value::Bool(a < b),
            IntOp::Gt => Value::Bool(a > b),
        })
    }
}

impl NativeOp for IntOp {
    fn apply(&self, machine: &mut Machine) {
        binary(machine, StackKind::Integer, Value::as_int, |a, b| self.eval(a, b));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
}

impl FloatOp {
    pub const ALL: [FloatOp; 6] = [
        FloatOp::Add,
        FloatOp::Sub,
        FloatOp::Mul,
        FloatOp::Div,
        FloatOp::Lt,
        FloatOp::Gt,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FloatOp::Add => "FLOAT.+",
            FloatOp::Sub => "FLOAT.-",
            FloatOp::Mul => "FLOAT.*",
            FloatOp::Div => "FLOAT./",
            FloatOp::Lt => "FLOAT.<",
            FloatOp::Gt => "FLOAT.>",
        }
    }

    fn eval(self, a: f64, b: f64) -> Option<Value> {
        Some(match self {
            FloatOp::Add => Value::Real(a + b),
            FloatOp::Sub => Value::Real(a - b),
            FloatOp::Mul => Value::Real(a * b),
            FloatOp::Div if b == 0.0 => return None,
            FloatOp::Div => Value::Real(a / b),
            FloatOp::Lt => Value::Bool(a < b),
            FloatOp::Gt => Value::Bool(a > b),
        })
    }
}

impl NativeOp for FloatOp {
    fn apply(&self, machine: &mut Machine) {
        binary(machine, StackKind::Real, Value::as_real, |a, b| self.eval(a, b));
    }
}

/// Pop two operands of `kind`, push `eval(second, top)`.
///
/// Does nothing unless both operands extract and `eval` produces a result.
pub(super) fn binary<T>(
    machine: &mut Machine,
    kind: StackKind,
    extract: fn(&Value) -> Option<T>,
    eval: impl FnOnce(T, T) -> Option<Value>,
) {
    let stack = machine.stack(kind);
    let (Some(left), Some(right)) = (stack.peek_at(1), stack.peek_at(0)) else {
        return;
    };
    let operand = |r| machine.value(r).as_ref().and_then(extract);
    let (Some(a), Some(b)) = (operand(left), operand(right)) else {
        return;
    };
    let Some(result) = eval(a, b) else {
        return;
    };
    machine.pop(kind);
    machine.pop(kind);
    if let Some(target) = StackKind::for_literal(result.kind()) {
        machine.push_value(target, result);
    }
}
