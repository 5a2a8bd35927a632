//! Code manipulation and definition.

use crate::instruction::NativeOp;
use crate::interpreter::Machine;
use crate::stack::StackKind;
use crate::value::{Code, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CodeOp {
    /// Move the next exec item to the code stack unexecuted.
    Quote,
    /// Execute the top code item.
    Do,
    /// Prepend the second code item to the top one (an atom top becomes a
    /// one-element list first).
    Cons,
    /// First child of the top code item.
    Car,
    /// The top code item without its first child.
    Cdr,
    /// Bind the top name to the top code item.
    CodeDefine,
    /// Bind the top name to the next exec item.
    ExecDefine,
}

impl CodeOp {
    pub const ALL: [CodeOp; 7] = [
        CodeOp::Quote,
        CodeOp::Do,
        CodeOp::Cons,
        CodeOp::Car,
        CodeOp::Cdr,
        CodeOp::CodeDefine,
        CodeOp::ExecDefine,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            CodeOp::Quote => "CODE.QUOTE",
            CodeOp::Do => "CODE.DO",
            CodeOp::Cons => "CODE.CONS",
            CodeOp::Car => "CODE.CAR",
            CodeOp::Cdr => "CODE.CDR",
            CodeOp::CodeDefine => "CODE.DEFINE",
            CodeOp::ExecDefine => "EXEC.DEFINE",
        }
    }
}

impl NativeOp for CodeOp {
    fn apply(&self, machine: &mut Machine) {
        match self {
            CodeOp::Quote => {
                if let Some(next) = machine.pop(StackKind::Exec) {
                    machine.push(StackKind::Code, next);
                }
            }
            CodeOp::Do => {
                if let Some(top) = machine.pop(StackKind::Code) {
                    machine.push(StackKind::Exec, top);
                }
            }
            CodeOp::Cons => {
                let stack = machine.stack(StackKind::Code);
                let (Some(item), Some(list)) = (stack.peek_at(1), stack.peek_at(0)) else {
                    return;
                };
                let consed = match machine.code(list) {
                    Some(code) => code.prepend(item),
                    None => Code::new(vec![item, list]),
                };
                machine.pop(StackKind::Code);
                machine.pop(StackKind::Code);
                machine.push_value(StackKind::Code, Value::Code(consed));
            }
            CodeOp::Car => {
                let Some(top) = machine.peek(StackKind::Code) else {
                    return;
                };
                // An atom is its own car; the empty list is its own car.
                let Some(code) = machine.code(top) else {
                    return;
                };
                if let Some(first) = code.first() {
                    machine.pop(StackKind::Code);
                    machine.push(StackKind::Code, first);
                }
            }
            CodeOp::Cdr => {
                let Some(top) = machine.peek(StackKind::Code) else {
                    return;
                };
                let rest = machine.code(top).map_or_else(Code::empty, |code| code.rest());
                machine.pop(StackKind::Code);
                machine.push_value(StackKind::Code, Value::Code(rest));
            }
            CodeOp::CodeDefine => define_from(machine, StackKind::Code),
            CodeOp::ExecDefine => define_from(machine, StackKind::Exec),
        }
    }
}

/// Bind the top of the name stack to the top of `source`.
///
/// Operands are consumed only if the binding is accepted.
fn define_from(machine: &mut Machine, source: StackKind) {
    let (Some(name_ref), Some(value)) = (machine.peek(StackKind::Name), machine.peek(source)) else {
        return;
    };
    let Some(name) = machine.value(name_ref).and_then(|v| v.as_name()) else {
        return;
    };
    if machine.define(name, value).is_ok() {
        machine.pop(StackKind::Name);
        machine.pop(source);
    }
}
