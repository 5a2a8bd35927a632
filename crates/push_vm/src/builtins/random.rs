//! Random constants, bounded by the configuration table.
//!
//! Missing or mistyped configuration entries fall back to the standard
//! defaults. Inverted bounds are swapped.

use crate::instruction::NativeOp;
use crate::interpreter::{keys, Machine};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RandomOp {
    Integer,
    Float,
    Name,
}

impl RandomOp {
    pub const ALL: [RandomOp; 3] = [RandomOp::Integer, RandomOp::Float, RandomOp::Name];

    pub const fn name(self) -> &'static str {
        match self {
            RandomOp::Integer => "INTEGER.RAND",
            RandomOp::Float => "FLOAT.RAND",
            RandomOp::Name => "NAME.RAND",
        }
    }
}

impl NativeOp for RandomOp {
    fn apply(&self, machine: &mut Machine) {
        match self {
            RandomOp::Integer => {
                let (lo, hi) = ordered(
                    machine.config_int(keys::MIN_RANDOM_INT).unwrap_or(-100),
                    machine.config_int(keys::MAX_RANDOM_INT).unwrap_or(100),
                );
                let n = machine.rng().i64(lo..=hi);
                machine.push_int(n);
            }
            RandomOp::Float => {
                let (lo, hi) = ordered(
                    machine.config_real(keys::MIN_RANDOM_REAL).unwrap_or(0.0),
                    machine.config_real(keys::MAX_RANDOM_REAL).unwrap_or(1.0),
                );
                let x = lo + (hi - lo) * machine.rng().f64();
                machine.push_real(x);
            }
            RandomOp::Name => {
                let name = random_name(machine);
                machine.push_name(name);
            }
        }
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// An existing bound name with probability `1 - NEW-ERC-NAME-PROBABILITY`,
/// otherwise a fresh upper-case name of configured length.
fn random_name(machine: &mut Machine) -> push_ir::Name {
    let fresh_probability = machine
        .config_real(keys::NEW_ERC_NAME_PROBABILITY)
        .unwrap_or(0.01);
    let bound = machine.bindings().len();
    if bound > 0 && machine.rng().f64() >= fresh_probability {
        let pick = machine.rng().usize(..bound);
        if let Some((name, _)) = machine.bindings().iter().nth(pick) {
            return name;
        }
    }

    let (lo, hi) = ordered(
        machine.config_int(keys::MIN_RANDOM_NAME_LENGTH).unwrap_or(2).max(1),
        machine.config_int(keys::MAX_RANDOM_NAME_LENGTH).unwrap_or(16).max(1),
    );
    let len = machine.rng().i64(lo..=hi);
    let text: String = (0..len).map(|_| machine.rng().uppercase()).collect();
    machine.intern(&text)
}

