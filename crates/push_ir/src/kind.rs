//! Value kind tags.

use std::fmt;

/// The kind of a Push value.
///
/// Each literal kind routes to exactly one stack; `Name` and `Code` are
/// routed by dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Real,
    Name,
    Code,
    Instruction,
}

impl ValueKind {
    /// Lower-case name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Real => "real",
            ValueKind::Name => "name",
            ValueKind::Code => "code",
            ValueKind::Instruction => "instruction",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
