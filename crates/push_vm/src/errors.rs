//! Error types for the machine.
//!
//! Only contract violations are errors. An empty stack, an unbound name or a
//! native operation lacking operands are ordinary control flow and never
//! surface here.

use push_ir::InternError;

use crate::value::ValueRef;

/// Result of a fallible machine operation.
pub type VmResult<T> = Result<T, VmError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// A caller handed the machine something it cannot accept.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A value handle no longer resolves (freed, or from another collector).
    #[error("stale value handle {0:?}")]
    StaleValue(ValueRef),

    /// The exec stack held something that is not a dispatchable value.
    #[error("unknown value kind for {0:?}")]
    UnknownValueKind(ValueRef),

    /// Defining `name` would make name resolution loop forever.
    #[error("binding `{name}` would refer back to itself")]
    SelfReferentialBinding { name: String },

    /// A value refers to an instruction the interpreter does not have.
    #[error("unknown instruction `{name}`")]
    UnknownInstruction { name: String },

    #[error(transparent)]
    Intern(#[from] InternError),
}

impl VmError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        VmError::InvalidArgument {
            reason: reason.into(),
        }
    }
}
