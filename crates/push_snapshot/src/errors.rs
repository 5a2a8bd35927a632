//! Snapshot errors.

use push_vm::VmError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The document is malformed. `offset` is a byte offset into it.
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The state holds something the text format cannot express.
    #[error("cannot represent {what} in a state document")]
    Unrepresentable { what: String },

    /// The document parsed but the interpreter rejected it.
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl SnapshotError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        SnapshotError::Parse {
            offset,
            message: message.into(),
        }
    }
}
