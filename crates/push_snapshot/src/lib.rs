//! Push Snapshot - text export and import of interpreter state.
//!
//! A state document is a single s-expression:
//!
//! ```text
//! (push-state
//!   (config (MAX-RANDOM-INT 100))
//!   (bindings (square (INTEGER.DUP INTEGER.*)))
//!   (stacks (exec 3 square) (integer 1 2)))
//! ```
//!
//! Sections and stacks may be omitted; stacks are listed bottom to top and
//! `;` starts a comment. Import is all or nothing: a document that fails to
//! parse or validate leaves the interpreter untouched.

mod errors;
mod lexer;
mod parser;
mod render;

use push_vm::Interpreter;

pub use errors::SnapshotError;
pub use parser::parse_image;
pub use render::render_image;

/// Export the complete state of `interp`.
///
/// Runs under the interpreter's execution lock.
#[tracing::instrument(level = "debug", skip_all, fields(id = ?interp.id()))]
pub fn dump_state(interp: &Interpreter) -> Result<String, SnapshotError> {
    interp.with(|machine| {
        let image = machine.image();
        let text = render_image(&image, |name| machine.has_instruction(name))?;
        tracing::debug!(bytes = text.len(), "state exported");
        Ok(text)
    })
}

/// Replace the state of `interp` with the document `text`.
///
/// Parsing, validation and the swap all happen under the interpreter's
/// execution lock.
#[tracing::instrument(level = "debug", skip_all, fields(id = ?interp.id()))]
pub fn load_state(interp: &Interpreter, text: &str) -> Result<(), SnapshotError> {
    interp.with(|machine| {
        let image = parse_image(text, |name| machine.has_instruction(name))?;
        machine.restore(&image)?;
        tracing::debug!(bytes = text.len(), "state imported");
        Ok(())
    })
}
