//! Render a `MachineImage` as a state document.

use std::fmt::Write;

use push_vm::{ensure_sufficient_stack, MachineImage, StackKind, ValueTree};

use crate::errors::SnapshotError;
use crate::lexer::{is_bare_atom, quote};
use crate::parser::classify;

/// Render `image`. `is_instruction` must agree with the one used when
/// parsing the result back, so names that would read as instructions get
/// quoted.
///
/// Layout is one section per line group, one entry per line, stacks in
/// exec, code, boolean, integer, real, name order, each listed bottom to top.
pub fn render_image(
    image: &MachineImage,
    is_instruction: impl Fn(&str) -> bool,
) -> Result<String, SnapshotError> {
    let writer = Writer { is_instruction };
    let mut out = String::from("(push-state");

    out.push_str("\n  (config");
    for (key, value) in &image.config {
        out.push_str("\n    (");
        writer.write_name(&mut out, key);
        out.push(' ');
        writer.write_value(&mut out, value)?;
        out.push(')');
    }
    out.push(')');

    out.push_str("\n  (bindings");
    for (name, value) in &image.bindings {
        out.push_str("\n    (");
        writer.write_name(&mut out, name);
        out.push(' ');
        writer.write_value(&mut out, value)?;
        out.push(')');
    }
    out.push(')');

    out.push_str("\n  (stacks");
    for kind in StackKind::ALL {
        out.push_str("\n    (");
        out.push_str(kind.as_str());
        for item in image.stack(kind) {
            out.push(' ');
            writer.write_value(&mut out, item)?;
        }
        out.push(')');
    }
    out.push_str("))\n");
    Ok(out)
}

struct Writer<F> {
    is_instruction: F,
}

impl<F: Fn(&str) -> bool> Writer<F> {
    fn write_value(&self, out: &mut String, value: &ValueTree) -> Result<(), SnapshotError> {
        match value {
            ValueTree::Bool(true) => out.push_str("TRUE"),
            ValueTree::Bool(false) => out.push_str("FALSE"),
            ValueTree::Int(n) => {
                let _ = write!(out, "{n}");
            }
            // `{:?}` keeps a fraction or exponent, so the text never reads
            // back as an integer.
            ValueTree::Real(x) => {
                let _ = write!(out, "{x:?}");
            }
            ValueTree::Name(text) => self.write_name(out, text),
            ValueTree::Instruction(text) => {
                if !is_bare_atom(text) || !matches!(classify(text, |_| true), ValueTree::Instruction(_)) {
                    return Err(SnapshotError::Unrepresentable {
                        what: format!("instruction name {text:?}"),
                    });
                }
                out.push_str(text);
            }
            ValueTree::Code(children) => {
                out.push('(');
                ensure_sufficient_stack(|| {
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            out.push(' ');
                        }
                        self.write_value(out, child)?;
                    }
                    Ok::<_, SnapshotError>(())
                })?;
                out.push(')');
            }
        }
        Ok(())
    }

    /// Bare when it reads back as the same name, quoted otherwise.
    fn write_name(&self, out: &mut String, text: &str) {
        let reads_as_name = is_bare_atom(text)
            && matches!(classify(text, &self.is_instruction), ValueTree::Name(_));
        if reads_as_name {
            out.push_str(text);
        } else {
            out.push_str(&quote(text));
        }
    }
}
