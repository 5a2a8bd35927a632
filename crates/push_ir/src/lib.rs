//! Push IR - shared identifier types for the Push virtual machine.
//!
//! - `Name`: compact handle for an interned symbol
//! - `NameInterner`: the grow-only, per-interpreter symbol table
//! - `ValueKind`: the closed set of value kinds
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: symbol text becomes `Name(u32)` once, so bindings,
//!   configuration and instruction tables compare handles, not strings.
//! - **Scoped Arenas**: every interpreter owns its interner; names cross
//!   interpreter boundaries only by re-interning their text.

mod interner;
mod kind;
mod name;

pub use interner::{InternError, NameInterner};
pub use kind::ValueKind;
pub use name::Name;
