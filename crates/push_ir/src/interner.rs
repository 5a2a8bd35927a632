//! Per-interpreter symbol interner.
//!
//! Each interpreter owns one `NameInterner`. Storage is grow-only: names are
//! never freed individually, the whole table is released when the interpreter
//! is torn down.

use super::Name;
use rustc_hash::FxHashMap;

/// Error when interning a symbol fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// The table exceeded `u32` capacity.
    #[error("name interner exceeded capacity: {count} symbols, max is {max}", max = u32::MAX)]
    Overflow { count: usize },
}

/// Grow-only symbol table mapping text to `Name` handles.
///
/// Interning equal text twice yields the same `Name`, so callers compare and
/// hash names without looking at their contents.
pub struct NameInterner {
    /// Map from symbol text to its handle.
    map: FxHashMap<Box<str>, Name>,
    /// Symbol text indexed by `Name::index`.
    strings: Vec<Box<str>>,
}

impl NameInterner {
    /// Create an interner holding only the empty symbol.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert(Box::<str>::from(""), Name::EMPTY);
        Self {
            map,
            strings: vec![Box::from("")],
        }
    }

    /// Try to intern `text`, returning its `Name` or an error on overflow.
    pub fn try_intern(&mut self, text: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.map.get(text) {
            return Ok(name);
        }

        let raw = u32::try_from(self.strings.len()).map_err(|_| InternError::Overflow {
            count: self.strings.len(),
        })?;
        let name = Name::from_raw(raw);
        let stored: Box<str> = Box::from(text);
        self.strings.push(stored.clone());
        self.map.insert(stored, name);
        Ok(name)
    }

    /// Intern `text`.
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32` capacity.
    /// Use `try_intern` for fallible interning.
    pub fn intern(&mut self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up an already-interned symbol without inserting it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.map.get(text).copied()
    }

    /// Look up the text for a `Name`.
    ///
    /// Returns the empty string for a handle this interner never issued.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// Whether `name` was issued by this interner.
    pub fn contains(&self, name: Name) -> bool {
        name.index() < self.strings.len()
    }

    /// Number of interned symbols, including the empty one.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if only the empty symbol is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NameInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameInterner")
            .field("len", &self.strings.len())
            .finish()
    }
}
