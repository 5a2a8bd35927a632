//! Name-keyed value tables.
//!
//! The same table type backs both the bindings (the symbol table consulted
//! when a `Name` is executed) and the configuration of an interpreter. Keys
//! are interned in the owning interpreter's arena.

use rustc_hash::FxHashMap;

use push_ir::Name;

use crate::value::ValueRef;

/// Map from interned name to value handle.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    entries: FxHashMap<Name, ValueRef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous value.
    pub fn insert(&mut self, name: Name, value: ValueRef) -> Option<ValueRef> {
        self.entries.insert(name, value)
    }

    /// Remove if present.
    pub fn remove(&mut self, name: Name) -> Option<ValueRef> {
        self.entries.remove(&name)
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<ValueRef> {
        self.entries.get(&name).copied()
    }

    pub fn contains(&self, name: Name) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, ValueRef)> + '_ {
        self.entries.iter().map(|(&name, &value)| (name, value))
    }

    /// All value handles, for root enumeration.
    pub fn values(&self) -> impl Iterator<Item = ValueRef> + '_ {
        self.entries.values().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests;
