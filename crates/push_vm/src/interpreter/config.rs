//! Configuration table.
//!
//! Configuration is a name-keyed map of values, separate from bindings.
//! The random instructions read their ranges from it. Keys are free-form;
//! [`keys`] lists the ones an interpreter is seeded with.

use push_ir::Name;

use super::Machine;
use crate::symbols::SymbolTable;
use crate::value::{Value, ValueRef};

/// Standard configuration keys.
pub mod keys {
    pub const MIN_RANDOM_INT: &str = "MIN-RANDOM-INT";
    pub const MAX_RANDOM_INT: &str = "MAX-RANDOM-INT";
    pub const MIN_RANDOM_REAL: &str = "MIN-RANDOM-REAL";
    pub const MAX_RANDOM_REAL: &str = "MAX-RANDOM-REAL";
    pub const MIN_RANDOM_NAME_LENGTH: &str = "MIN-RANDOM-NAME-LENGTH";
    pub const MAX_RANDOM_NAME_LENGTH: &str = "MAX-RANDOM-NAME-LENGTH";
    pub const MAX_POINTS_IN_RANDOM_EXPRESSIONS: &str = "MAX-POINTS-IN-RANDOM-EXPRESSIONS";
    pub const NEW_ERC_NAME_PROBABILITY: &str = "NEW-ERC-NAME-PROBABILITY";
}

fn default_entries() -> [(&'static str, Value); 8] {
    [
        (keys::MIN_RANDOM_INT, Value::Int(-100)),
        (keys::MAX_RANDOM_INT, Value::Int(100)),
        (keys::MIN_RANDOM_REAL, Value::Real(0.0)),
        (keys::MAX_RANDOM_REAL, Value::Real(1.0)),
        (keys::MIN_RANDOM_NAME_LENGTH, Value::Int(2)),
        (keys::MAX_RANDOM_NAME_LENGTH, Value::Int(16)),
        (keys::MAX_POINTS_IN_RANDOM_EXPRESSIONS, Value::Int(100)),
        (keys::NEW_ERC_NAME_PROBABILITY, Value::Real(0.01)),
    ]
}

impl Machine {
    pub(super) fn seed_default_config(&mut self) {
        for (key, value) in default_entries() {
            self.config_set_value(key, value);
        }
    }

    /// Set a configuration entry by key text.
    pub fn config_set(&mut self, key: &str, value: ValueRef) {
        let key = self.intern(key);
        self.config.insert(key, value);
    }

    /// Set a configuration entry by interned key.
    pub fn config_set_interned(&mut self, key: Name, value: ValueRef) {
        self.config.insert(key, value);
    }

    /// Allocate `value` and store it under `key`.
    pub fn config_set_value(&mut self, key: &str, value: Value) -> ValueRef {
        let r = self.alloc(value);
        self.config_set(key, r);
        r
    }

    /// Look up a configuration entry by key text.
    ///
    /// A key that was never interned cannot be present, so this does not
    /// grow the name arena.
    pub fn config_get(&self, key: &str) -> Option<ValueRef> {
        self.names.get(key).and_then(|k| self.config.get(k))
    }

    pub fn config_get_interned(&self, key: Name) -> Option<ValueRef> {
        self.config.get(key)
    }

    /// Remove a configuration entry.
    pub fn config_remove(&mut self, key: &str) -> Option<ValueRef> {
        let key = self.names.get(key)?;
        self.config.remove(key)
    }

    /// Resolved configuration value.
    pub fn config_value(&self, key: &str) -> Option<Value> {
        self.config_get(key).and_then(|r| self.value(r))
    }

    /// Integer configuration entry; `None` if absent or not an integer.
    pub fn config_int(&self, key: &str) -> Option<i64> {
        self.config_value(key)?.as_int()
    }

    /// Real configuration entry. Integer entries are widened.
    pub fn config_real(&self, key: &str) -> Option<f64> {
        match self.config_value(key)? {
            Value::Real(r) => Some(r),
            #[expect(clippy::cast_precision_loss, reason = "config ranges are small")]
            Value::Int(n) => Some(n as f64),
            _ => None,
        }
    }

    pub fn config(&self) -> &SymbolTable {
        &self.config
    }
}
