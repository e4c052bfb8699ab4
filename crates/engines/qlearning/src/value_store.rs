use std::collections::HashMap;

use crate::encoder::Fingerprint;

/// Tabular value function: fingerprint to value estimate, from White's side.
///
/// Entries are created lazily and never removed, so the table grows for the
/// lifetime of the engine.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: HashMap<Fingerprint, f64>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Fingerprint) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: Fingerprint, value: f64) {
        self.values.insert(key, value);
    }

    /// Inserts a zero entry when `key` is absent.
    pub fn ensure(&mut self, key: &Fingerprint) {
        if !self.values.contains_key(key) {
            self.values.insert(key.clone(), 0.0);
        }
    }

    /// Mutable access to an entry, creating it at zero.
    pub fn entry(&mut self, key: Fingerprint) -> &mut f64 {
        self.values.entry(key).or_insert(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
