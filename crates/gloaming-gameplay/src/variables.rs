//! Numeric game variables.
//!
//! Script-readable integer slots owned by the host. The clock mirrors its
//! hours, minutes and days into configured slots after every change.

use ahash::AHashMap;
use gloaming_common::VariableId;
use parking_lot::RwLock;

/// Store of numeric game variables. Unset slots read as 0.
#[derive(Debug, Default)]
pub struct GameVariables {
    values: RwLock<AHashMap<VariableId, i64>>,
}

impl GameVariables {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a slot.
    #[must_use]
    pub fn value(&self, id: VariableId) -> i64 {
        self.values.read().get(&id).copied().unwrap_or(0)
    }

    /// Writes a slot. Writes to the null id are ignored.
    pub fn set_value(&self, id: VariableId, value: i64) {
        if id.is_valid() {
            self.values.write().insert(id, value);
        }
    }

    /// Number of slots that were written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Checks whether no slot was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}
