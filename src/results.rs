//! Append-only result collection shared by all workers.

use parking_lot::Mutex;

/// Result strings in arrival order.
#[derive(Debug, Default)]
pub struct ResultCollection {
    entries: Mutex<Vec<String>>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: String) {
        self.entries.lock().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copies the current entries. Safe to call while workers are appending.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Takes every entry out, leaving the collection empty.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
    }
}
