//! Write-once cell for lazily derived values.

use std::fmt;
use std::sync::OnceLock;

/// Cell holding a value derived from immutable state, computed on first use.
///
/// The computation runs outside any lock. Threads racing on first access may
/// each compute the value; the first one installed is kept and the others are
/// dropped. This is only valid for pure, deterministic computations, where
/// every redundant result is equal to the installed one.
pub struct MemoCell<T> {
    slot: OnceLock<T>,
}

impl<T> MemoCell<T> {
    pub const fn new() -> Self {
        MemoCell {
            slot: OnceLock::new(),
        }
    }

    /// Return the cached value, computing and installing it if absent.
    pub fn get_or_compute<F: FnOnce() -> T>(&self, compute: F) -> &T {
        if let Some(value) = self.slot.get() {
            return value;
        }
        let value = compute();
        self.slot.get_or_init(move || value)
    }

    /// Cached value, if already computed.
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }
}

impl<T> Default for MemoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for MemoCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.get() {
            Some(value) => f.debug_tuple("MemoCell").field(value).finish(),
            None => f.write_str("MemoCell(<pending>)"),
        }
    }
}
