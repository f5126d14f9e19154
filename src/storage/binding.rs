use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::KvStore;

/// Default for a binding whose slot is empty or unreadable: either a
/// literal value or a zero-argument producer, resolved at most once.
pub enum Seed<T> {
    Value(T),
    Factory(Box<dyn FnOnce() -> T>),
}

impl<T> Seed<T> {
    pub fn value(value: T) -> Self {
        Seed::Value(value)
    }

    pub fn factory(f: impl FnOnce() -> T + 'static) -> Self {
        Seed::Factory(Box::new(f))
    }

    fn resolve(self) -> T {
        match self {
            Seed::Value(value) => value,
            Seed::Factory(f) => f(),
        }
    }
}

/// Whether a mutation reached the durable store or only process memory.
///
/// `MemoryOnly` is not a failure of the mutation itself: the in-memory
/// value has already been replaced and subsequent reads see it. Callers
/// should warn the user that the change may not survive a restart.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Durable,
    MemoryOnly,
}

impl Persistence {
    pub fn is_durable(self) -> bool {
        self == Persistence::Durable
    }

    /// Combine two outcomes, keeping the worst
    pub fn and(self, other: Persistence) -> Persistence {
        if self.is_durable() && other.is_durable() {
            Persistence::Durable
        } else {
            Persistence::MemoryOnly
        }
    }
}

/// Binds one in-memory value to a named slot in a `KvStore`.
///
/// The in-memory copy is authoritative within the session. Every `set`
/// replaces the whole `Arc` (replace-on-write), so consumers can detect
/// change with `Arc::ptr_eq` instead of comparing contents.
pub struct Binding<T> {
    key: &'static str,
    value: Arc<T>,
}

impl<T: Serialize + DeserializeOwned> Binding<T> {
    /// Read and deserialize the slot, falling back to `seed` if the slot
    /// is absent or unreadable. A corrupt slot is logged and recovered,
    /// never fatal.
    pub fn load(kv: &dyn KvStore, key: &'static str, seed: Seed<T>) -> Self {
        let value = match kv.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored value is corrupt, using default");
                    seed.resolve()
                }
            },
            Ok(None) => seed.resolve(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read slot, using default");
                seed.resolve()
            }
        };

        Self {
            key,
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The current in-memory value
    pub fn get(&self) -> &Arc<T> {
        &self.value
    }

    /// Compute a new value from the previous one, replace the in-memory
    /// copy, and write through to the store. The in-memory update always
    /// takes effect; a failed write degrades to `MemoryOnly`.
    pub fn set(&mut self, kv: &dyn KvStore, update: impl FnOnce(&T) -> T) -> Persistence {
        let next = update(&self.value);
        self.value = Arc::new(next);
        self.flush(kv)
    }

    /// Serialize and write the current value to the store
    pub fn flush(&self, kv: &dyn KvStore) -> Persistence {
        let raw = match serde_json::to_string(&*self.value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "failed to serialize value");
                return Persistence::MemoryOnly;
            }
        };

        match kv.put(self.key, &raw) {
            Ok(()) => Persistence::Durable,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "write-through failed, keeping in-memory value");
                Persistence::MemoryOnly
            }
        }
    }
}
