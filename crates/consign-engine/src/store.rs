//! # Generic In-Memory Document Store
//!
//! Thread-safe, cloneable key-value store backing each persisted
//! collection. All operations are synchronous (the RwLock is
//! `parking_lot`, not `tokio::sync`) because the lock is never held across
//! `.await` points. `parking_lot::RwLock` is non-poisonable — a panicking
//! writer does not permanently corrupt the store.
//!
//! Single-record atomicity is the only consistency guarantee: `try_update`
//! runs read-validate-mutate under one write lock, eliminating TOCTOU
//! races for a single document. Cross-document consistency is the
//! responsibility of the lifecycle manager's sequencing and reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Thread-safe, cloneable in-memory key-value store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if
    /// not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock.
    /// Mutations made before an `Err` return are kept — lazy signature
    /// expiration relies on this.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_roundtrip() {
        let store: Store<String> = Store::new();
        let id = Uuid::new_v4();
        assert!(store.insert(id, "a".to_string()).is_none());
        assert_eq!(store.get(&id), Some("a".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_missing_returns_none() {
        let store: Store<u32> = Store::new();
        assert!(store.update(&Uuid::new_v4(), |v| *v += 1).is_none());
    }

    #[test]
    fn try_update_keeps_mutation_on_err() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 1);
        let result: Option<Result<(), &str>> = store.try_update(&id, |v| {
            *v = 99;
            Err("rejected")
        });
        assert_eq!(result, Some(Err("rejected")));
        assert_eq!(store.get(&id), Some(99));
    }

    #[test]
    fn remove_returns_value() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 7);
        assert_eq!(store.remove(&id), Some(7));
        assert!(store.is_empty());
        assert!(!store.contains(&id));
    }
}
