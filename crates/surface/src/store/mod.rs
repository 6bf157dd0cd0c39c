//! Generic durable collection keyed by id.
//!
//! A [`KeyedStore`] owns an ordered collection of records and its
//! durable mirror. Records are keyed by a stable id; insertion order is
//! preserved across mutations (removing and re-adding a key changes its
//! position). Consumers never hold references into the collection -
//! reads return cloned snapshots, mutations go through the store's
//! operations, and the store is the single serialization point between
//! interleaved UI callbacks.

pub mod storage;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use storage::Storage;

/// A record that can live in a [`KeyedStore`].
pub trait StoreRecord: Clone + Serialize + DeserializeOwned {
    /// The record's stable key, unique within the collection.
    fn key(&self) -> &str;
}

/// An ordered, id-keyed collection with a durable mirror.
///
/// The mirror is read once at construction and rewritten after every
/// mutation. A missing or unparsable mirror initializes the collection
/// to empty (and writes the empty state back); a failing write is
/// logged and swallowed, leaving the in-memory state authoritative for
/// the rest of the session.
pub struct KeyedStore<R: StoreRecord> {
    storage: Rc<dyn Storage>,
    storage_key: &'static str,
    items: Vec<R>,
}

impl<R: StoreRecord> KeyedStore<R> {
    /// Open the store, loading the mirror under `storage_key`.
    pub fn open(storage: Rc<dyn Storage>, storage_key: &'static str) -> Self {
        let mut store = Self {
            storage,
            storage_key,
            items: Vec::new(),
        };
        store.load();
        store
    }

    /// Re-read the durable mirror, replacing the in-memory collection.
    ///
    /// Absent or corrupt mirrors reset to empty and write the empty
    /// state back; this never fails outward.
    pub fn load(&mut self) {
        match self.storage.read(self.storage_key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => self.items = items,
                Err(error) => {
                    tracing::warn!(
                        key = self.storage_key,
                        %error,
                        "unparsable durable mirror, resetting to empty"
                    );
                    self.items = Vec::new();
                    self.persist();
                }
            },
            None => {
                self.items = Vec::new();
                self.persist();
            }
        }
    }

    /// Cloned snapshot of the collection, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<R> {
        self.items.clone()
    }

    /// Cloned record under `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<R> {
        self.items.iter().find(|item| item.key() == key).cloned()
    }

    /// Whether a record with `key` exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key() == key)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fold over the collection without cloning it.
    pub fn fold<A>(&self, init: A, f: impl FnMut(A, &R) -> A) -> A {
        self.items.iter().fold(init, f)
    }

    /// Update the record under `key` in place, or append a new one.
    ///
    /// Existing records keep their position. Persists afterward.
    pub fn upsert(&mut self, key: &str, update: impl FnOnce(&mut R), insert: impl FnOnce() -> R) {
        match self.items.iter_mut().find(|item| item.key() == key) {
            Some(existing) => update(existing),
            None => self.items.push(insert()),
        }
        self.persist();
    }

    /// Update the record under `key` in place, if present.
    ///
    /// Returns whether a record was found; an absent key is a no-op and
    /// does not persist.
    pub fn update(&mut self, key: &str, update: impl FnOnce(&mut R)) -> bool {
        match self.items.iter_mut().find(|item| item.key() == key) {
            Some(existing) => {
                update(existing);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Remove the record under `key`.
    ///
    /// An absent key is a successful no-op. Persists either way, so the
    /// mirror converges even after a previously failed write.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != key);
        self.persist();
        self.items.len() < before
    }

    /// Empty the collection. Persists afterward.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.items) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!(key = self.storage_key, %error, "failed to serialize mirror");
                return;
            }
        };
        if let Err(error) = self.storage.write(self.storage_key, &serialized) {
            tracing::warn!(
                key = self.storage_key,
                %error,
                "durable mirror write failed, in-memory state stays authoritative"
            );
        }
    }
}
