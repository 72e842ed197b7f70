//! EntryStore: structural layer holding one slot per live identity.
//!
//! The value store and the original-key store of the map live in the same
//! slot, so they cannot drift apart. Slots are found through a `HashTable`
//! index keyed by the identity's precomputed hash; hashing is the caller's
//! job, so the store never needs a hasher and never calls into user code.

use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) identity: Arc<str>,
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

#[derive(Clone)]
pub(crate) struct EntryStore<K, V> {
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> EntryStore<K, V> {
    pub fn new() -> Self {
        Self {
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find_slot(&self, hash: u64, identity: &str) -> Option<DefaultKey> {
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| &*e.identity == identity)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn get(&self, hash: u64, identity: &str) -> Option<&Entry<K, V>> {
        let k = self.find_slot(hash, identity)?;
        self.slots.get(k)
    }

    pub fn get_mut(&mut self, hash: u64, identity: &str) -> Option<&mut Entry<K, V>> {
        let k = self.find_slot(hash, identity)?;
        self.slots.get_mut(k)
    }

    /// Create a slot for an identity the caller has checked is not live.
    pub fn insert(&mut self, hash: u64, identity: Arc<str>, key: K, value: V) {
        debug_assert!(self.get(hash, &identity).is_none(), "identity already live");
        let k = self.slots.insert(Entry {
            identity,
            hash,
            key,
            value,
        });
        let _ = self.index.insert_unique(hash, k, |&kk| {
            self.slots.get(kk).map(|e| e.hash).unwrap_or(0)
        });
    }

    pub fn remove(&mut self, hash: u64, identity: &str) -> Option<Entry<K, V>> {
        let occupied = self
            .index
            .find_entry(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| &*e.identity == identity)
                    .unwrap_or(false)
            })
            .ok()?;
        let (k, _) = occupied.remove();
        self.slots.remove(k)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }
}
