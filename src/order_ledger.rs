//! OrderLedger: append-only record of first-insertion order of identities.
//!
//! Removing an identity from the map does not touch the ledger, so the
//! ledger may hold stale identities. Readers must check liveness against the
//! entry store. A membership index makes "append only if absent" O(1) instead
//! of a linear scan; the ledger only shrinks on `clear` or `retain`.

use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct Ledgered {
    pub(crate) identity: Arc<str>,
    pub(crate) hash: u64,
}

#[derive(Clone, Default)]
pub(crate) struct OrderLedger {
    entries: Vec<Ledgered>,
    positions: HashTable<usize>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return the recorded identity, appending it first if it is not yet
    /// anywhere in the ledger, live or stale. A re-inserted identity thus
    /// keeps its original position.
    pub fn record(&mut self, hash: u64, identity: &str) -> Arc<str> {
        match self.positions.entry(
            hash,
            |&i| &*self.entries[i].identity == identity,
            |&i| self.entries[i].hash,
        ) {
            TableEntry::Occupied(o) => self.entries[*o.get()].identity.clone(),
            TableEntry::Vacant(v) => {
                let identity: Arc<str> = Arc::from(identity);
                let _ = v.insert(self.entries.len());
                self.entries.push(Ledgered {
                    identity: identity.clone(),
                    hash,
                });
                identity
            }
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Ledgered> {
        self.entries.iter()
    }

    /// Keep only the identities for which `keep` holds, preserving their
    /// relative order. Returns how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Ledgered) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|l| keep(l));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            self.positions.clear();
            let entries = &self.entries;
            for (i, l) in entries.iter().enumerate() {
                self.positions.insert_unique(l.hash, i, |&j| entries[j].hash);
            }
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }
}
