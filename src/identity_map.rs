//! IdentityMap: public API combining the entry store and the order ledger.

use crate::entry_store::EntryStore;
use crate::identity::Identity;
use crate::order_ledger::{Ledgered, OrderLedger};
use core::fmt;
use core::hash::BuildHasher;
use core::iter::FusedIterator;
use core::mem;
use std::collections::hash_map::RandomState;

/// What an `escaping_each` callback asks the walk to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step<R> {
    /// Visit the next live entry.
    Continue,
    /// Stop without producing a result.
    Break,
    /// Stop and hand `R` back to the caller of the walk.
    Return(R),
}

/// An insertion-ordered map whose key equality is the key's `Identity`.
///
/// Lookups hash the identity string; the original key object is kept so
/// iteration hands it back. Iteration order is the order in which
/// identities first became live. Removing an entry leaves its identity in
/// the order ledger, so re-inserting it later resumes the old position;
/// `compact` drops such stale identities on request.
#[derive(Clone)]
pub struct IdentityMap<K, V, S = RandomState> {
    hasher: S,
    store: EntryStore<K, V>,
    ledger: OrderLedger,
}

impl<K, V> IdentityMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S: Default> Default for IdentityMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> IdentityMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            store: EntryStore::new(),
            ledger: OrderLedger::new(),
        }
    }

    /// The hasher used for identity strings.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of identities in the order ledger, including stale ones left
    /// behind by `remove`.
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    /// Remove every entry and empty the order ledger.
    pub fn clear(&mut self) {
        self.store.clear();
        self.ledger.clear();
    }

    /// Drop stale identities from the order ledger, keeping the relative
    /// order of live ones. Returns how many were dropped.
    ///
    /// After compaction a removed key that is put again is appended at the
    /// end instead of resuming its old position.
    pub fn compact(&mut self) -> usize {
        let store = &self.store;
        self.ledger.retain(|l| store.get(l.hash, &l.identity).is_some())
    }

    /// Live entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            ledger: self.ledger.iter(),
            store: &self.store,
            remaining: self.store.len(),
        }
    }

    /// Original keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values in insertion order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Call `f` with every live entry in insertion order.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Like `each`, with mutable access to the values.
    pub fn each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let _ = self.escaping_each_mut(|k, v| {
            f(k, v);
            Step::<()>::Continue
        });
    }

    /// Walk live entries in insertion order until `f` asks to stop.
    ///
    /// Returns `Some(r)` when `f` returns `Step::Return(r)`, and `None` when
    /// it returns `Step::Break` or the walk runs out of entries. The callback
    /// only gets shared borrows, so the visited sequence is fixed for the
    /// duration of the walk.
    pub fn escaping_each<R, F>(&self, mut f: F) -> Option<R>
    where
        F: FnMut(&K, &V) -> Step<R>,
    {
        for (k, v) in self.iter() {
            match f(k, v) {
                Step::Continue => {}
                Step::Break => return None,
                Step::Return(r) => return Some(r),
            }
        }
        None
    }

    /// Like `escaping_each`, with mutable access to the values.
    pub fn escaping_each_mut<R, F>(&mut self, mut f: F) -> Option<R>
    where
        F: FnMut(&K, &mut V) -> Step<R>,
    {
        let mut remaining = self.store.len();
        for l in self.ledger.iter() {
            if remaining == 0 {
                break;
            }
            let Some(entry) = self.store.get_mut(l.hash, &l.identity) else {
                continue;
            };
            remaining -= 1;
            match f(&entry.key, &mut entry.value) {
                Step::Continue => {}
                Step::Break => return None,
                Step::Return(r) => return Some(r),
            }
        }
        None
    }
}

impl<K, V, S> IdentityMap<K, V, S>
where
    S: BuildHasher,
{
    fn hash_identity(&self, identity: &str) -> u64 {
        self.hasher.hash_one(identity)
    }

    /// Insert or update the entry for `key`'s identity.
    ///
    /// Returns the previous value when the identity was live; the stored key
    /// is replaced by `key` as well. A new identity is appended to the
    /// iteration order unless it was live before and removed since, in which
    /// case it takes its old position back.
    pub fn put(&mut self, key: K, value: V) -> Option<V>
    where
        K: Identity,
    {
        let id = key.identity();
        let hash = self.hash_identity(&id);
        match self.store.get_mut(hash, &id) {
            Some(entry) => {
                drop(id);
                entry.key = key;
                Some(mem::replace(&mut entry.value, value))
            }
            None => {
                let identity = self.ledger.record(hash, &id);
                drop(id);
                self.store.insert(hash, identity, key, value);
                None
            }
        }
    }

    /// Look up the value stored under `key`'s identity.
    ///
    /// On an empty map this returns `None` without deriving the identity.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Identity + ?Sized,
    {
        if self.store.is_empty() {
            return None;
        }
        let id = key.identity();
        let hash = self.hash_identity(&id);
        self.store.get(hash, &id).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Identity + ?Sized,
    {
        if self.store.is_empty() {
            return None;
        }
        let id = key.identity();
        let hash = self.hash_identity(&id);
        self.store.get_mut(hash, &id).map(|e| &mut e.value)
    }

    /// Remove the entry for `key`'s identity and return its value.
    ///
    /// The identity stays in the order ledger.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Identity + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Like `remove`, also returning the stored original key.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: Identity + ?Sized,
    {
        let id = key.identity();
        let hash = self.hash_identity(&id);
        self.store.remove(hash, &id).map(|e| (e.key, e.value))
    }
}

impl<K, V, S> fmt::Debug for IdentityMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S> IntoIterator for &'a IdentityMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over live entries in insertion order.
pub struct Iter<'a, K, V> {
    ledger: core::slice::Iter<'a, Ledgered>,
    store: &'a EntryStore<K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // Stale tail identities are never walked once every live entry is out.
        while self.remaining > 0 {
            let l = self.ledger.next()?;
            if let Some(e) = self.store.get(l.hash, &l.identity) {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            store: self.store,
            remaining: self.remaining,
        }
    }
}

/// Iterator over original keys in insertion order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values in insertion order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
