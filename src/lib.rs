//! identity-map: an insertion-ordered map keyed by
//! caller-defined object identities.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a dictionary whose keys can be any object, where key equality is
//!   an explicit per-key capability (`Identity`) rather than `Eq`/`Hash` on
//!   the key type.
//! - Layers:
//!   - EntryStore<K, V>: structural layer; one slotmap slot per live
//!     identity holding (identity, hash, original key, value), found through
//!     a `HashTable` index on the precomputed hash.
//!   - OrderLedger: append-only sequence of identities in first-insertion
//!     order, with a membership index so "append only if absent" is O(1).
//!   - IdentityMap<K, V, S>: public API; derives and hashes identities,
//!     keeps the two layers in step, and provides ordered iteration.
//!
//! Constraints
//! - No internal locking. The map is `Send`/`Sync` whenever its keys,
//!   values and hasher are, so concurrent use goes through an outer
//!   `Mutex`/`RwLock`. Identity strings are shared between the store and the
//!   ledger through `Arc<str>`.
//! - Identity is derived once per call, before any structural change; stored
//!   identities are never re-derived.
//! - Absence is `None`; there is no error type. A panicking `identity()`
//!   propagates and leaves the map untouched.
//!
//! Lazy removal
//! - `remove` unlinks the entry from the store but leaves its identity in the
//!   ledger. Every traversal checks liveness against the store, so stale
//!   identities are skipped. Removal stays O(1); maps with heavy put/remove
//!   churn accumulate stale ledger entries until `clear` or the opt-in O(n)
//!   `compact`.
//! - Re-inserting a removed identity finds it still in the ledger and takes
//!   its original position back.
//!
//! Iteration
//! - `each`/`iter`/`keys`/`values` visit live entries in ledger order.
//! - `escaping_each` lets the callback return `Step::Continue`,
//!   `Step::Break`, or `Step::Return(r)`; the walk yields `Some(r)` only for
//!   the last case.
//! - Callbacks receive shared borrows of keys (and shared or exclusive
//!   borrows of values), so the map cannot be restructured mid-walk.
//!
//! Empty fast path
//! - `get`/`get_mut` on an empty map return `None` without deriving the
//!   key's identity. Identities are assumed pure, so this is unobservable
//!   for well-behaved keys.
//!
//! Notes and non-goals
//! - One value per key; no `contains_key`, no bulk insert.
//! - `Clone` duplicates the stores and the ledger (stale identities
//!   included); keys and values are cloned with their own `Clone`, so wrap
//!   them in `Rc` to share payloads between clones.

mod entry_store;
pub mod identity;
mod identity_map;
mod identity_map_proptest;
mod order_ledger;

// Public surface
pub use identity::{ByDisplay, Identity};
pub use identity_map::{IdentityMap, Iter, Keys, Step, Values};
