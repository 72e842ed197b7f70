// IdentityMap integration suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Identity equality: keys with equal identities are one key.
// - Size: `size()` counts live identities only.
// - Order: live entries come back in first-insertion order; updates and
//   re-insertion after removal keep the original slot.
// - Escaping iteration: `Return` yields a value and stops, `Break` stops
//   with nothing, otherwise the walk completes with nothing.
// - Clone independence in both directions.
use identity_map::{ByDisplay, Identity, IdentityMap, Step};
use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

// Object key with an explicit identity, independent of its other fields.
#[derive(Debug)]
struct Node {
    id: u32,
    label: &'static str,
}

impl Identity for Node {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Owned(format!("node#{}", self.id))
    }
}

// Test: concrete update scenario.
// Verifies: put("a",1); put("b",2); put("a",3) gives size 2, get("a") == 3,
// keys [a, b], values [3, 2].
#[test]
fn update_keeps_size_and_order() {
    let mut m = IdentityMap::new();
    m.put("a".to_string(), 1);
    m.put("b".to_string(), 2);
    assert_eq!(m.put("a".to_string(), 3), Some(1));
    assert_eq!(m.size(), 2);
    assert_eq!(m.get("a"), Some(&3));
    assert_eq!(m.keys().cloned().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), [3, 2]);
}

// Test: concrete removal scenario.
// Verifies: after put then remove, get is absent, size is 0, and `each`
// never invokes its callback.
#[test]
fn removed_key_is_gone() {
    let mut m = IdentityMap::new();
    m.put("a", 1);
    assert_eq!(m.remove("a"), Some(1));
    assert_eq!(m.get("a"), None);
    assert_eq!(m.size(), 0);
    let mut calls = 0;
    m.each(|_, _| calls += 1);
    assert_eq!(calls, 0);
}

// Test: identity equality across distinct key objects.
// Assumes: `Node` identity depends on `id` only.
// Verifies: last writer wins on value and on the stored key object.
#[test]
fn object_keys_compare_by_identity() {
    let mut m = IdentityMap::new();
    m.put(Node { id: 1, label: "one" }, 'x');
    m.put(Node { id: 2, label: "two" }, 'y');
    assert_eq!(m.put(Node { id: 1, label: "uno" }, 'z'), Some('x'));

    assert_eq!(m.size(), 2);
    assert_eq!(m.get(&Node { id: 1, label: "" }), Some(&'z'));
    let labels: Vec<_> = m.keys().map(|n| n.label).collect();
    assert_eq!(labels, ["uno", "two"]);
}

// Test: primitives and strings share the default-string identity space.
// Verifies: the integer 1 and the string "1" are the same key.
#[test]
fn default_string_identity_for_primitives() {
    let mut m: IdentityMap<Box<dyn Identity>, &str> = IdentityMap::new();
    m.put(Box::new(1i32), "int");
    m.put(Box::new(true), "bool");
    assert_eq!(m.get("1"), Some(&"int"));
    assert_eq!(m.get(&1u64), Some(&"int"));
    assert_eq!(m.get("true"), Some(&"bool"));
    assert_eq!(m.remove(&1u8), Some("int"));
    assert_eq!(m.size(), 1);
}

// Test: Display-keyed adapter.
// Verifies: `ByDisplay` keys equal whenever their rendering is equal.
#[test]
fn by_display_keys() {
    struct Version(u8, u8);
    impl fmt::Display for Version {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}.{}", self.0, self.1)
        }
    }
    let mut m = IdentityMap::new();
    m.put(ByDisplay(Version(1, 2)), "first");
    assert_eq!(m.get("1.2"), Some(&"first"));
    assert_eq!(m.put(ByDisplay(Version(1, 2)), "second"), Some("first"));
    assert_eq!(m.size(), 1);
}

// Test: re-insertion resumes the original slot.
// Verifies: insert A, B; remove A; insert A gives order [A, B].
#[test]
fn reinsertion_resumes_slot() {
    let mut m = IdentityMap::new();
    m.put("A", 1);
    m.put("B", 2);
    m.remove("A");
    m.put("A", 3);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["A", "B"]);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), [3, 2]);
}

// Test: escaping-each return contract.
// Verifies: Return on the second of three entries yields that value and
// the third entry is never visited.
#[test]
fn escaping_each_returns_value() {
    let mut m = IdentityMap::new();
    m.put("one", 1);
    m.put("two", 2);
    m.put("three", 3);
    let mut visited = Vec::new();
    let r = m.escaping_each(|k, v| {
        visited.push(*k);
        if *v == 2 {
            Step::Return(format!("found {}", k))
        } else {
            Step::Continue
        }
    });
    assert_eq!(r.as_deref(), Some("found two"));
    assert_eq!(visited, ["one", "two"]);
}

// Test: escaping-each break contract.
// Verifies: Break on the first of three entries yields nothing and visits
// nothing else.
#[test]
fn escaping_each_breaks() {
    let mut m = IdentityMap::new();
    m.put("one", 1);
    m.put("two", 2);
    m.put("three", 3);
    let mut visited = Vec::new();
    let r: Option<i32> = m.escaping_each(|k, _| {
        visited.push(*k);
        Step::Break
    });
    assert_eq!(r, None);
    assert_eq!(visited, ["one"]);
}

// Test: clone independence, both directions.
// Verifies: size, lookups, and order of each side are unaffected by
// mutations on the other.
#[test]
fn clone_is_independent() {
    let mut src = IdentityMap::new();
    src.put("a", Rc::new(1));
    src.put("b", Rc::new(2));
    let mut copy = src.clone();

    // Payloads are shared, structures are not.
    assert!(Rc::ptr_eq(src.get("a").unwrap(), copy.get("a").unwrap()));

    src.put("c", Rc::new(3));
    src.remove("a");
    assert_eq!(copy.size(), 2);
    assert_eq!(copy.get("a").map(|v| **v), Some(1));
    assert_eq!(copy.keys().copied().collect::<Vec<_>>(), ["a", "b"]);

    copy.remove("b");
    copy.put("z", Rc::new(26));
    assert_eq!(src.size(), 2);
    assert_eq!(src.get("b").map(|v| **v), Some(2));
    assert_eq!(src.keys().copied().collect::<Vec<_>>(), ["b", "c"]);
    assert_eq!(copy.keys().copied().collect::<Vec<_>>(), ["a", "z"]);
}

// Test: empty-map short circuit.
// Assumes: identity derivation is observable through a counter.
// Verifies: `get` on an empty map does not derive the identity; on a
// non-empty map it does.
#[test]
fn empty_get_skips_identity() {
    struct Counting<'a>(&'a Cell<u32>);
    impl Identity for Counting<'_> {
        fn identity(&self) -> Cow<'_, str> {
            self.0.set(self.0.get() + 1);
            Cow::Borrowed("counting")
        }
    }

    let calls = Cell::new(0);
    let mut m: IdentityMap<&str, i32> = IdentityMap::new();
    assert_eq!(m.get(&Counting(&calls)), None);
    assert_eq!(calls.get(), 0);

    m.put("counting", 5);
    assert_eq!(m.get(&Counting(&calls)), Some(&5));
    assert_eq!(calls.get(), 1);
}

// Test: a panicking identity propagates and leaves the map intact.
#[test]
fn identity_panic_propagates() {
    struct Faulty;
    impl Identity for Faulty {
        fn identity(&self) -> Cow<'_, str> {
            panic!("no identity");
        }
    }

    let mut m: IdentityMap<Box<dyn Identity>, i32> = IdentityMap::new();
    m.put(Box::new("ok"), 1);
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        m.put(Box::new(Faulty), 2);
    }));
    assert!(res.is_err(), "identity panic must reach the caller");
    assert_eq!(m.size(), 1);
    assert_eq!(m.get("ok"), Some(&1));
    assert_eq!(m.ledger_len(), 1);
}

// Test: lazy ledger growth under churn and opt-in compaction.
// Verifies: removals leave stale identities; `compact` drops them and keeps
// live order; `clear` empties the ledger.
#[test]
fn churn_then_compact() {
    let mut m = IdentityMap::new();
    for i in 0..100u32 {
        m.put(i, i * 2);
    }
    for i in (0..100u32).filter(|i| i % 3 != 0) {
        m.remove(&i);
    }
    assert_eq!(m.size(), 34);
    assert_eq!(m.ledger_len(), 100);
    assert_eq!(m.compact(), 66);
    assert_eq!(m.ledger_len(), 34);
    let keys: Vec<u32> = m.keys().copied().collect();
    assert_eq!(keys, (0..100u32).filter(|i| i % 3 == 0).collect::<Vec<_>>());

    m.clear();
    assert_eq!(m.ledger_len(), 0);
    assert!(m.is_empty());
}

// Test: external synchronization.
// Assumes: the map has no internal locking and owns no thread-bound state.
// Verifies: `IdentityMap<String, i32>` is `Send + Sync`, and a map behind
// `Arc<Mutex<_>>` can be filled from worker threads.
#[test]
fn shareable_behind_a_mutex() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<IdentityMap<String, i32>>();

    let shared = Arc::new(Mutex::new(IdentityMap::<String, i32>::new()));
    let workers: Vec<_> = (0..4)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..25 {
                    let mut m = shared.lock().unwrap();
                    m.put(format!("t{}-{}", t, i), i);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let m = shared.lock().unwrap();
    assert_eq!(m.size(), 100);
    assert_eq!(m.get("t3-24"), Some(&24));
}
