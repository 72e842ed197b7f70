#![cfg(test)]

// Property tests for IdentityMap kept inside the crate so they can compare
// the order ledger against the model without widening the public API.

use crate::identity::Identity;
use crate::identity_map::{IdentityMap, Step};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

// Key whose identity is `name`; `tag` tells apart key objects that share an
// identity so the test can check which object the map kept.
#[derive(Clone, Debug)]
struct Key {
    name: String,
    tag: u32,
}

impl Identity for Key {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// names, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, u32, i32),
    Get(usize),
    Remove(usize),
    Clear,
    Compact,
    CloneSwap,
    EscapeAt(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<u32>(), any::<i32>()).prop_map(|(i, t, v)| Op::Put(i, t, v)),
            2 => idx.clone().prop_map(Op::Get),
            4 => idx.clone().prop_map(Op::Remove),
            1 => Just(Op::Clear),
            1 => Just(Op::Compact),
            1 => Just(Op::CloneSwap),
            2 => idx.clone().prop_map(Op::EscapeAt),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Reference model: live entries by identity plus a plain Vec ledger with the
// same lazy-removal rule.
#[derive(Clone, Default)]
struct Model {
    live: HashMap<String, (u32, i32)>,
    ledger: Vec<String>,
}

impl Model {
    fn put(&mut self, name: &str, tag: u32, value: i32) -> Option<i32> {
        let prev = self.live.insert(name.to_string(), (tag, value)).map(|(_, v)| v);
        if prev.is_none() && !self.ledger.iter().any(|n| n == name) {
            self.ledger.push(name.to_string());
        }
        prev
    }

    fn order(&self) -> Vec<(String, u32, i32)> {
        self.ledger
            .iter()
            .filter_map(|n| self.live.get(n).map(|&(t, v)| (n.clone(), t, v)))
            .collect()
    }
}

fn observed<S>(m: &IdentityMap<Key, i32, S>) -> Vec<(String, u32, i32)> {
    m.iter().map(|(k, &v)| (k.name.clone(), k.tag, v)).collect()
}

// Invariants exercised after each step:
// - `size` equals the number of live identities.
// - Iteration yields live entries in first-insertion order with the most
//   recently supplied key object, and `keys`/`values`/`each` agree with it.
// - The ledger length matches the model, stale identities included.
fn run<S>(
    mut sut: IdentityMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model = Model::default();
    for op in ops {
        match op {
            Op::Put(i, tag, v) => {
                let name = &pool[i];
                let key = Key {
                    name: name.clone(),
                    tag,
                };
                prop_assert_eq!(sut.put(key, v), model.put(name, tag, v));
            }
            Op::Get(i) => {
                let probe = Key {
                    name: pool[i].clone(),
                    tag: 0,
                };
                let expected = model.live.get(&pool[i]).map(|&(_, v)| v);
                prop_assert_eq!(sut.get(&probe).copied(), expected);
                prop_assert_eq!(sut.get(pool[i].as_str()).copied(), expected);
            }
            Op::Remove(i) => {
                let expected = model.live.remove(&pool[i]).map(|(_, v)| v);
                prop_assert_eq!(sut.remove(pool[i].as_str()), expected);
            }
            Op::Clear => {
                sut.clear();
                model.live.clear();
                model.ledger.clear();
            }
            Op::Compact => {
                let before = model.ledger.len();
                let live = &model.live;
                model.ledger.retain(|n| live.contains_key(n));
                prop_assert_eq!(sut.compact(), before - model.ledger.len());
            }
            Op::CloneSwap => {
                let copy = sut.clone();
                sut.clear();
                prop_assert_eq!(observed(&copy), model.order());
                prop_assert_eq!(copy.ledger_len(), model.ledger.len());
                sut = copy;
            }
            Op::EscapeAt(i) => {
                let target = &pool[i];
                let mut visited = 0usize;
                let r = sut.escaping_each(|k, v| {
                    visited += 1;
                    if &k.name == target {
                        Step::Return(*v)
                    } else {
                        Step::Continue
                    }
                });
                let order = model.order();
                match order.iter().position(|(n, _, _)| n == target) {
                    Some(pos) => {
                        prop_assert_eq!(r, Some(order[pos].2));
                        prop_assert_eq!(visited, pos + 1);
                    }
                    None => {
                        prop_assert_eq!(r, None);
                        prop_assert_eq!(visited, order.len());
                    }
                }
            }
            Op::Iterate => {
                let mut via_each = Vec::new();
                sut.each(|k, &v| via_each.push((k.name.clone(), k.tag, v)));
                let seen = observed(&sut);
                prop_assert_eq!(&via_each, &seen);
                let keys: Vec<String> = sut.keys().map(|k| k.name.clone()).collect();
                let values: Vec<i32> = sut.values().copied().collect();
                prop_assert_eq!(keys, via_each.iter().map(|e| e.0.clone()).collect::<Vec<_>>());
                prop_assert_eq!(values, via_each.iter().map(|e| e.2).collect::<Vec<_>>());
            }
        }

        prop_assert_eq!(sut.size(), model.live.len());
        prop_assert_eq!(sut.is_empty(), model.live.is_empty());
        prop_assert_eq!(sut.ledger_len(), model.ledger.len());
        prop_assert_eq!(observed(&sut), model.order());
    }
    Ok(())
}

// Property: state-machine equivalence against the reference model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(IdentityMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress identity comparison.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants with every identity in one bucket, for both the
// entry index and the ledger's membership index.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(IdentityMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Invariant: `Default` builds an empty map around `S::default()`, and
// `hasher()` hands back that hasher; the map then behaves like any other.
#[test]
fn default_uses_hasher_default() {
    let mut m = IdentityMap::<&str, i32, ConstBuildHasher>::default();
    assert!(m.is_empty());
    assert_eq!(m.ledger_len(), 0);
    assert_eq!(m.hasher().hash_one("anything"), 0);

    m.put("a", 1);
    m.put("b", 2);
    assert_eq!(m.get("b"), Some(&2));
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["a", "b"]);
}
