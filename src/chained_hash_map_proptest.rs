#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// chain structure through `assert_invariants`.

use crate::chained_hash_map::ChainedHashMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Hashes only the length, so same-length keys always share a chain.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
struct Coarse(String);
impl Hash for Coarse {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Take(usize),
    Get(usize),
    Contains(String),
    ContainsValue(i32),
    Mutate(usize, i32),
    KeySet,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), -8i32..8).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Take),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => (-8i32..8).prop_map(Op::ContainsValue),
            1 => (idx.clone(), -3i32..3).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::KeySet),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn arb_config() -> impl Strategy<Value = (usize, f32)> {
    (1usize..=8, prop_oneof![Just(0.25f32), Just(0.5), Just(0.75), Just(1.0), Just(3.0)])
}

// Replays `ops` against both the map and a std HashMap model, checking
// observable parity and structural invariants after every step.
fn run_state_machine<K, F>(
    mut sut: ChainedHashMap<K, i32>,
    pool: &[String],
    ops: Vec<Op>,
    make_key: F,
) -> Result<(), TestCaseError>
where
    K: Clone + Eq + Hash + Ord + fmt::Debug,
    F: Fn(&str) -> K,
{
    let mut model: HashMap<K, i32> = HashMap::new();
    for op in ops {
        let capacity_before = sut.capacity();
        match op {
            Op::Put(i, v) => {
                let k = make_key(&pool[i]);
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = make_key(&pool[i]);
                prop_assert_eq!(sut.remove(&k), model.remove(&k).is_some());
            }
            Op::Take(i) => {
                let k = make_key(&pool[i]);
                prop_assert_eq!(sut.take(&k), model.remove(&k));
            }
            Op::Get(i) => {
                let k = make_key(&pool[i]);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            Op::Contains(s) => {
                let k = make_key(&s);
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            Op::ContainsValue(v) => {
                prop_assert_eq!(sut.contains_value(&v), model.values().any(|&m| m == v));
            }
            Op::Mutate(i, d) => {
                let k = make_key(&pool[i]);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(s), Some(m)) => {
                        *s = s.saturating_add(d);
                        *m = m.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            Op::KeySet => {
                let s_keys: BTreeSet<K> = sut.key_set().into_iter().collect();
                let m_keys: BTreeSet<K> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), capacity_before);
            }
        }

        // Post-conditions after each op
        // 1) Capacity only ever grows, by powers of two.
        prop_assert!(sut.capacity() >= capacity_before);
        prop_assert_eq!(sut.capacity() % capacity_before, 0);
        prop_assert!((sut.capacity() / capacity_before).is_power_of_two());
        // 2) Size parity
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // 3) Chain structure
        sut.assert_invariants();
    }

    // Every key ever put resolves to its last value.
    let pairs: BTreeSet<(K, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let expected: BTreeSet<(K, i32)> = model.into_iter().collect();
    prop_assert_eq!(pairs, expected);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap
// under small capacities and varied load factors, so most runs resize.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(((pool, ops), (cap, lf)) in (arb_scenario(), arb_config())) {
        let sut: ChainedHashMap<Key, i32> =
            ChainedHashMap::with_capacity_and_load_factor(cap, lf).unwrap();
        run_state_machine(sut, &pool, ops, |s| Key(s.to_string()))?;
    }
}

// Property: same invariants with keys that collide by length, stressing
// chain scans, mid-chain unlinks, and relinking of long chains.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(((pool, ops), (cap, lf)) in (arb_scenario(), arb_config())) {
        let sut: ChainedHashMap<Coarse, i32> =
            ChainedHashMap::with_capacity_and_load_factor(cap, lf).unwrap();
        run_state_machine(sut, &pool, ops, |s| Coarse(s.to_string()))?;
    }
}

// Property: borrowed `&str` lookups agree with owned-key lookups.
proptest! {
    #[test]
    fn prop_borrowed_lookup(keys in proptest::collection::vec("[a-z]{0,4}", 0..40), probe in "[a-z]{0,4}") {
        let mut m: ChainedHashMap<Key, usize> = ChainedHashMap::new();
        for (i, k) in keys.iter().enumerate() {
            m.put(Key(k.clone()), i);
        }
        prop_assert_eq!(m.get(probe.as_str()), m.get(&Key(probe.clone())));
        prop_assert_eq!(m.contains_key(probe.as_str()), keys.contains(&probe));
    }
}
