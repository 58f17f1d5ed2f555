// ChainedHashMap unit test suite (public API).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Last write wins: get(k) returns the value of the latest put(k, _).
// - Counting: len() counts distinct keys; updates never double-count.
// - Growth: a put reaching the threshold doubles capacity without losing
//   or duplicating entries.
// - Removal: only the matching entry is unlinked; misses return false.
// - Snapshots: key_set/entry_set are detached copies of the contents.
use chained_hashmap::{ChainedHashMap, ConfigError, MapConfig};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::thread;

/// Hashes only `group`: keys with the same group share one chain.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Colliding {
    group: u8,
    name: &'static str,
}

impl Hash for Colliding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
    }
}

// Test: default construction with an overwritten key.
// Verifies: len counts distinct keys; get sees the latest value.
#[test]
fn scenario_update_keeps_size() {
    let mut m = ChainedHashMap::new();
    m.put("x", 1);
    m.put("y", 2);
    m.put("x", 3);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("x"), Some(&3));
    assert_eq!(m.get("y"), Some(&2));
}

// Test: capacity 2 at load factor 0.5 gives threshold 1.
// Verifies: the first put grows the table to 4 buckets and the entry survives.
#[test]
fn scenario_first_put_resizes() {
    let mut m = ChainedHashMap::with_capacity_and_load_factor(2, 0.5).expect("valid config");
    assert_eq!(m.threshold(), 1);
    m.put("a", 1);
    assert_eq!(m.capacity(), 4);
    assert_eq!(m.threshold(), 2);
    assert_eq!(m.get("a"), Some(&1));
}

// Test: three keys in one chain.
// Verifies: removing one leaves the other two reachable.
#[test]
fn scenario_remove_within_colliding_chain() {
    let keys = [
        Colliding { group: 1, name: "p" },
        Colliding { group: 1, name: "q" },
        Colliding { group: 1, name: "r" },
    ];
    let mut m = ChainedHashMap::new();
    for (i, k) in keys.iter().enumerate() {
        m.put(k.clone(), i);
    }
    assert!(m.remove(&keys[1]));
    assert_eq!(m.get(&keys[0]), Some(&0));
    assert_eq!(m.get(&keys[1]), None);
    assert_eq!(m.get(&keys[2]), Some(&2));
    assert_eq!(m.len(), 2);
}

// Test: removal of an absent key.
// Verifies: returns false and leaves len unchanged.
#[test]
fn remove_absent_is_noop() {
    let mut m = ChainedHashMap::new();
    m.put(1u32, "one");
    assert!(!m.remove(&2));
    assert_eq!(m.len(), 1);
    assert!(m.remove(&1));
    assert!(!m.remove(&1));
    assert!(m.is_empty());
}

// Test: contains_value after an overwrite.
// Verifies: the old value is gone and the new value is found.
#[test]
fn contains_value_tracks_overwrites() {
    let mut m = ChainedHashMap::new();
    m.put("k".to_string(), "old".to_string());
    m.put("other".to_string(), "x".to_string());
    assert!(m.contains_value(&"old".to_string()));
    m.put("k".to_string(), "new".to_string());
    assert!(!m.contains_value(&"old".to_string()));
    assert!(m.contains_value(&"new".to_string()));
    assert!(m.contains_value(&"x".to_string()));
}

// Test: round trip across many resizes.
// Verifies: every key inserted before a doubling is still found after it.
#[test]
fn values_survive_repeated_growth() {
    let mut m = ChainedHashMap::with_capacity(1).expect("valid config");
    for i in 0..1_000u64 {
        m.put(i, i * i);
        assert_eq!(m.get(&i), Some(&(i * i)));
    }
    assert_eq!(m.len(), 1_000);
    for i in 0..1_000u64 {
        assert_eq!(m.get(&i), Some(&(i * i)));
    }
    assert!(m.len() < m.threshold());
}

// Test: constructor validation.
// Verifies: zero or oversized capacity and non-positive or NaN load factors fail.
#[test]
fn construction_errors() {
    assert_eq!(
        ChainedHashMap::<String, u8>::with_capacity(0).err(),
        Some(ConfigError::ZeroCapacity)
    );
    assert_eq!(
        ChainedHashMap::<String, u8>::with_config(MapConfig::new(8, -1.0)).err(),
        Some(ConfigError::InvalidLoadFactor(-1.0))
    );
    assert!(ChainedHashMap::<String, u8>::with_capacity_and_load_factor(8, f32::NAN).is_err());
    assert_eq!(
        ChainedHashMap::<String, u8>::with_capacity(usize::MAX).err(),
        Some(ConfigError::CapacityTooLarge(usize::MAX))
    );

    let m = ChainedHashMap::<String, u8>::with_config(MapConfig::new(10, 0.5)).expect("valid");
    assert_eq!((m.capacity(), m.threshold()), (10, 5));
}

// Test: snapshots.
// Verifies: key_set/entry_set reflect the contents; mutating them does not
// affect the map.
#[test]
fn key_and_entry_sets_are_detached() {
    let mut m = ChainedHashMap::new();
    m.put("a".to_string(), 1);
    m.put("b".to_string(), 2);
    m.put("a".to_string(), 10);

    let mut keys = m.key_set();
    let mut sorted: Vec<_> = keys.iter().cloned().collect();
    sorted.sort();
    assert_eq!(sorted, ["a", "b"]);

    let mut entries = m.entry_set();
    assert_eq!(entries.len(), 2);
    assert!(entries.contains(&("a".to_string(), 10)));
    assert!(entries.contains(&("b".to_string(), 2)));

    keys.clear();
    entries.insert(("c".to_string(), 3));
    assert_eq!(m.len(), 2);
    assert!(!m.contains_key("c"));
}

// Test: clear.
// Verifies: all entries are gone while capacity and threshold stay put.
#[test]
fn clear_resets_contents_only() {
    let mut m: ChainedHashMap<u32, u32> = (0..20).map(|i| (i, i)).collect();
    let cap = m.capacity();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.len(), 0);
    assert_eq!(m.capacity(), cap);
    assert!(!m.contains_key(&5));
    assert!(m.key_set().is_empty());
}

// Test: Option keys.
// Verifies: None is an ordinary key with its own bucket.
#[test]
fn none_is_an_ordinary_key() {
    let mut m = ChainedHashMap::new();
    m.put(None, "absent");
    m.put(Some(0), "zero");
    assert_eq!(m.get(&None), Some(&"absent"));
    assert_eq!(m.get(&Some(0)), Some(&"zero"));
    assert!(m.remove(&None));
    assert!(!m.contains_key(&None));
}

// Test: iteration and extension.
// Verifies: iter yields every pair once; extend applies last-write-wins.
#[test]
fn iter_and_extend() {
    let mut m = ChainedHashMap::new();
    m.extend([(1, 'a'), (2, 'b'), (1, 'c')]);
    let seen: BTreeSet<(i32, char)> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(seen, BTreeSet::from([(1, 'c'), (2, 'b')]));
    let mut count = 0;
    for (_k, _v) in &m {
        count += 1;
    }
    assert_eq!(count, m.len());
}

// Test: external locking.
// Verifies: the map is Send and works behind one Mutex across threads.
#[test]
fn shared_behind_a_mutex() {
    let m = Arc::new(Mutex::new(ChainedHashMap::new()));
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for i in 0..250u32 {
                    m.lock().expect("lock").put(t * 1_000 + i, t);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread");
    }
    let m = m.lock().expect("lock");
    assert_eq!(m.len(), 1_000);
    assert_eq!(m.get(&3_249), Some(&3));
}
