//! Property-Based Tests for Cache Module

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::cache::{cache_key, CacheStore};

const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: u64 = 600;

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,12}(\\?[a-z]{1,6}=[0-9-]{1,10})?"
}

fn payload_strategy() -> impl Strategy<Value = Value> {
    (any::<i32>(), "[A-Z]{2,8}", prop::option::of(any::<f32>()))
        .prop_map(|(sp, fuel, mw)| json!({ "data": [{ "settlementPeriod": sp, "fuelType": fuel, "generation": mw }] }))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), payload_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit and miss counters track every lookup.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, TEST_TTL),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => {
                    store.remove(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Within the TTL the cached payload comes back unchanged.
    #[test]
    fn prop_payload_returned_unchanged(key in key_strategy(), value in payload_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);
        store.set(key.clone(), value.clone(), TEST_TTL);

        prop_assert_eq!(store.get(&key), Some(value.clone()));
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // The store never grows past its capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), payload_strategy()), 1..200)
    ) {
        let max_entries = 20;
        let mut store = CacheStore::new(max_entries);

        for (key, value) in entries {
            store.set(key, value, TEST_TTL);
            prop_assert!(store.len() <= max_entries);
        }
    }

    // Clearing empties the store and reports how many keys went.
    #[test]
    fn prop_clear_reports_count(keys in prop::collection::btree_set(key_strategy(), 0..30)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);
        for key in &keys {
            store.set(key.clone(), json!({}), TEST_TTL);
        }

        prop_assert_eq!(store.clear(), keys.len());
        prop_assert!(store.is_empty());
    }

    // Key derivation ignores parameter insertion order.
    #[test]
    fn prop_key_order_independent(
        pairs in prop::collection::vec(("[a-z]{1,8}", "[0-9-]{1,10}"), 0..6)
    ) {
        let forward: BTreeMap<String, String> = pairs.iter().cloned().collect();
        let backward: BTreeMap<String, String> = pairs.iter().rev().cloned().collect();

        // Later duplicates win in `collect`, so only compare when names are unique
        prop_assume!(forward.len() == pairs.len());
        prop_assert_eq!(cache_key("raw/datasets/BOAL", &forward), cache_key("raw/datasets/BOAL", &backward));
    }
}
