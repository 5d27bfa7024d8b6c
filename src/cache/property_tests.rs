//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache engine's invariants over arbitrary
//! operation sequences.

use chrono::Utc;
use proptest::prelude::*;

use crate::cache::CacheStore;
use crate::models::{MessageId, MessageView};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: u64 = 300;

// == Strategies ==
fn id_strategy() -> impl Strategy<Value = MessageId> {
    1u64..64
}

fn view_strategy() -> impl Strategy<Value = MessageView> {
    ("[a-z]{1,20}", "[a-zA-Z0-9 ]{1,128}").prop_map(|(recipient, body)| MessageView {
        recipient,
        body,
        expires_at: Utc::now(),
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: MessageId, value: MessageView },
    Get { key: MessageId },
    ExpireNow { key: MessageId },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (id_strategy(), view_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        id_strategy().prop_map(|key| CacheOp::Get { key }),
        id_strategy().prop_map(|key| CacheOp::ExpireNow { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses add up to exactly the reads performed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value, TEST_TTL).unwrap();
                }
                CacheOp::Get { key } => match store.get(key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::ExpireNow { key } => store.expire_now(key),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // A set value is read back unchanged until it expires.
    #[test]
    fn prop_roundtrip_storage(key in id_strategy(), value in view_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);

        store.set(key, value.clone(), TEST_TTL).unwrap();

        prop_assert_eq!(store.get(key), Some(value));
    }

    // After expire_now, no read returns the key until it is set again.
    #[test]
    fn prop_expire_now_hides_entry(
        key in id_strategy(),
        value in view_strategy(),
        repeats in 1usize..4
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);
        store.set(key, value.clone(), TEST_TTL).unwrap();

        for _ in 0..repeats {
            store.expire_now(key);
        }
        prop_assert!(store.get(key).is_none());

        store.set(key, value.clone(), TEST_TTL).unwrap();
        prop_assert_eq!(store.get(key), Some(value));
    }

    // Overwriting keeps a single entry holding the latest value.
    #[test]
    fn prop_overwrite_semantics(
        key in id_strategy(),
        first in view_strategy(),
        second in view_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES);

        store.set(key, first, TEST_TTL).unwrap();
        store.set(key, second.clone(), TEST_TTL).unwrap();

        prop_assert_eq!(store.get(key), Some(second));
        prop_assert_eq!(store.len(), 1);
    }

    // The entry count never exceeds the configured capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((id_strategy(), view_strategy()), 1..200)
    ) {
        let max_entries = 16;
        let mut store = CacheStore::new(max_entries);

        for (key, value) in entries {
            store.set(key, value, TEST_TTL).unwrap();
            prop_assert!(store.len() <= max_entries);
        }
    }
}
