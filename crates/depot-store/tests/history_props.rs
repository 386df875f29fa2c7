//! History properties shared by every RecordStore backend.

use std::sync::Arc;

use depot_core::{Key, ManualClock, Value};
use depot_store::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use proptest::prelude::*;

/// A write: which key (index into a small key set), the value, and how far
/// the clock moves before it (possibly backwards, possibly not at all).
fn ops() -> impl Strategy<Value = Vec<(usize, i64, i64)>> {
    prop::collection::vec((0usize..3, any::<i64>(), -5i64..5), 1..40)
}

const KEYS: [&str; 3] = ["a", "b", "c"];

fn check_history(store: &dyn RecordStore, clock: &ManualClock, ops: &[(usize, i64, i64)]) {
    let mut expected: Vec<Vec<Value>> = vec![Vec::new(); KEYS.len()];

    for &(k, v, step) in ops {
        clock.advance(step);
        let key = Key::new(KEYS[k]).unwrap();
        store.write(&key, &Value::from(v), None).unwrap();
        expected[k].push(Value::from(v));
    }

    for (k, name) in KEYS.iter().enumerate() {
        let written = &expected[k];
        if written.is_empty() {
            assert!(store.read_latest(name).unwrap_err().is_not_found());
            assert!(store.backlog(name).unwrap_err().is_not_found());
            continue;
        }

        assert_eq!(&store.read_latest(name).unwrap().value, written.last().unwrap());

        let backlog: Vec<_> = store.backlog(name).unwrap().collect();
        assert_eq!(backlog.len(), written.len());
        assert_eq!(store.count(name).unwrap(), written.len());

        let values: Vec<Value> = backlog.iter().map(|r| r.value.clone()).collect();
        let newest_first: Vec<Value> = written.iter().rev().cloned().collect();
        assert_eq!(values, newest_first);

        for pair in backlog.windows(2) {
            assert!(pair[0].is_newer_than(&pair[1]));
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn memory_history_matches_writes(ops in ops()) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = MemoryRecordStore::with_clock(clock.clone());
        check_history(&store, &clock, &ops);
    }

    #[test]
    fn sqlite_history_matches_writes(ops in ops()) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = SqliteRecordStore::open_memory_with_clock(clock.clone()).unwrap();
        check_history(&store, &clock, &ops);
    }
}
