//! Behaviour every [`Storage`](depot::Storage) backend must share.
//!
//! Each check uses its own key prefix, so all of them can run against the
//! same fixture. Failures panic with the backend name in the message.

use depot::{Digest, Error, ErrorKind, Value};
use serde_json::json;

use crate::fixtures::Fixture;

/// Run every check against `fixture`.
pub fn run_all(fixture: &Fixture) {
    write_then_read(fixture);
    read_missing(fixture);
    latest_write_wins(fixture);
    backlog_newest_first(fixture);
    backlog_missing(fixture);
    backlog_is_restartable(fixture);
    keys_are_independent(fixture);
    equal_timestamps_keep_write_order(fixture);
    backwards_clock_keeps_history_ordered(fixture);
    attachments_are_deduplicated(fixture);
    empty_attachment(fixture);
    unknown_attachment(fixture);
    values_round_trip_exactly(fixture);
    invalid_writes_leave_no_trace(fixture);
    concurrent_writers_never_interleave(fixture);
}

fn values(fixture: &Fixture, key: &str) -> Vec<Value> {
    fixture
        .storage
        .backlog(key)
        .unwrap_or_else(|e| panic!("{:?}: backlog({key}) failed: {e}", fixture.backend))
        .map(|e| e.value)
        .collect()
}

pub fn write_then_read(fixture: &Fixture) {
    fixture.storage.write("wr/foo", &json!("bar"), None).unwrap();
    assert_eq!(fixture.storage.read("wr/foo").unwrap(), json!("bar"));
}

pub fn read_missing(fixture: &Fixture) {
    let err = fixture.storage.read("rm/never").unwrap_err();
    assert!(
        matches!(err, Error::NotFound(ref k) if k == "rm/never"),
        "{:?}: {err}",
        fixture.backend
    );
}

pub fn latest_write_wins(fixture: &Fixture) {
    let s = &fixture.storage;
    s.write("lw/x", &json!(1), None).unwrap();
    fixture.tick(1);
    s.write("lw/x", &json!(2), None).unwrap();
    assert_eq!(s.read("lw/x").unwrap(), json!(2));
    assert_eq!(s.latest("lw/x").unwrap().value, json!(2));
}

pub fn backlog_newest_first(fixture: &Fixture) {
    let s = &fixture.storage;
    for v in 1..=3 {
        fixture.tick(5);
        s.write("bn/x", &json!(v), None).unwrap();
    }
    assert_eq!(values(fixture, "bn/x"), vec![json!(3), json!(2), json!(1)]);

    let history = s.backlog("bn/x").unwrap();
    assert_eq!(history.len(), 3);
}

pub fn backlog_missing(fixture: &Fixture) {
    let err = fixture.storage.backlog("bm/never").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "{:?}", fixture.backend);
}

pub fn backlog_is_restartable(fixture: &Fixture) {
    let s = &fixture.storage;
    s.write("br/x", &json!("a"), None).unwrap();
    s.write("br/x", &json!("b"), None).unwrap();

    let mut first = s.backlog("br/x").unwrap();
    assert_eq!(first.next().map(|e| e.value), Some(json!("b")));

    // A second backlog starts from the newest entry again.
    assert_eq!(values(fixture, "br/x"), vec![json!("b"), json!("a")]);
    assert_eq!(first.next().map(|e| e.value), Some(json!("a")));
    assert!(first.next().is_none());
}

pub fn keys_are_independent(fixture: &Fixture) {
    let s = &fixture.storage;
    s.write("ki/a", &json!("a1"), None).unwrap();
    s.write("ki/b", &json!("b1"), None).unwrap();
    s.write("ki/a", &json!("a2"), None).unwrap();

    assert_eq!(values(fixture, "ki/a"), vec![json!("a2"), json!("a1")]);
    assert_eq!(values(fixture, "ki/b"), vec![json!("b1")]);
}

pub fn equal_timestamps_keep_write_order(fixture: &Fixture) {
    let s = &fixture.storage;
    let t1 = s.write("et/x", &json!(1), None).unwrap();
    let t2 = s.write("et/x", &json!(2), None).unwrap();
    let t3 = s.write("et/x", &json!(3), None).unwrap();
    assert!(t1 == t2 && t2 == t3);

    assert_eq!(s.read("et/x").unwrap(), json!(3));
    assert_eq!(values(fixture, "et/x"), vec![json!(3), json!(2), json!(1)]);
}

pub fn backwards_clock_keeps_history_ordered(fixture: &Fixture) {
    let s = &fixture.storage;
    let t1 = s.write("bc/x", &json!("early"), None).unwrap();
    fixture.tick(-60_000);
    let t2 = s.write("bc/x", &json!("late"), None).unwrap();
    fixture.tick(60_000);

    assert!(t2 >= t1, "{:?}: timestamp went backwards", fixture.backend);
    assert_eq!(s.read("bc/x").unwrap(), json!("late"));

    let entries: Vec<_> = s.backlog("bc/x").unwrap().collect();
    assert!(entries[0].timestamp >= entries[1].timestamp);
}

pub fn attachments_are_deduplicated(fixture: &Fixture) {
    let s = &fixture.storage;
    let payload = b"attachment payload".as_slice();
    s.write("ad/a", &json!(1), Some(payload)).unwrap();
    s.write("ad/b", &json!(2), Some(payload)).unwrap();

    let digest = Digest::of(payload);
    assert_eq!(s.latest("ad/a").unwrap().attachment, Some(digest));
    assert_eq!(s.latest("ad/b").unwrap().attachment, Some(digest));
    assert_eq!(s.attachment(&digest).unwrap().as_ref(), payload);
}

pub fn empty_attachment(fixture: &Fixture) {
    let s = &fixture.storage;
    s.write("ea/x", &json!(null), Some(b"".as_slice())).unwrap();

    let digest = s.latest("ea/x").unwrap().attachment;
    assert_eq!(digest, Some(Digest::of(b"")));
    assert!(s.attachment(&Digest::of(b"")).unwrap().is_empty());
}

pub fn unknown_attachment(fixture: &Fixture) {
    let digest = Digest::of(b"ua: never stored");
    let err = fixture.storage.attachment(&digest).unwrap_err();
    assert!(matches!(err, Error::AttachmentNotFound(d) if d == digest));
}

pub fn values_round_trip_exactly(fixture: &Fixture) {
    let value = json!({
        "zeta": [1, -2, 3.25, null, false],
        "alpha": {"nested": {"deep": "ünïcödé"}, "empty": []},
        "big": u64::MAX,
    });
    fixture.storage.write("rt/doc", &value, None).unwrap();

    let back = fixture.storage.read("rt/doc").unwrap();
    assert_eq!(back, value);
    assert_eq!(
        serde_json::to_string(&back).unwrap(),
        serde_json::to_string(&value).unwrap(),
        "{:?}: object key order changed",
        fixture.backend
    );
}

pub fn invalid_writes_leave_no_trace(fixture: &Fixture) {
    let s = &fixture.storage;

    let err = s.write("", &json!(1), Some(b"iw: orphan".as_slice())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let long_key = "k".repeat(depot::Limits::default().max_key_bytes + 1);
    let err = s.write(&long_key, &json!(1), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(s.attachment(&Digest::of(b"iw: orphan")).unwrap_err().is_not_found());
    assert!(s.read(&long_key).unwrap_err().is_not_found());
}

/// Writer threads hammering one key, each reading back after every write.
pub const CONCURRENT_WRITERS: usize = 8;
pub const WRITES_PER_WRITER: usize = 50;

pub fn concurrent_writers_never_interleave(fixture: &Fixture) {
    let key = "cw/shared";

    std::thread::scope(|scope| {
        for writer in 0..CONCURRENT_WRITERS {
            let storage = &fixture.storage;
            scope.spawn(move || {
                for n in 0..WRITES_PER_WRITER {
                    let value = json!({ "writer": writer, "n": n });
                    storage.write(key, &value, None).unwrap();

                    // Whatever is newest must be a complete value.
                    let latest = storage.read(key).unwrap();
                    assert!(latest["writer"].is_u64() && latest["n"].is_u64());
                }
            });
        }
    });

    let entries: Vec<_> = fixture.storage.backlog(key).unwrap().collect();
    assert_eq!(
        entries.len(),
        CONCURRENT_WRITERS * WRITES_PER_WRITER,
        "{:?}: lost writes",
        fixture.backend
    );
    assert_eq!(
        fixture.storage.count(key).unwrap(),
        CONCURRENT_WRITERS * WRITES_PER_WRITER
    );
    for pair in entries.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }

    // Each writer's own values appear newest first in its own order.
    for writer in 0..CONCURRENT_WRITERS {
        let ns: Vec<u64> = entries
            .iter()
            .filter(|e| e.value["writer"] == json!(writer))
            .filter_map(|e| e.value["n"].as_u64())
            .collect();
        let expected: Vec<u64> = (0..WRITES_PER_WRITER as u64).rev().collect();
        assert_eq!(ns, expected, "{:?}: writer {writer}", fixture.backend);
    }
}
