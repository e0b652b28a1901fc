//! Property-Based Tests for Cache Module

use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use bytes::Bytes;

use crate::cache::{CacheEntry, CacheStore};
use crate::fingerprint::fingerprint;

// == Strategies ==
fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z0-9_]{1,16}(\\.html|\\.css|/)?".prop_map(|s| s)
}

fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

fn headers_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("x-[a-z]{1,12}", "[a-zA-Z0-9 ,;=]{0,32}"), 0..6)
}

fn build_entry(headers: &[(String, String)], body: &[u8], served_at: SystemTime) -> CacheEntry {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    CacheEntry::new(StatusCode::OK, map, Bytes::copy_from_slice(body), served_at)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Store { path: String, body: Vec<u8> },
    Lookup { path: String },
    Invalidate { path: String, later: bool },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (path_strategy(), body_strategy()).prop_map(|(path, body)| CacheOp::Store { path, body }),
        path_strategy().prop_map(|path| CacheOp::Lookup { path }),
        (path_strategy(), any::<bool>()).prop_map(|(path, later)| CacheOp::Invalidate { path, later }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing then looking up by the same fingerprint returns identical headers and body.
    #[test]
    fn prop_roundtrip_storage(
        path in path_strategy(),
        headers in headers_strategy(),
        body in body_strategy()
    ) {
        let mut store = CacheStore::new();
        let fp = fingerprint(&path);
        let stored = build_entry(&headers, &body, SystemTime::now());
        let expected_headers = stored.headers.clone();

        store.store(fp, stored);
        let found = store.lookup(&fp).unwrap();

        prop_assert_eq!(&found.body[..], &body[..]);
        prop_assert_eq!(&found.headers, &expected_headers);
    }

    // A second store under the same fingerprint replaces the first entirely.
    #[test]
    fn prop_overwrite_semantics(
        path in path_strategy(),
        body1 in body_strategy(),
        body2 in body_strategy()
    ) {
        let mut store = CacheStore::new();
        let fp = fingerprint(&path);

        store.store(fp, build_entry(&[], &body1, SystemTime::now()));
        store.store(fp, build_entry(&[], &body2, SystemTime::now()));

        prop_assert_eq!(&store.lookup(&fp).unwrap().body[..], &body2[..]);
        prop_assert_eq!(store.len(), 1);
    }

    // Hit, miss and invalidation counters track every operation.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new();
        let served_at = SystemTime::now();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;
        let mut expected_invalidations = 0u64;

        for op in ops {
            match op {
                CacheOp::Store { path, body } => {
                    store.store(fingerprint(&path), build_entry(&[], &body, served_at));
                }
                CacheOp::Lookup { path } => match store.lookup(&fingerprint(&path)) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Invalidate { path, later } => {
                    let modified = if later {
                        served_at + Duration::from_secs(1)
                    } else {
                        served_at - Duration::from_secs(1)
                    };
                    if store.invalidate_if_modified(&fingerprint(&path), modified) {
                        prop_assert!(later, "Older modification time must not invalidate");
                        expected_invalidations += 1;
                    }
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.invalidations, expected_invalidations);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Concurrent writers through the shared mutex never expose a torn entry:
    // every body read back is one that some writer stored whole.
    #[test]
    fn prop_concurrent_operation_correctness(
        bodies in prop::collection::vec(body_strategy(), 2..16)
    ) {
        let store = Arc::new(Mutex::new(CacheStore::new()));
        let fp = fingerprint("/shared.html");

        let handles: Vec<_> = bodies
            .iter()
            .cloned()
            .map(|body| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let entry = build_entry(&[("x-len".to_string(), body.len().to_string())], &body, SystemTime::now());
                    store.lock().unwrap().store(fp, entry);
                    store.lock().unwrap().lookup(&fp).map(|e| {
                        (e.body.clone(), e.headers["x-len"].to_str().unwrap().to_string())
                    })
                })
            })
            .collect();

        for handle in handles {
            let (body, len) = handle.join().expect("Thread should not panic").unwrap();
            prop_assert!(bodies.iter().any(|b| b[..] == body[..]));
            prop_assert_eq!(len, body.len().to_string());
        }
        prop_assert_eq!(store.lock().unwrap().len(), 1);
    }
}
