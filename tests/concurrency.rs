//! Multi-threaded tests for lock discipline and notification delivery.

use ditto::{Store, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 500;

fn shared_store() -> Arc<Store> {
    Arc::new(Store::open("concurrency").unwrap())
}

#[test]
fn test_parallel_disjoint_writers() {
    let store = shared_store();

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = format!("t{t}-k{i}");
                    store.put(&key, key.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(store.len(), THREADS * OPS_PER_THREAD);
    for t in 0..THREADS {
        for i in 0..OPS_PER_THREAD {
            let key = format!("t{t}-k{i}");
            assert_eq!(store.get_value(&key).unwrap(), key.as_bytes());
        }
    }
}

#[test]
fn test_same_key_last_writer_wins_whole_value() {
    let store = shared_store();

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                // Each writer stores a value made of a single repeated byte.
                let value = vec![t as u8; 64 + t];
                for _ in 0..OPS_PER_THREAD {
                    store.put("contended", &value).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let value = store.get_value("contended").unwrap();
    let winner = value[0] as usize;
    assert!(winner < THREADS);
    assert_eq!(value, vec![winner as u8; 64 + winner]);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_readers_never_see_partial_values() {
    let store = shared_store();
    store.put("k", &[0u8; 32]).unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut round = 0u8;
            while !stop.load(Ordering::Relaxed) {
                round = round.wrapping_add(1);
                store.put("k", &vec![round; 32 + (round as usize % 7)]).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut buf = [0u8; 64];
                for _ in 0..2_000 {
                    let len = store.get("k", Some(&mut buf)).unwrap();
                    let first = buf[0];
                    assert!(buf[..len].iter().all(|&b| b == first));
                    assert_eq!(len, 32 + (first as usize % 7));
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn test_one_notification_per_successful_mutation() {
    let store = shared_store();
    let per_key = Arc::new(Mutex::new(HashMap::<String, usize>::new()));

    let counts = Arc::clone(&per_key);
    store
        .subscribe(move |key: &str| {
            *counts.lock().entry(key.to_string()).or_default() += 1;
        })
        .unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = format!("t{t}-{}", i % 10);
                    store.put(&key, b"v").unwrap();
                    // Half the deletes hit missing keys and must not notify.
                    let _ = store.delete(&key);
                    let _ = store.delete(&key);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let counts = per_key.lock();
    assert_eq!(counts.len(), THREADS * 10);
    for count in counts.values() {
        // One put and one successful delete per iteration.
        assert_eq!(*count, 2 * OPS_PER_THREAD / 10);
    }
}

#[test]
fn test_no_delivery_after_unsubscribe_returns() {
    let store = shared_store();
    let unsubscribed = Arc::new(AtomicBool::new(false));
    let late_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let id = {
        let unsubscribed = Arc::clone(&unsubscribed);
        let late_calls = Arc::clone(&late_calls);
        let calls = Arc::clone(&calls);
        store
            .subscribe(move |_key: &str| {
                if unsubscribed.load(Ordering::SeqCst) {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                }
                calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_micros(200));
            })
            .unwrap()
    };

    let stop = Arc::new(AtomicBool::new(false));
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let key = format!("w{t}");
                while !stop.load(Ordering::Relaxed) {
                    store.put(&key, b"x").unwrap();
                }
            })
        })
        .collect();

    while calls.load(Ordering::SeqCst) < 20 {
        thread::yield_now();
    }
    store.unsubscribe(id).unwrap();
    unsubscribed.store(true, Ordering::SeqCst);

    thread::sleep(Duration::from_millis(20));
    stop.store(true, Ordering::Relaxed);
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(late_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_subscribe_respects_capacity() {
    let store = shared_store();

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut granted = 0usize;
                for _ in 0..25 {
                    match store.subscribe(|_key: &str| {}) {
                        Ok(_) => granted += 1,
                        Err(StoreError::CapacityExceeded { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                granted
            })
        })
        .collect();

    let granted: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(granted, 100);
    assert_eq!(store.subscription_count(), 100);
}
