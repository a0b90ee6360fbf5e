// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Producer/consumer access to one store from several threads.

use std::sync::Arc;
use std::thread;

use aiq_result_store::ResultStore;
use aiq_types::{Statistics, TuningMode};

#[test]
fn test_locked_record_is_stable_while_producer_publishes() {
    let store = Arc::new(ResultStore::new(8, 3).unwrap());
    let mut first = Statistics::new(1, 100, TuningMode::VideoHdr);
    first.payload = vec![7; 16];
    store.publish_statistics(first).unwrap();

    let guard = store.lock_statistics().unwrap().unwrap();

    let producer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for seq in 2..200 {
                let mut stats = Statistics::new(seq, seq as u64 * 33, TuningMode::Video);
                stats.payload = vec![0; 16];
                store.publish_statistics(stats).unwrap();
            }
        })
    };
    producer.join().unwrap();

    assert_eq!(guard.sequence(), 1);
    assert_eq!(guard.tuning_mode, TuningMode::VideoHdr);
    assert!(guard.payload.iter().all(|&b| b == 7));
    assert!(store.statistics_sequences().contains(&1));
    drop(guard);

    let newest = store.lock_statistics().unwrap().unwrap();
    assert_eq!(newest.sequence(), 199);
}

#[test]
fn test_readers_see_strictly_increasing_sequences() {
    let store = Arc::new(ResultStore::new(16, 2).unwrap());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for seq in 0..500 {
                let mut slot = store.acquire_slot();
                slot.sequence = seq;
                store.commit(slot).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut last_seen = -1;
                for _ in 0..500 {
                    if let Some(latest) = store.latest() {
                        assert!(latest.sequence >= last_seen);
                        last_seen = latest.sequence;
                    }
                    let sequences = store.committed_sequences();
                    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.latest_sequence(), Some(499));
    assert_eq!(store.committed_sequences().len(), 16);
}
