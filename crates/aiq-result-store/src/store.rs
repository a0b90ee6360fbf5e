// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! ResultStore - fixed-capacity, sequence-ordered result history plus statistics ring.
//!
//! Key semantics:
//! - Results are built in slots handed out by [`ResultStore::acquire_slot`] and become
//!   visible to readers only through [`ResultStore::commit`].
//! - Committed results are immutable and shared (`Arc`); sequences strictly increase.
//! - The oldest committed result is evicted when the ring is full; its allocation is
//!   recycled once no reader holds it anymore.
//! - One statistics record can be locked at a time; a locked record is never evicted.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use aiq_types::{ControlResult, Sequence, Statistics};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::error::{StoreError, StoreResult};

pub const MIN_RESULT_CAPACITY: usize = 2;
pub const MIN_STATISTICS_CAPACITY: usize = 2;

/// Sequence-indexed result ring and statistics ring shared by producer and consumers.
#[derive(Debug)]
pub struct ResultStore {
    results: RwLock<ResultRing>,
    statistics: Mutex<StatisticsRing>,
}

#[derive(Debug)]
struct ResultRing {
    capacity: usize,
    committed: VecDeque<Arc<ControlResult>>, // oldest -> newest
    pool: Vec<ControlResult>,
}

#[derive(Debug)]
struct StatisticsRing {
    capacity: usize,
    records: VecDeque<Arc<Statistics>>, // oldest -> newest
    locked: Option<Sequence>,
    last_published: Option<Sequence>,
}

impl ResultStore {
    pub fn new(result_capacity: usize, statistics_capacity: usize) -> StoreResult<Self> {
        if result_capacity < MIN_RESULT_CAPACITY {
            return Err(StoreError::InvalidCapacity {
                ring: "result",
                minimum: MIN_RESULT_CAPACITY,
                requested: result_capacity,
            });
        }
        if statistics_capacity < MIN_STATISTICS_CAPACITY {
            return Err(StoreError::InvalidCapacity {
                ring: "statistics",
                minimum: MIN_STATISTICS_CAPACITY,
                requested: statistics_capacity,
            });
        }

        Ok(Self {
            results: RwLock::new(ResultRing {
                capacity: result_capacity,
                committed: VecDeque::with_capacity(result_capacity),
                pool: Vec::with_capacity(result_capacity),
            }),
            statistics: Mutex::new(StatisticsRing {
                capacity: statistics_capacity,
                records: VecDeque::with_capacity(statistics_capacity),
                locked: None,
                last_published: None,
            }),
        })
    }

    pub fn result_capacity(&self) -> usize {
        self.results.read().capacity
    }

    // ═══════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════

    /// Hand out an empty, unscheduled result slot.
    ///
    /// The slot is exclusively owned by the caller until it is committed.
    pub fn acquire_slot(&self) -> ControlResult {
        let recycled = self.results.write().pool.pop();
        match recycled {
            Some(mut slot) => {
                slot.reset();
                slot
            }
            None => ControlResult::default(),
        }
    }

    /// Make `result` visible to readers.
    ///
    /// The result must carry a sequence greater than every previously committed one.
    pub fn commit(&self, result: ControlResult) -> StoreResult<Arc<ControlResult>> {
        if !result.is_scheduled() {
            return Err(StoreError::UnscheduledResult {
                sequence: result.sequence,
            });
        }

        let mut ring = self.results.write();
        if let Some(last) = ring.committed.back() {
            if result.sequence <= last.sequence {
                return Err(StoreError::NonMonotonicSequence {
                    last: last.sequence,
                    requested: result.sequence,
                });
            }
        }

        if ring.committed.len() == ring.capacity {
            if let Some(evicted) = ring.committed.pop_front() {
                trace!("[RESULT-STORE] Evicting result seq={}", evicted.sequence);
                // Readers may still hold the evicted result; only reclaim unshared slots.
                if let Ok(slot) = Arc::try_unwrap(evicted) {
                    if ring.pool.len() < ring.capacity {
                        ring.pool.push(slot);
                    }
                }
            }
        }

        let committed = Arc::new(result);
        debug!(
            "[RESULT-STORE] Committed seq={} mode={} skip={}",
            committed.sequence, committed.tuning_mode, committed.skip
        );
        ring.committed.push_back(Arc::clone(&committed));
        Ok(committed)
    }

    /// Newest committed result.
    pub fn latest(&self) -> Option<Arc<ControlResult>> {
        self.results.read().committed.back().cloned()
    }

    pub fn latest_sequence(&self) -> Option<Sequence> {
        self.results.read().committed.back().map(|r| r.sequence)
    }

    /// Result in effect on frame `sequence`: the newest committed one with a sequence `<=` it.
    pub fn result_for(&self, sequence: Sequence) -> Option<Arc<ControlResult>> {
        self.results
            .read()
            .committed
            .iter()
            .rev()
            .find(|r| r.sequence <= sequence)
            .cloned()
    }

    /// Committed result whose sequence is exactly `sequence`.
    pub fn exact(&self, sequence: Sequence) -> Option<Arc<ControlResult>> {
        let ring = self.results.read();
        ring.committed
            .binary_search_by_key(&sequence, |r| r.sequence)
            .ok()
            .and_then(|idx| ring.committed.get(idx).cloned())
    }

    /// Committed sequences, oldest first.
    pub fn committed_sequences(&self) -> Vec<Sequence> {
        self.results
            .read()
            .committed
            .iter()
            .map(|r| r.sequence)
            .collect()
    }

    /// Drop every committed result and every unlocked statistics record.
    ///
    /// Sequence ordering starts over for both rings: the next commit and the next publish
    /// may carry any sequence. A locked statistics record stays until its guard drops.
    pub fn reset(&self) {
        {
            let mut ring = self.results.write();
            let committed: Vec<_> = ring.committed.drain(..).collect();
            for result in committed {
                if let Ok(slot) = Arc::try_unwrap(result) {
                    if ring.pool.len() < ring.capacity {
                        ring.pool.push(slot);
                    }
                }
            }
        }

        let mut stats = self.statistics.lock();
        let locked = stats.locked;
        stats.records.retain(|s| Some(s.sequence) == locked);
        stats.last_published = None;
        debug!("[RESULT-STORE] Reset");
    }

    // ═══════════════════════════════════════════════════════════
    // Statistics
    // ═══════════════════════════════════════════════════════════

    /// Store a new statistics record, evicting the oldest unlocked one when full.
    pub fn publish_statistics(&self, statistics: Statistics) -> StoreResult<()> {
        let mut ring = self.statistics.lock();
        if let Some(last) = ring.last_published {
            if statistics.sequence <= last {
                return Err(StoreError::NonMonotonicStatistics {
                    last,
                    requested: statistics.sequence,
                });
            }
        }

        if ring.records.len() >= ring.capacity {
            let locked = ring.locked;
            let victim = ring
                .records
                .iter()
                .position(|s| Some(s.sequence) != locked)
                .ok_or(StoreError::StatisticsRingExhausted)?;
            ring.records.remove(victim);
        }

        trace!(
            "[RESULT-STORE] Published statistics seq={} mode={}",
            statistics.sequence,
            statistics.tuning_mode
        );
        ring.last_published = Some(statistics.sequence);
        ring.records.push_back(Arc::new(statistics));
        Ok(())
    }

    /// Lock the newest statistics record for reading.
    ///
    /// Returns `Ok(None)` when nothing has been published yet. The record stays in the
    /// ring until the returned guard is dropped.
    pub fn lock_statistics(&self) -> StoreResult<Option<StatisticsLock<'_>>> {
        let mut ring = self.statistics.lock();
        if let Some(sequence) = ring.locked {
            return Err(StoreError::StatisticsAlreadyLocked { sequence });
        }

        let Some(record) = ring.records.back().cloned() else {
            return Ok(None);
        };
        ring.locked = Some(record.sequence);
        trace!("[RESULT-STORE] Locked statistics seq={}", record.sequence);
        Ok(Some(StatisticsLock {
            store: self,
            record,
        }))
    }

    pub fn locked_statistics_sequence(&self) -> Option<Sequence> {
        self.statistics.lock().locked
    }

    pub fn statistics_sequences(&self) -> Vec<Sequence> {
        self.statistics
            .lock()
            .records
            .iter()
            .map(|s| s.sequence)
            .collect()
    }

    fn unlock_statistics(&self, sequence: Sequence) {
        let mut ring = self.statistics.lock();
        if ring.locked == Some(sequence) {
            ring.locked = None;
            trace!("[RESULT-STORE] Unlocked statistics seq={}", sequence);
        } else {
            warn!(
                "[RESULT-STORE] Unlock of seq={} ignored, locked={:?}",
                sequence, ring.locked
            );
        }
    }
}

/// Read guard over one statistics record; unlocks on drop.
#[derive(Debug)]
pub struct StatisticsLock<'a> {
    store: &'a ResultStore,
    record: Arc<Statistics>,
}

impl StatisticsLock<'_> {
    pub fn sequence(&self) -> Sequence {
        self.record.sequence
    }
}

impl Deref for StatisticsLock<'_> {
    type Target = Statistics;

    fn deref(&self) -> &Statistics {
        &self.record
    }
}

impl Drop for StatisticsLock<'_> {
    fn drop(&mut self) {
        self.store.unlock_statistics(self.record.sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiq_types::TuningMode;

    fn result_at(store: &ResultStore, sequence: Sequence) -> ControlResult {
        let mut slot = store.acquire_slot();
        slot.sequence = sequence;
        slot
    }

    #[test]
    fn test_rejects_tiny_capacities() {
        assert!(matches!(
            ResultStore::new(1, 3),
            Err(StoreError::InvalidCapacity { ring: "result", .. })
        ));
        assert!(matches!(
            ResultStore::new(4, 1),
            Err(StoreError::InvalidCapacity { ring: "statistics", .. })
        ));
    }

    #[test]
    fn test_commit_requires_increasing_sequence() {
        let store = ResultStore::new(4, 2).unwrap();
        store.commit(result_at(&store, 5)).unwrap();

        let err = store.commit(result_at(&store, 5)).unwrap_err();
        assert_eq!(err, StoreError::NonMonotonicSequence { last: 5, requested: 5 });

        let err = store.commit(result_at(&store, 3)).unwrap_err();
        assert_eq!(err, StoreError::NonMonotonicSequence { last: 5, requested: 3 });

        assert!(matches!(
            store.commit(store.acquire_slot()),
            Err(StoreError::UnscheduledResult { sequence: -1 })
        ));
        assert_eq!(store.committed_sequences(), vec![5]);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let store = ResultStore::new(3, 2).unwrap();
        for seq in 1..=5 {
            store.commit(result_at(&store, seq)).unwrap();
        }
        assert_eq!(store.committed_sequences(), vec![3, 4, 5]);
        assert!(store.exact(2).is_none());
        assert_eq!(store.latest_sequence(), Some(5));
    }

    #[test]
    fn test_evicted_slot_is_recycled_clean() {
        let store = ResultStore::new(2, 2).unwrap();
        let mut first = result_at(&store, 1);
        first.skip = true;
        first.tuning_mode = TuningMode::VideoUll;
        store.commit(first).unwrap();
        store.commit(result_at(&store, 2)).unwrap();
        store.commit(result_at(&store, 3)).unwrap();

        let slot = store.acquire_slot();
        assert_eq!(slot, ControlResult::default());
    }

    #[test]
    fn test_held_result_survives_eviction() {
        let store = ResultStore::new(2, 2).unwrap();
        let held = store.commit(result_at(&store, 1)).unwrap();
        store.commit(result_at(&store, 2)).unwrap();
        store.commit(result_at(&store, 3)).unwrap();
        assert_eq!(held.sequence, 1);
        assert!(store.exact(1).is_none());
    }

    #[test]
    fn test_result_for_picks_result_in_effect() {
        let store = ResultStore::new(8, 2).unwrap();
        for seq in [2, 4, 8] {
            store.commit(result_at(&store, seq)).unwrap();
        }
        assert!(store.result_for(1).is_none());
        assert_eq!(store.result_for(2).unwrap().sequence, 2);
        assert_eq!(store.result_for(3).unwrap().sequence, 2);
        assert_eq!(store.result_for(7).unwrap().sequence, 4);
        assert_eq!(store.result_for(100).unwrap().sequence, 8);
        assert!(store.exact(3).is_none());
        assert_eq!(store.exact(4).unwrap().sequence, 4);
    }

    #[test]
    fn test_statistics_lock_returns_newest() {
        let store = ResultStore::new(4, 3).unwrap();
        assert!(store.lock_statistics().unwrap().is_none());

        store.publish_statistics(Statistics::new(10, 1000, TuningMode::Video)).unwrap();
        store.publish_statistics(Statistics::new(11, 1033, TuningMode::Video)).unwrap();

        let guard = store.lock_statistics().unwrap().unwrap();
        assert_eq!(guard.sequence(), 11);
        assert_eq!(guard.timestamp, 1033);
        assert_eq!(store.locked_statistics_sequence(), Some(11));
        assert!(matches!(
            store.lock_statistics(),
            Err(StoreError::StatisticsAlreadyLocked { sequence: 11 })
        ));
        drop(guard);
        assert_eq!(store.locked_statistics_sequence(), None);
    }

    #[test]
    fn test_locked_statistics_never_evicted() {
        let store = ResultStore::new(4, 2).unwrap();
        store.publish_statistics(Statistics::new(1, 0, TuningMode::Video)).unwrap();
        let guard = store.lock_statistics().unwrap().unwrap();

        for seq in 2..6 {
            store.publish_statistics(Statistics::new(seq, 0, TuningMode::Video)).unwrap();
        }
        assert_eq!(store.statistics_sequences(), vec![1, 5]);
        assert_eq!(guard.sequence(), 1);
        drop(guard);

        store.publish_statistics(Statistics::new(6, 0, TuningMode::Video)).unwrap();
        assert_eq!(store.statistics_sequences(), vec![5, 6]);
    }

    #[test]
    fn test_statistics_must_increase() {
        let store = ResultStore::new(4, 2).unwrap();
        store.publish_statistics(Statistics::new(3, 0, TuningMode::Video)).unwrap();
        assert_eq!(
            store.publish_statistics(Statistics::new(3, 0, TuningMode::Video)),
            Err(StoreError::NonMonotonicStatistics { last: 3, requested: 3 })
        );
    }

    #[test]
    fn test_reset_keeps_locked_statistics() {
        let store = ResultStore::new(4, 3).unwrap();
        store.commit(result_at(&store, 1)).unwrap();
        store.publish_statistics(Statistics::new(1, 0, TuningMode::Video)).unwrap();
        store.publish_statistics(Statistics::new(2, 0, TuningMode::Video)).unwrap();
        let guard = store.lock_statistics().unwrap().unwrap();

        store.reset();
        assert!(store.latest().is_none());
        assert_eq!(store.statistics_sequences(), vec![2]);
        drop(guard);

        // Commits may restart from any sequence after a reset.
        store.commit(result_at(&store, 0)).unwrap();
    }

    #[test]
    fn test_reset_restarts_statistics_ordering() {
        let store = ResultStore::new(4, 3).unwrap();
        for seq in 6..9 {
            store.publish_statistics(Statistics::new(seq, 0, TuningMode::Video)).unwrap();
        }
        let guard = store.lock_statistics().unwrap().unwrap();
        assert_eq!(guard.sequence(), 8);

        store.reset();
        store.publish_statistics(Statistics::new(0, 0, TuningMode::Video)).unwrap();
        assert_eq!(guard.sequence(), 8);
        assert_eq!(store.statistics_sequences(), vec![8, 0]);
        drop(guard);

        store.publish_statistics(Statistics::new(1, 0, TuningMode::Video)).unwrap();
        assert_eq!(store.lock_statistics().unwrap().unwrap().sequence(), 1);
        assert_eq!(
            store.publish_statistics(Statistics::new(1, 0, TuningMode::Video)),
            Err(StoreError::NonMonotonicStatistics { last: 1, requested: 1 })
        );
    }
}
