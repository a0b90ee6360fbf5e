// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded sequence/request-id correlation tables.

use std::collections::VecDeque;

use ahash::AHashMap;
use aiq_types::{RequestId, Sequence};
use tracing::trace;

use crate::collaborators::RequestCorrelator;

/// Default request-id correlator
///
/// Both tables keep at most `capacity` entries and forget the oldest first, so lookups
/// cover roughly the window of results the store still holds.
#[derive(Debug, Clone)]
pub struct RequestIdMap {
    capacity: usize,
    by_sequence: AHashMap<Sequence, RequestId>,
    sequence_order: VecDeque<Sequence>,
    executed: AHashMap<RequestId, RequestId>,
    request_order: VecDeque<RequestId>,
}

impl RequestIdMap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            by_sequence: AHashMap::with_capacity(capacity),
            sequence_order: VecDeque::with_capacity(capacity),
            executed: AHashMap::with_capacity(capacity),
            request_order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.by_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sequence.is_empty()
    }
}

impl RequestCorrelator for RequestIdMap {
    fn record(&mut self, sequence: Sequence, request_id: RequestId) {
        if self.by_sequence.insert(sequence, request_id).is_none() {
            self.sequence_order.push_back(sequence);
            if self.sequence_order.len() > self.capacity {
                if let Some(oldest) = self.sequence_order.pop_front() {
                    self.by_sequence.remove(&oldest);
                }
            }
        }
        trace!("[AIQ-ENGINE] seq={} -> request {}", sequence, request_id);
    }

    fn request_id_for(&self, sequence: Sequence) -> Option<RequestId> {
        self.by_sequence.get(&sequence).copied()
    }

    fn link_request(&mut self, request_id: RequestId, executed_request_id: RequestId) {
        if self.executed.insert(request_id, executed_request_id).is_none() {
            self.request_order.push_back(request_id);
            if self.request_order.len() > self.capacity {
                if let Some(oldest) = self.request_order.pop_front() {
                    self.executed.remove(&oldest);
                }
            }
        }
    }

    fn executed_request_for(&self, request_id: RequestId) -> Option<RequestId> {
        self.executed.get(&request_id).copied()
    }

    fn reset(&mut self) {
        self.by_sequence.clear();
        self.sequence_order.clear();
        self.executed.clear();
        self.request_order.clear();
    }
}
