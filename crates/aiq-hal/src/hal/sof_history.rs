// Copyright 2025 AIQ Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;

use aiq_types::{Sequence, SofEvent};

/// Bounded history of start-of-frame events, oldest first.
#[derive(Debug, Clone)]
pub struct SofHistory {
    capacity: usize,
    events: VecDeque<SofEvent>,
}

impl SofHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, event: SofEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn timestamp_for(&self, sequence: Sequence) -> Option<u64> {
        self.events
            .iter()
            .rev()
            .find(|e| e.sequence == sequence)
            .map(|e| e.timestamp)
    }

    pub fn latest(&self) -> Option<SofEvent> {
        self.events.back().copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
