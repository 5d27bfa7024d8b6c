//! LRU Tracker Module
//!
//! Access ordering of cached message ids, used to pick eviction victims when
//! the cache is at capacity.

use std::collections::{BTreeMap, HashMap};

use crate::models::MessageId;

// == LRU Tracker ==
/// Tracks access order of message ids.
///
/// Every touch stamps the id with a fresh tick; the smallest tick is the
/// least recently used. Touch, remove and eviction are all logarithmic.
#[derive(Debug, Default)]
pub struct LruTracker {
    next_tick: u64,
    ticks: HashMap<MessageId, u64>,
    order: BTreeMap<u64, MessageId>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks an id as most recently used.
    pub fn touch(&mut self, id: MessageId) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(previous) = self.ticks.insert(id, tick) {
            self.order.remove(&previous);
        }
        self.order.insert(tick, id);
    }

    // == Remove ==
    pub fn remove(&mut self, id: MessageId) {
        if let Some(tick) = self.ticks.remove(&id) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Pops the least recently used id, if any.
    pub fn evict_oldest(&mut self) -> Option<MessageId> {
        let (_, id) = self.order.pop_first()?;
        self.ticks.remove(&id);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, id: MessageId) -> bool {
        self.ticks.contains_key(&id)
    }
}
