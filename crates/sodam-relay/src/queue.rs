//! FIFO set of in-flight transfers keyed by submission id.

use std::collections::{HashMap, VecDeque};

use crate::data::SubmissionId;

/// Pending-transfer queue with O(1) tail insert, O(1) removal of an
/// arbitrary entry by key, and amortized O(1) head eviction.
///
/// Completion order depends on network latency, not submission order, so
/// entries usually leave out of order: `remove` drops the entry from the map
/// and leaves a stale id in the order deque, which `remove_head` skips
/// lazily and `remove` compacts away once they outnumber the live entries.
/// The submission-id key is monotonic, so ids never recur.
pub(crate) struct PendingQueue<T> {
    entries: HashMap<SubmissionId, T>,
    order:   VecDeque<SubmissionId>,
}

impl<T> PendingQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order:   VecDeque::new(),
        }
    }

    pub fn insert(&mut self, id: SubmissionId, entry: T) {
        self.entries.insert(id, entry);
        self.order.push_back(id);
    }

    pub fn remove(&mut self, id: SubmissionId) -> Option<T> {
        let entry = self.entries.remove(&id);

        // stale ids accumulate in the order deque as entries complete out
        // of order; compact once they outnumber the live entries two to
        // one, which keeps each removal amortized O(1)
        if self.order.len() > 2 * self.entries.len().max(1) {
            self.order.retain(|id| self.entries.contains_key(id));
        }

        entry
    }

    /// Removes and returns the oldest live entry, or `None` when empty.
    pub fn remove_head(&mut self) -> Option<(SubmissionId, T)> {
        while let Some(id) = self.order.pop_front() {
            if let Some(entry) = self.entries.remove(&id) {
                return Some((id, entry));
            }
        }

        None
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}
