//! Min-priority queue with improve-only updates
//!
//! Backs the prioritized-sweeping schedule: items are states, keys are
//! negative Bellman residuals, and `pop` yields the smallest key (largest
//! residual) first. Decrease-key is implemented as lazy deletion: `update`
//! re-pushes only when the new key improves on the item's current one, and
//! `pop` discards heap entries whose key no longer matches the item's best.
//!
//! Equal keys pop in insertion order (a monotone sequence number breaks
//! ties), so sweeps are deterministic for a fixed push order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// Heap entry. Ordering is reversed so `BinaryHeap` (a max-heap) pops the
/// smallest priority, with earlier sequence numbers winning ties.
#[derive(Debug, Clone)]
struct Entry<T> {
    priority: f64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue over hashable items with float keys.
#[derive(Debug, Clone, Default)]
pub struct SweepQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    /// Current effective priority per queued item; heap entries that
    /// disagree are stale and skipped on pop.
    current: HashMap<T, f64>,
    seq: u64,
}

impl<T: Clone + Eq + Hash> SweepQueue<T> {
    pub fn new() -> Self {
        SweepQueue {
            heap: BinaryHeap::new(),
            current: HashMap::new(),
            seq: 0,
        }
    }

    /// Number of distinct queued items.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Queue `item` at `priority`, replacing any existing key unconditionally.
    pub fn push(&mut self, item: T, priority: f64) {
        self.current.insert(item.clone(), priority);
        self.heap.push(Entry {
            priority,
            seq: self.seq,
            item,
        });
        self.seq += 1;
    }

    /// Queue `item` at `priority` only if that improves (lowers) its current
    /// key; a queued item with an equal or better key keeps it. Absent items
    /// are simply pushed.
    pub fn update(&mut self, item: T, priority: f64) {
        match self.current.get(&item) {
            Some(&existing) if priority >= existing => {}
            _ => self.push(item, priority),
        }
    }

    /// Remove and return the item with the smallest key, or `None` when
    /// empty. Stale heap entries left behind by `push`/`update` are dropped
    /// here.
    pub fn pop(&mut self) -> Option<T> {
        while let Some(entry) = self.heap.pop() {
            match self.current.get(&entry.item) {
                Some(&priority) if priority == entry.priority => {
                    self.current.remove(&entry.item);
                    return Some(entry.item);
                }
                _ => continue,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_smallest_priority_first() {
        let mut q = SweepQueue::new();
        q.push("b", -1.0);
        q.push("a", -3.0);
        q.push("c", -2.0);
        assert_eq!(q.pop(), Some("a"));
        assert_eq!(q.pop(), Some("c"));
        assert_eq!(q.pop(), Some("b"));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_equal_priorities_pop_in_insertion_order() {
        let mut q = SweepQueue::new();
        q.push("first", -1.0);
        q.push("second", -1.0);
        q.push("third", -1.0);
        assert_eq!(q.pop(), Some("first"));
        assert_eq!(q.pop(), Some("second"));
        assert_eq!(q.pop(), Some("third"));
    }

    #[test]
    fn test_update_improves_priority() {
        let mut q = SweepQueue::new();
        q.push("a", -1.0);
        q.push("b", -2.0);
        q.update("a", -5.0);
        assert_eq!(q.pop(), Some("a"));
        assert_eq!(q.pop(), Some("b"));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_update_never_worsens_priority() {
        let mut q = SweepQueue::new();
        q.push("a", -5.0);
        q.push("b", -2.0);
        q.update("a", -1.0); // worse key, ignored
        assert_eq!(q.pop(), Some("a"));
        assert_eq!(q.pop(), Some("b"));
    }

    #[test]
    fn test_update_inserts_missing_item() {
        let mut q = SweepQueue::new();
        q.update("a", -1.0);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some("a"));
    }

    #[test]
    fn test_popped_item_can_requeue() {
        let mut q = SweepQueue::new();
        q.push("a", -3.0);
        assert_eq!(q.pop(), Some("a"));
        q.update("a", -1.0);
        assert_eq!(q.pop(), Some("a"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_len_counts_distinct_items() {
        let mut q = SweepQueue::new();
        q.push("a", -1.0);
        q.update("a", -4.0);
        q.update("a", -2.0);
        assert_eq!(q.len(), 1);
    }
}
