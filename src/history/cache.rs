use std::collections::{HashSet, VecDeque};

/// Fixed-capacity FIFO set of record ids.
///
/// Remembers the most recently inserted `capacity` ids; inserting past the
/// bound evicts the oldest insertion. An id stays suppressed only while it is
/// still in the window.
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    members: HashSet<i64>,
    order: VecDeque<i64>,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: HashSet::with_capacity(capacity.saturating_add(1)),
            order: VecDeque::with_capacity(capacity.saturating_add(1)),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.members.contains(&id)
    }

    /// Insert `id`, evicting the oldest entry if the window overflows.
    /// Returns false if `id` was already present.
    pub fn insert(&mut self, id: i64) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back(id);

        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut cache = DedupCache::new(3);
        assert!(cache.insert(5));
        assert!(cache.contains(5));
        assert!(!cache.contains(7));
        assert!(!cache.insert(5));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_insertion() {
        let mut cache = DedupCache::new(2);
        cache.insert(9);
        cache.insert(3);
        cache.insert(7);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(9));
        assert!(cache.contains(3));
        assert!(cache.contains(7));
    }

    #[test]
    fn test_reinsert_does_not_refresh_position() {
        let mut cache = DedupCache::new(2);
        cache.insert(1);
        cache.insert(2);
        cache.insert(1);
        cache.insert(3);

        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut cache = DedupCache::new(0);
        assert!(cache.insert(1));
        assert!(cache.is_empty());
        assert!(!cache.contains(1));
    }
}
