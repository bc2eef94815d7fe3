use std::collections::VecDeque;

/// Capacity-bounded FIFO window.
///
/// Insertion order is chronological. Pushing beyond capacity evicts from the
/// front, so the window always holds the `capacity` most recent items.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    window: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item and return how many of the oldest items were evicted.
    pub fn push(&mut self, item: T) -> usize {
        self.window.push_back(item);
        self.evict_overflow()
    }

    fn evict_overflow(&mut self) -> usize {
        let mut evicted = 0;
        while self.window.len() > self.capacity {
            self.window.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// The `n` most recent items, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.window.len().saturating_sub(n);
        self.window.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
