use parking_lot::Mutex;

use queue::{Element, PriorityQueue};

/// Naive priority queue that keeps all elements sorted within a single vector.
/// No optimizations are attempted with this implementation; it serves as a baseline and as a
/// reference for the heap.
pub struct NaiveQueue<T> {
    /// Sorted by descending priority, so the lowest priority sits at the end and can be popped.
    pool: Mutex<Vec<Element<T>>>,
}

impl<T> NaiveQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Mutex::new(Vec::with_capacity(capacity)),
        }
    }
}

impl<T: Send + Sync + 'static> PriorityQueue<T> for NaiveQueue<T> {
    /// Very naive and expensive insertion (~O(n log n) due to a full sort on every push).
    fn push_pair(&self, element: Element<T>) {
        let mut guard = self.pool.lock();
        guard.push(element);
        guard.sort_by(|a, b| b.cmp_priority(a));
    }

    fn peek(&self) -> Option<Element<T>> {
        self.pool.lock().last().cloned()
    }

    fn pop(&self) -> Option<Element<T>> {
        self.pool.lock().pop()
    }

    fn drain(&self, n: usize) -> Vec<Element<T>> {
        let mut guard = self.pool.lock();

        let drain_start = guard.len().saturating_sub(n);

        let mut drained = guard.split_off(drain_start);
        drained.reverse(); // bring lowest priority to the front
        drained
    }

    fn contains(&self, element: &Element<T>) -> bool {
        self.pool.lock().iter().any(|e| e.same_as(element))
    }

    fn remove(&self, element: &Element<T>) -> bool {
        let mut guard = self.pool.lock();
        match guard.iter().position(|e| e.same_as(element)) {
            Some(index) => {
                // `remove` shifts, keeping the remaining elements sorted.
                guard.remove(index);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.pool.lock().len()
    }

    fn clear(&self) {
        self.pool.lock().clear();
    }

    /// Ascending order, which is a valid heap layout.
    fn snapshot(&self) -> Vec<Element<T>> {
        self.pool.lock().iter().rev().cloned().collect()
    }
}
