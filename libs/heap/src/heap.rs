use std::{iter::FusedIterator, vec};

use parking_lot::Mutex;
use queue::{Element, Error, PriorityQueue, Result};

/// Capacity of a heap created with [`ConcurrentBinaryMinHeap::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// A binary min-heap that can be shared between threads.
///
/// All state sits behind a single per-instance lock that every operation holds for its full
/// duration, so each call is atomic with respect to all others. The element with the lowest
/// priority is always at the root. No other ordering is guaranteed, in particular not among
/// elements of equal priority, nor for [`iter`](Self::iter) and [`copy_to`](Self::copy_to),
/// which both expose the internal slot order.
#[derive(Debug)]
pub struct ConcurrentBinaryMinHeap<T> {
    state: Mutex<HeapState<T>>,
}

/// Array representation of the heap: the children of slot `i` live at `2i + 1` and `2i + 2`.
#[derive(Debug)]
struct HeapState<T> {
    /// Valid slots are `items[..count]`, spare storage past `count` is vacant.
    items: Vec<Element<T>>,
    capacity: usize,
}

impl<T> HeapState<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports an allocation the system cannot
    /// serve instead of aborting.
    fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut items = Vec::new();
        items.try_reserve_exact(capacity).map_err(|err| {
            tracing::trace!(capacity, %err, "rejected unallocatable heap capacity");
            Error::InvalidArgument(format!("cannot reserve initial capacity {capacity}: {err}"))
        })?;
        Ok(Self { items, capacity })
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn insert(&mut self, element: Element<T>) {
        if self.count() == self.capacity {
            self.grow();
        }
        self.items.push(element);
        self.sift_up(self.count() - 1);
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity.saturating_mul(2).max(self.capacity.saturating_add(1));
        self.items.reserve_exact(new_capacity - self.count());
        tracing::debug!(
            old_capacity = self.capacity,
            new_capacity,
            "growing heap storage"
        );
        self.capacity = new_capacity;
    }

    /// Removes the element at `index` by moving the last element into its slot.
    fn remove_at(&mut self, index: usize) -> Element<T> {
        let removed = self.items.swap_remove(index);
        if index < self.count() {
            // The replacement came from the bottom of another subtree, so it may belong above
            // or below `index`.
            let index = self.sift_up(index);
            self.sift_down(index);
        }
        removed
    }

    fn position(&self, element: &Element<T>) -> Option<usize> {
        self.items.iter().position(|e| e.same_as(element))
    }

    /// Moves the element at `index` towards the root while it precedes its parent.
    /// Returns the slot it ends up in.
    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.items[index].precedes(&self.items[parent]) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index
    }

    /// Moves the element at `index` towards the leaves while a child precedes it.
    fn sift_down(&mut self, mut index: usize) {
        let count = self.count();
        loop {
            let left = 2 * index + 1;
            if left >= count {
                break;
            }
            let right = left + 1;
            let smaller = if right < count && self.items[right].precedes(&self.items[left]) {
                right
            } else {
                left
            };

            if !self.items[smaller].precedes(&self.items[index]) {
                break;
            }
            self.swap(index, smaller);
            index = smaller;
        }
    }

    /// The only place that reorders elements.
    fn swap(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.count() && b < self.count());
        self.items.swap(a, b);
    }
}

impl<T> ConcurrentBinaryMinHeap<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(HeapState::with_capacity(capacity)),
        }
    }

    /// Like [`with_capacity`](Self::with_capacity) for callers holding a signed size, e.g. one
    /// parsed from user input.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `capacity` is negative or too large to allocate. Nothing
    /// is allocated in that case.
    pub fn try_with_capacity(capacity: isize) -> Result<Self> {
        let Ok(capacity) = usize::try_from(capacity) else {
            tracing::trace!(capacity, "rejected negative heap capacity");
            return Err(Error::InvalidArgument(format!(
                "initial capacity must not be negative, got {capacity}"
            )));
        };
        Ok(Self {
            state: Mutex::new(HeapState::try_with_capacity(capacity)?),
        })
    }

    /// Inserts a new element built from `priority` and `value` and returns its handle.
    pub fn push(&self, priority: f64, value: T) -> Element<T> {
        let element = Element::new(priority, value);
        self.push_pair(Element::clone(&element));
        element
    }

    pub fn push_pair(&self, element: Element<T>) {
        self.state.lock().insert(element);
    }

    /// Same as [`push_pair`](Self::push_pair).
    pub fn add(&self, element: Element<T>) {
        self.push_pair(element);
    }

    /// Returns the element with the lowest priority without removing it.
    pub fn peek(&self) -> Option<Element<T>> {
        self.state.lock().items.first().cloned()
    }

    /// # Errors
    /// [`Error::EmptyCollection`] if the heap has no elements.
    pub fn peek_priority(&self) -> Result<f64> {
        self.peek()
            .map(|e| e.priority())
            .ok_or(Error::EmptyCollection)
    }

    /// # Errors
    /// [`Error::EmptyCollection`] if the heap has no elements.
    pub fn peek_value(&self) -> Result<T>
    where
        T: Clone,
    {
        self.peek()
            .map(|e| e.value().clone())
            .ok_or(Error::EmptyCollection)
    }

    /// Removes and returns the element with the lowest priority.
    pub fn pop(&self) -> Option<Element<T>> {
        let mut state = self.state.lock();
        if state.items.is_empty() {
            return None;
        }
        Some(state.remove_at(0))
    }

    /// # Errors
    /// [`Error::EmptyCollection`] if the heap has no elements.
    pub fn pop_priority(&self) -> Result<f64> {
        self.pop()
            .map(|e| e.priority())
            .ok_or(Error::EmptyCollection)
    }

    /// Pops the root and returns its value, moving it out if no other handle is left.
    ///
    /// # Errors
    /// [`Error::EmptyCollection`] if the heap has no elements.
    pub fn pop_value(&self) -> Result<T>
    where
        T: Clone,
    {
        let element = self.pop().ok_or(Error::EmptyCollection)?;
        Ok(match element.try_unwrap() {
            Ok(pair) => pair.into_value(),
            Err(shared) => shared.value().clone(),
        })
    }

    /// Pops up to `n` elements, lowest priority first, without letting other threads interleave.
    pub fn drain(&self, n: usize) -> Vec<Element<T>> {
        let mut state = self.state.lock();
        let n = n.min(state.count());
        let mut drained = Vec::with_capacity(n);
        for _ in 0..n {
            drained.push(state.remove_at(0));
        }
        drained
    }

    /// Returns `true` if this exact element is stored. Linear in the number of elements.
    pub fn contains(&self, element: &Element<T>) -> bool {
        self.state.lock().position(element).is_some()
    }

    /// Removes this exact element. Returns `false` if it is not stored.
    pub fn remove(&self, element: &Element<T>) -> bool {
        let mut state = self.state.lock();
        match state.position(element) {
            Some(index) => {
                state.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Removes all elements. The allocated storage and the capacity are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        tracing::debug!(dropped = state.count(), "clearing heap");
        state.items.clear();
    }

    /// Copies all elements in internal slot order into `target`, starting at `start`.
    /// Slots of `target` outside the written range are left untouched.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `start` lies past the end of `target` or fewer than
    /// [`len`](Self::len) slots remain after it. `target` is not modified in that case.
    pub fn copy_to(&self, target: &mut [Option<Element<T>>], start: usize) -> Result<()> {
        let state = self.state.lock();
        let count = state.count();
        let len = target.len();
        let Some(window) = target
            .get_mut(start..)
            .and_then(|rest| rest.get_mut(..count))
        else {
            return Err(Error::InvalidArgument(format!(
                "cannot copy {count} elements into a buffer of length {len} at offset {start}"
            )));
        };

        for (slot, element) in window.iter_mut().zip(&state.items) {
            *slot = Some(Element::clone(element));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.state.lock().count()
    }

    /// Number of elements the heap can hold before its storage has to grow.
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always `false`: every heap accepts insertions and removals.
    pub fn is_read_only(&self) -> bool {
        false
    }

    /// Copies the current elements in internal slot order.
    pub fn to_vec(&self) -> Vec<Element<T>> {
        self.state.lock().items.clone()
    }

    /// Iterates over a snapshot of the elements taken when this is called. Later changes to
    /// the heap are not visible to the iterator and the lock is not held while iterating.
    pub fn iter(&self) -> Snapshot<T> {
        Snapshot {
            inner: self.to_vec().into_iter(),
        }
    }
}

impl<T> Default for ConcurrentBinaryMinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<Element<T>> for ConcurrentBinaryMinHeap<T> {
    fn extend<I: IntoIterator<Item = Element<T>>>(&mut self, iter: I) {
        let state = self.state.get_mut();
        for element in iter {
            state.insert(element);
        }
    }
}

impl<T> FromIterator<Element<T>> for ConcurrentBinaryMinHeap<T> {
    fn from_iter<I: IntoIterator<Item = Element<T>>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

/// One-shot iterator over the elements a heap held when [`ConcurrentBinaryMinHeap::iter`] was
/// called, in internal slot order.
#[derive(Debug)]
pub struct Snapshot<T> {
    inner: vec::IntoIter<Element<T>>,
}

impl<T> Iterator for Snapshot<T> {
    type Item = Element<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Snapshot<T> {}

impl<T> FusedIterator for Snapshot<T> {}

impl<'a, T> IntoIterator for &'a ConcurrentBinaryMinHeap<T> {
    type Item = Element<T>;
    type IntoIter = Snapshot<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Send + Sync + 'static> PriorityQueue<T> for ConcurrentBinaryMinHeap<T> {
    fn push_pair(&self, element: Element<T>) {
        ConcurrentBinaryMinHeap::push_pair(self, element);
    }

    fn peek(&self) -> Option<Element<T>> {
        ConcurrentBinaryMinHeap::peek(self)
    }

    fn pop(&self) -> Option<Element<T>> {
        ConcurrentBinaryMinHeap::pop(self)
    }

    fn contains(&self, element: &Element<T>) -> bool {
        ConcurrentBinaryMinHeap::contains(self, element)
    }

    fn remove(&self, element: &Element<T>) -> bool {
        ConcurrentBinaryMinHeap::remove(self, element)
    }

    fn len(&self) -> usize {
        ConcurrentBinaryMinHeap::len(self)
    }

    fn clear(&self) {
        ConcurrentBinaryMinHeap::clear(self);
    }

    fn snapshot(&self) -> Vec<Element<T>> {
        self.to_vec()
    }

    fn push(&self, priority: f64, value: T) -> Element<T> {
        ConcurrentBinaryMinHeap::push(self, priority, value)
    }

    fn drain(&self, n: usize) -> Vec<Element<T>> {
        ConcurrentBinaryMinHeap::drain(self, n)
    }
}

// region:    --- Checked swap, exercised by the unit tests

#[cfg(test)]
impl<T> HeapState<T> {
    fn try_swap(&mut self, a: usize, b: usize) -> Result<()> {
        let count = self.count();
        if count < 2 {
            return Err(Error::InvalidOperation(
                "swapping needs at least two elements",
            ));
        }
        if let Some(&index) = [a, b].iter().find(|&&i| i >= count) {
            return Err(Error::IndexOutOfRange { index, count });
        }
        self.swap(a, b);
        Ok(())
    }
}

#[cfg(test)]
impl<T> ConcurrentBinaryMinHeap<T> {
    /// Swaps two slots directly. May break the heap property, hence test-only.
    pub(crate) fn swap_elements(&self, a: usize, b: usize) -> Result<()> {
        self.state.lock().try_swap(a, b)
    }
}

// endregion: --- Checked swap
