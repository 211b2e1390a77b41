use std::{cmp::Ordering, fmt, ops::Deref, sync::Arc};

/// Shared surface of all priority queue implementations in this workspace.
///
/// Every method takes `&self`; implementations synchronize internally so a queue can be shared
/// between threads behind an [`Arc`] without any external locking.
pub trait PriorityQueue<T>: Send + Sync + 'static {
    fn push_pair(&self, element: Element<T>);
    fn peek(&self) -> Option<Element<T>>;
    fn pop(&self) -> Option<Element<T>>;
    /// Returns `true` if this exact element (by identity, not by value) is currently stored.
    fn contains(&self, element: &Element<T>) -> bool;
    /// Removes this exact element. Returns `false` if it is not stored.
    fn remove(&self, element: &Element<T>) -> bool;
    fn len(&self) -> usize;
    fn clear(&self);
    /// Copy of all stored elements in an order that satisfies the heap property.
    fn snapshot(&self) -> Vec<Element<T>>;

    /// Builds a new [`Element`] from `priority` and `value`, stores it and hands back the handle
    /// so the caller can later [`remove`](Self::remove) it.
    fn push(&self, priority: f64, value: T) -> Element<T> {
        let element = Element::new(priority, value);
        self.push_pair(Element::clone(&element));
        element
    }

    /// Pops up to `n` elements, lowest priority first.
    fn drain(&self, n: usize) -> Vec<Element<T>> {
        let mut drained = Vec::with_capacity(n.min(self.len()));
        for _ in 0..n {
            let Some(element) = self.pop() else {
                break;
            };
            drained.push(element);
        }
        drained
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A priority paired with an arbitrary payload.
///
/// Lower priorities are extracted first. Once built, neither field changes.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityValuePair<T> {
    priority: f64,
    value: T,
}

impl<T> PriorityValuePair<T> {
    pub fn new(priority: f64, value: T) -> Self {
        Self { priority, value }
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Compares by priority only, using the IEEE total order so `NaN` priorities still sort
    /// deterministically: a `NaN` with the sign bit set sorts before `-inf`, any other `NaN`
    /// after `+inf`.
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }

    /// `true` if `self` must leave the queue strictly before `other`.
    pub fn precedes(&self, other: &Self) -> bool {
        self.cmp_priority(other) == Ordering::Less
    }
}

/// Shared handle to a [`PriorityValuePair`] stored in a queue.
///
/// Two elements are equal only if they point to the same pair. Pairs that merely hold the same
/// priority and value are different elements, so `contains`/`remove` always address the exact
/// item that was pushed.
pub struct Element<T>(Arc<PriorityValuePair<T>>);

impl<T> Element<T> {
    pub fn new(priority: f64, value: T) -> Self {
        Self(Arc::new(PriorityValuePair::new(priority, value)))
    }

    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the inner pair if this is the last handle to it.
    pub fn try_unwrap(self) -> Result<PriorityValuePair<T>, Self> {
        Arc::try_unwrap(self.0).map_err(Self)
    }
}

impl<T> From<PriorityValuePair<T>> for Element<T> {
    fn from(pair: PriorityValuePair<T>) -> Self {
        Self(Arc::new(pair))
    }
}

impl<T> Deref for Element<T> {
    type Target = PriorityValuePair<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// region:    --- Handle semantics (no `T: Clone` / `T: PartialEq` bounds)

impl<T> Clone for Element<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for Element<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl<T> Eq for Element<T> {}

impl<T: fmt::Debug> fmt::Debug for Element<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&*self.0).finish()
    }
}

// endregion: --- Handle semantics

#[cfg(test)]
mod tests {
    use super::{Element, PriorityValuePair};
    use std::cmp::Ordering;

    /// Lower priority -> extracted first
    #[test]
    fn cmp_diff_priority() {
        let low = PriorityValuePair::new(1.0, "low");
        let high = PriorityValuePair::new(2.0, "high");

        assert_eq!(low.cmp_priority(&high), Ordering::Less);
        assert_eq!(high.cmp_priority(&low), Ordering::Greater);
        assert!(low.precedes(&high));
        assert!(!high.precedes(&low));
    }

    /// Equal priorities never precede each other, so no ordering among them is implied.
    #[test]
    fn cmp_equal_priority() {
        let a = PriorityValuePair::new(3.0, "a");
        let b = PriorityValuePair::new(3.0, "b");

        assert_eq!(a.cmp_priority(&b), Ordering::Equal);
        assert!(!a.precedes(&b));
        assert!(!b.precedes(&a));
    }

    #[test]
    fn nan_sorts_after_numbers() {
        let nan = PriorityValuePair::new(f64::NAN, ());
        let inf = PriorityValuePair::new(f64::INFINITY, ());

        assert!(inf.precedes(&nan));
        assert_eq!(nan.cmp_priority(&nan), Ordering::Equal);
    }

    #[test]
    fn negative_nan_sorts_before_numbers() {
        let neg_nan = PriorityValuePair::new(-f64::NAN, ());
        let neg_inf = PriorityValuePair::new(f64::NEG_INFINITY, ());

        assert!(neg_nan.priority().is_sign_negative());
        assert!(neg_nan.precedes(&neg_inf));
    }

    #[test]
    fn element_from_pair() {
        let element: Element<_> = PriorityValuePair::new(4.0, 'x').into();

        assert_eq!(element.priority(), 4.0);
        assert_eq!(*element.value(), 'x');
        assert_eq!(element.try_unwrap().ok(), Some(PriorityValuePair::new(4.0, 'x')));
    }

    #[test]
    fn element_equality_is_identity() {
        let a = Element::new(1.0, 7);
        let b = Element::new(1.0, 7);
        let a_again = a.clone();

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(*a, *b); // the pairs themselves compare by value
    }

    #[test]
    fn try_unwrap_needs_last_handle() {
        let a = Element::new(2.5, String::from("payload"));
        let extra = a.clone();

        let a = a.try_unwrap().expect_err("a second handle is alive");
        drop(extra);

        let pair = a.try_unwrap().expect("last handle");
        assert_eq!(pair.priority(), 2.5);
        assert_eq!(pair.into_value(), "payload");
    }
}
