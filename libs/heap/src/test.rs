#[cfg(test)]
mod test_suite {
    use queue::test::suite;

    use crate::ConcurrentBinaryMinHeap;

    struct HeapTester;

    impl suite::Tester<ConcurrentBinaryMinHeap<u64>> for HeapTester {
        fn create_queue(&self) -> ConcurrentBinaryMinHeap<u64> {
            // Small on purpose, so the concurrent tests grow the storage under contention.
            ConcurrentBinaryMinHeap::with_capacity(4)
        }
    }

    #[test]
    fn min_extraction_order() {
        suite::test_min_extraction_order(HeapTester);
    }

    #[test]
    fn empty_queue() {
        suite::test_empty_queue(HeapTester);
    }

    #[test]
    fn remove_semantics() {
        suite::test_remove_semantics(HeapTester);
    }

    #[test]
    fn clear_and_reuse() {
        suite::test_clear_and_reuse(HeapTester);
    }

    #[test]
    fn concurrent_push() {
        suite::test_concurrent_push(HeapTester);
    }

    #[test]
    fn concurrent_push_and_drain() {
        suite::test_concurrent_push_and_drain(HeapTester);
    }

    #[test]
    fn concurrent_remove() {
        suite::test_concurrent_remove(HeapTester);
    }
}

/// Replays random operation sequences against [`naive::NaiveQueue`] and checks that both
/// queues always agree on length and on the priority that leaves next.
#[cfg(test)]
mod differential {
    use naive::NaiveQueue;
    use proptest::prelude::*;
    use queue::{Element, PriorityQueue, test::suite::assert_heap_property};

    use crate::ConcurrentBinaryMinHeap;

    #[derive(Debug, Clone)]
    enum Op {
        Push(i8),
        Pop,
        Remove(usize),
        Drain(usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            5 => (-20i8..20).prop_map(Op::Push),
            2 => Just(Op::Pop),
            2 => any::<usize>().prop_map(Op::Remove),
            1 => (0usize..6).prop_map(Op::Drain),
            1 => Just(Op::Clear),
        ]
    }

    /// Takes `popped` out of the oracle after checking it carries the oracle's minimum
    /// priority. Ties may be broken differently by both queues, so identity is not compared.
    fn take_from_oracle(
        oracle: &NaiveQueue<usize>,
        popped: &Element<usize>,
    ) -> Result<(), TestCaseError> {
        prop_assert_eq!(oracle.peek().map(|e| e.priority()), Some(popped.priority()));
        prop_assert!(oracle.remove(popped));
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_matches_naive_queue(
            ops in prop::collection::vec(op(), 0..200),
            capacity in 0usize..8,
        ) {
            let heap = ConcurrentBinaryMinHeap::with_capacity(capacity);
            let oracle = NaiveQueue::new(capacity);
            let mut handles: Vec<Element<usize>> = vec![];

            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Push(priority) => {
                        let element = Element::new(f64::from(priority), step);
                        heap.push_pair(element.clone());
                        oracle.push_pair(element.clone());
                        handles.push(element);
                    }
                    Op::Pop => match heap.pop() {
                        Some(popped) => take_from_oracle(&oracle, &popped)?,
                        None => prop_assert!(oracle.is_empty()),
                    },
                    Op::Remove(pick) if !handles.is_empty() => {
                        let element = &handles[pick % handles.len()];
                        prop_assert_eq!(heap.remove(element), oracle.remove(element));
                    }
                    Op::Remove(_) => {}
                    Op::Drain(n) => {
                        let drained = heap.drain(n);
                        prop_assert_eq!(drained.len(), n.min(oracle.len()));
                        for popped in &drained {
                            take_from_oracle(&oracle, popped)?;
                        }
                    }
                    Op::Clear => {
                        heap.clear();
                        oracle.clear();
                    }
                }

                prop_assert_eq!(heap.len(), oracle.len());
                prop_assert!(heap.capacity() >= heap.len());
                assert_heap_property(&heap.to_vec());
            }
        }
    }
}
