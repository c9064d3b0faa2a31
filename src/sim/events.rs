//! Intersection events and the accumulator that gathers them
//!
//! Detection runs as a tree of parallel subtasks. Each subtask records into
//! its own [`EventList`]; at every join two lists are spliced together in
//! O(1). `EventList::new()` is the identity and `merge` is associative, so the
//! merged result holds the same events however the scheduler shaped the
//! joins. Only their sequence differs, and that is erased by sorting.

use std::cmp::Ordering;
use std::collections::LinkedList;

/// How two segments meet during the coming step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntersectionKind {
    /// The segments already overlap; they get pushed apart rather than bounced
    AlreadyIntersected,
    /// The first (lower id) segment runs into the second's face
    FirstWithSecond,
    /// The second segment runs into the first's face
    SecondWithFirst,
}

/// A pair of segments that will intersect, lower id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntersectionEvent {
    pub first: u32,
    pub second: u32,
    pub kind: IntersectionKind,
}

impl IntersectionEvent {
    pub fn new(first: u32, second: u32, kind: IntersectionKind) -> Self {
        debug_assert!(first < second, "event pair {first}/{second} not canonical");
        Self {
            first,
            second,
            kind,
        }
    }

    /// Sort key: lower id, then higher id
    #[inline]
    pub fn key(&self) -> (u32, u32) {
        (self.first, self.second)
    }
}

impl PartialOrd for IntersectionEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Events are ordered by pair alone; a pair is reported at most once per step
impl Ord for IntersectionEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Accumulator of intersection events
#[derive(Debug, Default)]
pub struct EventList {
    chunks: LinkedList<Vec<IntersectionEvent>>,
    count: usize,
}

impl EventList {
    /// Empty list, the identity for [`merge`](Self::merge)
    pub fn new() -> Self {
        Self {
            chunks: LinkedList::new(),
            count: 0,
        }
    }

    /// Append an event
    ///
    /// If the list cannot grow the event is dropped with a warning instead of
    /// aborting the step.
    pub fn push(&mut self, event: IntersectionEvent) {
        if self.chunks.back().is_none() {
            self.chunks.push_back(Vec::new());
        }
        let Some(chunk) = self.chunks.back_mut() else {
            return;
        };
        if let Err(err) = chunk.try_reserve(1) {
            log::warn!(
                "Dropping intersection event {}/{}: {}",
                event.first,
                event.second,
                err
            );
            return;
        }
        chunk.push(event);
        self.count += 1;
    }

    /// Splice `other` onto the end of `self`
    pub fn merge(mut self, mut other: Self) -> Self {
        self.chunks.append(&mut other.chunks);
        self.count += other.count;
        self
    }

    /// Number of events recorded
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntersectionEvent> {
        self.chunks.iter().flatten()
    }

    /// Flatten into canonical (lower id, higher id) order
    pub fn into_sorted(self) -> Vec<IntersectionEvent> {
        let mut events = Vec::with_capacity(self.count);
        for chunk in self.chunks {
            events.extend(chunk);
        }
        events.sort_unstable();
        debug_assert!(
            events.windows(2).all(|w| w[0].key() < w[1].key()),
            "pair reported twice in one step"
        );
        events
    }
}

impl Extend<IntersectionEvent> for EventList {
    fn extend<T: IntoIterator<Item = IntersectionEvent>>(&mut self, iter: T) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<IntersectionEvent> for EventList {
    fn from_iter<T: IntoIterator<Item = IntersectionEvent>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event(a: u32, b: u32) -> IntersectionEvent {
        IntersectionEvent::new(a, b, IntersectionKind::FirstWithSecond)
    }

    fn list_of(pairs: &[(u32, u32)]) -> EventList {
        pairs.iter().map(|&(a, b)| event(a, b)).collect()
    }

    #[test]
    fn test_push_and_count() {
        let mut list = EventList::new();
        assert!(list.is_empty());
        list.push(event(0, 1));
        list.push(event(2, 5));
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().count(), 2);
    }

    #[test]
    fn test_merge_with_identity() {
        let merged = EventList::new().merge(list_of(&[(1, 2), (0, 3)]));
        assert_eq!(merged.len(), 2);
        let merged = list_of(&[(1, 2)]).merge(EventList::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.into_sorted(), vec![event(1, 2)]);
    }

    #[test]
    fn test_sorted_by_first_then_second() {
        let list = list_of(&[(3, 4), (0, 9)]).merge(list_of(&[(0, 2), (1, 3)]));
        let keys: Vec<_> = list.into_sorted().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec![(0, 2), (0, 9), (1, 3), (3, 4)]);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_non_canonical_pair_panics_in_debug() {
        let _ = IntersectionEvent::new(4, 2, IntersectionKind::AlreadyIntersected);
    }

    fn pairs() -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((0u32..500, 1u32..500), 0..40)
            .prop_map(|v| v.into_iter().map(|(a, d)| (a, a + d)).collect())
    }

    proptest! {
        #[test]
        fn prop_merge_is_associative(a in pairs(), b in pairs(), c in pairs()) {
            let left = list_of(&a).merge(list_of(&b)).merge(list_of(&c));
            let right = list_of(&a).merge(list_of(&b).merge(list_of(&c)));
            prop_assert_eq!(left.len(), a.len() + b.len() + c.len());
            prop_assert_eq!(left.len(), right.len());
            let left: Vec<_> = left.iter().copied().collect();
            let right: Vec<_> = right.iter().copied().collect();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_merge_order_keeps_multiset(a in pairs(), b in pairs()) {
            let mut ab: Vec<_> = list_of(&a).merge(list_of(&b)).iter().map(|e| e.key()).collect();
            let mut ba: Vec<_> = list_of(&b).merge(list_of(&a)).iter().map(|e| e.key()).collect();
            ab.sort_unstable();
            ba.sort_unstable();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_event_order_is_total(a in pairs(), b in pairs(), c in pairs()) {
            for ((x, y), z) in a.iter().zip(b.iter()).zip(c.iter()) {
                let (x, y, z) = (event(x.0, x.1), event(y.0, y.1), event(z.0, z.1));
                // Irreflexive
                prop_assert!(!(x < x));
                // Antisymmetric
                prop_assert!(!(x < y && y < x));
                // Transitive
                if x < y && y < z {
                    prop_assert!(x < z);
                }
                // Total: exactly one of <, ==, > holds
                let rels = [x < y, x.key() == y.key(), x > y];
                prop_assert_eq!(rels.iter().filter(|&&r| r).count(), 1);
            }
        }
    }
}
