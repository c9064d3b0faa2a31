//! Collision detection
//!
//! Walks the quadtree testing every pair that shares a node, plus every
//! node segment against the segments of each strict ancestor. A node's local
//! pass runs in parallel across its segments, then its four children are
//! visited concurrently and joined. Segment state is only read; each subtask
//! fills its own [`EventList`] and results are spliced at the joins.
//!
//! With `parallel` off the same recursion runs inline. Both paths report the
//! same set of events.

use rayon::prelude::*;

use super::events::{EventList, IntersectionEvent};
use super::geometry::sweep_intersection;
use super::quadtree::{Node, Quadtree};
use super::segment::Segment;

/// Test one pair, in either order
///
/// Cheap bounding-box reject first. The pair is put in canonical order
/// before the sweep test so the event always lists the lower id first.
pub fn check_pair(a: &Segment, b: &Segment, dt: f64) -> Option<IntersectionEvent> {
    if !a.bounds.overlaps(&b.bounds) {
        return None;
    }
    let (l1, l2) = if a.id < b.id { (a, b) } else { (b, a) };
    sweep_intersection(l1, l2, dt).map(|kind| IntersectionEvent::new(l1.id, l2.id, kind))
}

/// Segments held by the nodes above the one being visited
///
/// Lives on the traversal's stack; each level links to its parent's entry.
#[derive(Clone, Copy)]
struct Ancestors<'n> {
    segments: &'n [usize],
    parent: Option<&'n Ancestors<'n>>,
}

impl<'n> Ancestors<'n> {
    fn iter(&self) -> impl Iterator<Item = &'n [usize]> {
        std::iter::successors(Some(self), |a| a.parent).map(|a| a.segments)
    }
}

/// Detection over one step's segments
pub struct Detector<'a> {
    segments: &'a [Segment],
    dt: f64,
    parallel: bool,
}

impl<'a> Detector<'a> {
    pub fn new(segments: &'a [Segment], dt: f64, parallel: bool) -> Self {
        Self {
            segments,
            dt,
            parallel,
        }
    }

    /// Every intersecting pair, found through the quadtree
    pub fn detect(&self, tree: &Quadtree) -> EventList {
        self.visit(tree.root(), None)
    }

    /// Every intersecting pair, testing all n² pairs
    pub fn detect_brute_force(&self) -> EventList {
        let n = self.segments.len();
        let scan = |events: &mut EventList, i: usize| {
            let a = &self.segments[i];
            for b in &self.segments[i + 1..] {
                if let Some(event) = check_pair(a, b, self.dt) {
                    events.push(event);
                }
            }
        };

        if self.parallel {
            (0..n)
                .into_par_iter()
                .fold(EventList::new, |mut events, i| {
                    scan(&mut events, i);
                    events
                })
                .reduce(EventList::new, EventList::merge)
        } else {
            let mut events = EventList::new();
            for i in 0..n {
                scan(&mut events, i);
            }
            events
        }
    }

    fn visit(&self, node: &Node, ancestors: Option<&Ancestors<'_>>) -> EventList {
        let local = self.local_pass(node, ancestors);

        let Some(children) = node.children.as_deref() else {
            return local;
        };

        // Empty nodes add nothing for descendants to test against
        let link = Ancestors {
            segments: &node.segments,
            parent: ancestors,
        };
        let below = if node.segments.is_empty() {
            ancestors
        } else {
            Some(&link)
        };

        let [top_left, top_right, bottom_left, bottom_right] = children;
        let nested = if self.parallel {
            let ((tl, tr), (bl, br)) = rayon::join(
                || {
                    rayon::join(
                        || self.visit(top_left, below),
                        || self.visit(top_right, below),
                    )
                },
                || {
                    rayon::join(
                        || self.visit(bottom_left, below),
                        || self.visit(bottom_right, below),
                    )
                },
            );
            tl.merge(tr).merge(bl.merge(br))
        } else {
            self.visit(top_left, below)
                .merge(self.visit(top_right, below))
                .merge(self.visit(bottom_left, below))
                .merge(self.visit(bottom_right, below))
        };

        local.merge(nested)
    }

    /// Pairs within `node`, and `node` against its ancestors
    fn local_pass(&self, node: &Node, ancestors: Option<&Ancestors<'_>>) -> EventList {
        let held = &node.segments;
        let scan = |events: &mut EventList, i: usize| {
            let a = &self.segments[held[i]];
            for &j in &held[i + 1..] {
                if let Some(event) = check_pair(a, &self.segments[j], self.dt) {
                    events.push(event);
                }
            }
            for above in ancestors.into_iter().flat_map(|a| a.iter()) {
                for &j in above {
                    if let Some(event) = check_pair(a, &self.segments[j], self.dt) {
                        events.push(event);
                    }
                }
            }
        };

        if self.parallel {
            (0..held.len())
                .into_par_iter()
                .fold(EventList::new, |mut events, i| {
                    scan(&mut events, i);
                    events
                })
                .reduce(EventList::new, EventList::merge)
        } else {
            let mut events = EventList::new();
            for i in 0..held.len() {
                scan(&mut events, i);
            }
            events
        }
    }
}
