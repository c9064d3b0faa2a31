//! Quadtree broad phase
//!
//! Rebuilt from scratch every step over the segments' current and predicted
//! positions, then dropped. A segment descends into a quadrant only when all
//! four of its reference points (both current and both predicted endpoints)
//! lie strictly inside it; otherwise it stays at the coarser node. Two
//! segments that could meet during the step therefore always end up in the
//! same node or in an ancestor/descendant pair, which is exactly the set of
//! pairs the detector tests.
//!
//! Coordinates follow the screen convention: "top" is the half with the
//! smaller y.

use glam::DVec2;

use super::geometry::Aabb;
use super::segment::Segment;

/// When to stop subdividing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionLimits {
    /// A node holding at most this many segments becomes a leaf
    pub leaf_capacity: usize,
    /// A node deeper than this becomes a leaf
    pub max_depth: u32,
}

/// Child slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Quadrant strictly containing every reference point of `segment`, if any
    pub fn classify(segment: &Segment, mid: DVec2) -> Option<Quadrant> {
        let points = segment.reference_points();
        Self::ALL
            .into_iter()
            .find(|q| points.iter().all(|&p| q.strictly_contains(p, mid)))
    }

    #[inline]
    fn strictly_contains(self, p: DVec2, mid: DVec2) -> bool {
        match self {
            Quadrant::TopLeft => p.x < mid.x && p.y < mid.y,
            Quadrant::TopRight => p.x > mid.x && p.y < mid.y,
            Quadrant::BottomLeft => p.x < mid.x && p.y > mid.y,
            Quadrant::BottomRight => p.x > mid.x && p.y > mid.y,
        }
    }

    /// This quadrant's rectangle within `parent`, split at `mid`
    pub fn bounds(self, parent: &Aabb, mid: DVec2) -> Aabb {
        match self {
            Quadrant::TopLeft => Aabb::new(parent.min, mid),
            Quadrant::TopRight => Aabb::new(
                DVec2::new(mid.x, parent.min.y),
                DVec2::new(parent.max.x, mid.y),
            ),
            Quadrant::BottomLeft => Aabb::new(
                DVec2::new(parent.min.x, mid.y),
                DVec2::new(mid.x, parent.max.y),
            ),
            Quadrant::BottomRight => Aabb::new(mid, parent.max),
        }
    }
}

/// A quadtree node
#[derive(Debug)]
pub struct Node {
    pub bounds: Aabb,
    pub depth: u32,
    /// Indices of the segments held directly by this node
    pub segments: Vec<usize>,
    /// Children in [`Quadrant::ALL`] order; `None` for a leaf
    pub children: Option<Box<[Node; 4]>>,
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&Node> {
        self.children.as_ref().map(|c| &c[quadrant as usize])
    }

    fn children_iter(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flat_map(|c| c.iter())
    }
}

/// Spatial partition of one step's segments
#[derive(Debug)]
pub struct Quadtree {
    root: Node,
}

impl Quadtree {
    /// Partition every segment in `segments` within `bounds`
    ///
    /// With `parallel` set the four quadrants of each node are built on the
    /// current rayon pool; the tree is identical either way.
    pub fn build(
        bounds: Aabb,
        segments: &[Segment],
        limits: PartitionLimits,
        parallel: bool,
    ) -> Self {
        let builder = Builder {
            segments,
            limits,
            parallel,
        };
        let root = builder.partition(bounds, 0, (0..segments.len()).collect());
        let tree = Self { root };

        debug_assert_eq!(
            tree.segment_count(),
            segments.len(),
            "quadtree lost or duplicated segments"
        );
        log::trace!(
            "Quadtree: {} segments, {} nodes, depth {}",
            segments.len(),
            tree.node_count(),
            tree.max_depth_reached()
        );
        tree
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Segments held across all nodes
    pub fn segment_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.segments.len() + node.children_iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            1 + node.children_iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    pub fn max_depth_reached(&self) -> u32 {
        fn deepest(node: &Node) -> u32 {
            node.children_iter().map(deepest).max().unwrap_or(node.depth)
        }
        deepest(&self.root)
    }
}

struct Builder<'a> {
    segments: &'a [Segment],
    limits: PartitionLimits,
    parallel: bool,
}

impl Builder<'_> {
    fn partition(&self, bounds: Aabb, depth: u32, indices: Vec<usize>) -> Node {
        if indices.len() <= self.limits.leaf_capacity || depth > self.limits.max_depth {
            return Node {
                bounds,
                depth,
                segments: indices,
                children: None,
            };
        }

        let mid = bounds.center();
        let mut buckets: [Vec<usize>; 4] = Default::default();
        let mut retained = Vec::new();
        for i in indices {
            match Quadrant::classify(&self.segments[i], mid) {
                Some(q) => buckets[q as usize].push(i),
                None => retained.push(i),
            }
        }

        let [top_left, top_right, bottom_left, bottom_right] = buckets;
        let child = |q: Quadrant, indices: Vec<usize>| {
            self.partition(q.bounds(&bounds, mid), depth + 1, indices)
        };

        let children = if self.parallel {
            let ((tl, tr), (bl, br)) = rayon::join(
                || {
                    rayon::join(
                        || child(Quadrant::TopLeft, top_left),
                        || child(Quadrant::TopRight, top_right),
                    )
                },
                || {
                    rayon::join(
                        || child(Quadrant::BottomLeft, bottom_left),
                        || child(Quadrant::BottomRight, bottom_right),
                    )
                },
            );
            [tl, tr, bl, br]
        } else {
            [
                child(Quadrant::TopLeft, top_left),
                child(Quadrant::TopRight, top_right),
                child(Quadrant::BottomLeft, bottom_left),
                child(Quadrant::BottomRight, bottom_right),
            ]
        };

        Node {
            bounds,
            depth,
            segments: retained,
            children: Some(Box::new(children)),
        }
    }
}
