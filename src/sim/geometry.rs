//! Geometry predicates for moving segments
//!
//! Everything here is stateless. Orientation is measured with the 2D cross
//! product; exact zero is treated as collinear, so touching counts as
//! intersecting.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::events::IntersectionKind;
use super::segment::Segment;
use crate::{cross, turning_angle};

/// Axis-aligned rectangle (min corner, max corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing every point
    pub fn from_points(points: &[DVec2]) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for &p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    /// Closed-interval overlap; boxes sharing an edge overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.max.y < other.min.y
            || other.max.x < self.min.x
            || other.max.y < self.min.y)
    }
}

/// Orientation of `pk` relative to the directed line `pi -> pj`
#[inline]
pub fn direction(pi: DVec2, pj: DVec2, pk: DVec2) -> f64 {
    cross(pk - pi, pj - pi)
}

/// Whether `pk` lies within the bounding box of `pi`..`pj`
///
/// Only meaningful when the three points are collinear.
#[inline]
pub fn on_segment(pi: DVec2, pj: DVec2, pk: DVec2) -> bool {
    ((pi.x <= pk.x && pk.x <= pj.x) || (pj.x <= pk.x && pk.x <= pi.x))
        && ((pi.y <= pk.y && pk.y <= pj.y) || (pj.y <= pk.y && pk.y <= pi.y))
}

#[inline]
fn opposite_signs(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

/// Check if segments `p1`-`p2` and `p3`-`p4` intersect (touching included)
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = direction(p3, p4, p1);
    let d2 = direction(p3, p4, p2);
    let d3 = direction(p1, p2, p3);
    let d4 = direction(p1, p2, p4);

    // Each segment straddles the other's line
    if opposite_signs(d1, d2) && opposite_signs(d3, d4) {
        return true;
    }

    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// Check if `point` is strictly inside the parallelogram with edges
/// `p1`-`p2`, `p3`-`p4` (opposite) and `p1`-`p3`, `p2`-`p4` (opposite)
pub fn point_in_parallelogram(point: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = direction(p1, p2, point);
    let d2 = direction(p3, p4, point);
    let d3 = direction(p1, p3, point);
    let d4 = direction(p2, p4, point);

    opposite_signs(d1, d2) && opposite_signs(d3, d4)
}

/// Intersection point of the infinite lines through `p1`-`p2` and `p3`-`p4`
///
/// Parallel lines give a non-finite point.
pub fn intersection_point(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> DVec2 {
    let u = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x))
        / ((p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y));
    p1 + (p2 - p1) * u
}

/// Which side edge of the swept parallelogram the first segment crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideEdge {
    None,
    /// Edge traced by the second segment's `p1`
    First,
    /// Edge traced by the second segment's `p2`
    Second,
}

/// Classify how `l1` and `l2` meet during the next `dt` of simulated time
///
/// The pair must be in canonical order (`l1.id < l2.id`). Motion is taken
/// relative to `l1`: the parallelogram swept by `l2` over `dt` is tested
/// against the stationary `l1`.
pub fn sweep_intersection(l1: &Segment, l2: &Segment, dt: f64) -> Option<IntersectionKind> {
    debug_assert!(l1.id < l2.id, "pair not in canonical order");

    if segments_intersect(l1.p1, l1.p2, l2.p1, l2.p2) {
        return Some(IntersectionKind::AlreadyIntersected);
    }

    let relative = (l2.velocity - l1.velocity) * dt;
    let swept1 = l2.p1 + relative;
    let swept2 = l2.p2 + relative;

    // l1 fully engulfed by l2's sweep
    if point_in_parallelogram(l1.p1, l2.p1, l2.p2, swept1, swept2)
        && point_in_parallelogram(l1.p2, l2.p1, l2.p2, swept1, swept2)
    {
        return Some(IntersectionKind::FirstWithSecond);
    }

    let mut crossings = 0;
    let mut side = SideEdge::None;

    // Leading edge
    if segments_intersect(l1.p1, l1.p2, swept1, swept2) {
        crossings += 1;
    }
    if segments_intersect(l1.p1, l1.p2, swept1, l2.p1) {
        crossings += 1;
        side = SideEdge::First;
    }
    if segments_intersect(l1.p1, l1.p2, swept2, l2.p2) {
        crossings += 1;
        side = SideEdge::Second;
    }

    match crossings {
        0 => None,
        2 => Some(IntersectionKind::SecondWithFirst),
        _ => {
            let angle = turning_angle(l1.direction(), l2.direction());
            let kind = match side {
                SideEdge::First if angle < 0.0 => IntersectionKind::SecondWithFirst,
                SideEdge::Second if angle > 0.0 => IntersectionKind::SecondWithFirst,
                _ => IntersectionKind::FirstWithSecond,
            };
            Some(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: u32, p1: (f64, f64), p2: (f64, f64), vel: (f64, f64)) -> Segment {
        Segment::new(
            id,
            DVec2::new(p1.0, p1.1),
            DVec2::new(p2.0, p2.1),
            DVec2::new(vel.0, vel.1),
            0.5,
        )
    }

    #[test]
    fn test_segments_cross() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(2.0, 2.0);
        let c = DVec2::new(0.0, 2.0);
        let d = DVec2::new(2.0, 0.0);
        assert!(segments_intersect(a, b, c, d));
        assert!(!segments_intersect(a, c, b, d));
    }

    #[test]
    fn test_segments_touching_and_collinear() {
        // T-junction: endpoint lies on the other segment
        assert!(segments_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 3.0),
        ));
        // Collinear, overlapping
        assert!(segments_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(3.0, 0.0),
        ));
        // Collinear, disjoint
        assert!(!segments_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn test_point_in_parallelogram_is_strict() {
        let p1 = DVec2::new(0.0, 0.0);
        let p2 = DVec2::new(0.0, 2.0);
        let p3 = DVec2::new(2.0, 0.0);
        let p4 = DVec2::new(2.0, 2.0);
        assert!(point_in_parallelogram(DVec2::new(1.0, 1.0), p1, p2, p3, p4));
        assert!(!point_in_parallelogram(DVec2::new(3.0, 1.0), p1, p2, p3, p4));
        // On the boundary is outside
        assert!(!point_in_parallelogram(DVec2::new(0.0, 1.0), p1, p2, p3, p4));
    }

    #[test]
    fn test_intersection_point() {
        let p = intersection_point(
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 5.0),
        );
        assert!((p - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(DVec2::ZERO, DVec2::splat(1.0));
        let b = Aabb::new(DVec2::splat(1.0), DVec2::splat(2.0));
        let c = Aabb::new(DVec2::new(1.5, 0.0), DVec2::new(2.0, 0.5));
        assert!(a.overlaps(&b)); // shared corner
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_sweep_already_intersected() {
        let l1 = seg(0, (0.0, 0.0), (2.0, 2.0), (0.0, 0.0));
        let l2 = seg(1, (0.0, 2.0), (2.0, 0.0), (0.0, 0.0));
        assert_eq!(
            sweep_intersection(&l1, &l2, 0.5),
            Some(IntersectionKind::AlreadyIntersected)
        );
    }

    #[test]
    fn test_sweep_engulfed() {
        // Short l1 sits between l2's start and end positions
        let l1 = seg(0, (1.0, 0.5), (1.0, 1.5), (0.0, 0.0));
        let l2 = seg(1, (2.0, 0.0), (2.0, 2.0), (-4.0, 0.0));
        assert_eq!(
            sweep_intersection(&l1, &l2, 0.5),
            Some(IntersectionKind::FirstWithSecond)
        );
    }

    #[test]
    fn test_sweep_crosses_both_sides() {
        // Long l1 is hit broadside by a short l2
        let l1 = seg(0, (0.0, 0.0), (0.0, 10.0), (0.0, 0.0));
        let l2 = seg(1, (1.0, 4.0), (1.0, 6.0), (-4.0, 0.0));
        assert_eq!(
            sweep_intersection(&l1, &l2, 0.5),
            Some(IntersectionKind::SecondWithFirst)
        );
    }

    #[test]
    fn test_sweep_single_side_edge() {
        // Parallel, offset segments: only l2.p1's track crosses l1
        let l1 = seg(0, (10.0, 10.0), (10.0, 20.0), (1.0, 0.0));
        let l2 = seg(1, (10.8, 12.0), (10.8, 22.0), (-1.0, 0.0));
        assert_eq!(
            sweep_intersection(&l1, &l2, 0.5),
            Some(IntersectionKind::FirstWithSecond)
        );
    }

    #[test]
    fn test_sweep_miss() {
        let l1 = seg(0, (0.0, 0.0), (0.0, 1.0), (0.0, 0.0));
        let l2 = seg(1, (5.0, 0.0), (5.0, 1.0), (-1.0, 0.0));
        assert_eq!(sweep_intersection(&l1, &l2, 0.5), None);

        // Moving apart
        let l2 = seg(1, (1.0, 0.0), (1.0, 1.0), (3.0, 0.0));
        assert_eq!(sweep_intersection(&l1, &l2, 0.5), None);
    }
}
