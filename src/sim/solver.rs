//! Collision response
//!
//! Applies one intersection event to the pair it names. Events must be fed
//! in canonical order, one at a time: each response reads the velocities
//! left by the previous one.

use glam::DVec2;

use super::events::{IntersectionEvent, IntersectionKind};
use super::geometry::intersection_point;
use super::segment::Segment;

/// Apply `event` and refresh both segments' derived state for `dt`
///
/// `segments` is indexed by id.
pub fn resolve(segments: &mut [Segment], event: &IntersectionEvent, dt: f64) {
    let (l1, l2) = pair_mut(segments, event.first as usize, event.second as usize);
    debug_assert!(l1.id == event.first && l2.id == event.second);

    match event.kind {
        IntersectionKind::AlreadyIntersected => separate(l1, l2),
        IntersectionKind::FirstWithSecond | IntersectionKind::SecondWithFirst => {
            bounce(l1, l2, event.kind)
        }
    }

    l1.refresh(dt);
    l2.refresh(dt);
}

/// Mutable access to two distinct segments, `a < b`
fn pair_mut(segments: &mut [Segment], a: usize, b: usize) -> (&mut Segment, &mut Segment) {
    debug_assert!(a < b);
    let (head, tail) = segments.split_at_mut(b);
    (&mut head[a], &mut tail[0])
}

/// Un-stick two overlapping segments
///
/// Each segment is sent away from the crossing point toward its own farther
/// endpoint, keeping its speed.
fn separate(l1: &mut Segment, l2: &mut Segment) {
    let mut p = intersection_point(l1.p1, l1.p2, l2.p1, l2.p2);
    if !p.is_finite() {
        // Collinear overlap: the lines have no single crossing point
        p = (l1.p1 + l1.p2 + l2.p1 + l2.p2) / 4.0;
    }
    flee(l1, p);
    flee(l2, p);
}

fn flee(segment: &mut Segment, from: DVec2) {
    let target = if (segment.p1 - from).length() < (segment.p2 - from).length() {
        segment.p2
    } else {
        segment.p1
    };
    segment.velocity = (target - from).normalize_or_zero() * segment.speed();
}

/// Elastic collision along the normal of the struck segment
///
/// Lengths stand in for masses; velocity along the face is untouched.
fn bounce(l1: &mut Segment, l2: &mut Segment, kind: IntersectionKind) {
    let face = match kind {
        IntersectionKind::FirstWithSecond => l2.direction(),
        _ => l1.direction(),
    }
    .normalize();
    let normal = face.perp();

    let v1_face = l1.velocity.dot(face);
    let v2_face = l2.velocity.dot(face);
    let v1_normal = l1.velocity.dot(normal);
    let v2_normal = l2.velocity.dot(normal);

    let m1 = l1.length();
    let m2 = l2.length();
    let total = m1 + m2;

    let new_v1_normal = ((m1 - m2) / total) * v1_normal + (2.0 * m2 / total) * v2_normal;
    let new_v2_normal = (2.0 * m1 / total) * v1_normal + ((m2 - m1) / total) * v2_normal;

    l1.velocity = normal * new_v1_normal + face * v1_face;
    l2.velocity = normal * new_v2_normal + face * v2_face;
}
