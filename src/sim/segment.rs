//! Moving line segments
//!
//! A segment's endpoints and velocity are its state. Everything else
//! (`predicted_*`, `displacement`, `bounds`) is derived from them for the
//! current time step and must be refreshed whenever they change.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;

/// Initial placement of a segment, supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub p1: DVec2,
    pub p2: DVec2,
    pub velocity: DVec2,
}

impl SegmentSpec {
    pub fn new(p1: DVec2, p2: DVec2, velocity: DVec2) -> Self {
        Self { p1, p2, velocity }
    }
}

/// A moving segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Identity; orders pairs canonically (lower id first)
    pub id: u32,
    pub p1: DVec2,
    pub p2: DVec2,
    pub velocity: DVec2,
    /// `p1` after one time step
    pub predicted_p1: DVec2,
    /// `p2` after one time step
    pub predicted_p2: DVec2,
    /// Motion over one time step
    pub displacement: DVec2,
    /// Encloses current and predicted endpoints
    pub bounds: Aabb,
}

impl Segment {
    pub fn new(id: u32, p1: DVec2, p2: DVec2, velocity: DVec2, dt: f64) -> Self {
        let mut segment = Self {
            id,
            p1,
            p2,
            velocity,
            predicted_p1: p1,
            predicted_p2: p2,
            displacement: DVec2::ZERO,
            bounds: Aabb::new(p1.min(p2), p1.max(p2)),
        };
        segment.refresh(dt);
        segment
    }

    pub fn from_spec(id: u32, spec: &SegmentSpec, dt: f64) -> Self {
        Self::new(id, spec.p1, spec.p2, spec.velocity, dt)
    }

    /// Recompute derived state after the endpoints or velocity changed
    pub fn refresh(&mut self, dt: f64) {
        self.displacement = self.velocity * dt;
        self.predicted_p1 = self.p1 + self.displacement;
        self.predicted_p2 = self.p2 + self.displacement;
        self.bounds = Aabb::from_points(&self.reference_points());
    }

    /// Move to the predicted position, then refresh for the next step
    pub fn advance(&mut self, dt: f64) {
        self.p1 = self.predicted_p1;
        self.p2 = self.predicted_p2;
        self.refresh(dt);
    }

    /// Current and predicted endpoints
    #[inline]
    pub fn reference_points(&self) -> [DVec2; 4] {
        [self.p1, self.p2, self.predicted_p1, self.predicted_p2]
    }

    /// Vector from `p1` to `p2`
    #[inline]
    pub fn direction(&self) -> DVec2 {
        self.p2 - self.p1
    }

    /// Segment length; stands in for mass in collisions
    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}
