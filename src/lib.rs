//! Collision World - continuous collision detection for moving line segments
//!
//! Core modules:
//! - `sim`: Deterministic simulation (segments, quadtree, detection, solver, world)
//! - `settings`: World configuration (bounds, time step, partition limits)
//! - `error`: Construction and configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::WorldError;
pub use settings::{DetectionMode, WorldConfig};
pub use sim::{SegmentSpec, World};

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Default time step (seconds of simulated time per step)
    pub const TIME_STEP: f64 = 0.5;

    /// World box
    pub const BOX_XMIN: f64 = 0.5;
    pub const BOX_XMAX: f64 = 1.0;
    pub const BOX_YMIN: f64 = 0.5;
    pub const BOX_YMAX: f64 = 1.0;

    /// A quadtree node with at most this many segments is a leaf
    pub const LEAF_CAPACITY: usize = 100;
    /// Nodes deeper than this are never subdivided
    pub const MAX_DEPTH: u32 = 15;
}

/// Signed area of the parallelogram spanned by `a` and `b` (2D cross product)
#[inline]
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed angle (radians, in (-π, π]) turning from `from` to `to`
#[inline]
pub fn turning_angle(from: DVec2, to: DVec2) -> f64 {
    cross(from, to).atan2(from.dot(to))
}
