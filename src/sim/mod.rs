//! Deterministic simulation module
//!
//! All collision logic lives here. Results must not depend on scheduling:
//! - Detection only reads segment state
//! - Events are sorted by segment id before they are applied
//! - Only the solver mutates segments, one event at a time

pub mod detect;
pub mod events;
pub mod geometry;
pub mod quadtree;
pub mod segment;
pub mod solver;
pub mod world;

pub use detect::{Detector, check_pair};
pub use events::{EventList, IntersectionEvent, IntersectionKind};
pub use geometry::{
    Aabb, direction, intersection_point, on_segment, point_in_parallelogram, segments_intersect,
    sweep_intersection,
};
pub use quadtree::{Node, PartitionLimits, Quadrant, Quadtree};
pub use segment::{Segment, SegmentSpec};
pub use solver::resolve;
pub use world::World;
