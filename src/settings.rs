//! World configuration
//!
//! Loaded by the caller (file, embedded JSON, or built in code) and handed to
//! [`World::new`](crate::World::new). Nothing here touches the filesystem.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::WorldError;
use crate::sim::Aabb;

/// Which detector finds candidate pairs each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DetectionMode {
    /// Quadtree broad phase with fork-join traversal
    #[default]
    Quadtree,
    /// Every pair tested; reference for validating the quadtree
    BruteForce,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Quadtree => "quadtree",
            DetectionMode::BruteForce => "brute-force",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quadtree" | "tree" => Some(DetectionMode::Quadtree),
            "brute-force" | "bruteforce" | "brute" => Some(DetectionMode::BruteForce),
            _ => None,
        }
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Box the segments bounce around in
    pub bounds: Aabb,
    /// Simulated time covered by one step
    pub time_step: f64,

    // === Partition ===
    /// A node holding at most this many segments is not subdivided
    pub leaf_capacity: usize,
    /// Nodes deeper than this are not subdivided
    pub max_depth: u32,

    // === Detection ===
    pub detection: DetectionMode,
    /// Worker threads for detection (0 = rayon's default)
    pub threads: usize,
    /// Run detection through rayon; when false the same recursion runs inline
    pub parallel: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Aabb::new(
                DVec2::new(BOX_XMIN, BOX_YMIN),
                DVec2::new(BOX_XMAX, BOX_YMAX),
            ),
            time_step: TIME_STEP,

            leaf_capacity: LEAF_CAPACITY,
            max_depth: MAX_DEPTH,

            detection: DetectionMode::Quadtree,
            threads: 0,
            parallel: true,
        }
    }
}

impl WorldConfig {
    /// Default configuration with different bounds
    pub fn with_bounds(min: DVec2, max: DVec2) -> Self {
        Self {
            bounds: Aabb::new(min, max),
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, WorldError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(WorldError::InvalidConfig(format!(
                "time step must be positive, got {}",
                self.time_step
            )));
        }
        let size = self.bounds.size();
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(WorldError::InvalidConfig(format!(
                "bounds must have positive area, got {:?}..{:?}",
                self.bounds.min, self.bounds.max
            )));
        }
        if self.leaf_capacity == 0 {
            return Err(WorldError::InvalidConfig(
                "leaf capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
