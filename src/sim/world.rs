//! The collision world
//!
//! Owns the segments and drives each step:
//! 1. detect (parallel, read-only)
//! 2. sort events into canonical order
//! 3. solve events one at a time
//! 4. advance every segment to its predicted position
//! 5. bounce segments off the walls

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::detect::Detector;
use super::events::IntersectionEvent;
use super::quadtree::{PartitionLimits, Quadtree};
use super::segment::{Segment, SegmentSpec};
use super::solver;
use crate::error::WorldError;
use crate::settings::{DetectionMode, WorldConfig};

/// A box of moving segments
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    /// Indexed by id
    segments: Vec<Segment>,
    capacity: usize,
    /// Time step the segments' derived state was computed for
    derived_dt: f64,
    steps: u64,
    wall_collisions: u64,
    segment_collisions: u64,
    pool: ThreadPool,
}

impl World {
    /// Empty world with room for `capacity` segments
    pub fn with_capacity(config: WorldConfig, capacity: usize) -> Result<Self, WorldError> {
        config.validate()?;
        if capacity == 0 {
            return Err(WorldError::InvalidConfig(
                "segment capacity must be at least 1".to_string(),
            ));
        }

        let mut segments = Vec::new();
        segments.try_reserve_exact(capacity)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("detect-{i}"))
            .build()?;

        log::info!(
            "World: capacity {}, {} detection on {} threads, dt {}",
            capacity,
            config.detection.as_str(),
            pool.current_num_threads(),
            config.time_step
        );

        Ok(Self {
            derived_dt: config.time_step,
            config,
            segments,
            capacity,
            steps: 0,
            wall_collisions: 0,
            segment_collisions: 0,
            pool,
        })
    }

    /// World holding exactly `specs`, ids assigned in order
    pub fn new(config: WorldConfig, specs: &[SegmentSpec]) -> Result<Self, WorldError> {
        let mut world = Self::with_capacity(config, specs.len().max(1))?;
        for spec in specs {
            world.add_segment(*spec)?;
        }
        Ok(world)
    }

    /// Add a segment; returns its index (which is also its id)
    pub fn add_segment(&mut self, spec: SegmentSpec) -> Result<usize, WorldError> {
        if self.segments.len() >= self.capacity {
            return Err(WorldError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let index = self.segments.len();
        let id = u32::try_from(index).map_err(|_| WorldError::CapacityExceeded {
            capacity: self.capacity,
        })?;
        self.segments
            .push(Segment::from_spec(id, &spec, self.derived_dt));
        Ok(index)
    }

    /// Advance one step with the configured time step
    pub fn step(&mut self) {
        self.step_with(self.config.time_step);
    }

    /// Advance one step covering `dt` of simulated time
    pub fn step_with(&mut self, dt: f64) {
        if dt != self.derived_dt {
            for segment in &mut self.segments {
                segment.refresh(dt);
            }
            self.derived_dt = dt;
        }

        let events = self.detect(dt);
        self.segment_collisions += events.len() as u64;
        for event in &events {
            solver::resolve(&mut self.segments, event, dt);
        }

        self.advance(dt);
        let bounced = self.bounce_walls(dt);
        self.wall_collisions += bounced;
        self.steps += 1;

        log::debug!(
            "Step {}: {} segment collisions, {} wall bounces",
            self.steps,
            events.len(),
            bounced
        );
    }

    /// Intersection events for the coming step, in canonical order
    fn detect(&self, dt: f64) -> Vec<IntersectionEvent> {
        let segments = &self.segments;
        let config = &self.config;
        let events = self.pool.install(|| {
            let detector = Detector::new(segments, dt, config.parallel);
            match config.detection {
                DetectionMode::Quadtree => {
                    let limits = PartitionLimits {
                        leaf_capacity: config.leaf_capacity,
                        max_depth: config.max_depth,
                    };
                    let tree = Quadtree::build(config.bounds, segments, limits, config.parallel);
                    detector.detect(&tree)
                }
                DetectionMode::BruteForce => detector.detect_brute_force(),
            }
        });
        events.into_sorted()
    }

    /// Move every segment to its predicted position
    fn advance(&mut self, dt: f64) {
        let segments = &mut self.segments;
        if self.config.parallel {
            self.pool
                .install(|| segments.par_iter_mut().for_each(|s| s.advance(dt)));
        } else {
            segments.iter_mut().for_each(|s| s.advance(dt));
        }
    }

    /// Reflect segments heading out of the box; returns how many bounced
    fn bounce_walls(&mut self, dt: f64) -> u64 {
        let walls = self.config.bounds;
        let mut bounced = 0;

        for segment in &mut self.segments {
            let reach = segment.bounds;
            let v = &mut segment.velocity;
            let mut hit = false;

            // Right
            if reach.max.x > walls.max.x && v.x > 0.0 {
                v.x = -v.x;
                hit = true;
            }
            // Left
            if reach.min.x < walls.min.x && v.x < 0.0 {
                v.x = -v.x;
                hit = true;
            }
            // Bottom
            if reach.max.y > walls.max.y && v.y > 0.0 {
                v.y = -v.y;
                hit = true;
            }
            // Top
            if reach.min.y < walls.min.y && v.y < 0.0 {
                v.y = -v.y;
                hit = true;
            }

            if hit {
                segment.refresh(dt);
                bounced += 1;
            }
        }
        bounced
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total segment-wall bounces so far
    pub fn wall_collisions(&self) -> u64 {
        self.wall_collisions
    }

    /// Total segment-segment collisions so far
    pub fn segment_collisions(&self) -> u64 {
        self.segment_collisions
    }
}
