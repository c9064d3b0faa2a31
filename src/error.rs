//! Errors surfaced while building a world
//!
//! Only construction and configuration can fail. Stepping never returns an
//! error: degenerate geometry is the caller's responsibility, and broken
//! internal invariants are caught by debug assertions.

use std::collections::TryReserveError;

use rayon::ThreadPoolBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("Segment capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("Failed to allocate segment store")]
    Allocation(#[from] TryReserveError),

    #[error("Failed to build detection thread pool")]
    ThreadPool(#[from] ThreadPoolBuildError),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}
