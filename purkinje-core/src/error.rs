//! Error types for parameter validation and growth.

use crate::types::NodeId;
use thiserror::Error;

/// A malformed [`crate::config::GrowthParams`].
///
/// Always detected before the first growth step; a run that fails
/// validation produces no nodes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("generations must be at most {max}, got {got}")]
    TooManyGenerations { got: u32, max: u32 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be finite in every component")]
    NonFinitePoint { field: &'static str },

    #[error("segment_length must be positive, got {0}")]
    NonPositiveSegment(f64),

    #[error("segment_length {segment} exceeds {field} {length}")]
    SegmentTooLong {
        field: &'static str,
        segment: f64,
        length: f64,
    },

    #[error("repulsion_weight must be non-negative, got {0}")]
    NegativeRepulsion(f64),

    #[error("length_jitter must lie in [0, 1), got {0}")]
    JitterOutOfRange(f64),

    #[error("init_node and second_node coincide or are too close to define a direction")]
    DegenerateDirection,

    #[error("run could create up to {bound} nodes, more than the limit of {max}")]
    TooManyNodes { bound: f64, max: usize },
}

/// Failure of a growth run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GrowthError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A node id outside `[0, node_count)` reached the engine. This is a
    /// defect in the spatial index or the engine, never an input problem.
    #[error("node {id} referenced but only {node_count} nodes exist")]
    DanglingNode { id: NodeId, node_count: usize },
}
