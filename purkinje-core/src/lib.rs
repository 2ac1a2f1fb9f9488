//! Fractal growth of 3-D branching fiber networks (Purkinje-like trees).
//!
//! Main components:
//! - [`config`] — the validated parameter record for one run.
//! - [`spatial`] — proximity index over placed nodes (grid and brute force).
//! - [`repulsion`] — inverse-distance push that keeps branches apart.
//! - [`branch`] — transient growth fronts and split geometry.
//! - [`growth`] — the generation loop that grows and splits branches.
//! - [`network`] — the resulting nodes, segments and branch records.
//! - [`error`] — configuration and growth errors.
//! - [`types`] — shared type aliases and ids.

pub mod branch;
pub mod config;
pub mod error;
pub mod growth;
pub mod network;
pub mod repulsion;
pub mod spatial;
pub mod types;

pub use config::{GrowthParams, SplitAxis};
pub use error::{ConfigError, GrowthError};
pub use growth::{FractalTree, generate};
pub use network::{BranchRecord, Network, Segment};
pub use spatial::{BruteForceIndex, GridIndex, SpatialIndex};
pub use types::{BranchId, NodeId, Point3};
