//! Proximity queries over already placed nodes.
//!
//! Two interchangeable implementations of [`SpatialIndex`]:
//! - [`BruteForceIndex`] — a linear scan, the reference behavior.
//! - [`GridIndex`] — an unbounded uniform grid of hashed cells.
//!
//! Both return neighbors within the query radius (inclusive) sorted by
//! ascending [`NodeId`], so swapping one for the other never changes the
//! grown geometry.

use crate::types::{NodeId, Point3};
use glam::IVec3;
use std::collections::HashMap;

/// Incremental index answering "which nodes lie within `r` of `p`".
pub trait SpatialIndex {
    /// Adds a node's position. Subsequent queries may return it.
    fn insert(&mut self, id: NodeId, pos: Point3);

    /// Collects into `out` every node within `radius` of `point`, except
    /// the ids listed in `exclude`.
    ///
    /// `out` is cleared first and is sorted by ascending id on return.
    fn query_within(&self, point: Point3, radius: f64, exclude: &[NodeId], out: &mut Vec<NodeId>);

    /// Number of inserted nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Linear scan over every inserted node.
#[derive(Debug, Default, Clone)]
pub struct BruteForceIndex {
    points: Vec<(NodeId, Point3)>,
}

impl BruteForceIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for BruteForceIndex {
    fn insert(&mut self, id: NodeId, pos: Point3) {
        self.points.push((id, pos));
    }

    fn query_within(&self, point: Point3, radius: f64, exclude: &[NodeId], out: &mut Vec<NodeId>) {
        out.clear();
        let r2 = radius * radius;
        for &(id, pos) in &self.points {
            if (pos - point).length_squared() <= r2 && !exclude.contains(&id) {
                out.push(id);
            }
        }
        out.sort_unstable();
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

/// Uniform grid of cubic cells keyed by integer cell coordinates.
///
/// Cells are created on demand, so the grid has no world bounds. A query
/// visits every cell overlapping the query sphere's bounding box and then
/// filters by exact distance. With `cell_size` equal to the usual query
/// radius that is a 3x3x3 block of cells.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f64,
    cells: HashMap<IVec3, Vec<(NodeId, Point3)>>,
    len: usize,
}

impl GridIndex {
    /// Creates an empty grid.
    ///
    /// ### Parameters
    /// - `cell_size` - Edge length of one cell. Non-positive or non-finite
    ///   values fall back to `1.0`.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, pos: Point3) -> IVec3 {
        (pos / self.cell_size).floor().as_ivec3()
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpatialIndex for GridIndex {
    fn insert(&mut self, id: NodeId, pos: Point3) {
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().push((id, pos));
        self.len += 1;
    }

    fn query_within(&self, point: Point3, radius: f64, exclude: &[NodeId], out: &mut Vec<NodeId>) {
        out.clear();
        if radius < 0.0 || self.len == 0 {
            return;
        }
        let r2 = radius * radius;
        let lo = self.cell_of(point - Point3::splat(radius));
        let hi = self.cell_of(point + Point3::splat(radius));

        // Every cell overlapping the query sphere's bounding box.
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let Some(bucket) = self.cells.get(&IVec3::new(x, y, z)) else {
                        continue;
                    };
                    // Cells over-cover the sphere; filter by exact distance.
                    for &(id, pos) in bucket {
                        if (pos - point).length_squared() <= r2 && !exclude.contains(&id) {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out.sort_unstable();
    }

    fn len(&self) -> usize {
        self.len
    }
}
