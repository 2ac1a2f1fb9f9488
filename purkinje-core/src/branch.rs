//! Growth fronts and their split geometry.

use crate::types::{BranchId, NodeId, Point3};
use glam::DQuat;

/// Lifecycle of a [`Branch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchState {
    /// Still advancing towards its target length.
    Growing,
    /// Reached its target length and was replaced by two children.
    Split,
    /// Reached its target length in the last generation; a leaf.
    Done,
}

/// Transient growth front inside the engine.
///
/// A branch starts at an existing node (the root node or its parent's final
/// node) and appends one node per step. `axis` is a unit vector kept
/// perpendicular to `direction`; splits rotate about it.
///
/// `trail` holds the chain nodes behind the tip, oldest first, each with
/// its path length to the tip. It crosses split points, so a child's trail
/// continues into its parent's chain.
#[derive(Debug, Clone)]
pub struct Branch {
    pub generation: u32,
    pub parent: Option<BranchId>,
    pub state: BranchState,
    pub tip: NodeId,
    pub tip_pos: Point3,
    pub trail: Vec<(NodeId, f64)>,
    pub direction: Point3,
    pub axis: Point3,
    pub length: f64,
    pub nodes: Vec<NodeId>,
}

impl Branch {
    /// Creates the root branch at node `start` growing along `direction`.
    ///
    /// `direction` must be a unit vector.
    pub fn root(start: NodeId, pos: Point3, direction: Point3) -> Self {
        Self {
            generation: 0,
            parent: None,
            state: BranchState::Growing,
            tip: start,
            tip_pos: pos,
            trail: Vec::new(),
            direction,
            axis: direction.any_orthonormal_vector(),
            length: 0.0,
            nodes: vec![start],
        }
    }

    /// Moves the tip to a freshly created node.
    ///
    /// Trail nodes farther than `reach` along the chain are dropped; the
    /// immediate predecessor is always kept.
    pub fn advance(&mut self, id: NodeId, pos: Point3, direction: Point3, step: f64, reach: f64) {
        for (_, arc) in &mut self.trail {
            *arc += step;
        }
        self.trail.push((self.tip, step));
        // Arcs shrink towards the back, so the kept part is a suffix.
        let keep_from = self
            .trail
            .iter()
            .position(|&(_, arc)| arc <= reach)
            .unwrap_or(self.trail.len() - 1);
        self.trail.drain(..keep_from);

        self.tip = id;
        self.tip_pos = pos;
        self.direction = direction;
        self.length += step;
        self.nodes.push(id);
    }

    /// Immediate predecessor of the tip along the chain.
    pub fn prev(&self) -> Option<NodeId> {
        self.trail.last().map(|&(id, _)| id)
    }

    /// Axis perpendicular to the current direction, derived from the
    /// carried axis.
    ///
    /// Repulsion bends the direction away from the plane the axis was
    /// chosen for, so the axis is re-orthogonalized before use.
    pub fn split_axis(&self) -> Point3 {
        let d = self.direction;
        let a = (self.axis - d * self.axis.dot(d)).normalize_or_zero();
        if a == Point3::ZERO {
            d.any_orthonormal_vector()
        } else {
            a
        }
    }

    /// Produces the two children of this branch.
    ///
    /// The children start at this branch's tip with zero length, directions
    /// rotated by `+angle` and `-angle` about `axis`, and inherit `axis`.
    /// The branch itself is marked [`BranchState::Split`].
    ///
    /// ### Parameters
    /// - `id` - Record id this branch was stored under; the children's parent.
    /// - `axis` - Unit rotation axis perpendicular to `self.direction`.
    /// - `angle` - Branch angle in radians.
    pub fn split(&mut self, id: BranchId, axis: Point3, angle: f64) -> [Branch; 2] {
        self.state = BranchState::Split;
        let child = |sign: f64| {
            let direction = (DQuat::from_axis_angle(axis, sign * angle) * self.direction).normalize();
            Branch {
                generation: self.generation + 1,
                parent: Some(id),
                state: BranchState::Growing,
                tip: self.tip,
                tip_pos: self.tip_pos,
                trail: self.trail.clone(),
                direction,
                axis,
                length: 0.0,
                nodes: vec![self.tip],
            }
        };
        [child(1.0), child(-1.0)]
    }
}

/// Rotates the unit vector `axis` about the unit vector `about` by `angle`.
pub(crate) fn spin(axis: Point3, about: Point3, angle: f64) -> Point3 {
    (DQuat::from_axis_angle(about, angle) * axis).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_axis_is_perpendicular_unit() {
        let d = Point3::new(1.0, 2.0, -2.0).normalize();
        let b = Branch::root(0, Point3::ZERO, d);
        assert!((b.axis.length() - 1.0).abs() < 1e-12);
        assert!(b.axis.dot(d).abs() < 1e-12);
        assert_eq!(b.state, BranchState::Growing);
        assert_eq!(b.nodes, vec![0]);
    }

    #[test]
    fn advance_tracks_chain() {
        let mut b = Branch::root(0, Point3::ZERO, Point3::X);
        b.advance(1, Point3::new(0.5, 0.0, 0.0), Point3::X, 0.5, 0.6);
        b.advance(2, Point3::new(1.0, 0.0, 0.0), Point3::X, 0.5, 0.6);
        assert_eq!(b.tip, 2);
        assert_eq!(b.prev(), Some(1));
        assert_eq!(b.trail, vec![(1, 0.5)]);
        assert_eq!(b.length, 1.0);
        assert_eq!(b.nodes, vec![0, 1, 2]);
    }

    #[test]
    fn trail_keeps_nodes_within_reach_and_always_the_predecessor() {
        let mut b = Branch::root(0, Point3::ZERO, Point3::X);
        b.advance(1, Point3::new(1.0, 0.0, 0.0), Point3::X, 1.0, 1.9);
        b.advance(2, Point3::new(2.0, 0.0, 0.0), Point3::X, 1.0, 1.9);
        assert_eq!(b.trail, vec![(1, 1.0)]);

        // A short step keeps the second predecessor within reach.
        b.advance(3, Point3::new(2.25, 0.0, 0.0), Point3::X, 0.25, 1.9);
        assert_eq!(b.trail, vec![(1, 1.25), (2, 0.25)]);

        // A step longer than the reach still keeps the predecessor.
        b.advance(4, Point3::new(5.25, 0.0, 0.0), Point3::X, 3.0, 1.9);
        assert_eq!(b.trail, vec![(3, 3.0)]);
    }

    #[test]
    fn split_rotates_children_symmetrically() {
        let mut b = Branch::root(0, Point3::ZERO, Point3::X);
        b.axis = Point3::Z;
        b.advance(1, Point3::X, Point3::X, 1.0, 1.9);

        let angle = 0.3;
        let [plus, minus] = b.split(4, b.split_axis(), angle);

        assert_eq!(b.state, BranchState::Split);
        assert!((plus.direction - Point3::new(angle.cos(), angle.sin(), 0.0)).length() < 1e-12);
        assert!((minus.direction - Point3::new(angle.cos(), -angle.sin(), 0.0)).length() < 1e-12);
        assert!((plus.direction.angle_between(minus.direction) - 2.0 * angle).abs() < 1e-12);

        for c in [&plus, &minus] {
            assert_eq!(c.parent, Some(4));
            assert_eq!(c.generation, 1);
            assert_eq!(c.tip, 1);
            assert_eq!(c.prev(), Some(0));
            assert_eq!(c.length, 0.0);
            assert_eq!(c.nodes, vec![1]);
            assert!(c.axis.dot(c.direction).abs() < 1e-12);
        }
    }

    #[test]
    fn split_axis_is_reorthogonalized() {
        let mut b = Branch::root(0, Point3::ZERO, Point3::X);
        b.axis = Point3::Z;
        b.direction = Point3::new(1.0, 0.0, 1.0).normalize();
        let a = b.split_axis();
        assert!(a.dot(b.direction).abs() < 1e-12);
        assert!((a.length() - 1.0).abs() < 1e-12);

        b.axis = b.direction;
        let a = b.split_axis();
        assert!(a.dot(b.direction).abs() < 1e-12);
    }

    #[test]
    fn spin_keeps_axis_perpendicular() {
        let a = spin(Point3::Z, Point3::X, 1.1);
        assert!(a.dot(Point3::X).abs() < 1e-12);
        assert!((a.length() - 1.0).abs() < 1e-12);
    }
}
