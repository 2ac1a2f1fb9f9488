/// Identifier for a node in a [`crate::network::Network`].
///
/// This is an index into the network's node table. Ids are assigned densely
/// in creation order and are never reused.
pub type NodeId = usize;

/// Identifier for a branch record in a [`crate::network::Network`].
pub type BranchId = usize;

/// A 3-D coordinate.
pub type Point3 = glam::DVec3;
