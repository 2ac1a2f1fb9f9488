use crate::{
    branch::BranchState,
    error::GrowthError,
    types::{BranchId, NodeId, Point3},
};

/// One fixed-length growth step between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub tail: NodeId,
    pub head: NodeId,
}

/// A finished branch as it appears in the output.
///
/// `nodes` starts with the node the branch grew from (shared with its
/// parent, or the initial node for the root) and ends at its final node.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchRecord {
    pub generation: u32,
    pub parent: Option<BranchId>,
    pub nodes: Vec<NodeId>,
    pub length: f64,
    pub state: BranchState,
}

impl BranchRecord {
    /// Number of segments the branch consists of.
    pub fn segment_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// Grown network: node table, connectivity list and branch records.
///
/// Nodes and segments are append-only while the engine runs; once handed
/// back to the caller the network is read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Network {
    nodes: Vec<Point3>,
    segments: Vec<Segment>,
    branches: Vec<BranchRecord>,
}

impl Network {
    pub(crate) fn with_capacity(nodes: usize, branches: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            segments: Vec::with_capacity(nodes.saturating_sub(1)),
            branches: Vec::with_capacity(branches),
        }
    }

    pub(crate) fn push_node(&mut self, pos: Point3) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(pos);
        id
    }

    /// Appends a segment between two existing nodes.
    pub(crate) fn push_segment(&mut self, tail: NodeId, head: NodeId) -> Result<(), GrowthError> {
        self.check(tail)?;
        self.check(head)?;
        self.segments.push(Segment { tail, head });
        Ok(())
    }

    pub(crate) fn push_branch(&mut self, record: BranchRecord) -> BranchId {
        let id = self.branches.len();
        self.branches.push(record);
        id
    }

    /// Looks up a node position, failing on an id that was never created.
    pub(crate) fn position(&self, id: NodeId) -> Result<Point3, GrowthError> {
        self.nodes.get(id).copied().ok_or(GrowthError::DanglingNode {
            id,
            node_count: self.nodes.len(),
        })
    }

    fn check(&self, id: NodeId) -> Result<(), GrowthError> {
        self.position(id).map(|_| ())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Node positions indexed by [`NodeId`].
    pub fn nodes(&self) -> &[Point3] {
        &self.nodes
    }

    /// Connectivity list in creation order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Branch records in creation order; index is the [`BranchId`].
    pub fn branches(&self) -> &[BranchRecord] {
        &self.branches
    }

    pub fn node(&self, id: NodeId) -> Option<Point3> {
        self.nodes.get(id).copied()
    }

    /// Iterates over the leaf branches, i.e. those that never split.
    pub fn leaves(&self) -> impl Iterator<Item = &BranchRecord> + '_ {
        self.branches
            .iter()
            .filter(|b| b.state == BranchState::Done)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Final node of every leaf branch, in creation order.
    pub fn end_nodes(&self) -> Vec<NodeId> {
        self.leaves().filter_map(BranchRecord::last_node).collect()
    }

    /// Summed Euclidean length of all segments.
    pub fn total_length(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| self.nodes[s.head].distance(self.nodes[s.tail]))
            .sum()
    }

    /// Branch ids from `branch` back to the root, inclusive.
    ///
    /// Returns an empty vector for an unknown id.
    pub fn lineage(&self, branch: BranchId) -> Vec<BranchId> {
        let mut path = Vec::new();
        let mut cur = (branch < self.branches.len()).then_some(branch);
        while let Some(id) = cur {
            path.push(id);
            cur = self.branches[id].parent;
        }
        path
    }
}
