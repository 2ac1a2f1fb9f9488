//! Generation-by-generation fractal growth.
//!
//! One run of [`FractalTree::grow`] looks like:
//! 1. A root [`Branch`] starts at `init_node` heading towards `second_node`.
//! 2. For every generation, each active branch is grown to its length by
//!    [`grow_phase`], one segment at a time. Every step queries the
//!    [`SpatialIndex`] around the tip, bends the direction away from nearby
//!    nodes and appends a node and a segment.
//! 3. [`split_phase`] then replaces every grown branch with two children
//!    rotated by `±branch_angle`, unless the last generation was reached,
//!    in which case the branch becomes a leaf.
//!
//! All branches of generation `k` finish growing before generation `k + 1`
//! starts, and within a generation branches grow in creation order. Given
//! the same [`GrowthParams`] the output is bit-identical across runs and
//! across index implementations.

use crate::{
    branch::{self, Branch, BranchState},
    config::{GrowthParams, SplitAxis},
    error::{ConfigError, GrowthError},
    network::{BranchRecord, Network},
    repulsion::{Repulsion, steer},
    spatial::{GridIndex, SpatialIndex},
    types::{BranchId, NodeId},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::TAU;
use tracing::{debug, debug_span, trace};

/// Relative tolerance under which a length ratio counts as an integer.
const STEP_RATIO_EPS: f64 = 1e-9;

/// Upper bound on the node capacity reserved up front.
const MAX_RESERVED_NODES: usize = 1 << 22;

/// Number of steps needed to grow a branch of `length` in steps of
/// `segment`.
///
/// This is `ceil(length / segment)`, except that ratios within a relative
/// `1e-9` of an integer are rounded to it, so `0.3 / 0.01` gives 30 steps
/// rather than 31. Always at least one.
pub fn step_count(length: f64, segment: f64) -> usize {
    let ratio = length / segment;
    let nearest = ratio.round();
    let steps = if (ratio - nearest).abs() <= STEP_RATIO_EPS * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    steps.max(1.0) as usize
}

/// Validated growth run.
///
/// Holding a `FractalTree` means its parameters passed
/// [`GrowthParams::validate`]; growing it cannot fail on input.
#[derive(Debug, Clone)]
pub struct FractalTree {
    params: GrowthParams,
}

impl FractalTree {
    /// Validates `params` and wraps them for growing.
    pub fn new(params: GrowthParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    /// Grows the network using a [`GridIndex`] sized to the repulsion radius.
    pub fn grow(&self) -> Result<Network, GrowthError> {
        self.run(GridIndex::new(self.params.repulsion_radius()))
    }

    /// Grows the network using a fresh index of type `I`.
    ///
    /// Every [`SpatialIndex`] yields the same network; this exists so the
    /// brute-force index can serve as a reference.
    pub fn grow_with<I: SpatialIndex + Default>(&self) -> Result<Network, GrowthError> {
        self.run(I::default())
    }

    fn run<I: SpatialIndex>(&self, index: I) -> Result<Network, GrowthError> {
        let p = &self.params;
        let _span = debug_span!("grow", generations = p.generations).entered();

        let mut grower = Grower::new(p, index);
        let root_node = grower.place_root();
        let mut active = vec![Branch::root(root_node, p.init_node, p.initial_direction())];

        for generation in 0..=p.generations {
            let mut next = Vec::with_capacity(active.len() * 2);
            for mut b in active.drain(..) {
                let length = grower.branch_length(generation);
                grow_phase(&mut b, length, &mut grower)?;

                let last = generation == p.generations;
                b.state = if last {
                    BranchState::Done
                } else {
                    BranchState::Split
                };
                let id = grower.record(&b);
                if !last {
                    next.extend(split_phase(&mut b, id, &mut grower));
                }
            }
            debug!(
                generation,
                nodes = grower.network.node_count(),
                next = next.len(),
                "generation grown"
            );
            active = next;
        }

        let network = grower.network;
        debug!(
            nodes = network.node_count(),
            segments = network.segment_count(),
            leaves = network.leaf_count(),
            "growth finished"
        );
        Ok(network)
    }
}

/// Validates `params` and grows the network with the default index.
pub fn generate(params: &GrowthParams) -> Result<Network, GrowthError> {
    FractalTree::new(*params)?.grow()
}

/// Mutable state shared by the phases of one run.
pub(crate) struct Grower<'a, I> {
    params: &'a GrowthParams,
    network: Network,
    index: I,
    rng: StdRng,
    neighbors: Vec<NodeId>,
    exclude: Vec<NodeId>,
    repulsion: Repulsion,
}

impl<'a, I: SpatialIndex> Grower<'a, I> {
    fn new(params: &'a GrowthParams, index: I) -> Self {
        let steps = step_count(params.target_length, params.segment_length);
        let branches = (1usize << (params.generations + 1)) - 1;
        let nodes = branches
            .saturating_mul(steps)
            .saturating_add(1)
            .min(MAX_RESERVED_NODES);

        Self {
            params,
            network: Network::with_capacity(nodes, branches.min(MAX_RESERVED_NODES)),
            index,
            rng: StdRng::seed_from_u64(params.seed),
            neighbors: Vec::with_capacity(32),
            exclude: Vec::with_capacity(4),
            repulsion: Repulsion::new(),
        }
    }

    fn place_root(&mut self) -> NodeId {
        let id = self.network.push_node(self.params.init_node);
        self.index.insert(id, self.params.init_node);
        id
    }

    /// Length the next branch of `generation` grows to.
    ///
    /// Draws from the generator only when jitter is enabled.
    fn branch_length(&mut self, generation: u32) -> f64 {
        let p = self.params;
        if generation == 0 {
            return p.root_length();
        }
        if p.length_jitter > 0.0 {
            let u = self.rng.random_range(-p.length_jitter..=p.length_jitter);
            (p.target_length * (1.0 + u)).max(p.segment_length)
        } else {
            p.target_length
        }
    }

    fn record(&mut self, b: &Branch) -> BranchId {
        self.network.push_branch(BranchRecord {
            generation: b.generation,
            parent: b.parent,
            nodes: b.nodes.clone(),
            length: b.length,
            state: b.state,
        })
    }

    /// Sums the push on a tip from every indexed node in the repulsion
    /// radius, except the tip itself and its own trailing chain.
    fn repulsion_at(&mut self, b: &Branch) -> Result<(), GrowthError> {
        self.repulsion.clear();
        self.exclude.clear();
        self.exclude.push(b.tip);
        self.exclude.extend(b.trail.iter().map(|&(id, _)| id));

        self.index.query_within(
            b.tip_pos,
            self.params.repulsion_radius(),
            &self.exclude,
            &mut self.neighbors,
        );
        for &id in &self.neighbors {
            // Ids come from the index; a miss here is an index defect.
            let pos = self.network.position(id)?;
            self.repulsion.add(b.tip_pos, pos);
        }
        if self.repulsion.is_active() {
            trace!(tip = b.tip, neighbors = self.repulsion.count, "repelled");
        }
        Ok(())
    }
}

/// Grows `b` to exactly `length`, appending one node per step.
///
/// Every step but the last advances `segment_length`; the last covers the
/// remainder so the branch length equals `length`. A tip is never repelled
/// by its own chain within the repulsion radius. Each new node is
/// inserted into the index before the next step queries it, so later steps
/// and later branches are repelled by it.
///
/// ### Parameters
/// - `b` - The branch to grow; its tip, direction and node chain are updated.
/// - `length` - Target length for this branch.
/// - `g` - Shared run state (network, index, scratch buffers).
///
/// ### Errors
/// [`GrowthError::DanglingNode`] if the index reports a node the network
/// does not hold.
pub(crate) fn grow_phase<I: SpatialIndex>(
    b: &mut Branch,
    length: f64,
    g: &mut Grower<'_, I>,
) -> Result<(), GrowthError> {
    let seg = g.params.segment_length;
    let weight = g.params.repulsion_weight;
    let reach = g.params.repulsion_radius();
    let steps = step_count(length, seg);

    for step in 1..=steps {
        // Last step takes the remainder so the branch ends exactly on `length`.
        let step_len = if step == steps {
            length - seg * (steps - 1) as f64
        } else {
            seg
        };

        // Without repulsion the index is never consulted.
        let dir = if weight > 0.0 {
            g.repulsion_at(b)?;
            steer(b.direction, g.repulsion.displacement(weight))
        } else {
            b.direction
        };

        let pos = b.tip_pos + dir * step_len;
        let id = g.network.push_node(pos);
        g.network.push_segment(b.tip, id)?;
        // Visible to the next step and to every later branch.
        g.index.insert(id, pos);
        b.advance(id, pos, dir, step_len, reach);
    }

    b.length = length;
    Ok(())
}

/// Splits a fully grown branch into its two children.
///
/// With [`SplitAxis::Random`] the rotation axis is spun about the parent
/// direction by a uniform angle in `[0, 2π)` first.
///
/// ### Returns
/// The `+branch_angle` child followed by the `-branch_angle` child.
pub(crate) fn split_phase<I: SpatialIndex>(
    b: &mut Branch,
    id: BranchId,
    g: &mut Grower<'_, I>,
) -> [Branch; 2] {
    let mut axis = b.split_axis();
    if g.params.split_axis == SplitAxis::Random {
        let angle = g.rng.random_range(0.0..TAU);
        axis = branch::spin(axis, b.direction, angle);
    }
    b.split(id, axis, g.params.branch_angle)
}
