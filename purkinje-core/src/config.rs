//! Parameter record for one growth run.

use crate::{error::ConfigError, types::Point3};
use serde::{Deserialize, Serialize};

/// Neighborhood radius for repulsion, as a multiple of the segment length.
pub const REPULSION_RADIUS_FACTOR: f64 = 1.9;

/// Upper bound on `generations`; a run grows `2^(generations + 1) - 1` branches.
pub const MAX_GENERATIONS: u32 = 24;

/// Upper bound on the number of nodes a run may create.
///
/// Checked against [`GrowthParams::node_bound`] before growth starts.
pub const MAX_NODES: usize = 1 << 26;

/// How the rotation axis is chosen when a branch splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    /// Children inherit the parent's axis; without repulsion the whole
    /// tree stays in the plane spanned by the initial direction and axis.
    #[default]
    Planar,
    /// The inherited axis is first spun about the parent direction by a
    /// uniform random angle drawn from the seeded generator.
    Random,
}

/// Configuration describing one growth run.
///
/// Construct it directly or deserialize it (every field has a default),
/// then hand it to [`crate::growth::FractalTree::new`], which validates it
/// once. The record is never mutated by the engine.
///
/// ### Fields
/// - `generations` - Number of branch-splitting rounds.
/// - `target_length` - Length every branch grows to before it splits.
/// - `segment_length` - Length of one atomic growth step.
/// - `branch_angle` - Angle (radians) between each child and its parent.
/// - `repulsion_weight` - Strength of inter-branch avoidance.
/// - `init_node` - First node of the network.
/// - `second_node` - Together with `init_node`, fixes the initial direction.
/// - `root_length` - Optional length for the root branch only.
/// - `length_jitter` - Relative uniform jitter applied to non-root branch lengths.
/// - `split_axis` - Rotation axis policy at splits.
/// - `seed` - Seed for every random draw of the run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    pub generations: u32,
    pub target_length: f64,
    pub segment_length: f64,
    pub branch_angle: f64,
    pub repulsion_weight: f64,
    pub init_node: Point3,
    pub second_node: Point3,
    pub root_length: Option<f64>,
    pub length_jitter: f64,
    pub split_axis: SplitAxis,
    pub seed: u64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            generations: 10,
            target_length: 0.3,
            segment_length: 0.01,
            branch_angle: 0.15,
            repulsion_weight: 0.1,
            init_node: Point3::new(-1.0, 0.0, 0.0),
            second_node: Point3::new(-0.964, 0.0, 0.266),
            root_length: None,
            length_jitter: 0.0,
            split_axis: SplitAxis::Planar,
            seed: 0,
        }
    }
}

impl GrowthParams {
    /// Checks every field and reports the first violation.
    ///
    /// ### Returns
    /// - `Ok(())` if the record describes a runnable growth.
    /// - `Err(ConfigError)` naming the offending field otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generations > MAX_GENERATIONS {
            return Err(ConfigError::TooManyGenerations {
                got: self.generations,
                max: MAX_GENERATIONS,
            });
        }

        finite("target_length", self.target_length)?;
        finite("segment_length", self.segment_length)?;
        finite("branch_angle", self.branch_angle)?;
        finite("repulsion_weight", self.repulsion_weight)?;
        finite("length_jitter", self.length_jitter)?;
        finite_point("init_node", self.init_node)?;
        finite_point("second_node", self.second_node)?;

        if self.segment_length <= 0.0 {
            return Err(ConfigError::NonPositiveSegment(self.segment_length));
        }
        if self.segment_length > self.target_length {
            return Err(ConfigError::SegmentTooLong {
                field: "target_length",
                segment: self.segment_length,
                length: self.target_length,
            });
        }
        if let Some(root) = self.root_length {
            finite("root_length", root)?;
            if self.segment_length > root {
                return Err(ConfigError::SegmentTooLong {
                    field: "root_length",
                    segment: self.segment_length,
                    length: root,
                });
            }
        }
        if self.repulsion_weight < 0.0 {
            return Err(ConfigError::NegativeRepulsion(self.repulsion_weight));
        }
        if !(0.0..1.0).contains(&self.length_jitter) {
            return Err(ConfigError::JitterOutOfRange(self.length_jitter));
        }
        // Exact equality is not enough: tiny offsets underflow when squared.
        let offset = self.second_node - self.init_node;
        if !offset.length_squared().is_normal() || self.initial_direction() == Point3::ZERO {
            return Err(ConfigError::DegenerateDirection);
        }

        let bound = self.node_bound();
        if bound > MAX_NODES as f64 {
            return Err(ConfigError::TooManyNodes {
                bound,
                max: MAX_NODES,
            });
        }
        Ok(())
    }

    /// Upper bound on the number of nodes a run creates.
    ///
    /// Counts the initial node, the root's steps and, for every other
    /// branch, the steps of the longest length jitter can produce. Computed
    /// in `f64` so absurd ratios stay finite or become infinity instead of
    /// wrapping.
    pub fn node_bound(&self) -> f64 {
        let steps = |length: f64| (length / self.segment_length).ceil().max(1.0);
        let longest = (self.target_length * (1.0 + self.length_jitter)).max(self.segment_length);
        let branches = 2f64.powi(self.generations as i32 + 1) - 1.0;
        1.0 + steps(self.root_length()) + (branches - 1.0) * steps(longest)
    }

    /// Unit vector from `init_node` towards `second_node`.
    pub fn initial_direction(&self) -> Point3 {
        (self.second_node - self.init_node).normalize_or_zero()
    }

    /// Length the root branch grows to.
    pub fn root_length(&self) -> f64 {
        self.root_length.unwrap_or(self.target_length)
    }

    /// Radius of the repulsion neighborhood around a growing tip.
    pub fn repulsion_radius(&self) -> f64 {
        REPULSION_RADIUS_FACTOR * self.segment_length
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn finite_point(field: &'static str, p: Point3) -> Result<(), ConfigError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinitePoint { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GrowthParams {
        GrowthParams {
            generations: 2,
            target_length: 1.0,
            segment_length: 0.25,
            init_node: Point3::ZERO,
            second_node: Point3::X,
            ..GrowthParams::default()
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GrowthParams::default().validate(), Ok(()));
        assert_eq!(small().validate(), Ok(()));
    }

    #[test]
    fn coincident_anchors_are_rejected() {
        let mut p = small();
        p.second_node = p.init_node;
        assert_eq!(p.validate(), Err(ConfigError::DegenerateDirection));
    }

    #[test]
    fn segment_must_be_positive_and_not_longer_than_branch() {
        let mut p = small();
        p.segment_length = 0.0;
        assert_eq!(p.validate(), Err(ConfigError::NonPositiveSegment(0.0)));

        p.segment_length = -0.5;
        assert_eq!(p.validate(), Err(ConfigError::NonPositiveSegment(-0.5)));

        p.segment_length = 1.5;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::SegmentTooLong {
                field: "target_length",
                ..
            })
        ));

        // Equal lengths are allowed: one step per branch.
        p.segment_length = 1.0;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn root_length_is_checked_against_segment() {
        let mut p = small();
        p.root_length = Some(0.1);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::SegmentTooLong {
                field: "root_length",
                ..
            })
        ));

        p.root_length = Some(2.0);
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.root_length(), 2.0);
    }

    #[test]
    fn out_of_range_scalars_are_rejected() {
        let mut p = small();
        p.repulsion_weight = -0.1;
        assert_eq!(p.validate(), Err(ConfigError::NegativeRepulsion(-0.1)));

        let mut p = small();
        p.length_jitter = 1.0;
        assert_eq!(p.validate(), Err(ConfigError::JitterOutOfRange(1.0)));

        let mut p = small();
        p.generations = MAX_GENERATIONS + 1;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::TooManyGenerations { .. })
        ));

        let mut p = small();
        p.branch_angle = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NotFinite {
                field: "branch_angle",
                ..
            })
        ));

        let mut p = small();
        p.init_node = Point3::new(f64::INFINITY, 0.0, 0.0);
        assert_eq!(
            p.validate(),
            Err(ConfigError::NonFinitePoint { field: "init_node" })
        );
    }

    #[test]
    fn anchors_too_close_to_normalize_are_rejected() {
        let mut p = small();
        p.init_node = Point3::ZERO;
        p.second_node = Point3::new(1e-200, 0.0, 0.0);
        assert_eq!(p.validate(), Err(ConfigError::DegenerateDirection));

        p.second_node = Point3::new(1e200, 1e200, 0.0);
        assert_eq!(p.validate(), Err(ConfigError::DegenerateDirection));

        p.second_node = Point3::new(1e-6, 0.0, 0.0);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn runs_beyond_the_node_limit_are_rejected() {
        let mut p = small();
        p.segment_length = 1e-300;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::TooManyNodes { max: MAX_NODES, .. })
        ));

        // Twelve generations of four steps: 8191 branches.
        let mut p = small();
        p.generations = 12;
        assert_eq!(p.node_bound(), 1.0 + 8191.0 * 4.0);
        assert_eq!(p.validate(), Ok(()));

        // Jitter counts towards the bound.
        p.length_jitter = 0.5;
        assert_eq!(p.node_bound(), 1.0 + 4.0 + 8190.0 * 6.0);

        let mut p = small();
        p.generations = MAX_GENERATIONS;
        p.segment_length = 0.25;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::TooManyNodes { .. })
        ));
    }

    #[test]
    fn initial_direction_is_unit() {
        let mut p = small();
        p.second_node = Point3::new(0.0, 3.0, 4.0);
        let d = p.initial_direction();
        assert!((d.length() - 1.0).abs() < 1e-12);
        assert!((d - Point3::new(0.0, 0.6, 0.8)).length() < 1e-12);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let p: GrowthParams = serde_json::from_str(
            r#"{ "generations": 3, "init_node": [0, 0, 0], "second_node": [0, 0, 1],
                 "split_axis": "random" }"#,
        )
        .unwrap();

        assert_eq!(p.generations, 3);
        assert_eq!(p.second_node, Point3::Z);
        assert_eq!(p.split_axis, SplitAxis::Random);
        assert_eq!(p.segment_length, GrowthParams::default().segment_length);
    }
}
