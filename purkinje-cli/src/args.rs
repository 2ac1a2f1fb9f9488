//! Command-line flags and their translation into [`GrowthParams`].

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum, ValueHint};
use glam::DVec3;
use purkinje_core::{GrowthParams, SplitAxis};
use std::{fs, path::PathBuf};

/// Generate a fractal Purkinje fiber network.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Output file prefix; writes `<prefix>_xyz.txt`, `<prefix>_ien.txt`
    /// and `<prefix>_endnodes.txt`
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub outfile: PathBuf,

    /// JSON parameter file; flags override its values
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub params: Option<PathBuf>,

    /// Initial node, e.g. "-1 0 0" or "[-1, 0, 0]"
    #[arg(long, alias = "init_node", allow_hyphen_values = true, value_parser = parse_point)]
    pub init_node: Option<DVec3>,

    /// Second node fixing the initial direction
    #[arg(long, alias = "second_node", allow_hyphen_values = true, value_parser = parse_point)]
    pub second_node: Option<DVec3>,

    /// Number of branch generations
    #[arg(long, alias = "num_branch_gen")]
    pub num_branch_gen: Option<u32>,

    /// Average branch length
    #[arg(long, alias = "avg_branch_length")]
    pub avg_branch_length: Option<f64>,

    /// Branch angle in radians
    #[arg(long, alias = "branch_angle")]
    pub branch_angle: Option<f64>,

    /// Repulsion weight between branches
    #[arg(long, alias = "repulsive_parameter")]
    pub repulsive_parameter: Option<f64>,

    /// Length of one growth segment
    #[arg(long, alias = "branch_seg_length")]
    pub branch_seg_length: Option<f64>,

    /// Length of the root branch (defaults to the average branch length)
    #[arg(long)]
    pub root_length: Option<f64>,

    /// Relative uniform jitter of branch lengths, in [0, 1)
    #[arg(long)]
    pub length_jitter: Option<f64>,

    /// Rotation axis policy at splits
    #[arg(long, value_enum)]
    pub split_axis: Option<AxisArg>,

    /// Seed for random split axes and length jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the linear-scan index instead of the grid
    #[arg(long)]
    pub brute_force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    Planar,
    Random,
}

impl From<AxisArg> for SplitAxis {
    fn from(a: AxisArg) -> Self {
        match a {
            AxisArg::Planar => SplitAxis::Planar,
            AxisArg::Random => SplitAxis::Random,
        }
    }
}

impl Cli {
    /// Builds the parameter record: defaults, then the parameter file, then
    /// flags.
    ///
    /// Without a parameter file both anchor nodes must be given as flags.
    pub fn growth_params(&self) -> Result<GrowthParams> {
        let mut p = match &self.params {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading parameter file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing parameter file {}", path.display()))?
            }
            None => {
                if self.init_node.is_none() {
                    bail!("no initial node given");
                }
                if self.second_node.is_none() {
                    bail!("no second node given");
                }
                GrowthParams::default()
            }
        };

        if let Some(v) = self.init_node {
            p.init_node = v;
        }
        if let Some(v) = self.second_node {
            p.second_node = v;
        }
        if let Some(v) = self.num_branch_gen {
            p.generations = v;
        }
        if let Some(v) = self.avg_branch_length {
            p.target_length = v;
        }
        if let Some(v) = self.branch_angle {
            p.branch_angle = v;
        }
        if let Some(v) = self.repulsive_parameter {
            p.repulsion_weight = v;
        }
        if let Some(v) = self.branch_seg_length {
            p.segment_length = v;
        }
        if self.root_length.is_some() {
            p.root_length = self.root_length;
        }
        if let Some(v) = self.length_jitter {
            p.length_jitter = v;
        }
        if let Some(v) = self.split_axis {
            p.split_axis = v.into();
        }
        if let Some(v) = self.seed {
            p.seed = v;
        }
        Ok(p)
    }
}

/// Parses three numbers separated by commas and/or whitespace, optionally
/// wrapped in brackets.
pub fn parse_point(s: &str) -> Result<DVec3, String> {
    let inner = s
        .trim()
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')']);
    let values = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f64>().map_err(|e| format!("invalid number {t:?}: {e}")))
        .collect::<Result<Vec<f64>, String>>()?;

    match values.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        other => Err(format!("expected 3 coordinates, got {}", other.len())),
    }
}
