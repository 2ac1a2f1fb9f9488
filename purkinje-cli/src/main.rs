//! Command-line entry point for fractal Purkinje network generation.
//!
//! Parses flags (and an optional JSON parameter file) into a
//! [`purkinje_core::GrowthParams`], grows the network and writes it as
//! plain-text node and connectivity files. Any missing or invalid input
//! exits non-zero before growth starts.

mod args;
mod output;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use purkinje_core::{BruteForceIndex, FractalTree};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

fn run(cli: &Cli) -> Result<String> {
    let params = cli.growth_params()?;
    info!(outfile = %cli.outfile.display(), "output prefix");
    info!(init_node = %params.init_node, second_node = %params.second_node, "anchor nodes");
    info!(
        generations = params.generations,
        target_length = params.target_length,
        segment_length = params.segment_length,
        branch_angle = params.branch_angle,
        repulsion_weight = params.repulsion_weight,
        "growth parameters"
    );

    let tree = FractalTree::new(params).context("invalid growth parameters")?;
    let network = if cli.brute_force {
        tree.grow_with::<BruteForceIndex>()
    } else {
        tree.grow()
    }
    .context("growth failed")?;

    info!("Number of nodes generated: {}", network.node_count());
    info!("Number of segments generated: {}", network.segment_count());

    let files = output::write_network(&network, &cli.outfile)?;
    info!(
        xyz = %files.xyz.display(),
        ien = %files.ien.display(),
        end_nodes = %files.end_nodes.display(),
        "network written"
    );

    Ok(format!(
        "Network: num_nodes={} num_segs={}",
        network.node_count(),
        network.segment_count()
    ))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let summary = run(&cli)?;
    println!("{summary}");
    Ok(())
}
