//! Plain-text persistence of a grown [`Network`].
//!
//! Three files share a prefix:
//! - `<prefix>_xyz.txt` — one `x y z` row per node, in id order.
//! - `<prefix>_ien.txt` — one `tail head` row per segment.
//! - `<prefix>_endnodes.txt` — one node id per leaf tip.

use anyhow::{Context, Result};
use purkinje_core::Network;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Paths written by [`write_network`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub xyz: PathBuf,
    pub ien: PathBuf,
    pub end_nodes: PathBuf,
}

impl OutputFiles {
    pub fn from_prefix(prefix: &Path) -> Self {
        let with = |suffix: &str| {
            let mut s = prefix.as_os_str().to_owned();
            s.push(suffix);
            PathBuf::from(s)
        };
        Self {
            xyz: with("_xyz.txt"),
            ien: with("_ien.txt"),
            end_nodes: with("_endnodes.txt"),
        }
    }
}

/// Writes the node table, connectivity list and leaf tips of `net`.
pub fn write_network(net: &Network, prefix: &Path) -> Result<OutputFiles> {
    let files = OutputFiles::from_prefix(prefix);

    write_rows(&files.xyz, net.nodes(), |w, p| {
        writeln!(w, "{} {} {}", p.x, p.y, p.z)
    })?;
    write_rows(&files.ien, net.segments(), |w, s| {
        writeln!(w, "{} {}", s.tail, s.head)
    })?;
    write_rows(&files.end_nodes, &net.end_nodes(), |w, id| writeln!(w, "{id}"))?;

    Ok(files)
}

fn write_rows<T>(
    path: &Path,
    rows: &[T],
    mut row: impl FnMut(&mut BufWriter<File>, &T) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for r in rows {
        row(&mut w, r).with_context(|| format!("writing {}", path.display()))?;
    }
    w.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use purkinje_core::{GrowthParams, Point3, generate};
    use std::fs;

    #[test]
    fn prefix_gets_suffixes() {
        let files = OutputFiles::from_prefix(Path::new("/tmp/net/run1"));
        assert_eq!(files.xyz, PathBuf::from("/tmp/net/run1_xyz.txt"));
        assert_eq!(files.ien, PathBuf::from("/tmp/net/run1_ien.txt"));
        assert_eq!(files.end_nodes, PathBuf::from("/tmp/net/run1_endnodes.txt"));
    }

    #[test]
    fn written_files_mirror_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let params = GrowthParams {
            generations: 2,
            target_length: 1.0,
            segment_length: 0.5,
            init_node: Point3::ZERO,
            second_node: Point3::Z,
            ..GrowthParams::default()
        };
        let net = generate(&params).unwrap();

        let files = write_network(&net, &dir.path().join("tree")).unwrap();

        let xyz = fs::read_to_string(&files.xyz).unwrap();
        assert_eq!(xyz.lines().count(), net.node_count());
        let first: Vec<f64> = xyz
            .lines()
            .next()
            .unwrap()
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(first, vec![0.0, 0.0, 0.0]);

        let ien = fs::read_to_string(&files.ien).unwrap();
        assert_eq!(ien.lines().count(), net.segment_count());
        assert_eq!(ien.lines().next(), Some("0 1"));

        let ends = fs::read_to_string(&files.end_nodes).unwrap();
        let ends: Vec<usize> = ends.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(ends, net.end_nodes());
        assert_eq!(ends.len(), 4);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let net = Network::default();
        let err = write_network(&net, &dir.path().join("nope").join("tree")).unwrap_err();
        assert!(err.to_string().contains("creating"));
    }
}
