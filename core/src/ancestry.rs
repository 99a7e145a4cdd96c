//! Text rendering of a hole's merger history.

use crate::{
    black_hole::BlackHole,
    cluster::GlobularCluster,
    error::SimResult,
    types::HoleId,
};
use std::fmt::Write;

/// Attributes that can be shown for each node of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleField {
    Label,
    Mass,
    Spin,
    Speed,
    Time,
    MassRatio,
}

impl HoleField {
    fn render(&self, hole: &BlackHole) -> String {
        match self {
            Self::Label => hole.label.clone(),
            Self::Mass => format!("m={:.2}", hole.mass),
            Self::Spin => format!("chi={:.3}", hole.spin_magnitude),
            Self::Speed => format!("v={:.2}", hole.speed()),
            Self::Time => format!("t={:.3e}", hole.time),
            Self::MassRatio => match hole.mass_ratio {
                Some(q) => format!("q={q:.2}"),
                None => "q=-".to_string(),
            },
        }
    }
}

/// Indented tree of `root` and all its ancestors, parents heaviest first.
pub fn render_tree(
    cluster: &GlobularCluster,
    root: HoleId,
    fields: &[HoleField],
) -> SimResult<String> {
    let mut out = String::new();
    // Explicit stack: deep hierarchies would overflow a recursive walk.
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let hole = cluster.hole(id)?;
        let line: Vec<String> = fields.iter().map(|f| f.render(hole)).collect();
        let _ = writeln!(out, "{}{}", "    ".repeat(depth), line.join(" "));

        if let Some((a, b)) = hole.parents {
            let (pa, pb) = (cluster.hole(a)?, cluster.hole(b)?);
            let (heavy, light) = if pa.mass >= pb.mass { (a, b) } else { (b, a) };
            // Pushed light first so the heavy parent is printed first.
            stack.push((light, depth + 1));
            stack.push((heavy, depth + 1));
        }
    }
    Ok(out)
}

/// Number of merger generations below `root` (0 for a primordial hole).
pub fn generation(cluster: &GlobularCluster, root: HoleId) -> SimResult<usize> {
    let mut deepest = 0;
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        if let Some((a, b)) = cluster.hole(id)?.parents {
            stack.push((a, depth + 1));
            stack.push((b, depth + 1));
        }
    }
    Ok(deepest)
}

/// Primordial holes that ended up inside `root`.
pub fn primordial_ancestors(cluster: &GlobularCluster, root: HoleId) -> SimResult<Vec<HoleId>> {
    let mut leaves = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        match cluster.hole(id)?.parents {
            Some((a, b)) => {
                stack.push(b);
                stack.push(a);
            }
            None => leaves.push(id),
        }
    }
    Ok(leaves)
}
