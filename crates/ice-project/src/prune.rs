//! Save-time ordering and pruning
//!
//! Saving is lighter than canonicalization: pin assignments and other
//! per-instance payloads stay, only what the editor can rebuild is dropped.

use ice_doc::{Block, BlockKind, Graph, Project};
use std::cmp::Ordering;

/// Order blocks by position for diff-friendly output
///
/// Two stable passes: by `x`, then by `y`. The result is ordered by `y`,
/// with equal `y` kept in `x` order and full ties kept in original order.
pub fn sort_blocks(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| by_coordinate(a.position.x, b.position.x));
    blocks.sort_by(|a, b| by_coordinate(a.position.y, b.position.y));
}

fn by_coordinate(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Copy of `project` as written to disk
#[must_use]
pub fn prune_for_save(project: &Project) -> Project {
    let mut pruned = project.clone();
    prune_graph(&mut pruned.design.graph);
    for dependency in pruned.dependencies.values_mut() {
        prune_graph(&mut dependency.design.graph);
    }
    pruned
}

fn prune_graph(graph: &mut Graph) {
    for block in &mut graph.blocks {
        prune_block(block);
    }
}

fn prune_block(block: &mut Block) {
    match &mut block.kind {
        BlockKind::Code(code) => {
            for port in &mut code.ports.inputs {
                port.default = None;
            }
        }
        BlockKind::Dependency { data, .. } => *data = None,
        BlockKind::Input(_)
        | BlockKind::Output(_)
        | BlockKind::Constant(_)
        | BlockKind::Info(_)
        | BlockKind::Builtin { .. } => {}
    }
}
