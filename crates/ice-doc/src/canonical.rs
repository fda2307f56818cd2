//! Canonical form of reusable blocks
//!
//! Strips everything that belongs to one instance of a block rather than to
//! its definition, so structurally equal definitions serialize identically:
//!
//! - the target board (a dependency is board independent),
//! - FPGA pin assignments and the virtual flag of input/output ports (a
//!   multi-pin port keeps its width as `size`),
//! - instance payloads of nested dependency blocks.
//!
//! The document `version` has no place in [`Dependency`] and is dropped when
//! a document is turned into one.
//!
//! Canonicalization is total and idempotent; malformed payloads were already
//! defaulted at decode time.

use crate::block::{Block, BlockKind, IoData};
use crate::model::Dependency;

/// Canonical copy of a dependency
#[must_use]
pub fn canonicalize(dependency: &Dependency) -> Dependency {
    let mut canonical = dependency.clone();
    canonicalize_in_place(&mut canonical);
    canonical
}

/// Canonicalize a dependency in place
pub fn canonicalize_in_place(dependency: &mut Dependency) {
    dependency.design.board = None;
    for block in &mut dependency.design.graph.blocks {
        canonicalize_block(block);
    }
}

/// Canonicalize a single block instance
pub fn canonicalize_block(block: &mut Block) {
    match &mut block.kind {
        BlockKind::Input(io) | BlockKind::Output(io) => strip_pins(io),
        BlockKind::Dependency { data, .. } => *data = None,
        BlockKind::Constant(_)
        | BlockKind::Code(_)
        | BlockKind::Info(_)
        | BlockKind::Builtin { .. } => {}
    }
}

fn strip_pins(io: &mut IoData) {
    if io.size.is_none() {
        io.size = io
            .pins
            .as_ref()
            .map(Vec::len)
            .filter(|&n| n > 1)
            .and_then(|n| u64::try_from(n).ok());
    }
    io.pins = None;
    io.is_virtual = None;
}
