//! Icestudio Project Documents
//!
//! Typed model of a circuit project and the canonical, content-addressed
//! form of its reusable blocks.
//!
//! # Core Concepts
//!
//! - [`Project`]: root document (package, design, flat dependency map)
//! - [`Block`] / [`BlockKind`]: graph nodes with a typed payload per builtin
//! - [`canonicalize`]: strips instance detail from a reusable block
//! - [`Addressed`] / [`DependencyId`]: content address of a canonical block
//!
//! # Example
//!
//! ```rust
//! use ice_doc::{Addressed, Dependency};
//!
//! let dep = Dependency::default();
//! let addressed = Addressed::new(&dep);
//! assert!(addressed.verify());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod address;
mod block;
mod canonical;
mod hash;
mod lenient;
mod model;

// Re-exports
pub use address::{address_of, canonical_json, Addressed, DependencyId, ADDRESS_SCHEME};
pub use block::{
    is_builtin_type, tags, Block, BlockKind, CodeData, CodeParam, CodePort, CodePorts,
    ConstantData, IoData, Pin, Position, BUILTIN_PREFIX,
};
pub use canonical::{canonicalize, canonicalize_block, canonicalize_in_place};
pub use hash::{ContentHash, HashError};
pub use model::{
    Dependencies, Dependency, Design, Graph, Package, Pan, Project, ViewState, Wire,
    CURRENT_VERSION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
