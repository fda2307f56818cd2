//! Icestudio Document Migration
//!
//! Brings documents of any known schema to the current, flat,
//! content-addressed layout.
//!
//! # Schemas
//!
//! - **current** (`1.1`): flat `dependencies` map keyed by content address
//! - **1.0**: dependencies nested under `design.deps`, keyed by name
//! - **pre-1.0**: no package, bare `graph`/`deps` and older block payloads
//!
//! # Example
//!
//! ```rust
//! use ice_migrate::{migrate, SchemaVersion};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "version": "1.0",
//!     "package": {"name": "blink"},
//!     "design": {"board": "icestick", "graph": {"blocks": [], "wires": []}, "deps": {}}
//! });
//! let migration = migrate(raw, "blink").unwrap();
//! assert_eq!(migration.from, SchemaVersion::V1_0);
//! assert_eq!(migration.project.version, "1.1");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod flatten;
mod legacy;
mod migrate;
mod version;

// Re-exports
pub use error::{MigrationError, Result};
pub use flatten::{flatten, rewrite_graph, Flattened, Rewrites};
pub use legacy::{
    convert_to_legacy, upgrade_block_payload, upgrade_payloads, LegacyDesign, LegacyProject,
};
pub use migrate::{migrate, parse_document, Migration};
pub use version::{SchemaVersion, VersionMismatch, LEGACY_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
