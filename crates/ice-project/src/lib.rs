//! Icestudio Project Store
//!
//! Owns the live project of an editing session and moves it between the
//! document file, the graph editor and the code generator.
//!
//! # Operations
//!
//! - [`ProjectStore::load`] / [`ProjectStore::open`]: parse, migrate, report
//!   version and board mismatches
//! - [`ProjectStore::open_in`]: hand the project to the editor, optionally
//!   converting its board
//! - [`ProjectStore::update`] / [`ProjectStore::save`]: fold editor state
//!   back in and serialize a pruned, position-ordered copy
//! - [`ProjectStore::add_block`] / [`ProjectStore::import_block`]: insert a
//!   block file as a content-addressed dependency
//!
//! Collaborators live behind the traits in [`GraphEditor`],
//! [`CodeGenerator`], [`BoardRegistry`] and [`Storage`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod collab;
mod config;
mod decision;
mod error;
mod fs;
mod import;
mod prune;
mod store;

// Re-exports
pub use collab::{
    BoardRegistry, CodeGenerator, GenerateOptions, GraphEditor, LiveSnapshot, LoadOptions,
    Storage,
};
pub use config::StoreConfig;
pub use decision::{Decision, Prompt};
pub use error::{ProjectError, ResourceCopyError, Result};
pub use fs::FsStorage;
pub use import::{copy_included_files, find_included_files, CopyReport, ImportOutcome};
pub use prune::{prune_for_save, sort_blocks};
pub use store::{LoadDisposition, LoadReport, ProjectStore, SharedStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
