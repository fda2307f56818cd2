//! Error types for the project store
//!
//! [`ProjectError`] aborts an operation and leaves the live project as it
//! was. [`ResourceCopyError`] only describes one auxiliary file that could
//! not be copied during a block import; it is collected, never raised.

use ice_migrate::MigrationError;
use std::path::PathBuf;

/// Errors from store operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Document could not be brought to the current schema
    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Live project could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Storage access failed
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The graph editor refused to load the design
    #[error("wrong project format: {name}")]
    Rejected { name: String },

    /// Board conversion requested for a board the registry does not know
    #[error("unknown board: '{0}'")]
    UnknownBoard(String),

    /// Code generation failed
    #[error("code generation failed: {0}")]
    Generation(String),
}

impl ProjectError {
    /// Create an I/O error for `path`
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether the shell should report "wrong project format"
    #[must_use]
    pub fn is_wrong_format(&self) -> bool {
        match self {
            Self::Migration(err) => err.is_wrong_format(),
            Self::Rejected { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, ProjectError>;

/// An auxiliary file of an imported block that was not copied
#[derive(Debug, thiserror::Error)]
#[error("cannot copy {file} from {}: {reason}", source_path.display())]
pub struct ResourceCopyError {
    /// File name as referenced by the block's code
    pub file: String,
    /// Where it was looked up
    pub source_path: PathBuf,
    /// Underlying failure
    pub reason: std::io::Error,
}
