//! Error types for document migration
//!
//! Every variant makes the document unloadable; callers report them as a
//! wrong project format and keep their current project untouched.

/// Errors during migration to the current schema
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A block type names neither a builtin nor a known dependency
    #[error("unresolved block reference: '{block_type}'")]
    UnresolvedReference {
        /// The offending `type` string
        block_type: String,
    },

    /// Required structure is missing and cannot be defaulted
    #[error("malformed document: {reason}")]
    Malformed {
        /// What is missing
        reason: String,
    },

    /// Document does not decode into the expected shape
    #[error("invalid document structure: {0}")]
    Structure(#[from] serde_json::Error),
}

impl MigrationError {
    /// Create unresolved reference error
    pub fn unresolved(block_type: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            block_type: block_type.into(),
        }
    }

    /// Create malformed document error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether the shell reports this as a wrong project format rather
    /// than an unreadable file
    #[must_use]
    pub fn is_wrong_format(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. } | Self::Structure(_))
    }

    /// Offending block type, for unresolved references
    #[must_use]
    pub fn block_type(&self) -> Option<&str> {
        match self {
            Self::UnresolvedReference { block_type } => Some(block_type),
            _ => None,
        }
    }
}

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;
