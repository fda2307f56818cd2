//! Schema version detection

use ice_doc::CURRENT_VERSION;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Tag of the nested-dependency schema
pub const LEGACY_VERSION: &str = "1.0";

/// Schema a raw document was written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Flat dependency map, content-addressed
    Current,
    /// Dependencies nested under `design.deps`
    V1_0,
    /// Anything else, including a missing or non-string tag
    Unknown(Option<String>),
}

impl SchemaVersion {
    /// Read the top-level `version` field of a raw document
    #[must_use]
    pub fn detect(raw: &Value) -> Self {
        match raw.get("version").and_then(Value::as_str) {
            Some(CURRENT_VERSION) => Self::Current,
            Some(LEGACY_VERSION) => Self::V1_0,
            Some(other) => Self::Unknown(Some(other.to_string())),
            None => Self::Unknown(None),
        }
    }

    /// Tag as written in the document, if any
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Current => Some(CURRENT_VERSION),
            Self::V1_0 => Some(LEGACY_VERSION),
            Self::Unknown(tag) => tag.as_deref(),
        }
    }

    /// Whether the document needs migrating
    #[inline]
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current)
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("unversioned"))
    }
}

/// Non-fatal notice that a document was written in another schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMismatch {
    /// Version found in the document
    pub found: SchemaVersion,
    /// Version the caller expected
    pub expected: String,
}

impl VersionMismatch {
    /// Compare a document's version with the expected tag
    #[must_use]
    pub fn check(found: &SchemaVersion, expected: &str) -> Option<Self> {
        (found.tag() != Some(expected)).then(|| Self {
            found: found.clone(),
            expected: expected.to_string(),
        })
    }
}

impl Display for VersionMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "old project format {}", self.found)
    }
}
