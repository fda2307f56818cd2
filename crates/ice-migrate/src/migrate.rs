//! Version migration
//!
//! A one-way state machine over schema tags:
//!
//! ```text
//! Unknown --convert_to_legacy--> V1_0 --flatten--> Current
//! ```
//!
//! Every path ends with a reference check, so a migrated [`Project`] never
//! names a dependency it does not carry.

use ice_doc::{Design, Project, CURRENT_VERSION};
use serde_json::Value;

use crate::error::{MigrationError, Result};
use crate::flatten::{flatten, rewrite_graph};
use crate::legacy::{convert_to_legacy, upgrade_payloads, LegacyProject};
use crate::version::SchemaVersion;

/// A successfully migrated document
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// Document in the current schema
    pub project: Project,
    /// Schema the input was written in
    pub from: SchemaVersion,
}

impl Migration {
    /// Whether any transition ran
    #[inline]
    #[must_use]
    pub fn was_migrated(&self) -> bool {
        !self.from.is_current()
    }
}

enum Stage {
    Unknown(Value),
    V1_0(Value),
    Current(Project),
}

/// Parse raw document bytes
///
/// # Errors
/// Returns [`MigrationError::Structure`] when the bytes are not JSON.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Migrate a raw document to the current schema
///
/// `name` names the document when a pre-1.0 file carries no package.
///
/// # Errors
/// - [`MigrationError::Malformed`] when a graph is missing
/// - [`MigrationError::Structure`] when the document does not decode
/// - [`MigrationError::UnresolvedReference`] for a dangling block type
pub fn migrate(raw: Value, name: &str) -> Result<Migration> {
    let from = SchemaVersion::detect(&raw);
    let mut stage = match from {
        SchemaVersion::Current => Stage::Current(decode_current(raw)?),
        SchemaVersion::V1_0 => Stage::V1_0(raw),
        SchemaVersion::Unknown(_) => Stage::Unknown(raw),
    };

    let project = loop {
        stage = match stage {
            Stage::Unknown(raw) => {
                tracing::debug!(name, %from, "converting to the 1.0 layout");
                Stage::V1_0(convert_to_legacy(raw, name)?)
            }
            Stage::V1_0(raw) => {
                tracing::debug!(name, "flattening 1.0 dependencies");
                Stage::Current(convert_v1_0(raw)?)
            }
            Stage::Current(project) => break project,
        };
    };

    if let Some(id) = project.first_unresolved() {
        return Err(MigrationError::unresolved(id.as_str()));
    }
    Ok(Migration { project, from })
}

fn decode_current(raw: Value) -> Result<Project> {
    require_graph(&raw)?;
    let project: Project = serde_json::from_value(raw)?;

    let foreign = project
        .dependencies
        .keys()
        .filter(|id| !id.is_content_address())
        .count();
    if foreign > 0 {
        tracing::debug!(foreign, "dependencies keyed outside the address scheme, kept as is");
    }
    Ok(project)
}

fn convert_v1_0(mut raw: Value) -> Result<Project> {
    require_graph(&raw)?;
    upgrade_payloads(&mut raw);
    let legacy: LegacyProject = serde_json::from_value(raw)?;

    let flat = flatten(&legacy.design.deps)?;
    let mut graph = legacy.design.graph;
    rewrite_graph(&mut graph, &flat.rewrites)?;

    Ok(Project {
        version: CURRENT_VERSION.to_string(),
        package: legacy.package,
        design: Design {
            board: Some(legacy.design.board.unwrap_or_default()),
            graph,
            state: legacy.design.state,
        },
        dependencies: flat.dependencies,
    })
}

fn require_graph(raw: &Value) -> Result<()> {
    match raw.pointer("/design/graph") {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(MigrationError::malformed("design has no graph")),
    }
}
