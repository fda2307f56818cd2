//! Dependency flattening
//!
//! Turns the arbitrarily nested `deps` of a 1.0 document into a single,
//! deduplicated map keyed by content address.
//!
//! # Algorithm
//!
//! Two passes, each over an explicit stack:
//!
//! 1. Collect. The nested `deps` are walked depth-first, post-order. A legacy
//!    key is taken at most once: the first occurrence in post-order wins and
//!    later entries with the same key are dropped, not merged, together with
//!    their subtree.
//! 2. Address. Collected keys are addressed in collection order. Block types
//!    resolve against the complete key set, so an entry may use a sibling
//!    collected after it; such a key is addressed on demand first. The types
//!    of an entry's blocks are rewritten to addresses before the entry is
//!    canonicalized and addressed, which keeps stored keys stable under
//!    re-addressing.
//!
//! Entries that canonicalize to the same content share one address; the
//! first writer stays in the map.

use std::collections::HashSet;

use ice_doc::{Addressed, Dependencies, DependencyId, Graph};
use indexmap::IndexMap;

use crate::error::{MigrationError, Result};
use crate::legacy::LegacyProject;

/// Legacy key -> content address
pub type Rewrites = IndexMap<String, DependencyId>;

/// Output of [`flatten`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    /// Flat dependency map
    pub dependencies: Dependencies,
    /// Address assigned to every legacy key, in resolution order
    pub rewrites: Rewrites,
}

enum Visit<'a> {
    Enter(&'a str, &'a LegacyProject),
    Exit(&'a str, &'a LegacyProject),
}

enum Resolve<'a> {
    Enter(&'a str),
    Exit(&'a str),
}

/// Flatten nested legacy dependencies
///
/// # Errors
/// Returns [`MigrationError::UnresolvedReference`] when a block inside a
/// dependency names a type that is neither builtin nor a legacy key of the
/// document, or when legacy keys reference each other in a cycle.
pub fn flatten(deps: &IndexMap<String, LegacyProject>) -> Result<Flattened> {
    let collected = collect(deps);
    let mut out = Flattened::default();
    let mut active: HashSet<&str> = HashSet::new();

    for &root in collected.keys() {
        let mut stack = vec![Resolve::Enter(root)];
        while let Some(step) = stack.pop() {
            match step {
                Resolve::Enter(key) => {
                    if out.rewrites.contains_key(key) {
                        continue;
                    }
                    if !active.insert(key) {
                        tracing::debug!(key, "legacy keys reference each other in a cycle");
                        return Err(MigrationError::unresolved(key));
                    }
                    stack.push(Resolve::Exit(key));
                    for id in collected[key].design.graph.dependency_refs() {
                        let (&child, _) = collected
                            .get_key_value(id.as_str())
                            .ok_or_else(|| MigrationError::unresolved(id.as_str()))?;
                        if !out.rewrites.contains_key(child) {
                            stack.push(Resolve::Enter(child));
                        }
                    }
                }
                Resolve::Exit(key) => {
                    active.remove(key);
                    let mut content = collected[key].to_dependency(key);
                    rewrite_graph(&mut content.design.graph, &out.rewrites)?;

                    let (id, content) = Addressed::new(&content).into_parts();
                    if out.dependencies.contains_key(&id) {
                        tracing::debug!(key, %id, "legacy key deduplicated by content");
                    } else {
                        out.dependencies.insert(id.clone(), content);
                    }
                    out.rewrites.insert(key.to_string(), id);
                }
            }
        }
    }

    tracing::debug!(
        legacy_keys = out.rewrites.len(),
        dependencies = out.dependencies.len(),
        "flattened legacy dependencies"
    );
    Ok(out)
}

/// First-seen entry for every legacy key, in post-order
fn collect(deps: &IndexMap<String, LegacyProject>) -> IndexMap<&str, &LegacyProject> {
    let mut collected = IndexMap::new();
    let mut stack: Vec<Visit<'_>> = deps
        .iter()
        .rev()
        .map(|(key, dep)| Visit::Enter(key, dep))
        .collect();

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(key, dep) => {
                if collected.contains_key(key) {
                    tracing::debug!(key, "legacy key already collected, skipping duplicate");
                    continue;
                }
                stack.push(Visit::Exit(key, dep));
                stack.extend(
                    dep.design
                        .deps
                        .iter()
                        .rev()
                        .map(|(key, dep)| Visit::Enter(key, dep)),
                );
            }
            // Same key nested inside itself: the inner one was collected first
            Visit::Exit(key, dep) => {
                collected.entry(key).or_insert(dep);
            }
        }
    }
    collected
}

/// Point every dependency block of `graph` at its content address
///
/// # Errors
/// Returns [`MigrationError::UnresolvedReference`] for a type missing from
/// `rewrites`.
pub fn rewrite_graph(graph: &mut Graph, rewrites: &Rewrites) -> Result<()> {
    for id in graph.dependency_refs_mut() {
        let target = rewrites
            .get(id.as_str())
            .ok_or_else(|| MigrationError::unresolved(id.as_str()))?;
        *id = target.clone();
    }
    Ok(())
}
