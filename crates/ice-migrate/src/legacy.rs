//! Legacy document shapes
//!
//! Two generations predate the flat schema:
//!
//! ```text
//! pre-1.0: { graph, deps: { <name>: <pre-1.0 doc> }, board, state }
//! 1.0:     { version: "1.0", package, design: { board, graph, deps: { <name>: <1.0 doc> }, state } }
//! ```
//!
//! Pre-1.0 documents are reshaped into 1.0 on the raw JSON tree
//! ([`convert_to_legacy`]); 1.0 documents then decode into [`LegacyProject`].

use ice_doc::{tags, Dependency, Design, Graph, Package, ViewState};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{MigrationError, Result};
use crate::version::LEGACY_VERSION;

/// A 1.0 document or nested dependency
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyProject {
    #[serde(default)]
    pub package: Package,
    pub design: LegacyDesign,
}

/// Design of a 1.0 document, dependencies nested under `deps`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyDesign {
    #[serde(default)]
    pub board: Option<String>,
    pub graph: Graph,
    /// Nested dependencies in document order, keyed by legacy name
    #[serde(default)]
    pub deps: IndexMap<String, LegacyProject>,
    #[serde(default)]
    pub state: ViewState,
}

impl LegacyProject {
    /// Own content as a dependency, named after its legacy key when the
    /// package carries no name or description
    #[must_use]
    pub fn to_dependency(&self, key: &str) -> Dependency {
        let mut package = self.package.clone();
        if package.name.is_empty() {
            package.name = key.to_string();
        }
        if package.description.is_empty() {
            package.description = key.to_string();
        }
        Dependency {
            package,
            design: Design {
                board: None,
                graph: self.design.graph.clone(),
                state: self.design.state,
            },
        }
    }
}

/// Reshape a pre-1.0 document into the 1.0 layout
///
/// `name` becomes the package name and description; nested `deps` are
/// converted the same way, each named after its key.
///
/// # Errors
/// Returns [`MigrationError::Malformed`] when the document (or a nested
/// dependency) is not an object or has no `graph`.
pub fn convert_to_legacy(raw: Value, name: &str) -> Result<Value> {
    let Value::Object(mut doc) = raw else {
        return Err(MigrationError::malformed(format!(
            "document '{name}' is not an object"
        )));
    };

    let mut graph = doc
        .remove("graph")
        .filter(Value::is_object)
        .ok_or_else(|| MigrationError::malformed(format!("document '{name}' has no graph")))?;
    upgrade_graph_payloads(&mut graph);

    let mut deps = Map::new();
    if let Some(Value::Object(nested)) = doc.remove("deps") {
        for (key, dep) in nested {
            let converted = convert_to_legacy(dep, &key)?;
            deps.insert(key, converted);
        }
    }

    Ok(json!({
        "version": LEGACY_VERSION,
        "package": {
            "name": name,
            "version": "",
            "description": name,
            "author": "",
            "image": ""
        },
        "design": {
            "board": doc.remove("board").unwrap_or_else(|| json!("")),
            "graph": graph,
            "deps": deps,
            "state": doc.remove("state").unwrap_or_else(|| json!({}))
        }
    }))
}

/// Upgrade pre-1.0 block payloads found anywhere in a 1.0 document
///
/// Shape-aware: payloads already in the 1.0 layout are left untouched.
pub fn upgrade_payloads(doc: &mut Value) {
    let mut stack = vec![doc];
    while let Some(node) = stack.pop() {
        let Some(design) = node.get_mut("design").and_then(Value::as_object_mut) else {
            continue;
        };
        if let Some(graph) = design.get_mut("graph") {
            upgrade_graph_payloads(graph);
        }
        if let Some(deps) = design.get_mut("deps").and_then(Value::as_object_mut) {
            stack.extend(deps.values_mut());
        }
    }
}

fn upgrade_graph_payloads(graph: &mut Value) {
    let Some(blocks) = graph.get_mut("blocks").and_then(Value::as_array_mut) else {
        return;
    };
    for block in blocks {
        upgrade_block_payload(block);
    }
}

/// Rewrite one block's `data` from the pre-1.0 to the 1.0 layout
pub fn upgrade_block_payload(block: &mut Value) {
    let Some(block_type) = block.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return;
    };
    let Some(Value::Object(data)) = block.get_mut("data") else {
        return;
    };

    match block_type.as_str() {
        tags::INPUT | tags::OUTPUT if !data.contains_key("name") && !data.contains_key("pins") => {
            let pin = data.get("pin").and_then(Value::as_object);
            let pin_name = pin.and_then(|p| p.get("name")).cloned();
            let pin_value = pin.and_then(|p| p.get("value")).cloned();
            *data = json_object(json!({
                "name": data.get("label").cloned().unwrap_or_else(|| json!("")),
                "pins": [{
                    "index": "0",
                    "name": pin_name.unwrap_or_else(|| json!("")),
                    "value": pin_value.unwrap_or_else(|| json!("0"))
                }],
                "virtual": false
            }));
        }
        tags::CONSTANT if !data.contains_key("name") => {
            *data = json_object(json!({
                "name": data.get("label").cloned().unwrap_or_else(|| json!("")),
                "value": data.get("value").cloned().unwrap_or(Value::Null),
                "local": false
            }));
        }
        tags::CODE => {
            if let Some(params) = data.get_mut("params").and_then(Value::as_array_mut) {
                name_items(params);
            }
            if let Some(ports) = data.get_mut("ports").and_then(Value::as_object_mut) {
                for side in ["in", "out"] {
                    if let Some(items) = ports.get_mut(side).and_then(Value::as_array_mut) {
                        name_items(items);
                    }
                }
            }
        }
        _ => {}
    }
}

/// `["a", {"name": "b"}]` -> `[{"name": "a"}, {"name": "b"}]`
fn name_items(items: &mut [Value]) {
    for item in items {
        if let Value::String(name) = item {
            *item = json!({ "name": std::mem::take(name) });
        }
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
