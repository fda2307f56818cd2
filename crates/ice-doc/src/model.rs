//! Project document model
//!
//! Mirrors the current (flat) schema:
//!
//! ```text
//! { version, package, design: { board, graph: { blocks, wires }, state }, dependencies }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::address::DependencyId;
use crate::block::{Block, BlockKind};

/// Schema tag written by this crate
pub const CURRENT_VERSION: &str = "1.1";

/// Dependency map, keyed by content address
pub type Dependencies = BTreeMap<DependencyId, Dependency>;

/// Free-form package metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub image: String,
}

/// Canvas pan offset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// Editor viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub pan: Pan,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Pan::default(),
            zoom: 1.0,
        }
    }
}

impl ViewState {
    /// Most decimal places rounding keeps
    pub const MAX_PRECISION: u32 = 15;

    /// Round pan and zoom to `decimals` places, at most [`Self::MAX_PRECISION`]
    #[must_use]
    pub fn rounded(self, decimals: u32) -> Self {
        let exponent = i32::try_from(decimals.min(Self::MAX_PRECISION)).unwrap_or(0);
        let scale = 10f64.powi(exponent);
        let round = |v: f64| {
            let scaled = v * scale;
            if scaled.is_finite() {
                scaled.round() / scale
            } else {
                v
            }
        };
        Self {
            pan: Pan {
                x: round(self.pan.x),
                y: round(self.pan.y),
            },
            zoom: round(self.zoom),
        }
    }
}

/// Link between two block ports, passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wire(pub Value);

/// Blocks and wires of one design
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl Graph {
    /// Dependency references made by this graph's blocks
    pub fn dependency_refs(&self) -> impl Iterator<Item = &DependencyId> {
        self.blocks.iter().filter_map(|b| b.kind.dependency())
    }

    /// Mutable dependency references made by this graph's blocks
    pub fn dependency_refs_mut(&mut self) -> impl Iterator<Item = &mut DependencyId> {
        self.blocks.iter_mut().filter_map(|b| match &mut b.kind {
            BlockKind::Dependency { id, .. } => Some(id),
            _ => None,
        })
    }
}

/// Board, graph and viewport
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Design {
    /// Target board; absent in dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    pub graph: Graph,
    #[serde(default)]
    pub state: ViewState,
}

/// A reusable sub-circuit: package and design, no nested dependencies
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub package: Package,
    pub design: Design,
}

/// Root document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub version: String,
    #[serde(default)]
    pub package: Package,
    pub design: Design,
    #[serde(default)]
    pub dependencies: Dependencies,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            package: Package::default(),
            design: Design {
                board: Some(String::new()),
                graph: Graph::default(),
                state: ViewState::default(),
            },
            dependencies: Dependencies::new(),
        }
    }
}

impl Project {
    /// Target board, empty when unset
    #[inline]
    #[must_use]
    pub fn board(&self) -> &str {
        self.design.board.as_deref().unwrap_or_default()
    }

    /// Split a block-as-file document into its own content and the
    /// dependencies it carries
    #[must_use]
    pub fn into_dependency(self) -> (Dependency, Dependencies) {
        let dependency = Dependency {
            package: self.package,
            design: self.design,
        };
        (dependency, self.dependencies)
    }

    /// First dependency reference, at any level, missing from the map
    #[must_use]
    pub fn first_unresolved(&self) -> Option<&DependencyId> {
        std::iter::once(&self.design.graph)
            .chain(self.dependencies.values().map(|d| &d.design.graph))
            .flat_map(Graph::dependency_refs)
            .find(|id| !self.dependencies.contains_key(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Position;
    use serde_json::json;

    #[test]
    fn default_project_shape() {
        let value = serde_json::to_value(Project::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.1",
                "package": {"name": "", "version": "", "description": "", "author": "", "image": ""},
                "design": {
                    "board": "",
                    "graph": {"blocks": [], "wires": []},
                    "state": {"pan": {"x": 0.0, "y": 0.0}, "zoom": 1.0}
                },
                "dependencies": {}
            })
        );
    }

    #[test]
    fn state_defaults_when_empty() {
        let design: Design = serde_json::from_value(json!({"graph": {}, "state": {}})).unwrap();
        assert_eq!(design.state, ViewState::default());
        assert!(design.board.is_none());
    }

    #[test]
    fn missing_graph_is_an_error() {
        let result = serde_json::from_value::<Design>(json!({"board": "icezum"}));
        assert!(result.is_err());
    }

    #[test]
    fn rounding_to_four_decimals() {
        let state = ViewState {
            pan: Pan {
                x: 12.345_678,
                y: -0.000_04,
            },
            zoom: 0.666_666_6,
        };
        let rounded = state.rounded(4);
        assert_eq!(rounded.pan.x, 12.3457);
        assert_eq!(rounded.pan.y, 0.0);
        assert_eq!(rounded.zoom, 0.6667);
    }

    #[test]
    fn huge_precision_stays_finite() {
        let state = ViewState {
            pan: Pan {
                x: 12.345_678,
                y: 1e300,
            },
            zoom: 0.5,
        };
        for decimals in [ViewState::MAX_PRECISION, 400, u32::MAX] {
            let rounded = state.rounded(decimals);
            assert!(rounded.pan.x.is_finite() && rounded.pan.y.is_finite());
            assert!((rounded.pan.x - 12.345_678).abs() < 1e-9);
            assert_eq!(rounded.pan.y, 1e300);
            assert_eq!(rounded.zoom, 0.5);

            let json = serde_json::to_string(&rounded).unwrap();
            assert!(!json.contains("null"));
            assert!(serde_json::from_str::<ViewState>(&json).is_ok());
        }
    }

    #[test]
    fn unresolved_reference_detected_in_dependencies() {
        let mut project = Project::default();
        let mut inner = Dependency::default();
        inner.design.graph.blocks.push(Block::new(
            "x",
            BlockKind::Dependency {
                id: DependencyId::new("missing"),
                data: None,
            },
            Position::default(),
        ));
        project.dependencies.insert(DependencyId::new("present"), inner);
        project.design.graph.blocks.push(Block::new(
            "y",
            BlockKind::Dependency {
                id: DependencyId::new("present"),
                data: None,
            },
            Position::default(),
        ));

        assert_eq!(
            project.first_unresolved().map(DependencyId::as_str),
            Some("missing")
        );
    }

    #[test]
    fn nested_dependencies_are_not_representable() {
        let dep: Dependency = serde_json::from_value(json!({
            "package": {"name": "x"},
            "design": {"graph": {"blocks": [], "wires": []}},
            "dependencies": {"k": {}}
        }))
        .unwrap();
        let out = serde_json::to_value(dep).unwrap();
        assert!(out.get("dependencies").is_none());
    }
}
