//! Graph blocks and their type-specific payloads
//!
//! A block's `type` string is either a builtin tag (`basic.*`) or the
//! address of an entry in the project's dependency map. [`BlockKind`]
//! carries the strongly-typed payload for each case.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::DependencyId;
use crate::lenient;

/// Prefix shared by every builtin block type
pub const BUILTIN_PREFIX: &str = "basic.";

/// Builtin type tags with a dedicated payload
pub mod tags {
    /// FPGA input port
    pub const INPUT: &str = "basic.input";
    /// FPGA output port
    pub const OUTPUT: &str = "basic.output";
    /// Constant parameter
    pub const CONSTANT: &str = "basic.constant";
    /// Inline HDL code
    pub const CODE: &str = "basic.code";
    /// Free-form annotation
    pub const INFO: &str = "basic.info";
}

/// Whether a block type string names a builtin primitive
#[inline]
#[must_use]
pub fn is_builtin_type(block_type: &str) -> bool {
    block_type.starts_with(BUILTIN_PREFIX)
}

/// Block position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    #[serde(default)]
    pub x: f64,
    /// Vertical coordinate
    #[serde(default)]
    pub y: f64,
}

impl Position {
    /// Create a position
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One physical pin bound to an input/output block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pin {
    /// Bit index within the port
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub index: String,
    /// Board pin name
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub name: String,
    /// Board pin value
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub value: String,
}

/// Payload of `basic.input` / `basic.output`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IoData {
    /// Port label
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub name: String,
    /// Board pins wired to this port (instance detail)
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub pins: Option<Vec<Pin>>,
    /// Port not bound to a physical pin (instance detail)
    #[serde(
        rename = "virtual",
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_virtual: Option<bool>,
    /// Bus width, only kept when wider than one bit
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
    /// Fields this model does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `basic.constant`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstantData {
    /// Parameter label
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub name: String,
    /// Parameter value, kept verbatim
    #[serde(default)]
    pub value: Value,
    /// Local parameter (not exported to parent designs)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub local: bool,
    /// Fields this model does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named code parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeParam {
    /// Parameter name
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub name: String,
    /// Fields this model does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A code block port
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodePort {
    /// Port name
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub name: String,
    /// Editor-side default wiring, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Fields this model does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input and output ports of a code block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodePorts {
    /// Input ports
    #[serde(rename = "in", default, deserialize_with = "lenient::or_default")]
    pub inputs: Vec<CodePort>,
    /// Output ports
    #[serde(rename = "out", default, deserialize_with = "lenient::or_default")]
    pub outputs: Vec<CodePort>,
}

/// Payload of `basic.code`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeData {
    /// HDL source
    #[serde(default, deserialize_with = "lenient::stringish")]
    pub code: String,
    /// Module parameters
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub params: Vec<CodeParam>,
    /// Module ports
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub ports: CodePorts,
    /// Fields this model does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Block type with its typed payload
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// `basic.input`
    Input(IoData),
    /// `basic.output`
    Output(IoData),
    /// `basic.constant`
    Constant(ConstantData),
    /// `basic.code`
    Code(CodeData),
    /// `basic.info`
    Info(Option<Value>),
    /// Any other `basic.*` primitive, payload passed through
    Builtin {
        /// Full type tag
        tag: String,
        /// Raw payload
        data: Option<Value>,
    },
    /// Instance of a reusable dependency
    Dependency {
        /// Key into the dependency map
        id: DependencyId,
        /// Instance payload; the definition lives in the dependency map
        data: Option<Value>,
    },
}

impl BlockKind {
    /// Decode a kind from its wire `type` and `data`
    #[must_use]
    pub fn from_parts(block_type: &str, data: Option<Value>) -> Self {
        match block_type {
            tags::INPUT => Self::Input(lenient::payload(data)),
            tags::OUTPUT => Self::Output(lenient::payload(data)),
            tags::CONSTANT => Self::Constant(lenient::payload(data)),
            tags::CODE => Self::Code(lenient::payload(data)),
            tags::INFO => Self::Info(data),
            tag if is_builtin_type(tag) => Self::Builtin {
                tag: tag.to_string(),
                data,
            },
            other => Self::Dependency {
                id: DependencyId::new(other),
                data,
            },
        }
    }

    /// Encode back into wire `type` and `data`
    #[must_use]
    pub fn into_parts(self) -> (String, Option<Value>) {
        match self {
            Self::Input(io) => (tags::INPUT.to_string(), serde_json::to_value(io).ok()),
            Self::Output(io) => (tags::OUTPUT.to_string(), serde_json::to_value(io).ok()),
            Self::Constant(c) => (tags::CONSTANT.to_string(), serde_json::to_value(c).ok()),
            Self::Code(c) => (tags::CODE.to_string(), serde_json::to_value(c).ok()),
            Self::Info(data) => (tags::INFO.to_string(), data),
            Self::Builtin { tag, data } => (tag, data),
            Self::Dependency { id, data } => (id.into_string(), data),
        }
    }

    /// The wire `type` string
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Input(_) => tags::INPUT,
            Self::Output(_) => tags::OUTPUT,
            Self::Constant(_) => tags::CONSTANT,
            Self::Code(_) => tags::CODE,
            Self::Info(_) => tags::INFO,
            Self::Builtin { tag, .. } => tag,
            Self::Dependency { id, .. } => id.as_str(),
        }
    }

    /// Dependency referenced by this block, if any
    #[inline]
    #[must_use]
    pub fn dependency(&self) -> Option<&DependencyId> {
        match self {
            Self::Dependency { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// A node of the circuit graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    /// Editor cell id
    pub id: String,
    /// Type and payload
    pub kind: BlockKind,
    /// Canvas position
    pub position: Position,
    /// Fields this model does not interpret
    pub extra: Map<String, Value>,
}

impl Block {
    /// Create a block with no extra fields
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            extra: Map::new(),
        }
    }

    /// The wire `type` string
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }
}

/// Wire shape of a block
#[derive(Serialize, Deserialize)]
struct RawBlock {
    #[serde(default, deserialize_with = "lenient::stringish")]
    id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::stringish")]
    block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    position: Position,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Self {
            kind: BlockKind::from_parts(&raw.block_type, raw.data),
            id: raw.id,
            position: raw.position,
            extra: raw.extra,
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let (block_type, data) = block.kind.into_parts();
        Self {
            id: block.id,
            block_type,
            data,
            position: block.position,
            extra: block.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_builtin_payloads() {
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "type": "basic.input",
            "data": {"name": "clk", "pins": [{"index": "0", "name": "CLK", "value": "21"}], "virtual": false},
            "position": {"x": 10, "y": 20}
        }))
        .unwrap();

        let BlockKind::Input(io) = &block.kind else {
            panic!("expected input, got {:?}", block.kind);
        };
        assert_eq!(io.name, "clk");
        assert_eq!(io.pins.as_ref().map(Vec::len), Some(1));
        assert_eq!(io.is_virtual, Some(false));
        assert_eq!(block.position, Position::new(10.0, 20.0));
    }

    #[test]
    fn unknown_type_is_dependency_reference() {
        let block: Block = serde_json::from_value(json!({
            "id": "b2",
            "type": "5f0c...",
            "data": {"anything": true},
            "position": {"x": 0, "y": 0}
        }))
        .unwrap();

        assert_eq!(block.kind.dependency().map(DependencyId::as_str), Some("5f0c..."));
        assert_eq!(block.type_name(), "5f0c...");
    }

    #[test]
    fn other_builtins_pass_through() {
        let value = json!({
            "id": "m",
            "type": "basic.memory",
            "data": {"list": "0 1 2"},
            "position": {"x": 1.5, "y": 2.5},
            "size": {"width": 96, "height": 64}
        });
        let block: Block = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(block.kind, BlockKind::Builtin { .. }));
        assert_eq!(serde_json::to_value(&block).unwrap(), value);
    }

    #[test]
    fn malformed_payload_treated_as_absent() {
        let block: Block = serde_json::from_value(json!({
            "id": "c",
            "type": "basic.code",
            "data": {"code": "assign a = b;", "params": "oops", "ports": 3},
            "position": "nowhere"
        }))
        .unwrap();

        let BlockKind::Code(code) = &block.kind else {
            panic!("expected code block");
        };
        assert_eq!(code.code, "assign a = b;");
        assert!(code.params.is_empty());
        assert!(code.ports.inputs.is_empty());
        assert_eq!(block.position, Position::default());
    }

    #[test]
    fn code_port_default_round_trips_until_pruned() {
        let block: Block = serde_json::from_value(json!({
            "id": "c",
            "type": "basic.code",
            "data": {"code": "", "params": [], "ports": {"in": [{"name": "a", "default": {"apply": true}}], "out": []}},
            "position": {"x": 0, "y": 0}
        }))
        .unwrap();

        let out = serde_json::to_value(&block).unwrap();
        assert_eq!(out["data"]["ports"]["in"][0]["default"], json!({"apply": true}));
    }
}
