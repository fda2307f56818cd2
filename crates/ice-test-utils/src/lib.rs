//! Testing utilities for the Icestudio project workspace
//!
//! Shared document fixtures and in-memory stand-ins for the collaborators
//! of [`ice_project::ProjectStore`].

#![allow(missing_docs)]

use ice_doc::{
    Block, BlockKind, Dependencies, Dependency, DependencyId, Design, Graph, Position,
    Project, ViewState,
};
use ice_project::{
    BoardRegistry, CodeGenerator, GenerateOptions, GraphEditor, LiveSnapshot, LoadOptions, Storage,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn to_bytes(doc: &Value) -> Vec<u8> {
    serde_json::to_vec(doc).unwrap()
}

/// Current-schema project: two inputs feeding an `and2` instance
/// driving an output, plus a constant and a code block
pub fn current_document() -> Value {
    let and2 = json!({
        "package": {"name": "and2", "version": "1.0", "description": "AND gate", "author": "", "image": ""},
        "design": {
            "graph": {
                "blocks": [
                    {"id": "a", "type": "basic.input", "data": {"name": "a"}, "position": {"x": 0, "y": 0}},
                    {"id": "b", "type": "basic.input", "data": {"name": "b"}, "position": {"x": 0, "y": 100}},
                    {"id": "o", "type": "basic.output", "data": {"name": "o"}, "position": {"x": 400, "y": 50}},
                    {"id": "c", "type": "basic.code", "data": {
                        "code": "assign o = a & b;",
                        "params": [],
                        "ports": {"in": [{"name": "a"}, {"name": "b"}], "out": [{"name": "o"}]}
                    }, "position": {"x": 200, "y": 50}}
                ],
                "wires": [
                    {"source": {"block": "a", "port": "out"}, "target": {"block": "c", "port": "a"}},
                    {"source": {"block": "b", "port": "out"}, "target": {"block": "c", "port": "b"}},
                    {"source": {"block": "c", "port": "o"}, "target": {"block": "o", "port": "in"}}
                ]
            },
            "state": {"pan": {"x": 0, "y": 0}, "zoom": 1}
        }
    });
    let id = ice_doc::Addressed::new(&serde_json::from_value::<Dependency>(and2.clone()).unwrap())
        .id()
        .to_string();

    json!({
        "version": "1.1",
        "package": {"name": "blink", "version": "1.0", "description": "Blink a LED", "author": "Jane", "image": ""},
        "design": {
            "board": "icestick",
            "graph": {
                "blocks": [
                    {"id": "sw1", "type": "basic.input", "data": {"name": "sw1", "pins": [{"index": "0", "name": "SW1", "value": "10"}], "virtual": false}, "position": {"x": 50, "y": 80}},
                    {"id": "sw2", "type": "basic.input", "data": {"name": "sw2", "pins": [{"index": "0", "name": "SW2", "value": "11"}], "virtual": false}, "position": {"x": 50, "y": 200}},
                    {"id": "gate", "type": id, "position": {"x": 250, "y": 140}},
                    {"id": "led", "type": "basic.output", "data": {"name": "led", "pins": [{"index": "0", "name": "LED0", "value": "99"}], "virtual": false}, "position": {"x": 450, "y": 140}},
                    {"id": "k", "type": "basic.constant", "data": {"name": "N", "value": "4", "local": false}, "position": {"x": 250, "y": 0}},
                    {"id": "note", "type": "basic.info", "data": {"info": "two switches, one LED"}, "position": {"x": 0, "y": 300}}
                ],
                "wires": [
                    {"source": {"block": "sw1", "port": "out"}, "target": {"block": "gate", "port": "a"}},
                    {"source": {"block": "sw2", "port": "out"}, "target": {"block": "gate", "port": "b"}},
                    {"source": {"block": "gate", "port": "o"}, "target": {"block": "led", "port": "in"}}
                ]
            },
            "state": {"pan": {"x": 12.5, "y": -3.25}, "zoom": 0.75}
        },
        "dependencies": { id: and2 }
    })
}

/// 1.0 document: one `and2` instance whose definition holds a pre-1.0
/// input payload
pub fn legacy_document() -> Value {
    json!({
        "version": "1.0",
        "package": {"name": "top", "version": "", "description": "", "author": "", "image": ""},
        "design": {
            "board": "icezum",
            "graph": {
                "blocks": [{"id": "g1", "type": "and2", "position": {"x": 100, "y": 200}}],
                "wires": []
            },
            "deps": {
                "and2": {
                    "package": {},
                    "design": {
                        "board": "",
                        "graph": {"blocks": [{
                            "id": "in",
                            "type": "basic.input",
                            "data": {"label": "a", "pin": {"name": "A", "value": "0"}},
                            "position": {"x": 0, "y": 0}
                        }]},
                        "deps": {},
                        "state": {}
                    }
                }
            },
            "state": {"pan": {"x": 0, "y": 0}, "zoom": 1}
        }
    })
}

/// Unversioned document from before packages and 1.0 payloads
pub fn pre_1_0_document() -> Value {
    json!({
        "board": "icestick",
        "graph": {
            "blocks": [
                {"id": "i", "type": "basic.input", "data": {"label": "btn", "pin": {"name": "SW1", "value": "10"}}, "position": {"x": 0, "y": 0}},
                {"id": "g", "type": "inv", "position": {"x": 100, "y": 0}},
                {"id": "o", "type": "basic.output", "data": {"label": "led", "pin": {"name": "LED0", "value": "99"}}, "position": {"x": 200, "y": 0}}
            ],
            "wires": [
                {"source": {"block": "i", "port": "out"}, "target": {"block": "g", "port": "a"}},
                {"source": {"block": "g", "port": "o"}, "target": {"block": "o", "port": "in"}}
            ]
        },
        "deps": {
            "inv": {
                "graph": {"blocks": [
                    {"id": "a", "type": "basic.input", "data": {"label": "a"}, "position": {"x": 0, "y": 0}},
                    {"id": "c", "type": "basic.code", "data": {"code": "assign o = ~a;", "params": [], "ports": {"in": ["a"], "out": ["o"]}}, "position": {"x": 50, "y": 0}},
                    {"id": "o", "type": "basic.output", "data": {"label": "o"}, "position": {"x": 100, "y": 0}}
                ], "wires": []},
                "deps": {}
            }
        }
    })
}

/// Current-schema block file whose code includes auxiliary files
pub fn block_with_includes(code: &str) -> Value {
    json!({
        "version": "1.1",
        "package": {"name": "rom", "version": "", "description": "ROM", "author": "", "image": ""},
        "design": {
            "board": "icestick",
            "graph": {"blocks": [{
                "id": "c", "type": "basic.code",
                "data": {"code": code, "params": [], "ports": {"in": [{"name": "addr"}], "out": [{"name": "data"}]}},
                "position": {"x": 0, "y": 0}
            }], "wires": []}
        },
        "dependencies": {}
    })
}

/// In-memory graph editor
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    pub board: String,
    pub graph: Graph,
    pub dependencies: Dependencies,
    pub state: ViewState,
    /// Refuse every design passed to `load_design`
    pub reject_designs: bool,
    pub loads: Vec<LoadOptions>,
    pub created: Vec<DependencyId>,
    pub clears: usize,
    pub command_resets: usize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject_designs: true,
            ..Self::default()
        }
    }
}

impl GraphEditor for MemoryGraph {
    fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            board: self.board.clone(),
            graph: self.graph.clone(),
            dependencies: self.dependencies.clone(),
        }
    }

    fn view_state(&self) -> ViewState {
        self.state
    }

    fn set_view_state(&mut self, state: ViewState) {
        self.state = state;
    }

    fn load_design(
        &mut self,
        design: &Design,
        dependencies: &Dependencies,
        options: LoadOptions,
    ) -> bool {
        if self.reject_designs {
            return false;
        }
        self.board = design.board.clone().unwrap_or_default();
        self.graph = design.graph.clone();
        self.dependencies = dependencies.clone();
        self.loads.push(options);
        true
    }

    fn clear_all(&mut self) {
        self.graph = Graph::default();
        self.dependencies.clear();
        self.clears += 1;
    }

    fn reset_command_stack(&mut self) {
        self.command_resets += 1;
    }

    fn create_block(&mut self, id: &DependencyId, content: &Dependency) {
        let cell = format!("cell-{}", self.graph.blocks.len());
        self.graph.blocks.push(Block::new(
            cell,
            BlockKind::from_parts(id.as_str(), None),
            Position::default(),
        ));
        self.dependencies
            .entry(id.clone())
            .or_insert_with(|| content.clone());
        self.created.push(id.clone());
    }
}

/// In-memory file tree
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.lock().insert(path.into(), bytes.into());
        self
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().get(path.as_ref()).cloned()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.file(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files.lock().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let bytes = self.read(from)?;
        self.write(to, &bytes)
    }
}

/// Generator that emits the code of every code block it finds
#[derive(Debug, Clone, Default)]
pub struct FakeGenerator {
    pub fail: bool,
}

impl FakeGenerator {
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl CodeGenerator for FakeGenerator {
    type Error = String;

    fn generate(
        &self,
        target: &str,
        project: &Project,
        options: &GenerateOptions,
    ) -> Result<String, Self::Error> {
        if self.fail {
            return Err("generator unavailable".to_string());
        }
        let mut out = format!("// {target} for {}\n", project.package.name);
        let graphs = std::iter::once(&project.design.graph)
            .chain(project.dependencies.values().map(|d| &d.design.graph));
        for block in graphs.flat_map(|g| &g.blocks) {
            if let BlockKind::Code(code) = &block.kind {
                out.push_str(&code.code);
                out.push('\n');
            }
        }
        if options.board_rules {
            out.push_str("// board rules\n");
        }
        Ok(out)
    }
}

/// Fixed board list
#[derive(Debug, Clone, Default)]
pub struct StaticBoards(pub Vec<(String, String)>);

impl StaticBoards {
    pub fn new(boards: &[(&str, &str)]) -> Self {
        Self(
            boards
                .iter()
                .map(|(id, label)| ((*id).to_string(), (*label).to_string()))
                .collect(),
        )
    }
}

impl BoardRegistry for StaticBoards {
    fn label(&self, board: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(id, _)| id == board)
            .map(|(_, label)| label.clone())
    }
}

/// Number of blocks of `tag` in the top-level graph
pub fn count_blocks(project: &Project, tag: &str) -> usize {
    project
        .design
        .graph
        .blocks
        .iter()
        .filter(|b| b.type_name() == tag)
        .count()
}
