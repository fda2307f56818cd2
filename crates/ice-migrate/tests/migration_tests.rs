use ice_doc::{is_builtin_type, BlockKind, DependencyId, Project};
use ice_migrate::{migrate, parse_document, upgrade_payloads, MigrationError, SchemaVersion};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn and2_document() -> Value {
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

/// Reusable block holding one constant, identical wherever it appears
fn shared_leaf() -> Value {
    json!({
        "package": {"name": "leaf", "description": "shared leaf"},
        "design": {"graph": {"blocks": [{
            "id": "k", "type": "basic.constant",
            "data": {"name": "K", "value": "7", "local": false},
            "position": {"x": 0, "y": 0}
        }], "wires": []}}
    })
}

fn wrapper(child_key: &str) -> Value {
    json!({
        "design": {
            "graph": {"blocks": [{"id": "w", "type": child_key, "position": {"x": 0, "y": 0}}], "wires": []},
            "deps": { child_key: shared_leaf() }
        }
    })
}

fn assert_references_resolve(project: &Project) {
    let graphs = std::iter::once(&project.design.graph)
        .chain(project.dependencies.values().map(|d| &d.design.graph));
    for graph in graphs {
        for block in &graph.blocks {
            let ty = block.type_name();
            assert!(
                is_builtin_type(ty) || project.dependencies.keys().any(|k| k.as_str() == ty),
                "dangling type {ty}"
            );
        }
    }
}

#[test]
fn test_and2_document_migrates() {
    let migration = migrate(and2_document(), "top").unwrap();
    assert_eq!(migration.from, SchemaVersion::V1_0);

    let project = migration.project;
    assert_eq!(project.version, "1.1");
    assert_eq!(project.board(), "icezum");
    assert_eq!(project.dependencies.len(), 1);

    let (address, dep) = project.dependencies.iter().next().unwrap();
    assert_eq!(address.as_str().len(), 64);
    assert_eq!(project.design.graph.blocks[0].type_name(), address.as_str());
    assert_eq!(dep.package.name, "and2");
    assert_eq!(dep.package.description, "and2");

    let BlockKind::Input(io) = &dep.design.graph.blocks[0].kind else {
        panic!("input block expected");
    };
    assert_eq!(io.name, "a");
    // Pin assignments are instance detail and do not survive into the
    // addressed dependency
    assert_eq!(io.pins, None);
    assert_eq!(io.size, None);
}

#[test]
fn test_and2_payload_upgraded_to_pin_list() {
    let mut raw = and2_document();
    upgrade_payloads(&mut raw);
    let data = &raw["design"]["deps"]["and2"]["design"]["graph"]["blocks"][0]["data"];
    assert_eq!(data["name"], "a");
    assert_eq!(data["pins"], json!([{"index": "0", "name": "A", "value": "0"}]));
}

#[test]
fn test_shared_sub_block_deduplicated() {
    let raw = json!({
        "version": "1.0",
        "package": {"name": "top"},
        "design": {
            "board": "icestick",
            "graph": {"blocks": [
                {"id": "x", "type": "left", "position": {"x": 0, "y": 0}},
                {"id": "y", "type": "right", "position": {"x": 10, "y": 0}}
            ], "wires": []},
            "deps": {
                "left": wrapper("leafA"),
                "right": wrapper("leafB")
            }
        }
    });

    let project = migrate(raw, "top").unwrap().project;
    // leaf once, plus the two distinct wrappers
    assert_eq!(project.dependencies.len(), 3);

    let left = project.design.graph.blocks[0].kind.dependency().unwrap();
    let right = project.design.graph.blocks[1].kind.dependency().unwrap();
    assert_ne!(left, right);

    let leaf_of = |id: &DependencyId| project.dependencies[id].design.graph.blocks[0].kind.dependency().cloned();
    let leaf = leaf_of(left).unwrap();
    assert_eq!(leaf_of(right), Some(leaf.clone()));
    assert_eq!(project.dependencies[&leaf].package.name, "leaf");
    assert_references_resolve(&project);
}

#[test]
fn test_current_document_is_unchanged() {
    let legacy = migrate(and2_document(), "top").unwrap().project;
    let raw = serde_json::to_value(&legacy).unwrap();

    let again = migrate(raw, "top").unwrap();
    assert_eq!(again.from, SchemaVersion::Current);
    assert!(!again.was_migrated());
    assert_eq!(again.project, legacy);
}

#[test]
fn test_dangling_type_rejected() {
    let mut raw = and2_document();
    raw["design"]["graph"]["blocks"][0]["type"] = json!("or2");

    let err = migrate(raw, "top").unwrap_err();
    assert!(matches!(err, MigrationError::UnresolvedReference { ref block_type } if block_type == "or2"));
    assert!(err.is_wrong_format());
}

#[test]
fn test_dependency_may_use_later_sibling() {
    let raw = json!({
        "version": "1.0",
        "package": {"name": "top"},
        "design": {
            "board": "icezum",
            "graph": {"blocks": [{"id": "t", "type": "a", "position": {"x": 0, "y": 0}}], "wires": []},
            "deps": {
                "a": {"design": {"graph": {"blocks": [
                    {"id": "u", "type": "b", "position": {"x": 0, "y": 0}}
                ], "wires": []}}},
                "b": shared_leaf()
            }
        }
    });

    let project = migrate(raw, "top").unwrap().project;
    assert_eq!(project.dependencies.len(), 2);
    assert_references_resolve(&project);

    let top_type = DependencyId::new(project.design.graph.blocks[0].type_name());
    let a = &project.dependencies[&top_type];
    let b_id = DependencyId::new(a.design.graph.blocks[0].type_name());
    assert_eq!(project.dependencies[&b_id].package.name, "leaf");
}

#[test]
fn test_pre_1_0_document_from_bytes() {
    let bytes = br#"{
        "board": "icestick",
        "graph": {
            "blocks": [
                {"id": "i", "type": "basic.input", "data": {"label": "btn", "pin": {"name": "SW1", "value": "10"}}, "position": {"x": 0, "y": 0}},
                {"id": "g", "type": "inv", "position": {"x": 100, "y": 0}}
            ],
            "wires": [{"source": {"block": "i", "port": "out"}, "target": {"block": "g", "port": "a"}}]
        },
        "deps": {
            "inv": {
                "graph": {"blocks": [
                    {"id": "a", "type": "basic.input", "data": {"label": "a"}, "position": {"x": 0, "y": 0}},
                    {"id": "c", "type": "basic.code", "data": {"code": "assign o = ~a;", "params": [], "ports": {"in": ["a"], "out": ["o"]}}, "position": {"x": 50, "y": 0}}
                ], "wires": []},
                "deps": {}
            }
        }
    }"#;

    let raw = parse_document(bytes).unwrap();
    let migration = migrate(raw, "button").unwrap();
    assert_eq!(migration.from, SchemaVersion::Unknown(None));

    let project = migration.project;
    assert_eq!(project.package.name, "button");
    assert_eq!(project.design.graph.wires.len(), 1);

    let BlockKind::Input(io) = &project.design.graph.blocks[0].kind else {
        panic!("input block expected");
    };
    assert_eq!(io.name, "btn");
    assert_eq!(io.pins.as_ref().map(|p| p[0].name.as_str()), Some("SW1"));

    let inv = project.dependencies.values().next().unwrap();
    let BlockKind::Code(code) = &inv.design.graph.blocks[1].kind else {
        panic!("code block expected");
    };
    assert_eq!(code.ports.inputs[0].name, "a");
    assert_eq!(code.ports.outputs[0].name, "o");
    assert_references_resolve(&project);
}

proptest! {
    #[test]
    fn prop_dedup_independent_of_legacy_keys(
        keys in proptest::collection::btree_set("[a-z]{1,8}", 2..6)
    ) {
        let deps: serde_json::Map<String, Value> =
            keys.iter().map(|k| (k.clone(), shared_leaf())).collect();
        let blocks: Vec<Value> = keys
            .iter()
            .map(|k| json!({"id": k, "type": k, "position": {"x": 0, "y": 0}}))
            .collect();
        let raw = json!({
            "version": "1.0",
            "design": {"board": "", "graph": {"blocks": blocks, "wires": []}, "deps": deps}
        });

        let project = migrate(raw, "p").unwrap().project;
        prop_assert_eq!(project.dependencies.len(), 1);
        let first = project.design.graph.blocks[0].type_name().to_string();
        for block in &project.design.graph.blocks {
            prop_assert_eq!(block.type_name(), first.as_str());
        }
    }
}
