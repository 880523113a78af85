use std::fs;

use ai_bt::{BehaviorConfig, BehaviorRegistry, BehaviorTreeAsset, Comparison, NodeId};
use ai_bt_compiler::{compile, compile_str, compile_with, CompileError, CompileOptions};
use ai_core::Value;

const PATROL: &str = r#"<?xml version="1.0"?>
<BehaviorTree>
  <Selector>
    <Sequence>
      <Check key="alarm" type="bool" value="true"/>
      <Log msg="fleeing" level="warn"/>
      <WaitFor key="safe"/>
    </Sequence>
    <Inverter>
      <Fail/>
    </Inverter>
    <Sequence>
      <Increment key="steps"/>
      <Wait ticks="3"/>
    </Sequence>
  </Selector>
</BehaviorTree>
"#;

fn strict() -> CompileOptions {
    CompileOptions {
        strict_attributes: true,
    }
}

#[test]
fn compiled_tables_satisfy_tree_invariants() {
    let asset = compile_str(PATROL, &BehaviorRegistry::builtin(), CompileOptions::default()).unwrap();

    assert_eq!(asset.len(), 10);
    assert_eq!(asset.parents[0], None);
    for id in 1..asset.len() {
        let parent = asset.parents[id].expect("non-root has a parent");
        assert!(parent.index() < id);
        assert!(asset.children[parent.index()].contains(&NodeId(id as u32)));
    }
    assert_eq!(asset.validate(), Ok(()));
}

#[test]
fn attributes_configure_behaviors() {
    let asset = compile_str(PATROL, &BehaviorRegistry::builtin(), strict()).unwrap();

    assert_eq!(
        asset.behaviors[2],
        BehaviorConfig::Check {
            key: "alarm".to_string(),
            op: Comparison::Eq,
            value: Value::Bool(true),
        }
    );
    assert_eq!(
        asset.behaviors[8],
        BehaviorConfig::Increment {
            key: "steps".to_string(),
            by: 1,
        }
    );
    assert_eq!(asset.behaviors[9], BehaviorConfig::Wait { ticks: 3 });
}

#[test]
fn recompiling_writes_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("patrol.xml");
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    fs::write(&script, PATROL).unwrap();

    compile(&script, &first).unwrap();
    compile(&script, &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    let loaded = BehaviorTreeAsset::load(&first).unwrap();
    assert_eq!(loaded.len(), 10);
}

#[test]
fn failed_compile_leaves_existing_asset_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("tree.xml");
    let asset = dir.path().join("tree.json");

    fs::write(&script, PATROL).unwrap();
    compile(&script, &asset).unwrap();
    let before = fs::read(&asset).unwrap();

    fs::write(&script, "<BehaviorTree><Sequence><Dance/></Sequence></BehaviorTree>").unwrap();
    let err = compile(&script, &asset).unwrap_err();

    assert!(matches!(err, CompileError::UnknownBehaviorType { ref tag, .. } if tag == "Dance"));
    assert_eq!(fs::read(&asset).unwrap(), before);
}

#[test]
fn failed_compile_writes_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("tree.xml");
    let asset = dir.path().join("tree.json");
    fs::write(&script, "<BehaviorTree><Sequence>").unwrap();

    assert!(matches!(
        compile(&script, &asset),
        Err(CompileError::MalformedDocument(_))
    ));
    assert!(!asset.exists());
}

#[test]
fn missing_script_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile(&dir.path().join("nope.xml"), &dir.path().join("out.json")).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
}

#[test]
fn wrapper_must_hold_exactly_one_root() {
    let registry = BehaviorRegistry::builtin();
    for source in [
        "<BehaviorTree/>",
        "<BehaviorTree><Succeed/><Fail/></BehaviorTree>",
    ] {
        assert!(matches!(
            compile_str(source, &registry, CompileOptions::default()),
            Err(CompileError::MalformedDocument(_))
        ));
    }
}

#[test]
fn invalid_attribute_reports_its_path() {
    let err = compile_str(
        "<BehaviorTree><Sequence><Succeed/><Wait ticks=\"soon\"/></Sequence></BehaviorTree>",
        &BehaviorRegistry::builtin(),
        CompileOptions::default(),
    )
    .unwrap_err();

    match err {
        CompileError::InvalidAttribute { path, .. } => assert_eq!(path, "/Sequence/Wait[1]"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_attributes_warn_unless_strict() {
    let source = r#"<BehaviorTree><Log msg="hi" colour="red"/></BehaviorTree>"#;
    let registry = BehaviorRegistry::builtin();

    assert!(compile_str(source, &registry, CompileOptions::default()).is_ok());
    assert!(matches!(
        compile_str(source, &registry, strict()),
        Err(CompileError::UnknownAttribute { ref name, .. }) if name == "colour"
    ));
}

#[test]
fn child_counts_are_enforced() {
    let registry = BehaviorRegistry::builtin();

    let err = compile_str(
        "<BehaviorTree><Inverter><Succeed/><Fail/></Inverter></BehaviorTree>",
        &registry,
        CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::InvalidChildCount { found: 2, .. }));

    let err = compile_str(
        "<BehaviorTree><Wait ticks=\"1\"><Succeed/></Wait></BehaviorTree>",
        &registry,
        CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::InvalidChildCount { found: 1, .. }));
}

#[test]
fn custom_registry_entries_are_compiled() {
    let mut registry = BehaviorRegistry::builtin();
    registry.register("Fallback", |_| Ok(BehaviorConfig::Selector));

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("tree.xml");
    let asset_path = dir.path().join("tree.json");
    fs::write(&script, "<BehaviorTree><Fallback><Fail/><Succeed/></Fallback></BehaviorTree>").unwrap();

    let asset = compile_with(&script, &asset_path, &registry, CompileOptions::default()).unwrap();
    assert_eq!(asset.behaviors[0], BehaviorConfig::Selector);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&asset_path).unwrap()).unwrap();
    assert_eq!(json["parentsTable"], serde_json::json!([null, 0, 0]));
}

#[test]
fn deep_scripts_compile_without_recursion() {
    let depth = 20_000;
    let mut source = String::from("<BehaviorTree>");
    for _ in 0..depth {
        source.push_str("<AlwaysSucceed>");
    }
    source.push_str("<Succeed/>");
    for _ in 0..depth {
        source.push_str("</AlwaysSucceed>");
    }
    source.push_str("</BehaviorTree>");

    let asset = compile_str(&source, &BehaviorRegistry::builtin(), CompileOptions::default()).unwrap();

    assert_eq!(asset.len(), depth + 1);
    assert_eq!(asset.behaviors[depth], BehaviorConfig::Succeed);
    assert_eq!(asset.parents[depth], Some(NodeId(depth as u32 - 1)));
    assert_eq!(asset.validate(), Ok(()));
}

#[test]
fn unbalanced_markup_is_malformed() {
    let registry = BehaviorRegistry::builtin();
    for source in [
        "<BehaviorTree><Sequence><Succeed/></Selector></BehaviorTree>",
        "<BehaviorTree><Succeed/></BehaviorTree><BehaviorTree/>",
        "<BehaviorTree><Succeed/></BehaviorTree>trailing",
        "",
    ] {
        assert!(
            matches!(
                compile_str(source, &registry, CompileOptions::default()),
                Err(CompileError::MalformedDocument(_))
            ),
            "{source:?}"
        );
    }
}
