use ai_core::{AssetError, Blackboard, BlackboardAsset, Vector3};

#[test]
fn blackboard_asset_survives_a_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.blackboard.json");

    let mut bb = Blackboard::new();
    bb.set("hp", 42);
    bb.set("home", Vector3::new(1.0, 0.0, -1.0));
    bb.serialize().save(&path).unwrap();

    let loaded = Blackboard::from_asset(BlackboardAsset::load(&path).unwrap()).unwrap();
    assert_eq!(loaded.get::<i32>("hp").copied(), Ok(42));
    assert_eq!(
        loaded.get::<Vector3>("home").copied(),
        Ok(Vector3::new(1.0, 0.0, -1.0))
    );
}

#[test]
fn persisted_field_names_are_stable() {
    let mut bb = Blackboard::new();
    bb.set("flag", true);
    let json = serde_json::to_value(bb.serialize()).unwrap();

    assert_eq!(json["parameterNames"][0], "flag");
    assert_eq!(json["parameterTypes"][0], "Bool");
    assert_eq!(json["bools"][0], true);
}

#[test]
fn loading_a_missing_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    match BlackboardAsset::load(&path) {
        Err(AssetError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }
}
