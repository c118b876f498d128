use std::path::PathBuf;

use nexus_tree::{DependsOn, GroupTree, OpKind};

fn example_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/transformation_example.json")
}

fn example_tree() -> GroupTree {
    GroupTree::from_path(example_path(), "process").unwrap()
}

#[test]
fn reads_all_transformation_nodes() {
    let tree = example_tree();
    // 3 manipulator + 2 analyser + 7 sample + 1 calibration ops, 4 components
    assert_eq!(tree.len(), 17);
}

#[test]
fn finds_components_as_targets() {
    let tree = example_tree();
    let mut names: Vec<_> = tree.targets().map(|n| n.display_name().to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "instrument/electronanalyser",
            "instrument/manipulator",
            "process/calibration",
            "sample",
        ]
    );
}

#[test]
fn links_relative_sibling_references() {
    let tree = example_tree();
    let rot_z = tree
        .get("/entry/instrument/manipulator/transformations/rot_z")
        .unwrap();
    assert_eq!(
        rot_z.depends_on,
        DependsOn::Path("/entry/instrument/manipulator/transformations/rot_x".into())
    );
}

#[test]
fn links_root_relative_reference() {
    let tree = example_tree();
    let trans_x = tree.get("/entry/sample/transformations/trans_x").unwrap();
    assert_eq!(
        trans_x.depends_on,
        DependsOn::Path("/entry/instrument/manipulator/transformations/trans_z".into())
    );
}

#[test]
fn keeps_units_as_written() {
    let tree = example_tree();
    let shift = &tree
        .get("/entry/process/calibration/transformations/shift")
        .unwrap()
        .ops[0];
    assert_eq!(shift.kind, OpKind::Translation);
    assert_eq!(shift.unit, "cm");
    assert_eq!(shift.magnitude, 1.0);
}

#[test]
fn scan_field_reduces_to_first_point() {
    let tree = example_tree();
    let omg = &tree.get("/entry/sample/transformations/rot_omg").unwrap().ops[0];
    assert_eq!(omg.magnitude, 131.7);
}

#[test]
fn flags_process_nodes() {
    let tree = example_tree();
    let process: Vec<_> = tree
        .iter()
        .filter(|n| n.in_process)
        .map(|n| n.path.as_str())
        .collect();
    assert_eq!(
        process,
        vec![
            "/entry/process/calibration",
            "/entry/process/calibration/transformations/shift",
        ]
    );
}

#[test]
fn missing_file_is_io_error() {
    let err = GroupTree::from_path("does/not/exist.json", "process").unwrap_err();
    assert!(matches!(err, nexus_tree::TreeError::Io { .. }));
}
