//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

/// Build command for the sketchnet-cli binary (finds it in target/debug when run via cargo test).
fn sketchnet_cli() -> Command {
    cargo_bin_cmd!("sketchnet-cli")
}

/// Path to sketchnet library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("sketchnet")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = sketchnet_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Netlist"));
}

#[test]
fn test_cli_version() {
    let mut cmd = sketchnet_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_graph_series_pair() {
    let mut cmd = sketchnet_cli();
    let path = fixtures_dir().join("series_pair.json");

    cmd.arg("graph").arg(path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Components: 2"))
        .stdout(predicate::str::contains("junctions: 0"));
}

#[test]
fn test_cli_graph_json_names() {
    let mut cmd = sketchnet_cli();
    let path = fixtures_dir().join("tee_network.json");

    cmd.arg("graph")
        .arg(path)
        .arg("--format")
        .arg("json")
        .arg("--names");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"R3\""))
        .stdout(predicate::str::contains("node0"));
}

#[test]
fn test_cli_normalize_reports_segments() {
    let mut cmd = sketchnet_cli();
    let path = fixtures_dir().join("tee_network.json");

    cmd.arg("normalize").arg(path);

    // The long rail splits at the stem's endpoint: 2 raw -> 3 canonical.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 raw wires -> 3 canonical segments"));
}

#[test]
fn test_cli_types_lists_catalogue() {
    let mut cmd = sketchnet_cli();

    cmd.arg("types").arg("--verbose");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resistor"))
        .stdout(predicate::str::contains("op-amp"));
}

#[test]
fn test_cli_rejects_unknown_component_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "components": {{
                "z1": {{
                    "id": "z1",
                    "type": "flux-capacitor",
                    "position": {{"x": 0.0, "y": 0.0}},
                    "rotation": 0
                }}
            }},
            "wires": []
        }}"#
    )
    .unwrap();

    let mut cmd = sketchnet_cli();
    cmd.arg("graph").arg(file.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_missing_file() {
    let mut cmd = sketchnet_cli();
    cmd.arg("graph").arg("no-such-scene.json");
    cmd.assert().failure();
}
