use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn biograph(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("biograph").expect("binary");
    cmd.current_dir(workdir).env_remove("RUST_LOG").arg("--quiet");
    cmd
}

fn setup_letters() -> TempDir {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("letters.json"),
        r#"[
            {"date": "1888-05-01", "sender": "Jo", "recipient": "Vincent",
             "content": "I saw Rappard in Paris.",
             "mentionedPlaces": ["Paris", "Paris"]},
            {"date": "1889-01-10", "personFrom": "Vincent", "personTo": "Theo",
             "content": ""}
        ]"#,
    )
    .unwrap();
    temp
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn clean_collapses_fragments() {
    let temp = tempdir().unwrap();
    let output = biograph(temp.path())
        .args(["clean", "Gau", "Gauguin", "Paul Gauguin"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::json!(["Paul Gauguin"]));
}

#[test]
fn graph_exports_four_tiers() {
    let temp = setup_letters();
    let output = biograph(temp.path())
        .args(["graph", "--letters", "letters.json", "--central", "Vincent"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph = stdout_json(&output);
    assert_eq!(graph["central"], "person:Vincent");
    let ids: Vec<&str> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["person:Vincent", "person:Jo", "letter:1", "place:Paris", "person:Theo", "letter:2"]
    );
    assert_eq!(graph["edges"].as_array().unwrap().len(), 5);
}

#[test]
fn graph_writes_gexf_file() {
    let temp = setup_letters();
    biograph(temp.path())
        .args(["graph", "--letters", "letters.json", "--format", "gexf", "--out", "out/graph.gexf"])
        .assert()
        .success();
    let gexf = fs::read_to_string(temp.path().join("out/graph.gexf")).unwrap();
    assert!(gexf.contains(r#"<node id="place:Paris" label="Paris">"#));
}

#[test]
fn extract_uses_pretagged_tokens() {
    let temp = setup_letters();
    fs::write(
        temp.path().join("tokens.json"),
        r###"{"0": [
            {"word": "Rap", "entity": "B-PER", "score": 0.9},
            {"word": "##pard", "entity": "I-PER", "score": 0.85},
            {"word": "Paris", "entity": "B-LOC", "score": 0.97}
        ]}"###,
    )
    .unwrap();

    let output = biograph(temp.path())
        .args(["extract", "--letters", "letters.json", "--tokens", "tokens.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let letters = stdout_json(&output);
    assert_eq!(letters[0]["mentionedPeople"], serde_json::json!(["Rappard"]));
    assert_eq!(letters[0]["mentionedPlaces"], serde_json::json!(["Paris"]));
    assert!(letters[1].get("mentionedPeople").is_none());
}

#[test]
fn extract_warns_when_identical_letters_get_different_tokens() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("letters.json"),
        r#"[
            {"date": "1888", "sender": "Vincent", "recipient": "Theo", "content": "Greetings"},
            {"date": "1889", "sender": "Vincent", "recipient": "Theo", "content": "Greetings"}
        ]"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("tokens.json"),
        r#"{
            "0": [{"word": "Arles", "entity": "B-LOC", "score": 0.9}],
            "1": [{"word": "Paris", "entity": "B-LOC", "score": 0.9}]
        }"#,
    )
    .unwrap();

    biograph(temp.path())
        .args(["extract", "--letters", "letters.json", "--tokens", "tokens.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Letter 1 has the same text"));
}

#[test]
fn extract_without_model_passes_letters_through() {
    let temp = setup_letters();
    biograph(temp.path())
        .args(["extract", "--letters", "letters.json", "--out", "enriched.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("left unchanged"));

    let letters: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("enriched.json")).unwrap()).unwrap();
    assert_eq!(letters.as_array().unwrap().len(), 2);
    assert!(letters[0].get("mentionedPeople").is_none());
}

#[test]
fn metrics_report_degrees() {
    let temp = setup_letters();
    let output = biograph(temp.path())
        .args(["metrics", "--letters", "letters.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let metrics = stdout_json(&output);
    assert_eq!(metrics["degree"]["letter:1"], 3);
    assert_eq!(metrics["degree"]["person:Vincent"], 2);
}

#[test]
fn ego_rejects_zero_depth() {
    let temp = setup_letters();
    biograph(temp.path())
        .args(["ego", "--letters", "letters.json", "--center", "person:Jo", "--depth", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn layout_places_tiers_on_rows() {
    let temp = setup_letters();
    let output = biograph(temp.path())
        .args(["layout", "--letters", "letters.json", "--mode", "hierarchical"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let layout = stdout_json(&output);
    assert_eq!(layout["mode"], "hierarchical");
    assert_eq!(layout["positions"]["person:Vincent"]["y"], 0.0);
    assert_eq!(layout["positions"]["place:Paris"]["y"], 600.0);
}

#[test]
fn config_rejects_unknown_keys() {
    let temp = setup_letters();
    fs::write(temp.path().join("biograph.toml"), "[graph]\nshow_events = true\n").unwrap();
    biograph(temp.path())
        .args(["graph", "--letters", "letters.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("biograph.toml"));
}

#[test]
fn config_aliases_merge_correspondents() {
    let temp = setup_letters();
    fs::write(
        temp.path().join("biograph.toml"),
        r#"
        [[aliases]]
        canonical = "Johanna Bonger"
        variants = ["Jo"]
        "#,
    )
    .unwrap();
    let output = biograph(temp.path())
        .args(["graph", "--letters", "letters.json", "--central", "Vincent"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let graph = stdout_json(&output);
    let labels: Vec<&str> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["label"].as_str().unwrap())
        .collect();
    assert!(labels.contains(&"Johanna Bonger"));
    assert!(!labels.contains(&"Jo"));
}
