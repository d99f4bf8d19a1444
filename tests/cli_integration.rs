// CLI integration tests for decode and types flows.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_event-envelope");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

fn write_input(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).expect("write input");
    path
}

#[test]
fn decode_file_prints_summary() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        &temp,
        "event.json",
        r#"{"object":{"object":"charge","id":"ch_1","amount":100},"previous_attributes":{"amount":50}}"#,
    );

    let output = cmd()
        .args(["decode", path.to_str().unwrap()])
        .output()
        .expect("decode");
    assert!(output.status.success());
    let summary = parse_json(&output.stdout);
    assert_eq!(summary["type"], "charge");
    assert_eq!(summary["typed"], true);
    assert_eq!(summary["id"], "ch_1");
    assert_eq!(summary["previous_attributes"][0], "amount");
}

#[test]
fn decode_stdin_with_unknown_tag() {
    let mut child = cmd()
        .arg("decode")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"object":{"object":"unknown_future_type","foo":"bar"}}"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let summary = parse_json(&output.stdout);
    assert_eq!(summary["type"], "unknown_future_type");
    assert_eq!(summary["typed"], false);
}

#[test]
fn missing_discriminator_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(&temp, "event.json", r#"{"object":{"id":"ch_1"}}"#);

    let output = cmd()
        .args(["decode", path.to_str().unwrap()])
        .output()
        .expect("decode");
    assert_eq!(output.status.code().unwrap(), 3);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "MissingField");
    assert_eq!(err["error"]["field"], "object.object");
}

#[test]
fn strict_previous_attributes_flag() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        &temp,
        "event.json",
        r#"{"object":{"object":"charge","id":"ch_1"},"previous_attributes":"amount"}"#,
    );

    let lenient = cmd()
        .args(["decode", path.to_str().unwrap()])
        .output()
        .expect("lenient");
    assert!(lenient.status.success());
    assert_eq!(parse_json(&lenient.stdout)["previous_attributes"], "absent");

    let strict = cmd()
        .args(["decode", "--strict-previous-attributes", path.to_str().unwrap()])
        .output()
        .expect("strict");
    assert_eq!(strict.status.code().unwrap(), 4);
}

#[test]
fn types_lists_registered_tags() {
    let output = cmd().arg("types").output().expect("types");
    assert!(output.status.success());
    let listing = parse_json(&output.stdout);
    let types = listing["types"].as_array().expect("types array");
    assert!(types.iter().any(|entry| entry["tag"] == "charge"));
}

#[test]
fn usage_exit_code() {
    let output = cmd().args(["decode", "--bogus"]).output().expect("decode");
    assert_eq!(output.status.code().unwrap(), 2);
}

#[test]
fn decode_accepts_out_of_range_numbers() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        &temp,
        "event.json",
        r#"{"object":{"object":"widget","id":"w_1"},"previous_attributes":{"n":1e400,"m":123456789012345678901234567890}}"#,
    );

    let output = cmd()
        .args(["decode", path.to_str().unwrap()])
        .output()
        .expect("decode");
    assert!(output.status.success());
    let summary = parse_json(&output.stdout);
    assert_eq!(summary["previous_attributes"][0], "m");
    assert_eq!(summary["previous_attributes"][1], "n");
}
