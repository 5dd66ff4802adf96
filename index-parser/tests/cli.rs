use std::io::Write;
use std::process::{Command, Stdio};

fn expected_with_newline(expected: &str) -> String {
    format!("{}\n", expected.trim_end_matches('\n'))
}

#[test]
fn cli_reads_file_path() {
    let output = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .arg("tests/fixtures/payloads/documenter-search-index.js")
        .output()
        .expect("run CLI");

    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let expected = include_str!("fixtures/expected/documenter-search-index.json");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        expected_with_newline(expected),
    );
}

#[test]
fn cli_reads_stdin_when_no_args() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn CLI");

    let payload = include_str!("fixtures/payloads/bare-payload.json");
    child
        .stdin
        .take()
        .expect("stdin open")
        .write_all(payload.as_bytes())
        .expect("write stdin");

    let output = child.wait_with_output().expect("read CLI output");
    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    let expected = include_str!("fixtures/expected/bare-payload.json");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        expected_with_newline(expected),
    );
}

#[test]
fn cli_fails_on_malformed_record() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn CLI");

    child
        .stdin
        .take()
        .expect("stdin open")
        .write_all(br#"{"docs":[{"location":"a","page":"A","title":"A","text":""}]}"#)
        .expect("write stdin");

    let output = child.wait_with_output().expect("read CLI output");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("record 0 is missing required field `category`"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn cli_help_describes_both_payload_forms() {
    let output = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .arg("--help")
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("var documenterSearchIndex = {\"docs\": [...]};"),
        "help lacks the script form: {stdout}"
    );
    assert!(
        stdout.contains("{\"docs\": [...]}    "),
        "help lacks the bare form: {stdout}"
    );
}

#[test]
fn cli_counts_records() {
    let output = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .args(["--count", "tests/fixtures/payloads/documenter-search-index.js"])
        .output()
        .expect("run CLI");

    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "21\n");
}

#[test]
fn cli_streams_json_lines() {
    let output = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .args(["--jsonl", "tests/fixtures/payloads/documenter-search-index.js"])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 21);
    assert!(lines[2].contains(r##""location":"#WaveSim.jl""##));
}

#[test]
fn cli_rejects_unknown_option() {
    let output = Command::new(env!("CARGO_BIN_EXE_index_parser"))
        .arg("--pretty")
        .output()
        .expect("run CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown option: --pretty"), "unexpected stderr: {stderr}");
}
