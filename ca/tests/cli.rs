//! Integration tests for the `ca` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// `ca` running in `dir`, with logs and config lookups kept inside it
fn ca(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ca").expect("binary should build");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_DATA_HOME", dir.join(".data"))
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

fn envelopes(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn test_tools_lists_every_tool() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bash"))
        .stdout(predicate::str::contains("MultiEdit"))
        .stdout(predicate::str::contains("ExitPlanMode"));
}

#[test]
fn test_schema_for_one_tool() {
    let temp = TempDir::new().unwrap();

    let output = ca(temp.path()).args(["schema", "Grep"]).output().unwrap();

    assert!(output.status.success());
    let def: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(def["name"], "Grep");
    assert_eq!(def["input_schema"]["required"][0], "pattern");
}

#[test]
fn test_schema_unknown_tool_fails() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .args(["schema", "Teleport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool"));
}

#[test]
fn test_exec_write_then_read() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .args(["exec", "Write", "--input", r#"{"file_path": "notes.txt", "content": "alpha\nbeta\n"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success": true"#));

    let output = ca(temp.path())
        .args(["exec", "Read", "--input", r#"{"file_path": "notes.txt"}"#])
        .output()
        .unwrap();
    let envelope: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["content"], "     1|alpha\n     2|beta");
    assert_eq!(envelope["_metadata"]["call_number"], 1);
}

#[test]
fn test_exec_failed_tool_still_exits_zero() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .args(["exec", "Read", "--input", r#"{"file_path": "missing.txt"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success": false"#))
        .stdout(predicate::str::contains("FileNotFound"));
}

#[test]
fn test_exec_rejects_malformed_input() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .args(["exec", "Read", "--input", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --input JSON"));
}

#[test]
fn test_exec_respects_cwd_flag() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/inner.txt"), "x").unwrap();

    let output = ca(temp.path())
        .args(["-C", "sub", "exec", "LS"])
        .output()
        .unwrap();
    let envelope: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["entries"][0]["name"], "inner.txt");
}

#[test]
fn test_run_script_keeps_state_between_calls() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("calls.jsonl");
    fs::write(
        &script,
        [
            r#"# set up and inspect"#,
            r#"{"tool": "Bash", "input": {"command": "mkdir -p work && cd work && echo hi > a.txt"}}"#,
            r#"{"tool": "Bash", "input": {"command": "pwd"}}"#,
            r#""#,
            r#"{"tool": "TodoWrite", "input": {"todos": [{"id": "1", "content": "check", "status": "in_progress"}]}}"#,
            r#"{"tool": "Nope", "input": {}}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let output = ca(temp.path())
        .args(["run", "calls.jsonl", "--hint"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let results = envelopes(&output.stdout);
    assert_eq!(results.len(), 4);
    assert!(results[1]["output"].as_str().unwrap().ends_with("/work"));
    assert_eq!(results[1]["_metadata"]["call_number"], 2);
    assert_eq!(results[2]["in_progress"], 1);
    assert_eq!(results[3]["error_type"], "UnknownTool");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Current TODO List"));
    assert!(stdout.contains("[~] [1] check (in_progress)"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("4 call(s), 1 failed"));
}

#[test]
fn test_run_reports_bad_line() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("bad.jsonl"), "{\"tool\": \"LS\"}\nnot json\n").unwrap();

    ca(temp.path())
        .args(["run", "bad.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let temp = TempDir::new().unwrap();

    ca(temp.path())
        .args(["-c", "nope.yml", "tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_local_config_is_used() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".codeagent.yml"), "limits:\n  read-default-limit: 1\n").unwrap();
    fs::write(temp.path().join("f.txt"), "one\ntwo\nthree\n").unwrap();

    let output = ca(temp.path())
        .args(["exec", "Read", "--input", r#"{"file_path": "f.txt"}"#])
        .output()
        .unwrap();
    let envelope: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["showing_lines"], "1-1");
}
