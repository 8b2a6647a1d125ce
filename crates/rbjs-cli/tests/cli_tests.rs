//! End-to-end runs of the `rbjs` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn rbjs(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_rbjs"))
        .args(args)
        .current_dir(dir)
        .env_remove("RBJS_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary starts");
    if let Some(text) = stdin {
        child
            .stdin
            .take()
            .expect("stdin piped")
            .write_all(text.as_bytes())
            .expect("stdin written");
    } else {
        drop(child.stdin.take());
    }
    child.wait_with_output().expect("binary finishes")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn converts_stdin() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = rbjs(dir.path(), &["-t", "es2015"], Some(r#"(lvasgn :a (int 1))"#));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "let a = 1");
}

#[test]
fn reads_json_input_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("prog.json"), r#"["send", null, ":puts", ["str", "hi"]]"#).expect("write input");
    let output = rbjs(dir.path(), &["prog.json"], None);
    assert!(output.status.success());
    assert_eq!(stdout(&output), r#"puts("hi")"#);
}

#[test]
fn applies_config_file_filters() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("rbjs.json"),
        r#"{"filters": ["node"], "options": {"esLevel": "es2015"}}"#,
    )
    .expect("write config");
    let output = rbjs(dir.path(), &[], Some(r#"(send (const nil :File) :read (str "x"))"#));
    assert!(output.status.success());
    assert_eq!(stdout(&output), r#"const fs = require("fs"); fs.readFileSync("x", "utf8")"#);
}

#[test]
fn conversion_failure_exits_nonzero_with_json_diagnostics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = rbjs(dir.path(), &["--diagnostics", "json"], Some(r#"(xstr@1:0 (str "ls"))"#));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let diagnostics: serde_json::Value = serde_json::from_slice(&output.stderr).expect("json diagnostics");
    assert_eq!(diagnostics[0]["code"], 1001);
    assert_eq!(diagnostics[0]["category"], "unsupported-construct");
}

#[test]
fn lists_filters() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = rbjs(dir.path(), &["--list-filters"], None);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "node\nunderscore");
}
