use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const SCHEMA: &str = r#"{
  "program": "greet",
  "args": [
    { "long": "name", "short": "n", "description": "Who to greet" },
    { "long": "times", "short": "t", "type": "int", "min": 1, "default": 1 },
    { "long": "loud", "short": "l", "type": "flag", "description": "Shout" },
    { "long": "extra", "positional": true, "multiValue": true },
    { "long": "help", "short": "h", "type": "help", "description": "Show help message" }
  ]
}
"#;

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argwalk-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_schema(prefix: &str) -> (PathBuf, PathBuf) {
    let dir = make_temp_dir(prefix);
    let path = dir.join("argwalk.json");
    fs::write(&path, SCHEMA).expect("failed to write schema");
    (dir, path)
}

fn argwalk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argwalk"))
}

fn parse_with(schema: &Path, tokens: &[&str]) -> Output {
    argwalk()
        .arg("parse")
        .arg("--schema")
        .arg(schema)
        .arg("--")
        .args(tokens)
        .output()
        .expect("failed to run argwalk parse")
}

#[test]
fn help_works() {
    let out = argwalk()
        .arg("--help")
        .output()
        .expect("failed to run argwalk --help");
    assert!(
        out.status.success(),
        "argwalk --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("parse") && stdout.contains("usage") && stdout.contains("init"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn parse_prints_resolved_values_as_json() {
    let (dir, schema) = write_schema("parse-json");

    let out = parse_with(&schema, &["-ln", "ada", "--times=3", "one", "two"]);
    assert!(
        out.status.success(),
        "argwalk parse failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is not JSON");
    assert_eq!(report["name"], "ada");
    assert_eq!(report["times"], 3);
    assert_eq!(report["loud"], true);
    assert_eq!(report["extra"], serde_json::json!(["one", "two"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_reports_missing_required_argument() {
    let (dir, schema) = write_schema("parse-missing");

    let out = parse_with(&schema, &["--loud"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("argument name is missing and has no default value"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_rejects_value_below_minimum() {
    let (dir, schema) = write_schema("parse-min");

    let out = parse_with(&schema, &["-n", "ada", "-t", "0"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("below the minimum 1"), "unexpected stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_help_trigger_prints_banner() {
    let (dir, schema) = write_schema("parse-help");

    let out = parse_with(&schema, &["-h"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.starts_with("Usage: greet [options] <extra>..."),
        "unexpected stdout:\n{stdout}"
    );
    assert!(stdout.contains("-n, --name <NAME>"), "unexpected stdout:\n{stdout}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn init_writes_a_usable_schema() {
    let dir = make_temp_dir("init");

    let out = argwalk()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run argwalk init");
    assert!(
        out.status.success(),
        "argwalk init failed:\nstderr:\n{}",
        String::from_utf8_lossy(&out.stderr),
    );
    let schema = dir.join("argwalk.json");
    assert!(schema.is_file(), "argwalk.json not created");

    let out = argwalk()
        .arg("parse")
        .arg("--schema")
        .arg(&schema)
        .arg("--format")
        .arg("plain")
        .arg("--")
        .args(["-v", "a.txt"])
        .output()
        .expect("failed to run argwalk parse");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("verbose = true"), "unexpected stdout:\n{stdout}");
    assert!(stdout.contains("files = a.txt"), "unexpected stdout:\n{stdout}");

    let again = argwalk()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run argwalk init");
    assert!(!again.status.success(), "second init should refuse to overwrite");

    let _ = fs::remove_dir_all(&dir);
}
