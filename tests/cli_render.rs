//! End-to-end tests for the `leetmate-render` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Binary with user config and env overrides isolated away.
fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("leetmate-render");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("LEETMATE_TRUNCATE_THRESHOLD")
        .env_remove("LEETMATE_ELLIPSIS")
        .env_remove("LEETMATE_TRUNCATION")
        .env_remove("LEETMATE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

// ============================================================================
// render
// ============================================================================

#[test]
fn cli_shows_help() {
    let home = TempDir::new().expect("temp dir");
    base_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("thread"))
        .stdout(predicate::str::contains("complexity"));
}

#[test]
fn render_from_stdin_escapes_markup() {
    let home = TempDir::new().expect("temp dir");
    base_cmd(&home)
        .arg("render")
        .write_stdin("<script>alert(1)</script> & `let x`")
        .assert()
        .success()
        .stdout(predicate::str::contains("&lt;script&gt;"))
        .stdout(predicate::str::contains("&amp;"))
        .stdout(predicate::str::contains(r#"<code class="inline-code">"#))
        .stdout(predicate::str::contains("<script>").not());
}

#[test]
fn render_file_collapses_and_expands() {
    let home = TempDir::new().expect("temp dir");
    let path = home.path().join("long.txt");
    fs::write(&path, "x".repeat(310)).expect("write message");

    base_cmd(&home)
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(format!("{}...\n", "x".repeat(300)));

    base_cmd(&home)
        .args(["render", "--expanded"])
        .arg(&path)
        .assert()
        .success()
        .stdout(format!("{}\n", "x".repeat(310)));
}

#[test]
fn render_json_reports_truncation_and_fragment() {
    let home = TempDir::new().expect("temp dir");
    let output = base_cmd(&home)
        .args(["render", "--json", "--threshold", "10"])
        .write_stdin("```rust\nlet n = 42;\n``` and more text here")
        .output()
        .expect("run render");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["is_truncatable"], true);
    let fragment = json["fragment"].as_array().expect("fragment array");
    assert_eq!(fragment[0]["kind"], "code-block");
    assert_eq!(fragment[0]["language"], "rust");
    assert!(json["html"].as_str().unwrap_or_default().ends_with("..."));
}

#[test]
fn raw_truncation_flag_cuts_inside_block() {
    let home = TempDir::new().expect("temp dir");
    base_cmd(&home)
        .args(["render", "--threshold", "12", "--raw-truncation"])
        .write_stdin("```js\nconst value = 1;\n```")
        .assert()
        .success()
        .stdout(predicate::str::contains("code-block").not())
        .stdout(predicate::str::starts_with("```js<br/>"));
}

#[test]
fn config_file_and_env_are_applied() {
    let home = TempDir::new().expect("temp dir");
    let cfg = home.path().join("render.toml");
    fs::write(&cfg, "truncate_threshold = 4\nellipsis = \" (more)\"\n").expect("write config");

    base_cmd(&home)
        .arg("--config")
        .arg(&cfg)
        .arg("render")
        .write_stdin("abcdefgh")
        .assert()
        .success()
        .stdout("abcd (more)\n");

    base_cmd(&home)
        .arg("--config")
        .arg(&cfg)
        .env("LEETMATE_TRUNCATE_THRESHOLD", "6")
        .arg("render")
        .write_stdin("abcdefgh")
        .assert()
        .success()
        .stdout("abcdef (more)\n");
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().expect("temp dir");
    let cfg = home.path().join("bad.toml");
    fs::write(&cfg, "[palette]\nkeyword = \"blue\"\n").expect("write config");

    base_cmd(&home)
        .arg("--config")
        .arg(&cfg)
        .arg("render")
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("palette.keyword"));
}

// ============================================================================
// thread
// ============================================================================

#[test]
fn thread_renders_html_document() {
    let home = TempDir::new().expect("temp dir");
    let out = home.path().join("thread.html");

    base_cmd(&home)
        .args(["thread", &fixture("thread.jsonl"), "--output"])
        .arg(&out)
        .assert()
        .success();

    let html = fs::read_to_string(&out).expect("read thread html");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<article").count(), 3);
    assert!(html.contains(r#"id="msg-m2" data-thread-id="t1" data-parent-id="m1">"#));
    assert!(html.contains("Linus &lt;admin&gt;"));
    assert!(html.contains("&lt;script&gt; tags &amp; &#039;quotes&#039;"));
    assert!(html.contains(r#"data-message-id="m2" aria-expanded="false">Show more</button>"#));
    assert_eq!(html.matches("message-toggle").count(), 1);
    assert!(html.contains(r#"<code class="language-python">"#));
    assert!(html.contains(">not a date</time>"));
}

#[test]
fn thread_json_respects_expand_flag() {
    let home = TempDir::new().expect("temp dir");
    let output = base_cmd(&home)
        .args(["thread", &fixture("thread.jsonl"), "--json", "--expand", "m2"])
        .output()
        .expect("run thread");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1]["id"], "m2");
    assert_eq!(lines[1]["expanded"], true);
    assert_eq!(lines[1]["is_truncatable"], true);
    assert!(
        lines[1]["html"]
            .as_str()
            .unwrap_or_default()
            .ends_with("Any feedback on naming?")
    );
    assert_eq!(lines[0]["is_truncatable"], false);
}

#[test]
fn thread_with_bad_line_fails_with_line_number() {
    let home = TempDir::new().expect("temp dir");
    let path = home.path().join("bad.jsonl");
    fs::write(&path, "{\"id\":\"a\",\"content\":\"ok\"}\n{oops\n").expect("write thread");

    base_cmd(&home)
        .arg("thread")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

// ============================================================================
// complexity / completions
// ============================================================================

#[test]
fn complexity_from_stdin() {
    let home = TempDir::new().expect("temp dir");
    base_cmd(&home)
        .arg("complexity")
        .write_stdin("if (a && b || c) { return 1; }")
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn complexity_json_breakdown() {
    let home = TempDir::new().expect("temp dir");
    let output = base_cmd(&home)
        .args(["complexity", "--json"])
        .write_stdin("int x = c ? 1 : 2; // if ignored")
        .output()
        .expect("run complexity");
    let json: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["complexity"], 2);
    assert_eq!(json["ternaries"], 1);
    assert_eq!(json["branches"], 0);
}

#[test]
fn completions_generate() {
    let home = TempDir::new().expect("temp dir");
    base_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("leetmate-render"));
}
