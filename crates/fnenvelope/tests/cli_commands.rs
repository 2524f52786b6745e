#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn fnenvelope() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fnenvelope"));
    command.arg("--log-level").arg("error");
    command
}

fn run_with_stdin(mut command: Command, stdin: &[u8]) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("command should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("command should finish")
}

#[test]
fn encode_prints_request_envelope() {
    let output = fnenvelope()
        .args(["encode", "-H", "content-type: text/plain", "--data", "say \"hi\""])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be one JSON object");
    assert_eq!(value["body"], "say \"hi\"");
    assert_eq!(value["headers"]["Content-Type"][0], "text/plain");
}

#[test]
fn encode_without_body_has_empty_body_field() {
    let output = fnenvelope()
        .arg("encode")
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"{\"body\":\"\",\"headers\":{}}\n");
}

#[test]
fn echo_answers_each_request() {
    let mut command = fnenvelope();
    command.args(["echo", "--status", "201"]);
    let output = run_with_stdin(
        command,
        b"{\"body\":\"one\",\"headers\":{\"X-A\":[\"1\"]}}\n{\"body\":\"two\",\"headers\":{}}\n",
    );

    assert!(output.status.success());
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["body"], "one");
    assert_eq!(lines[0]["headers"]["X-A"][0], "1");
    assert_eq!(lines[0]["status_code"], 201);
    assert_eq!(lines[1]["body"], "two");
}

#[test]
fn echo_rejects_malformed_request() {
    let mut command = fnenvelope();
    command.arg("echo");
    let output = run_with_stdin(command, b"{\"headers\":");

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn dispatch_against_echo_function() {
    let output = fnenvelope()
        .args([
            "--format",
            "json",
            "dispatch",
            "-H",
            "x-trace: abc",
            "--data",
            "ping",
            "--repeat",
            "3",
            "--",
            env!("CARGO_BIN_EXE_fnenvelope"),
            "--log-level",
            "error",
            "echo",
        ])
        .output()
        .expect("dispatch should run");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert_eq!(line["status_code"], 200);
        assert_eq!(line["body"], "ping");
        assert_eq!(line["headers"]["X-Trace"][0], "abc");
    }
}

#[test]
fn dispatch_replays_function_status() {
    let output = fnenvelope()
        .args([
            "--format",
            "pretty",
            "dispatch",
            "--data",
            "ping",
            "--",
            env!("CARGO_BIN_EXE_fnenvelope"),
            "--log-level",
            "error",
            "echo",
            "--status",
            "202",
        ])
        .output()
        .expect("dispatch should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"status=202 size=4 body=ping\n");
}

#[test]
fn dispatch_reports_function_that_exits_early() {
    let output = fnenvelope()
        .args(["--format", "pretty", "dispatch", "--data", "x", "--", "true"])
        .output()
        .expect("dispatch should run");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("status=500"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dispatch failed"));
}

#[test]
fn dispatch_missing_function_is_not_found() {
    let output = fnenvelope()
        .args(["dispatch", "--", "/nonexistent/fnenvelope-function"])
        .output()
        .expect("dispatch should run");

    assert_eq!(output.status.code(), Some(127));
}
