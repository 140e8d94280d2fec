//! CLI integration tests
//!
//! These tests run the built binary against the fixtures.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn wsdl_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wsdl"))
}

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_summary() {
    let output = Command::new(wsdl_bin())
        .args(["inspect", &fixture("stockquote.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("wsdl v"), "should show version");
    assert!(stdout.contains("http://example.com/stockquote.wsdl"));
    assert!(stdout.contains("Messages: 2"), "{}", stdout);
    assert!(stdout.contains("StockQuotePort"));
    assert!(stdout.contains("http://example.com/stockquote"));
    assert!(stdout.contains("Unresolved References"));
}

#[test]
fn test_cli_inspect_json_output() {
    let output = Command::new(wsdl_bin())
        .args(["inspect", "--json", &fixture("overloads.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.trim_start().starts_with('{'));
    assert!(stdout.contains("\"targetNamespace\": \"urn:overloads\""), "{}", stdout);
    assert!(stdout.contains("\"portTypes\""));
    assert!(stdout.contains("\"REQUEST_RESPONSE\""));
}

#[test]
fn test_cli_inspect_missing_file() {
    let output = Command::new(wsdl_bin())
        .args(["inspect", &fixture("nope.wsdl")])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OTHER_ERROR"), "{}", stderr);
}

// ============================================================================
// Roundtrip Command Tests
// ============================================================================

#[test]
fn test_cli_roundtrip_stdout() {
    let output = Command::new(wsdl_bin())
        .args(["roundtrip", &fixture("minimal.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("definitions"));
    assert!(stdout.contains("http://schemas.xmlsoap.org/wsdl/"));
}

#[test]
fn test_cli_roundtrip_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.wsdl");

    let status = Command::new(wsdl_bin())
        .args([
            "roundtrip",
            &fixture("extensions.wsdl"),
            "--output",
            out.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to execute command");

    assert!(status.success());
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("ext:Signature"));
}
