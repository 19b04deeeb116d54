//! Integration tests for `ssrkit build --json`.
//!
//! A shell script stands in for esbuild (via `SSRKIT_ESBUILD`), so these run
//! on unix only.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "ssrkit-cli", "--bin", "ssrkit", "--"]);
    cmd
}

/// Fake esbuild: emits the entry file's contents, or an esbuild-style error
/// when the file contains `BROKEN`.
fn fake_esbuild(dir: &Path) -> PathBuf {
    let path = dir.join("fake-esbuild");
    let script = r#"#!/bin/sh
if grep -q BROKEN "$1"; then
  echo "✘ [ERROR] Could not resolve \"./missing\"" >&2
  echo "" >&2
  echo "    $1:1:7:" >&2
  exit 1
fi
cat "$1"
"#;
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn project() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let esbuild = fake_esbuild(dir.path());
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/navbar.js"), "export const Navbar = 1;").unwrap();
    std::fs::write(dir.path().join("src/footer.js"), "export const Footer = 2;").unwrap();
    std::fs::write(
        dir.path().join("ssrkit.json"),
        r#"{
  "components": [{ "entry": "src/navbar.js" }, { "entry": "src/footer.js" }],
  "host": { "mount_path": "/widgets" }
}"#,
    )
    .unwrap();
    (dir, esbuild)
}

#[test]
fn test_build_json_writes_bundles_in_order() {
    let (dir, esbuild) = project();
    let outdir = dir.path().join("dist");

    let output = cargo_bin()
        .arg("--json")
        .arg("--cwd")
        .arg(dir.path())
        .arg("build")
        .arg("--outdir")
        .arg(&outdir)
        .env("SSRKIT_ESBUILD", &esbuild)
        .output()
        .expect("Failed to run build command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "build failed: {stdout}");

    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], true);
    assert_eq!(json["bundles"][0]["entry"], "src/navbar.js");
    assert_eq!(json["bundles"][1]["entry"], "src/footer.js");

    assert_eq!(
        std::fs::read_to_string(outdir.join("0.js")).unwrap(),
        "export const Navbar = 1;"
    );
    assert_eq!(
        std::fs::read_to_string(outdir.join("1.js")).unwrap(),
        "export const Footer = 2;"
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(outdir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(
        manifest,
        serde_json::json!({"bundles": ["/widgets/0.js", "/widgets/1.js"]})
    );
}

#[test]
fn test_build_json_reports_first_bundler_error() {
    let (dir, esbuild) = project();
    std::fs::write(dir.path().join("src/footer.js"), "BROKEN").unwrap();

    let output = cargo_bin()
        .arg("--json")
        .arg("--cwd")
        .arg(dir.path())
        .arg("build")
        .env("SSRKIT_ESBUILD", &esbuild)
        .output()
        .expect("Failed to run build command");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "COMPILE_BUILD_FAILED");
    assert_eq!(json["error"]["message"], "Could not resolve \"./missing\"");
    assert_eq!(json["error"]["entry"], "src/footer.js");
}

#[test]
fn test_build_without_components_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ssrkit.json"), "{}").unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .arg("build")
        .output()
        .expect("Failed to run build command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No components registered"), "stderr: {stderr}");
}

#[test]
fn test_version() {
    let output = cargo_bin()
        .arg("version")
        .output()
        .expect("Failed to run version command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ssrkit "));
}
