#![cfg(feature = "cli")]

use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxiups").to_string()
}

#[test]
fn cli_create_apply_roundtrip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("delta.ups");
    let output = dir.path().join("output.bin");
    let restored = dir.path().join("restored.bin");

    std::fs::write(&source, b"abcde12345abcde12345").unwrap();
    std::fs::write(&target, b"abcdeXXXXXabcde12345!").unwrap();

    let st = Command::new(bin())
        .arg("--force")
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("--force")
        .arg("apply")
        .arg(&patch)
        .arg(&source)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&target).unwrap()
    );

    // The same patch applied to the patched file undoes itself.
    let st = Command::new(bin())
        .arg("--force")
        .arg("apply")
        .arg(&patch)
        .arg(&output)
        .arg(&restored)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&restored).unwrap(),
        std::fs::read(&source).unwrap()
    );
}

#[test]
fn cli_refuses_existing_output_without_force() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("s.bin");
    let target = dir.path().join("t.bin");
    let patch = dir.path().join("p.ups");

    std::fs::write(&source, b"one").unwrap();
    std::fs::write(&target, b"two").unwrap();
    std::fs::write(&patch, b"already here").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&patch).unwrap(), b"already here");
}

#[test]
fn cli_apply_rejects_wrong_input() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("s.bin");
    let target = dir.path().join("t.bin");
    let stranger = dir.path().join("x.bin");
    let patch = dir.path().join("p.ups");
    let output = dir.path().join("o.bin");

    std::fs::write(&source, b"correct source").unwrap();
    std::fs::write(&target, b"correct target").unwrap();
    std::fs::write(&stranger, b"unrelated file").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .arg("apply")
        .arg(&patch)
        .arg(&stranger)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert!(!output.exists());
}

#[test]
fn cli_info_prints_patch_details() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("s.bin");
    let target = dir.path().join("t.bin");
    let patch = dir.path().join("p.ups");

    std::fs::write(&source, b"ABCD").unwrap();
    std::fs::write(&target, b"ABXD").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("info").arg(&patch).output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("blocks:             1"), "stdout: {text}");
    assert!(text.contains("input size:         4"), "stdout: {text}");
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
}
