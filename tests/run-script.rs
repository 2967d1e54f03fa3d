extern crate tempfile;

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin(name: &str) -> PathBuf {
    let mut root = env::current_exe()
        .unwrap()
        .parent()
        .expect("executable's directory")
        .to_path_buf();
    if root.ends_with("deps") {
        root.pop();
    }
    root.join(name)
}

fn run(dir: &Path, name: &str, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin(name));
    cmd.env("RUST_BACKTRACE", "1");
    cmd.current_dir(dir).args(args);
    let out = cmd.output().expect("command failed to run");
    println!("{}", String::from_utf8_lossy(&out.stdout));
    println!("{}", String::from_utf8_lossy(&out.stderr));
    out
}

#[test]
fn one_line_per_generated_macro() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(
        dir.path(),
        "icespice-macros",
        &["--quiet", "--thickness=100", "--thickness=500", "--output-dir=macros"],
    );
    assert!(out.status.success());
    let macros = std::fs::read_dir(dir.path().join("macros")).unwrap().count();
    assert_eq!(macros, 2 * 9);

    let out = run(
        dir.path(),
        "icespice-run-script",
        &["--macro-dir=macros", "--executable=/opt/icespice/ICESPICE"],
    );
    assert!(out.status.success());
    let script = std::fs::read_to_string(dir.path().join("run_macros.sh")).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines.len(), macros);
    assert_eq!(
        lines[0],
        "/opt/icespice/ICESPICE macros/MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac"
    );
    for l in lines.iter() {
        assert!(l.starts_with("/opt/icespice/ICESPICE macros/MACRO_ICESPICE_"));
    }
}

#[test]
fn prefix_selects_macros() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), "icespice-macros", &["--quiet", "--combined"]);
    assert!(out.status.success());
    let out = run(dir.path(), "icespice-macros", &["--quiet", "--thickness=300"]);
    assert!(out.status.success());

    let out = run(
        dir.path(),
        "icespice-run-script",
        &["--prefix=ICESPICE", "--script=combined.sh"],
    );
    assert!(out.status.success());
    let script = std::fs::read_to_string(dir.path().join("combined.sh")).unwrap();
    assert_eq!(script, "./ICESPICE ICESPICE.mac\n");

    let out = run(dir.path(), "icespice-run-script", &["--quiet"]);
    assert!(out.status.success());
    let script = std::fs::read_to_string(dir.path().join("run_macros.sh")).unwrap();
    assert_eq!(script.lines().count(), 9);
}

#[test]
fn empty_directory_warns() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), "icespice-run-script", &[]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("warning"));
    let script = std::fs::read_to_string(dir.path().join("run_macros.sh")).unwrap();
    assert_eq!(script, "");
}

#[test]
fn missing_directory_fails() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), "icespice-run-script", &["--macro-dir=nowhere"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("run_macros.sh").exists());
}
