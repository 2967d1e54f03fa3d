extern crate tempfile;
#[macro_use]
extern crate difference;

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin_dir() -> PathBuf {
    let mut root = env::current_exe()
        .unwrap()
        .parent()
        .expect("executable's directory")
        .to_path_buf();
    if root.ends_with("deps") {
        root.pop();
    }
    root
}

fn run(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin_dir().join("icespice-macros"));
    cmd.env("RUST_BACKTRACE", "1");
    cmd.current_dir(dir).args(args);
    let out = cmd.output().expect("command failed to run");
    println!("{}", String::from_utf8_lossy(&out.stdout));
    println!("{}", String::from_utf8_lossy(&out.stderr));
    out
}

fn read(path: &Path) -> String {
    let mut f = File::open(path).unwrap();
    let mut s = String::new();
    f.read_to_string(&mut s).unwrap();
    s
}

fn expected_scenario() -> String {
    let mut s = String::from(
        "/control/verbose 1\n\
         /run/verbose 0\n\
         /event/verbose 0\n\
         /run/initialize\n\
         /ICESPICE/Detector/Thickness 100\n\
         /ICESPICE/Detector/Position -20\n\
         /gun/position 0 0 50 mm\n",
    );
    for e in (100..=2000).step_by(100) {
        s.push_str(&format!(
            "/analysis/setFileName ICESPICE_PIPS100_f50mm_g20mm_{}keV.root\n",
            e
        ));
        s.push_str(&format!("/gun/energy {} keV\n", e));
        s.push_str("/run/beamOn 50000\n");
    }
    s
}

#[test]
fn help_works() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--help"]);
    assert!(out.status.success());
}

#[test]
fn default_sweep_writes_one_macro_per_geometry() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--quiet"]);
    assert!(out.status.success());
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 4 * 9);
    assert!(names.iter().all(|n| n.starts_with("MACRO_ICESPICE_PIPS")));
    for t in &[100, 300, 500, 1000] {
        for g in (20..=60).step_by(5) {
            let name = format!("MACRO_ICESPICE_PIPS{}_f50mm_g{}mm.mac", t, g);
            let text = read(&dir.path().join(&name));
            assert_eq!(text.lines().count(), 7 + 3 * 20, "{}", name);
        }
    }
    let s1 = read(&dir.path().join("MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac"));
    let s2 = expected_scenario();
    assert_diff!(&s1, &s2, "\n", 0);
}

#[test]
fn combined_sweep_writes_a_single_macro() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--combined", "--thickness=500", "--detector-position=-30"]);
    assert!(out.status.success());
    let text = read(&dir.path().join("ICESPICE.mac"));
    assert_eq!(text.lines().count(), 4 + 1 + 1 + 40 * 3);
    assert!(text.contains(
        "/ICESPICE/source/Energy 2000\n\
         /analysis/setFileName ICESPICE_PIPS500_f50mm_g-30mm_2000keV.root\n\
         /run/beamOn 10000\n"
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn saved_sweep_can_be_replayed() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(
        dir.path(),
        &[
            "--thickness=300",
            "--energy-min=500",
            "--energy-max=1000",
            "--particles=100",
            "--output-dir=first",
            "--save-sweep-as=sweep.yaml",
        ],
    );
    assert!(out.status.success());
    let out = run(
        dir.path(),
        &["--sweep-file=sweep.yaml", "--output-dir=second"],
    );
    assert!(out.status.success());
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    assert_eq!(std::fs::read_dir(&second).unwrap().count(), 9);
    for entry in std::fs::read_dir(&first).unwrap() {
        let name = entry.unwrap().file_name();
        let s1 = read(&first.join(&name));
        let s2 = read(&second.join(&name));
        assert_diff!(&s1, &s2, "\n", 0);
        assert_eq!(s1.matches("/run/beamOn 100\n").count(), 6);
    }
}

#[test]
fn run_script_lists_every_macro() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--quiet", "--run-script=run.sh"]);
    assert!(out.status.success());
    let script = read(&dir.path().join("run.sh"));
    assert_eq!(script.lines().count(), 4 * 9);
    assert!(script
        .lines()
        .all(|l| l.starts_with("./ICESPICE MACRO_ICESPICE_PIPS") && l.ends_with(".mac")));
}

#[test]
fn combined_run_script_skips_the_simulation_program() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    std::fs::write(dir.path().join("ICESPICE"), "").unwrap();
    std::fs::write(dir.path().join("ICESPICE_PIPS100_f50mm_g-20mm_50keV.root"), "").unwrap();
    let out = run(dir.path(), &["--quiet", "--combined", "--run-script=run.sh"]);
    assert!(out.status.success());
    assert_eq!(read(&dir.path().join("run.sh")), "./ICESPICE ICESPICE.mac\n");
}

#[test]
fn colliding_sweep_fails_without_writing() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--detector-position=-20", "--detector-position=-20"]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn out_of_range_thickness_fails() {
    let dir = tempfile::tempdir().expect("Unable to create temp directory");
    let out = run(dir.path(), &["--thickness=4000"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("4000"));
}
