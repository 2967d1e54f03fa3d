//! Writing a shell script that runs the simulation once per macro.

use crate::atomicfile::AtomicFile;

use std::io::{Result, Write};
use std::path::Path;

/// The extension every macro file carries.
pub const MACRO_EXTENSION: &str = ".mac";

/// Find the macros in `dir`: files whose name starts with `prefix` and
/// ends in `.mac`, which keeps the simulation program and its ROOT
/// output out of the list.  Names are sorted so the script comes out
/// the same every time.
pub fn find_macros(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(prefix) && name.ends_with(MACRO_EXTENSION) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_./+-=:,".contains(c)
}

/// Quote a word for `sh` if it needs it.
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_shell_safe) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// The invocation line for one macro.
pub fn invocation(executable: &str, dir: &Path, name: &str) -> String {
    let arg = if dir == Path::new(".") {
        name.to_string()
    } else {
        dir.join(name).display().to_string()
    };
    format!("{} {}", executable, shell_quote(&arg))
}

/// Write `script`, with one line running `executable` on each of the
/// named macros in `dir`.
pub fn write_script<S: AsRef<str>>(
    dir: &Path,
    names: &[S],
    executable: &str,
    script: &Path,
) -> Result<()> {
    let f = AtomicFile::create(script)?;
    for name in names.iter() {
        writeln!(&f, "{}", invocation(executable, dir, name.as_ref()))?;
    }
    let path = f.commit()?;
    make_executable(&path)
}

/// Write `script`, with one line running `executable` on each macro in
/// `dir` that starts with `prefix`.  Returns the macros it lists.
pub fn emit(dir: &Path, prefix: &str, executable: &str, script: &Path) -> Result<Vec<String>> {
    let names = find_macros(dir, prefix)?;
    write_script(dir, &names, executable, script)?;
    Ok(names)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[test]
fn one_line_per_matching_macro() {
    let dir = tempfile::tempdir().unwrap();
    for name in &[
        "MACRO_ICESPICE_PIPS300_f50mm_g20mm.mac",
        "MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac",
        "ICESPICE.mac",
        "notes.txt",
    ] {
        std::fs::write(dir.path().join(name), "/run/initialize\n").unwrap();
    }
    std::fs::create_dir(dir.path().join("MACRO_ICESPICE_old")).unwrap();
    let script = dir.path().join("run.sh");
    let names = emit(dir.path(), "MACRO_ICESPICE", "./ICESPICE", &script).unwrap();
    assert_eq!(names.len(), 2);
    let text = std::fs::read_to_string(&script).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), names.len());
    let d = dir.path().display();
    assert_eq!(
        lines[0],
        format!("./ICESPICE {}/MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac", d)
    );
    assert_eq!(
        lines[1],
        format!("./ICESPICE {}/MACRO_ICESPICE_PIPS300_f50mm_g20mm.mac", d)
    );
}

#[test]
fn simulation_program_and_output_are_not_macros() {
    let dir = tempfile::tempdir().unwrap();
    let mut sweep = crate::sweep::Sweep::combined();
    sweep.thickness = crate::sweep::Axis::Values(vec![100.0]);
    crate::layout::generate(&sweep, dir.path(), |_, _| ()).unwrap();
    for name in &["ICESPICE", "ICESPICE_PIPS100_f50mm_g-20mm_50keV.root"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    let script = dir.path().join("run.sh");
    let names = emit(dir.path(), "ICESPICE", "./ICESPICE", &script).unwrap();
    assert_eq!(names, vec!["ICESPICE.mac".to_string()]);
    assert_eq!(
        std::fs::read_to_string(&script).unwrap(),
        format!("./ICESPICE {}/ICESPICE.mac\n", dir.path().display())
    );
}

#[test]
fn script_lists_exactly_the_names_given() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    write_script(Path::new("."), &["b.mac", "a.mac"], "./ICESPICE", &script).unwrap();
    assert_eq!(
        std::fs::read_to_string(&script).unwrap(),
        "./ICESPICE b.mac\n./ICESPICE a.mac\n"
    );
}

#[test]
fn empty_directory_gives_empty_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    let names = emit(dir.path(), "MACRO_ICESPICE", "./ICESPICE", &script).unwrap();
    assert!(names.is_empty());
    assert_eq!(std::fs::read_to_string(&script).unwrap(), "");
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    let e = emit(&dir.path().join("nope"), "MACRO", "./ICESPICE", &script).unwrap_err();
    assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
    assert!(!script.exists());
}

#[test]
fn odd_names_are_quoted() {
    assert_eq!(shell_quote("MACRO_a.mac"), "MACRO_a.mac");
    assert_eq!(shell_quote("MACRO a.mac"), "'MACRO a.mac'");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(
        invocation("./ICESPICE", Path::new("."), "MACRO_x.mac"),
        "./ICESPICE MACRO_x.mac"
    );
}

#[cfg(unix)]
#[test]
fn script_is_executable() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    emit(dir.path(), "MACRO", "./ICESPICE", &script).unwrap();
    let mode = std::fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}
