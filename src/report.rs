//! Progress reports printed while files are written.

use std::path::Path;
use std::time;

/// The git version of this build.
pub const VERSION: &str = git_version::git_version!(args = ["--always", "--dirty"], fallback = "unknown");

/// Keeps track of what has been written, and tells the user about it
/// unless they asked for quiet.
#[derive(Debug)]
pub struct Report {
    start: time::Instant,
    files: usize,
    lines: usize,
    /// The user has requested that nothing be printed!
    pub quiet: bool,
}

impl Report {
    /// Start reporting, announcing which version is running.
    pub fn new(quiet: bool) -> Report {
        if !quiet {
            println!("git version: {}", VERSION);
        }
        Report {
            start: time::Instant::now(),
            files: 0,
            lines: 0,
            quiet,
        }
    }

    /// A file with this many lines has been written.
    pub fn wrote(&mut self, path: &Path, lines: usize) {
        self.files += 1;
        self.lines += lines;
        if !self.quiet {
            println!("[{}] wrote {:?} ({} lines)", self.files, path, lines);
        }
    }

    /// Print a summary of everything written.
    pub fn finish(&self) {
        if self.quiet {
            return;
        }
        println!(
            "Wrote {} file{} ({} lines) in {}",
            self.files,
            if self.files == 1 { "" } else { "s" },
            self.lines,
            format_duration(self.start.elapsed())
        );
    }

    /// The number of files written so far.
    pub fn files(&self) -> usize {
        self.files
    }
}

/// Note something the user should look at, on stderr.  Warnings are
/// printed even when quiet.
pub fn warn(msg: &str) {
    eprintln!("{}", warning(msg));
}

fn warning(msg: &str) -> String {
    format!("warning: {}", msg)
}

fn format_duration(t: time::Duration) -> String {
    let secs = t.as_secs();
    let mins = secs / 60;
    if mins >= 1 {
        format!("{} minutes {} seconds", mins, secs % 60)
    } else if secs >= 1 {
        format!("{:.1} seconds", t.as_secs_f64())
    } else {
        format!("{} ms", t.as_millis())
    }
}

#[test]
fn durations_read_naturally() {
    assert_eq!(format_duration(time::Duration::from_millis(12)), "12 ms");
    assert_eq!(format_duration(time::Duration::from_millis(2500)), "2.5 seconds");
    assert_eq!(format_duration(time::Duration::from_secs(125)), "2 minutes 5 seconds");
}

#[test]
fn report_counts_files() {
    let mut r = Report::new(true);
    r.wrote(Path::new("a.mac"), 10);
    r.wrote(Path::new("b.mac"), 5);
    assert_eq!(r.files(), 2);
    assert_eq!(r.lines, 15);
}

#[test]
fn warnings_are_labelled() {
    assert_eq!(warning("no macros"), "warning: no macros");
}
