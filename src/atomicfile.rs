//! Write output files so that a reader never sees half a macro.

use tempfile::TempDir;

use std::fs::{rename, File};
use std::io::{Error, ErrorKind, Result, Write};
use std::path::{Path, PathBuf};

/// A file that is written into a scratch directory next to its final
/// location, and only renamed into place once `commit` is called.  If
/// the `AtomicFile` is dropped without being committed, the partial
/// output is thrown away along with the scratch directory.
pub struct AtomicFile {
    path: PathBuf,
    dir: TempDir,
    file: File,
}

impl AtomicFile {
    /// Start writing a file, which will replace any existing file of
    /// the same name once committed.
    pub fn create<P: AsRef<Path>>(p: P) -> Result<AtomicFile> {
        let filepath = p.as_ref();
        if filepath.file_name().is_none() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Cannot create a file named {:?}", filepath),
            ));
        }
        let parent = match filepath.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let dir = TempDir::new_in(parent)?;
        let file = File::create(dir.path().join("partial"))?;
        Ok(AtomicFile {
            path: PathBuf::from(filepath),
            dir,
            file,
        })
    }

    /// Flush everything to disk and move the file into place.
    pub fn commit(mut self) -> Result<PathBuf> {
        self.file.flush()?;
        self.file.sync_data()?;
        rename(self.dir.path().join("partial"), &self.path)?;
        Ok(self.path)
    }
}

impl<'a> Write for &'a AtomicFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (&self.file).write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        (&self.file).flush()
    }
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (&self.file).write_all(buf)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.file.write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.file.write_all(buf)
    }
}

#[test]
fn committed_file_appears() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.mac");
    let mut f = AtomicFile::create(&target).unwrap();
    writeln!(f, "/run/initialize").unwrap();
    assert!(!target.exists());
    assert_eq!(f.commit().unwrap(), target);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "/run/initialize\n");
}

#[test]
fn dropped_file_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.mac");
    {
        let mut f = AtomicFile::create(&target).unwrap();
        writeln!(f, "/run/beamOn 10").unwrap();
    }
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn committing_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.mac");
    std::fs::write(&target, "old\n").unwrap();
    let f = AtomicFile::create(&target).unwrap();
    (&f).write_all(b"new\n").unwrap();
    f.commit().unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "new\n");
}
