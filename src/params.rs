//! Command-line flags and sweep files.
//!
//! A sweep starts from the defaults of its layout (or from a sweep
//! file), and any flags given on the command line override it.

use crate::atomicfile::AtomicFile;
use crate::sweep::{invalid, Axis, Layout, Sweep};
use auto_args::AutoArgs;

use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// Flags that adjust the sweep.
#[derive(AutoArgs, Debug, Default, Clone)]
pub struct SweepParams {
    /// Write the whole sweep into a single macro.
    pub combined: bool,
    /// A detector thickness in micrometers (may be repeated).
    pub thickness: Vec<f64>,
    /// A source position in mm (may be repeated).
    pub source_position: Vec<f64>,
    /// A detector position in mm (may be repeated).
    pub detector_position: Vec<f64>,
    /// A particle energy in keV (may be repeated).
    pub energy: Vec<f64>,
    /// The lowest energy in keV.
    pub energy_min: Option<f64>,
    /// The highest energy in keV.
    pub energy_max: Option<f64>,
    /// The energy step in keV.
    pub energy_step: Option<f64>,
    /// The number of events per energy.
    pub particles: Option<u64>,
    /// The prefix of macro file names.
    pub prefix: Option<String>,
}

impl SweepParams {
    /// The sweep these flags describe when no sweep file is given.
    pub fn to_sweep(&self) -> Sweep {
        let layout = if self.combined {
            Layout::Combined
        } else {
            Layout::PerGeometry
        };
        self.apply_to(Sweep::for_layout(layout))
    }

    /// Override the parts of `sweep` that were given as flags.
    pub fn apply_to(&self, mut sweep: Sweep) -> Sweep {
        if self.combined {
            sweep.layout = Layout::Combined;
        }
        if !self.thickness.is_empty() {
            sweep.thickness = Axis::Values(self.thickness.clone());
        }
        if !self.source_position.is_empty() {
            sweep.source_position = Axis::Values(self.source_position.clone());
        }
        if !self.detector_position.is_empty() {
            sweep.detector_position = Axis::Values(self.detector_position.clone());
        }
        if !self.energy.is_empty() {
            sweep.energy = Axis::Values(self.energy.clone());
        } else if self.energy_min.is_some() || self.energy_max.is_some() || self.energy_step.is_some() {
            let (start, stop, step) = bounds(&sweep.energy);
            sweep.energy = Axis::steps(
                self.energy_min.unwrap_or(start),
                self.energy_max.unwrap_or(stop),
                self.energy_step.unwrap_or(step),
            );
        }
        if let Some(particles) = self.particles {
            sweep.particles = particles;
        }
        if let Some(ref prefix) = self.prefix {
            sweep.prefix = prefix.clone();
        }
        sweep
    }
}

/// The start, stop and step of an axis, guessing a step for a list.
fn bounds(axis: &Axis) -> (f64, f64, f64) {
    match *axis {
        Axis::Steps { start, stop, step } => (start, stop, step),
        Axis::Values(ref v) => {
            let first = v.first().cloned().unwrap_or(0.0);
            let last = v.last().cloned().unwrap_or(first);
            let step = if v.len() > 1 { v[1] - v[0] } else { 1.0 };
            (first, last, step)
        }
    }
}

/// The parameters of the macro generator.
#[derive(AutoArgs, Debug)]
pub struct GenerateParams {
    /// A yaml, json or cbor file describing the sweep.
    pub sweep_file: Option<PathBuf>,
    /// sweep flags
    pub _sweep: SweepParams,
    /// The directory the macros are written to.
    pub output_dir: Option<PathBuf>,
    /// Save the sweep that was used as yaml, json or cbor.
    pub save_sweep_as: Option<PathBuf>,
    /// Also write a script running every macro.
    pub run_script: Option<PathBuf>,
    /// The simulation program the script runs.
    pub executable: Option<String>,
    /// Do not print progress.
    pub quiet: bool,
}

impl GenerateParams {
    /// The sweep to generate, reading the sweep file if there is one.
    pub fn sweep(&self) -> std::io::Result<Sweep> {
        match self.sweep_file {
            Some(ref path) => Ok(self._sweep.apply_to(load_sweep(path)?)),
            None => Ok(self._sweep.to_sweep()),
        }
    }

    /// Where the macros go.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// The parameters of the run script writer.
#[derive(AutoArgs, Debug)]
pub struct ScriptParams {
    /// The directory holding the macros.
    pub macro_dir: Option<PathBuf>,
    /// Only macros whose name starts with this are listed.
    pub prefix: Option<String>,
    /// The simulation program to run.
    pub executable: Option<String>,
    /// The script to write.
    pub script: Option<PathBuf>,
    /// Do not print progress.
    pub quiet: bool,
}

/// The program the run script invokes unless told otherwise.
pub const DEFAULT_EXECUTABLE: &str = "./ICESPICE";
/// The run script written unless told otherwise.
pub const DEFAULT_SCRIPT: &str = "run_macros.sh";

impl ScriptParams {
    /// The directory holding the macros.
    pub fn macro_dir(&self) -> PathBuf {
        self.macro_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
    /// The prefix macros must start with.
    pub fn prefix(&self) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| Sweep::per_geometry().prefix)
    }
    /// The program to run.
    pub fn executable(&self) -> String {
        self.executable
            .clone()
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string())
    }
    /// The script to write.
    pub fn script(&self) -> PathBuf {
        self.script
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|x| x.to_str())
}

fn bad_data<E: std::error::Error + Send + Sync + 'static>(path: &Path, e: E) -> Error {
    Error::new(ErrorKind::InvalidData, format!("error reading {:?}: {}", path, e))
}

/// Read a sweep from a yaml, json or cbor file.
pub fn load_sweep(path: &Path) -> std::io::Result<Sweep> {
    let f = std::fs::File::open(path)?;
    match extension(path) {
        Some("yaml") | Some("yml") => serde_yaml::from_reader(&f).map_err(|e| bad_data(path, e)),
        Some("json") => serde_json::from_reader(&f).map_err(|e| bad_data(path, e)),
        Some("cbor") => serde_cbor::from_reader(&f).map_err(|e| bad_data(path, e)),
        _ => Err(invalid(format!("I don't know how to read sweep file {:?}", path))),
    }
}

/// Save a sweep as yaml, json or cbor, depending on the extension.
pub fn save_sweep(sweep: &Sweep, path: &Path) -> std::io::Result<()> {
    let write_error = |e: String| Error::new(ErrorKind::Other, format!("error writing {:?}: {}", path, e));
    let f = AtomicFile::create(path)?;
    match extension(path) {
        Some("yaml") | Some("yml") => {
            serde_yaml::to_writer(&f, sweep).map_err(|e| write_error(e.to_string()))?
        }
        Some("json") => serde_json::to_writer_pretty(&f, sweep).map_err(|e| write_error(e.to_string()))?,
        Some("cbor") => serde_cbor::to_writer(&f, sweep).map_err(|e| write_error(e.to_string()))?,
        _ => return Err(invalid(format!("I don't know how to create sweep file {:?}", path))),
    }
    f.commit()?;
    Ok(())
}

#[test]
fn no_flags_gives_defaults() {
    assert_eq!(SweepParams::default().to_sweep(), Sweep::per_geometry());
    let p = SweepParams {
        combined: true,
        ..SweepParams::default()
    };
    assert_eq!(p.to_sweep(), Sweep::combined());
}

#[test]
fn flags_override_defaults() {
    let p = SweepParams {
        thickness: vec![500.0],
        detector_position: vec![-30.0, -40.0],
        energy_max: Some(500.0),
        particles: Some(1000),
        ..SweepParams::default()
    };
    let sweep = p.to_sweep();
    assert_eq!(sweep.thickness, Axis::Values(vec![500.0]));
    assert_eq!(sweep.source_position, Axis::Values(vec![50.0]));
    assert_eq!(sweep.energies(), vec![100.0, 200.0, 300.0, 400.0, 500.0]);
    assert_eq!(sweep.particles, 1000);
    assert_eq!(sweep.geometries().len(), 2);
}

#[test]
fn energy_bounds_from_a_list() {
    let mut sweep = Sweep::per_geometry();
    sweep.energy = Axis::Values(vec![10.0, 20.0, 30.0]);
    let p = SweepParams {
        energy_min: Some(20.0),
        ..SweepParams::default()
    };
    assert_eq!(p.apply_to(sweep).energies(), vec![20.0, 30.0]);
}

#[test]
fn sweep_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut sweep = Sweep::combined();
    sweep.thickness = Axis::Values(vec![300.0]);
    for name in &["sweep.yaml", "sweep.json", "sweep.cbor"] {
        let path = dir.path().join(name);
        save_sweep(&sweep, &path).unwrap();
        assert_eq!(load_sweep(&path).unwrap(), sweep);
    }
}

#[test]
fn unknown_extensions_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.toml");
    let e = save_sweep(&Sweep::per_geometry(), &path).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidInput);
    assert!(!path.exists());
    std::fs::write(&path, "").unwrap();
    assert_eq!(load_sweep(&path).unwrap_err().kind(), ErrorKind::InvalidInput);
}

#[test]
fn broken_sweep_file_is_invalid_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.yaml");
    std::fs::write(&path, "layout: Sideways\n").unwrap();
    assert_eq!(load_sweep(&path).unwrap_err().kind(), ErrorKind::InvalidData);
}
