//! Turning a sweep into macro files.
//!
//! Building the macros is separate from writing them, so that a sweep
//! whose file names collide is rejected before anything touches the
//! disk.

use crate::atomicfile::AtomicFile;
use crate::command::{header, Command};
use crate::sweep::{invalid, Geometry, KeV, Layout, Sweep};

use std::collections::HashSet;
use std::io::{Result, Write};
use std::path::{Path, PathBuf};

/// A macro that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroFile {
    /// The file name, without any directory.
    pub name: String,
    /// The commands, one per line.
    pub commands: Vec<Command>,
}

impl MacroFile {
    /// The text of the macro.
    pub fn text(&self) -> String {
        let mut s = String::new();
        for c in self.commands.iter() {
            s.push_str(&c.to_string());
            s.push('\n');
        }
        s
    }

    /// Write the macro into `dir`, returning its path.
    pub fn write_in(&self, dir: &Path) -> Result<PathBuf> {
        let f = AtomicFile::create(dir.join(&self.name))?;
        (&f).write_all(self.text().as_bytes())?;
        f.commit()
    }
}

/// The label of a geometry used in per-geometry file names.  The
/// detector sits at negative positions, so only its distance is
/// encoded.
pub fn geometry_label(g: &Geometry) -> String {
    format!(
        "PIPS{}_f{}mm_g{}mm",
        g.thickness,
        g.source_position,
        g.detector_position.abs()
    )
}

/// The name of the macro holding a single geometry.
pub fn macro_name(prefix: &str, g: &Geometry) -> String {
    format!("{}_{}.mac", prefix, geometry_label(g))
}

fn run_name(layout: Layout, g: &Geometry, energy: KeV) -> String {
    match layout {
        Layout::PerGeometry => format!("ICESPICE_{}_{}keV.root", geometry_label(g), energy),
        Layout::Combined => format!(
            "ICESPICE_PIPS{}_f{}mm_g{}mm_{}keV.root",
            g.thickness, g.source_position, g.detector_position, energy
        ),
    }
}

fn per_geometry(sweep: &Sweep) -> Vec<MacroFile> {
    let energies = sweep.energies();
    sweep
        .geometries()
        .iter()
        .map(|g| {
            let mut commands = header();
            commands.push(Command::DetectorThickness(g.thickness));
            commands.push(Command::DetectorPosition(g.detector_position));
            commands.push(Command::GunPosition(g.source_position));
            for &e in energies.iter() {
                commands.push(Command::SetFileName(run_name(Layout::PerGeometry, g, e)));
                commands.push(Command::GunEnergy(e));
                commands.push(Command::BeamOn(sweep.particles));
            }
            MacroFile {
                name: macro_name(&sweep.prefix, g),
                commands,
            }
        })
        .collect()
}

fn combined(sweep: &Sweep) -> MacroFile {
    let sources = sweep.source_position.values();
    let detectors = sweep.detector_position.values();
    let energies = sweep.energies();
    let mut commands = header();
    for thickness in sweep.thickness.values() {
        commands.push(Command::DetectorThickness(thickness));
        for &source_position in sources.iter() {
            for &detector_position in detectors.iter() {
                commands.push(Command::DetectorPosition(detector_position));
                let g = Geometry {
                    thickness,
                    source_position,
                    detector_position,
                };
                for &e in energies.iter() {
                    commands.push(Command::SourceEnergy(e));
                    commands.push(Command::SetFileName(run_name(Layout::Combined, &g, e)));
                    commands.push(Command::BeamOn(sweep.particles));
                }
            }
        }
    }
    MacroFile {
        name: format!("{}.mac", sweep.prefix),
        commands,
    }
}

/// Build every macro of a sweep, refusing sweeps that are out of range
/// or whose macro or run output names collide.
pub fn build(sweep: &Sweep) -> Result<Vec<MacroFile>> {
    sweep.check()?;
    let macros = match sweep.layout {
        Layout::PerGeometry => per_geometry(sweep),
        Layout::Combined => vec![combined(sweep)],
    };
    check_unique(&macros)?;
    Ok(macros)
}

fn check_unique(macros: &[MacroFile]) -> Result<()> {
    let mut names = HashSet::new();
    let mut runs = HashSet::new();
    for m in macros.iter() {
        if !names.insert(m.name.as_str()) {
            return Err(invalid(format!("two macros would be named {}", m.name)));
        }
        for c in m.commands.iter() {
            if let Command::SetFileName(run) = c {
                if !runs.insert(run.as_str()) {
                    return Err(invalid(format!("two runs would write to {}", run)));
                }
            }
        }
    }
    Ok(())
}

/// Build and write every macro of a sweep into `dir`, calling `wrote`
/// after each file lands.
pub fn generate<F: FnMut(&Path, &MacroFile)>(
    sweep: &Sweep,
    dir: &Path,
    mut wrote: F,
) -> Result<Vec<PathBuf>> {
    let macros = build(sweep)?;
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(macros.len());
    for m in macros.iter() {
        let path = m.write_in(dir)?;
        wrote(&path, m);
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
fn scenario_geometry() -> Geometry {
    Geometry {
        thickness: 100.0,
        source_position: 50.0,
        detector_position: -20.0,
    }
}

#[test]
fn scenario_file_name() {
    assert_eq!(
        macro_name("MACRO_ICESPICE", &scenario_geometry()),
        "MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac"
    );
}

#[test]
fn one_macro_per_geometry() {
    let sweep = Sweep::per_geometry();
    let macros = build(&sweep).unwrap();
    assert_eq!(macros.len(), sweep.geometries().len());
    assert_eq!(macros.len(), 4 * 9);
    for (m, g) in macros.iter().zip(sweep.geometries().iter()) {
        assert_eq!(m.name, macro_name(&sweep.prefix, g));
        assert_eq!(m.commands.len(), header().len() + 3 + 3 * 20);
    }
}

#[test]
fn scenario_energy_sweep() {
    let macros = build(&Sweep::per_geometry()).unwrap();
    let m = &macros[0];
    assert_eq!(m.name, "MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac");
    let text = m.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[4], "/ICESPICE/Detector/Thickness 100");
    assert_eq!(lines[5], "/ICESPICE/Detector/Position -20");
    assert_eq!(lines[6], "/gun/position 0 0 50 mm");
    let energies: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with("/gun/energy"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(energies.len(), 20);
    for (k, &i) in energies.iter().enumerate() {
        assert_eq!(lines[i], format!("/gun/energy {} keV", 100 * (k + 1)));
        assert_eq!(lines[i + 1], "/run/beamOn 50000");
    }
    assert_eq!(
        lines[7],
        "/analysis/setFileName ICESPICE_PIPS100_f50mm_g20mm_100keV.root"
    );
}

#[test]
fn combined_matches_nested_loops() {
    let sweep = Sweep::combined();
    let macros = build(&sweep).unwrap();
    assert_eq!(macros.len(), 1);
    let m = &macros[0];
    assert_eq!(m.name, "ICESPICE.mac");
    assert_eq!(m.commands.len(), 4 + 4 * (1 + 9 * (1 + 40 * 3)));
    let text = m.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        &lines[..10],
        &[
            "/control/verbose 1",
            "/run/verbose 0",
            "/event/verbose 0",
            "/run/initialize",
            "/ICESPICE/Detector/Thickness 100",
            "/ICESPICE/Detector/Position -20",
            "/ICESPICE/source/Energy 50",
            "/analysis/setFileName ICESPICE_PIPS100_f50mm_g-20mm_50keV.root",
            "/run/beamOn 10000",
            "/ICESPICE/source/Energy 100",
        ]
    );
    assert_eq!(
        lines.last(),
        Some(&"/run/beamOn 10000")
    );
    assert!(text.contains("/analysis/setFileName ICESPICE_PIPS1000_f50mm_g-60mm_2000keV.root\n"));
}

#[test]
fn both_layouts_name_root_files() {
    for sweep in &[Sweep::per_geometry(), Sweep::combined()] {
        for m in build(sweep).unwrap().iter() {
            for c in m.commands.iter() {
                if let Command::SetFileName(run) = c {
                    assert!(run.starts_with("ICESPICE_PIPS"), "{}", run);
                    assert!(run.ends_with("keV.root"), "{}", run);
                }
            }
        }
    }
}

#[test]
fn colliding_names_are_rejected() {
    let mut sweep = Sweep::per_geometry();
    sweep.detector_position = crate::sweep::Axis::Values(vec![-20.0, -20.0]);
    let e = build(&sweep).unwrap_err();
    assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput);
    assert!(e.to_string().contains("MACRO_ICESPICE_PIPS100_f50mm_g20mm.mac"));

    let mut sweep = Sweep::combined();
    sweep.energy = crate::sweep::Axis::Values(vec![100.0, 200.0, 100.0]);
    assert!(build(&sweep).is_err());
}

#[test]
fn generate_writes_every_macro() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("macros");
    let mut sweep = Sweep::per_geometry();
    sweep.thickness = crate::sweep::Axis::Values(vec![100.0]);
    let mut seen = 0;
    let paths = generate(&sweep, &out, |_, _| seen += 1).unwrap();
    assert_eq!(paths.len(), 9);
    assert_eq!(seen, 9);
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 9);
    let text = std::fs::read_to_string(out.join("MACRO_ICESPICE_PIPS100_f50mm_g60mm.mac")).unwrap();
    assert_eq!(text.lines().count(), 7 + 3 * 20);
}

#[test]
fn nothing_is_written_for_a_bad_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let mut sweep = Sweep::per_geometry();
    sweep.thickness = crate::sweep::Axis::Values(vec![0.0]);
    assert!(generate(&sweep, dir.path(), |_, _| ()).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
