//! Lines of the Geant4 macro language that ICESPICE understands.

use crate::sweep::{KeV, Micrometers, Millimeters};
use std::fmt;

/// A single macro command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `/control/verbose`
    ControlVerbose(u32),
    /// `/run/verbose`
    RunVerbose(u32),
    /// `/event/verbose`
    EventVerbose(u32),
    /// `/run/initialize`
    RunInitialize,
    /// Set the PIPS thickness (the messenger's unit is micrometer).
    DetectorThickness(Micrometers),
    /// Set the detector face position (the messenger's unit is mm).
    DetectorPosition(Millimeters),
    /// Move the particle gun along the beam axis.
    GunPosition(Millimeters),
    /// Set the particle gun energy.
    GunEnergy(KeV),
    /// Set the energy of the ICESPICE source generator.
    SourceEnergy(KeV),
    /// Name the ROOT file the next run writes to.
    SetFileName(String),
    /// Simulate this many events.
    BeamOn(u64),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::ControlVerbose(v) => write!(f, "/control/verbose {}", v),
            Command::RunVerbose(v) => write!(f, "/run/verbose {}", v),
            Command::EventVerbose(v) => write!(f, "/event/verbose {}", v),
            Command::RunInitialize => write!(f, "/run/initialize"),
            Command::DetectorThickness(t) => write!(f, "/ICESPICE/Detector/Thickness {}", t),
            Command::DetectorPosition(z) => write!(f, "/ICESPICE/Detector/Position {}", z),
            Command::GunPosition(z) => write!(f, "/gun/position 0 0 {} mm", z),
            Command::GunEnergy(e) => write!(f, "/gun/energy {} keV", e),
            Command::SourceEnergy(e) => write!(f, "/ICESPICE/source/Energy {}", e),
            Command::SetFileName(name) => write!(f, "/analysis/setFileName {}", name),
            Command::BeamOn(n) => write!(f, "/run/beamOn {}", n),
        }
    }
}

/// The commands every macro starts with.
pub fn header() -> Vec<Command> {
    vec![
        Command::ControlVerbose(1),
        Command::RunVerbose(0),
        Command::EventVerbose(0),
        Command::RunInitialize,
    ]
}

#[test]
fn numbers_print_short() {
    assert_eq!(
        Command::DetectorThickness(100.0).to_string(),
        "/ICESPICE/Detector/Thickness 100"
    );
    assert_eq!(
        Command::DetectorPosition(-22.5).to_string(),
        "/ICESPICE/Detector/Position -22.5"
    );
    assert_eq!(Command::GunEnergy(150.0).to_string(), "/gun/energy 150 keV");
    assert_eq!(Command::GunPosition(50.0).to_string(), "/gun/position 0 0 50 mm");
    assert_eq!(Command::BeamOn(50_000).to_string(), "/run/beamOn 50000");
}

#[test]
fn header_initializes_last() {
    let h = header();
    assert_eq!(h.len(), 4);
    assert_eq!(h[0].to_string(), "/control/verbose 1");
    assert_eq!(h.last(), Some(&Command::RunInitialize));
}
