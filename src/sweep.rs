//! The parameters we sweep over, and the order we visit them in.

use std::io::{Error, ErrorKind, Result};

/// Thickness of the PIPS detector in micrometers.
pub type Micrometers = f64;
/// A position along the beam axis in millimeters.
pub type Millimeters = f64;
/// A particle energy in keV.
pub type KeV = f64;

/// Tolerance used when deciding whether `stop` lies on a step grid.
const GRID_TOLERANCE: f64 = 1e-9;

/// The most values a single axis may hold.
pub const MAX_AXIS_VALUES: usize = 1_000_000;

/// One axis of a sweep.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Axis {
    /// An explicit list of values, visited in order.
    Values(Vec<f64>),
    /// `start`, `start + step`, ... up to and including `stop` when it
    /// falls on the grid.
    Steps {
        /// The first value.
        start: f64,
        /// The last value we may reach.
        stop: f64,
        /// The increment, which may be negative.
        step: f64,
    },
}

impl Axis {
    /// An inclusive arithmetic progression.
    pub fn steps(start: f64, stop: f64, step: f64) -> Axis {
        Axis::Steps { start, stop, step }
    }

    /// All the values on this axis.  A `Steps` axis that cannot reach
    /// `stop` is empty, which `check` reports.
    pub fn values(&self) -> Vec<f64> {
        match *self {
            Axis::Values(ref v) => v.iter().map(|&x| tidy(x)).collect(),
            Axis::Steps { start, stop, step } => match step_count(start, stop, step) {
                Some(count) if count <= MAX_AXIS_VALUES as f64 => (0..count as usize)
                    .map(|i| tidy(start + i as f64 * step))
                    .collect(),
                _ => Vec::new(),
            },
        }
    }

    /// Make sure this axis describes at least one value.
    pub fn check(&self, name: &str) -> Result<()> {
        if let Axis::Steps { start, stop, step } = *self {
            if step == 0.0 || !step.is_finite() {
                return Err(invalid(format!("{} step must be non-zero, not {}", name, step)));
            }
            if (stop - start) * step < 0.0 {
                return Err(invalid(format!(
                    "{} step {} never gets from {} to {}",
                    name, step, start, stop
                )));
            }
            if let Some(count) = step_count(start, stop, step) {
                if count > MAX_AXIS_VALUES as f64 {
                    return Err(invalid(format!(
                        "{} would have {} values, more than {}",
                        name, count, MAX_AXIS_VALUES
                    )));
                }
            }
        }
        let values = self.values();
        if values.is_empty() {
            return Err(invalid(format!("{} has no values", name)));
        }
        if let Some(x) = values.iter().find(|x| !x.is_finite()) {
            return Err(invalid(format!("{} value {} is not a number", name, x)));
        }
        Ok(())
    }
}

/// How many values `start..=stop` holds in steps of `step`, or `None`
/// if `step` never gets there.
fn step_count(start: f64, stop: f64, step: f64) -> Option<f64> {
    let span = (stop - start) / step;
    if step == 0.0 || !span.is_finite() || span < -GRID_TOLERANCE {
        None
    } else {
        Some((span + GRID_TOLERANCE).floor() + 1.0)
    }
}

/// Strip floating point noise from a grid value, so that it prints as
/// `0.3` rather than `0.30000000000000004`, and never as `-0`.
fn tidy(x: f64) -> f64 {
    let rounded = (x * 1e9).round() / 1e9;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub(crate) fn invalid(msg: String) -> Error {
    Error::new(ErrorKind::InvalidInput, msg)
}

/// How the macros of a sweep are laid out on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One macro per detector geometry, sweeping energy inside it.
    PerGeometry,
    /// The whole sweep in one macro.
    Combined,
}

/// A single detector geometry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// The PIPS detector thickness.
    pub thickness: Micrometers,
    /// Where the source sits ("f" in file names).
    pub source_position: Millimeters,
    /// Where the detector face sits ("g" in file names).
    pub detector_position: Millimeters,
}

/// A complete description of a parameter sweep.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sweep {
    /// How the output is split into files.
    pub layout: Layout,
    /// Detector thicknesses.
    pub thickness: Axis,
    /// Source positions.
    pub source_position: Axis,
    /// Detector positions.
    pub detector_position: Axis,
    /// Particle energies.
    pub energy: Axis,
    /// Events simulated per energy.
    pub particles: u64,
    /// Prefix of the macro file name(s).
    pub prefix: String,
}

/// The thicknesses of the PIPS detectors we own.
pub const PIPS_THICKNESSES: [Micrometers; 4] = [100.0, 300.0, 500.0, 1000.0];

impl Sweep {
    /// The sweep that writes one macro per geometry.
    pub fn per_geometry() -> Sweep {
        Sweep {
            layout: Layout::PerGeometry,
            thickness: Axis::Values(PIPS_THICKNESSES.to_vec()),
            source_position: Axis::Values(vec![50.0]),
            detector_position: Axis::steps(-20.0, -60.0, -5.0),
            energy: Axis::steps(100.0, 2000.0, 100.0),
            particles: 50_000,
            prefix: "MACRO_ICESPICE".to_string(),
        }
    }

    /// The sweep that writes everything into `ICESPICE.mac`.
    pub fn combined() -> Sweep {
        Sweep {
            layout: Layout::Combined,
            thickness: Axis::Values(PIPS_THICKNESSES.to_vec()),
            source_position: Axis::Values(vec![50.0]),
            detector_position: Axis::steps(-20.0, -60.0, -5.0),
            energy: Axis::steps(50.0, 2000.0, 50.0),
            particles: 10_000,
            prefix: "ICESPICE".to_string(),
        }
    }

    /// The default sweep for a layout.
    pub fn for_layout(layout: Layout) -> Sweep {
        match layout {
            Layout::PerGeometry => Sweep::per_geometry(),
            Layout::Combined => Sweep::combined(),
        }
    }

    /// Every geometry, thickness first, then source position, then
    /// detector position.
    pub fn geometries(&self) -> Vec<Geometry> {
        let sources = self.source_position.values();
        let detectors = self.detector_position.values();
        let mut out = Vec::new();
        for thickness in self.thickness.values() {
            for &source_position in sources.iter() {
                for &detector_position in detectors.iter() {
                    out.push(Geometry {
                        thickness,
                        source_position,
                        detector_position,
                    });
                }
            }
        }
        out
    }

    /// The energies visited for each geometry.
    pub fn energies(&self) -> Vec<KeV> {
        self.energy.values()
    }

    /// Check the sweep against what the ICESPICE detector messenger
    /// will accept.
    pub fn check(&self) -> Result<()> {
        self.thickness.check("thickness")?;
        self.source_position.check("source position")?;
        self.detector_position.check("detector position")?;
        self.energy.check("energy")?;
        let geometries = self.thickness.values().len() as f64
            * self.source_position.values().len() as f64
            * self.detector_position.values().len() as f64;
        if geometries * self.energies().len() as f64 > MAX_AXIS_VALUES as f64 {
            return Err(invalid(format!(
                "{} geometries at {} energies is more than {} runs",
                geometries,
                self.energies().len(),
                MAX_AXIS_VALUES
            )));
        }
        for t in self.thickness.values() {
            if !(t > 0.0 && t <= 3000.0) {
                return Err(invalid(format!(
                    "thickness {} um is outside (0, 3000]",
                    t
                )));
            }
        }
        for g in self.detector_position.values() {
            if !(g > -100.0 && g <= 0.0) {
                return Err(invalid(format!(
                    "detector position {} mm is outside (-100, 0]",
                    g
                )));
            }
        }
        if let Some(e) = self.energies().into_iter().find(|&e| e <= 0.0) {
            return Err(invalid(format!("energy {} keV is not positive", e)));
        }
        if self.particles == 0 {
            return Err(invalid("particles must be at least 1".to_string()));
        }
        if self.prefix.is_empty() || self.prefix.contains('/') {
            return Err(invalid(format!("bad file prefix {:?}", self.prefix)));
        }
        Ok(())
    }
}

#[test]
fn steps_include_stop() {
    assert_eq!(
        Axis::steps(-20.0, -60.0, -5.0).values(),
        vec![-20.0, -25.0, -30.0, -35.0, -40.0, -45.0, -50.0, -55.0, -60.0]
    );
    let energies = Axis::steps(50.0, 2000.0, 50.0).values();
    assert_eq!(energies.len(), 40);
    assert_eq!(energies[0], 50.0);
    assert_eq!(energies[39], 2000.0);
}

#[test]
fn steps_off_grid_stop_early() {
    assert_eq!(Axis::steps(0.0, 1.0, 0.3).values(), vec![0.0, 0.3, 0.6, 0.9]);
}

#[test]
fn steps_in_wrong_direction_are_rejected() {
    let axis = Axis::steps(-20.0, -60.0, 5.0);
    assert!(axis.values().is_empty());
    assert_eq!(
        axis.check("detector position").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert!(Axis::steps(1.0, 2.0, 0.0).check("energy").is_err());
}

#[test]
fn huge_axes_are_rejected() {
    let e = Axis::steps(1.0, 1e30, 1.0).check("energy").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidInput);
    assert!(e.to_string().contains("more than"));
    assert!(Axis::steps(1.0, 1e30, 1.0).values().is_empty());

    let mut sweep = Sweep::per_geometry();
    sweep.energy = Axis::steps(1.0, 1e12, 1.0);
    assert!(sweep.check().is_err());

    let mut sweep = Sweep::combined();
    sweep.energy = Axis::steps(1.0, 100_000.0, 1.0);
    assert!(sweep.check().unwrap_err().to_string().contains("runs"));

    let edge = Axis::steps(1.0, MAX_AXIS_VALUES as f64, 1.0);
    edge.check("energy").unwrap();
    assert_eq!(edge.values().len(), MAX_AXIS_VALUES);
    assert!(Axis::steps(0.0, MAX_AXIS_VALUES as f64, 1.0).check("energy").is_err());
}

#[test]
fn geometries_are_thickness_major() {
    let mut sweep = Sweep::per_geometry();
    sweep.source_position = Axis::Values(vec![40.0, 50.0]);
    let g = sweep.geometries();
    assert_eq!(g.len(), 4 * 2 * 9);
    assert_eq!(
        g[0],
        Geometry {
            thickness: 100.0,
            source_position: 40.0,
            detector_position: -20.0
        }
    );
    assert_eq!(g[1].detector_position, -25.0);
    assert_eq!(g[9].source_position, 50.0);
    assert_eq!(g[18].thickness, 300.0);
}

#[test]
fn defaults_pass_check() {
    Sweep::per_geometry().check().unwrap();
    Sweep::combined().check().unwrap();
    assert_eq!(Sweep::per_geometry().energies().len(), 20);
}

#[test]
fn out_of_range_values_are_rejected() {
    let mut sweep = Sweep::per_geometry();
    sweep.thickness = Axis::Values(vec![100.0, 5000.0]);
    let e = sweep.check().unwrap_err();
    assert!(e.to_string().contains("5000"));

    let mut sweep = Sweep::per_geometry();
    sweep.detector_position = Axis::Values(vec![20.0]);
    assert!(sweep.check().is_err());

    let mut sweep = Sweep::combined();
    sweep.energy = Axis::Values(vec![0.0]);
    assert!(sweep.check().is_err());

    let mut sweep = Sweep::combined();
    sweep.particles = 0;
    assert!(sweep.check().is_err());
}
