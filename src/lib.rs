//! This crate writes Geant4 macros that sweep the ICESPICE detector
//! simulation over detector thickness, source and detector position,
//! and particle energy, along with a script that runs them all.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(missing_docs)]

#[macro_use]
extern crate serde_derive;

pub mod atomicfile;
pub mod command;
pub mod layout;
pub mod params;
pub mod report;
pub mod script;
pub mod sweep;
