//! Post-processing toolkit for vibrational analysis and chemical
//! kinetics: takes the geometry, masses and Cartesian Hessian of a
//! converged calculation and derives normal modes, partition functions,
//! thermodynamic state functions and transition-state-theory rate
//! constants.
//!
//! The typical pipeline runs strictly upward through the modules:
//!
//! ```text
//! Molecule -> analyze() -> Modes -> PartFun::build() -> {thermo, kinetics}
//! ```
//!
//! All quantities are in Hartree atomic units; the [constants] module
//! holds the conversion factors. Parsers for the output formats of
//! electronic-structure programs are deliberately not part of this crate,
//! any frontend that fills a [Molecule](initialization::Molecule) works.

pub mod analysis;
pub mod constants;
pub mod defaults;
pub mod errors;
pub mod initialization;
pub mod io;
pub mod kinetics;
pub mod nma;
pub mod partition;
pub mod thermo;
pub mod utils;

pub use errors::{AnalysisError, Result};
pub use initialization::{Atom, Molecule};
pub use io::{Configuration, KineticsConfig, NmaConfig, PartitionConfig};
pub use kinetics::{
    equilibrium_constant, ln_rate_constant, rate_constant, reaction_analysis, ReactionRates,
    Tunneling,
};
pub use nma::{analyze, Modes, Scheme};
pub use partition::{
    Electronic, Ensemble, ModeTreatment, PartFun, PartFunRatio, Rotation, Statistics,
    Translation, Vibration,
};
pub use thermo::{evaluate, ThermoResult, ThermoScan, ThermoTable};
