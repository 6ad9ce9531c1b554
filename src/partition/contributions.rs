use crate::constants::{BOLTZMANN, PLANCK};
use crate::defaults;
use crate::errors::{AnalysisError, Result};
use crate::initialization::Molecule;
use crate::partition::Statistics;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The ensemble of the translational contribution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Ensemble {
    /// NpT: the kT/p volume factor makes the internal energy an enthalpy
    /// and the free energy a Gibbs free energy.
    ConstantPressure { pressure: f64 },
    /// NVT with an explicit volume per molecule in bohr^3.
    ConstantVolume { volume: f64 },
}

/// The contribution of the external translation: the classical ideal-gas
/// partition function (2 pi m kB T / h^2)^(3/2) times the volume per
/// molecule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Translation {
    /// Total mass in atomic units.
    pub mass: f64,
    pub ensemble: Ensemble,
}

impl Translation {
    pub fn new(mass: f64, ensemble: Ensemble) -> Result<Translation> {
        match ensemble {
            Ensemble::ConstantPressure { pressure } if pressure <= 0.0 => {
                return Err(AnalysisError::Domain(format!(
                    "the pressure has to be > 0, but it is {}",
                    pressure
                )))
            }
            Ensemble::ConstantVolume { volume } if volume <= 0.0 => {
                return Err(AnalysisError::Domain(format!(
                    "the volume has to be > 0, but it is {}",
                    volume
                )))
            }
            _ => {}
        }
        Ok(Translation { mass, ensemble })
    }

    /// ln of the volume per molecule at the given temperature.
    pub fn ln_volume(&self, temp: f64) -> f64 {
        match self.ensemble {
            Ensemble::ConstantPressure { pressure } => (BOLTZMANN * temp / pressure).ln(),
            Ensemble::ConstantVolume { volume } => volume.ln(),
        }
    }
}

impl Statistics for Translation {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        let thermal: f64 =
            1.5 * (2.0 * PI * self.mass * BOLTZMANN * temp / PLANCK.powi(2)).ln();
        match self.ensemble {
            // the indistinguishability term and the pV term cancel for an
            // ideal gas at constant pressure
            Ensemble::ConstantPressure { .. } => temp.powi(n) * (thermal + self.ln_volume(temp)),
            Ensemble::ConstantVolume { .. } => {
                temp.powi(n) * (1.0 + thermal + self.ln_volume(temp))
            }
        }
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        match self.ensemble {
            Ensemble::ConstantPressure { .. } => 2.5 * temp.powi(n - 1),
            Ensemble::ConstantVolume { .. } => 1.5 * temp.powi(n - 1),
        }
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        match self.ensemble {
            Ensemble::ConstantPressure { .. } => -2.5 * temp.powi(n - 2),
            Ensemble::ConstantVolume { .. } => -1.5 * temp.powi(n - 2),
        }
    }
}

/// The contribution of the external rotation in the classical high
/// temperature approximation. The number of non-vanishing principal
/// moments decides the temperature power: T for a linear rotor, T^(3/2)
/// for a general one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rotation {
    /// Principal moments of inertia in ascending order.
    pub moments: Array1<f64>,
    /// Number of moments above the threshold.
    pub count: usize,
    pub symmetry_number: usize,
    /// Temperature independent prefactor of the classical partition
    /// function.
    factor: f64,
}

impl Rotation {
    /// Build the rotational contribution of a molecule, or `None` for a
    /// single atom. Fails for periodic systems, which have no external
    /// rotation.
    pub fn new(mol: &Molecule, symmetry_number: usize) -> Result<Option<Rotation>> {
        if symmetry_number == 0 {
            return Err(AnalysisError::Domain(
                "the rotational symmetry number has to be >= 1".to_string(),
            ));
        }
        if mol.is_periodic() {
            return Err(AnalysisError::Domain(
                "there is no external rotation in periodic systems".to_string(),
            ));
        }
        let moments: Array1<f64> = mol.moments_of_inertia();
        let retained: Vec<f64> = moments
            .iter()
            .cloned()
            .filter(|moment| *moment > defaults::MOMENT_THRESHOLD)
            .collect();
        if retained.is_empty() {
            return Ok(None);
        }
        let count: usize = retained.len();
        let factor: f64 = retained
            .iter()
            .map(|moment| 2.0 * PI * moment * BOLTZMANN)
            .product::<f64>()
            .sqrt()
            / symmetry_number as f64
            / PI;
        Ok(Some(Rotation {
            moments,
            count,
            symmetry_number,
            factor,
        }))
    }
}

impl Statistics for Rotation {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        temp.powi(n) * (0.5 * self.count as f64 * temp.ln() + self.factor.ln())
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        0.5 * self.count as f64 * temp.powi(n - 1)
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        -0.5 * self.count as f64 * temp.powi(n - 2)
    }
}

/// The electronic contribution: a degeneracy-weighted Boltzmann sum over
/// the known electronic levels. Without explicit levels the ground state
/// enters alone with the spin multiplicity as its degeneracy, and the
/// contribution reduces to a temperature independent ln g.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Electronic {
    /// (energy above the reference, degeneracy) pairs.
    pub levels: Vec<(f64, f64)>,
}

impl Electronic {
    pub fn from_molecule(mol: &Molecule) -> Result<Electronic> {
        if mol.electronic_levels.is_empty() {
            if mol.multiplicity == 0 {
                return Err(AnalysisError::Domain(
                    "the spin multiplicity has to be >= 1".to_string(),
                ));
            }
            return Ok(Electronic {
                levels: vec![(0.0, mol.multiplicity as f64)],
            });
        }
        Ok(Electronic {
            levels: mol
                .electronic_levels
                .iter()
                .map(|(energy, degeneracy)| (*energy, *degeneracy as f64))
                .collect(),
        })
    }

    /// Boltzmann factors and their degeneracy-weighted moments.
    fn moments(&self, temp: f64) -> (f64, f64, f64) {
        let mut z: f64 = 0.0;
        let mut first: f64 = 0.0;
        let mut second: f64 = 0.0;
        for (energy, degeneracy) in self.levels.iter() {
            let bf: f64 = degeneracy * (-energy / (BOLTZMANN * temp)).exp();
            z += bf;
            first += bf * energy;
            second += bf * energy * energy;
        }
        (z, first / z, second / z)
    }
}

impl Statistics for Electronic {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        let (z, _first, _second) = self.moments(temp);
        temp.powi(n) * z.ln()
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        let (_z, first, _second) = self.moments(temp);
        temp.powi(n - 2) * first / BOLTZMANN
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        let (_z, first, second) = self.moments(temp);
        temp.powi(n - 4) / BOLTZMANN.powi(2) * second
            - 2.0 * temp.powi(n - 3) / BOLTZMANN * first
            - temp.powi(n - 4) / BOLTZMANN.powi(2) * first.powi(2)
    }
}
