use crate::defaults;
use crate::errors::{AnalysisError, Result};
use crate::initialization::Atom;
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, UPLO};
use serde::{Deserialize, Serialize};

/// The normalized input record of one analysis: geometry, masses, the
/// Cartesian Hessian and the reference energy, independent of the program
/// that produced them. Constructed once from external data and never
/// mutated; everything downstream borrows it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    /// Coordinates in bohr, one row per atom.
    pub coordinates: Array2<f64>,
    /// Atomic masses in atomic units.
    pub masses: Array1<f64>,
    /// Periodic cell vectors (3x3, rows), if the source calculation was periodic.
    pub cell: Option<Array2<f64>>,
    /// Cartesian second derivatives of the energy, 3N x 3N.
    pub hessian: Array2<f64>,
    /// Reference electronic energy in Hartree.
    pub energy: f64,
    /// Spin multiplicity 2S + 1.
    pub multiplicity: u8,
    /// Optional electronic levels as (energy above `energy`, degeneracy) pairs.
    pub electronic_levels: Vec<(f64, usize)>,
    pub title: String,
}

impl Molecule {
    /// Build a validated [Molecule] from its parts. The Hessian has to be
    /// 3N x 3N and symmetric within [defaults::HESSIAN_SYMMETRY_TOLERANCE];
    /// violations are reported, never repaired.
    pub fn new(atoms: Vec<Atom>, hessian: Array2<f64>, energy: f64) -> Result<Self> {
        if atoms.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "a molecule needs at least one atom".to_string(),
            ));
        }
        let n_atoms: usize = atoms.len();
        if hessian.nrows() != 3 * n_atoms || hessian.ncols() != 3 * n_atoms {
            return Err(AnalysisError::InvalidInput(format!(
                "the Hessian has to be {0} x {0}, but it is {1} x {2}",
                3 * n_atoms,
                hessian.nrows(),
                hessian.ncols()
            )));
        }
        let scale: f64 = hessian.iter().fold(1.0_f64, |acc, h| acc.max(h.abs()));
        let asym: f64 = (&hessian - &hessian.t())
            .iter()
            .fold(0.0_f64, |acc, d| acc.max(d.abs()));
        if asym > defaults::HESSIAN_SYMMETRY_TOLERANCE * scale {
            return Err(AnalysisError::InvalidInput(format!(
                "the Hessian is not symmetric, max |H - H^T| = {:.3e}",
                asym
            )));
        }
        for atom in atoms.iter() {
            if atom.mass <= 0.0 {
                return Err(AnalysisError::Domain(format!(
                    "the mass of atom {} has to be > 0",
                    atom.name
                )));
            }
        }

        let mut coordinates: Array2<f64> = Array2::zeros([n_atoms, 3]);
        let mut masses: Array1<f64> = Array1::zeros(n_atoms);
        for (i, atom) in atoms.iter().enumerate() {
            coordinates
                .slice_mut(s![i, ..])
                .assign(&Array1::from_iter(atom.xyz.iter().cloned()));
            masses[i] = atom.mass;
        }

        Ok(Molecule {
            atoms,
            coordinates,
            masses,
            cell: None,
            hessian,
            energy,
            multiplicity: defaults::MULTIPLICITY,
            electronic_levels: Vec::new(),
            title: String::new(),
        })
    }

    /// Attach a 3x3 periodic cell.
    pub fn with_cell(mut self, cell: Array2<f64>) -> Result<Self> {
        if cell.nrows() != 3 || cell.ncols() != 3 {
            return Err(AnalysisError::InvalidInput(format!(
                "the periodic cell has to be 3 x 3, but it is {} x {}",
                cell.nrows(),
                cell.ncols()
            )));
        }
        self.cell = Some(cell);
        Ok(self)
    }

    pub fn with_multiplicity(mut self, multiplicity: u8) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Attach explicit electronic levels as (energy, degeneracy) pairs with
    /// energies relative to the reference energy.
    pub fn with_electronic_levels(mut self, levels: Vec<(f64, usize)>) -> Result<Self> {
        for (energy, degeneracy) in levels.iter() {
            if *degeneracy == 0 {
                return Err(AnalysisError::Domain(format!(
                    "electronic level at {} Hartree has degeneracy 0",
                    energy
                )));
            }
        }
        self.electronic_levels = levels;
        Ok(self)
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Dimension of the Cartesian Hessian, 3N.
    pub fn size(&self) -> usize {
        3 * self.atoms.len()
    }

    pub fn is_periodic(&self) -> bool {
        self.cell.is_some()
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.sum()
    }

    /// Mass vector of length 3N with every atomic mass repeated for the
    /// three Cartesian components.
    pub fn masses3(&self) -> Array1<f64> {
        let mut masses: Vec<f64> = Vec::with_capacity(self.size());
        self.masses.iter().for_each(|mass| {
            for _i in 0..3 {
                masses.push(*mass);
            }
        });
        Array::from(masses)
    }

    pub fn center_of_mass(&self) -> Array1<f64> {
        let weighted: Array2<f64> = &self.coordinates * &self.masses.view().insert_axis(Axis(1));
        weighted.sum_axis(Axis(0)) / self.total_mass()
    }

    /// Inertia tensor about the center of mass.
    pub fn inertia_tensor(&self) -> Array2<f64> {
        let com: Array1<f64> = self.center_of_mass();
        let mut tensor: Array2<f64> = Array2::zeros([3, 3]);
        for (pos, mass) in self.coordinates.outer_iter().zip(self.masses.iter()) {
            let r: Array1<f64> = &pos - &com;
            let r2: f64 = r.dot(&r);
            for a in 0..3 {
                tensor[[a, a]] += mass * r2;
                for b in 0..3 {
                    tensor[[a, b]] -= mass * r[a] * r[b];
                }
            }
        }
        tensor
    }

    /// Principal moments of inertia in ascending order.
    pub fn moments_of_inertia(&self) -> Array1<f64> {
        let (moments, _axes): (Array1<f64>, Array2<f64>) =
            self.inertia_tensor().eigh(UPLO::Lower).unwrap();
        moments
    }

    /// A molecule is linear when its smallest principal moment vanishes
    /// within the given threshold.
    pub fn is_linear(&self, moment_threshold: f64) -> bool {
        self.n_atoms() >= 2 && self.moments_of_inertia()[0].abs() < moment_threshold
    }

    /// Number of external degrees of freedom: 3 translations plus the
    /// rotations supported by the geometry. Periodic systems only have
    /// the translations.
    pub fn external_count(&self, moment_threshold: f64) -> usize {
        if self.is_periodic() || self.n_atoms() == 1 {
            3
        } else if self.is_linear(moment_threshold) {
            5
        } else {
            6
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AMU, ANGSTROM};
    use crate::initialization::Atom;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn water_atoms() -> Vec<Atom> {
        vec![
            Atom::new("O", Vector3::new(0.0, 0.0, 0.0)).unwrap(),
            Atom::new("H", Vector3::new(0.0, 1.43, 1.108)).unwrap(),
            Atom::new("H", Vector3::new(0.0, -1.43, 1.108)).unwrap(),
        ]
    }

    #[test]
    fn construction_and_shape_checks() {
        let atoms = water_atoms();
        assert!(Molecule::new(atoms.clone(), Array2::zeros([8, 8]), 0.0).is_err());
        let mol = Molecule::new(atoms, Array2::zeros([9, 9]), -76.4).unwrap();
        assert_eq!(mol.n_atoms(), 3);
        assert_eq!(mol.size(), 9);
        assert_relative_eq!(
            mol.total_mass() / AMU,
            15.9949146221 + 2.0 * 1.0078250319,
            epsilon = 1e-10
        );
    }

    #[test]
    fn asymmetric_hessian_is_rejected() {
        let mut hessian: Array2<f64> = Array2::zeros([9, 9]);
        hessian[[0, 1]] = 1.0;
        assert!(Molecule::new(water_atoms(), hessian, 0.0).is_err());
    }

    #[test]
    fn water_is_bent() {
        let mol = Molecule::new(water_atoms(), Array2::zeros([9, 9]), 0.0).unwrap();
        assert!(!mol.is_linear(crate::defaults::MOMENT_THRESHOLD));
        assert_eq!(mol.external_count(crate::defaults::MOMENT_THRESHOLD), 6);
    }

    #[test]
    fn carbon_dioxide_is_linear() {
        let d: f64 = 1.16 * ANGSTROM;
        let atoms = vec![
            Atom::new("O", Vector3::new(0.0, 0.0, -d)).unwrap(),
            Atom::new("C", Vector3::new(0.0, 0.0, 0.0)).unwrap(),
            Atom::new("O", Vector3::new(0.0, 0.0, d)).unwrap(),
        ];
        let mol = Molecule::new(atoms, Array2::zeros([9, 9]), 0.0).unwrap();
        assert!(mol.is_linear(crate::defaults::MOMENT_THRESHOLD));
        assert_eq!(mol.external_count(crate::defaults::MOMENT_THRESHOLD), 5);
    }

    #[test]
    fn center_of_mass_of_homonuclear_dimer() {
        let atoms = vec![
            Atom::new("N", Vector3::new(0.0, 0.0, 0.0)).unwrap(),
            Atom::new("N", Vector3::new(0.0, 0.0, 2.0)).unwrap(),
        ];
        let mol = Molecule::new(atoms, Array2::zeros([6, 6]), 0.0).unwrap();
        let com = mol.center_of_mass();
        assert_relative_eq!(com[2], 1.0, epsilon = 1e-12);
    }
}
