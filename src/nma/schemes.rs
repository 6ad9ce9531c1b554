use crate::errors::{AnalysisError, Result};
use crate::initialization::Molecule;
use crate::io::NmaConfig;
use crate::nma::projection::{external_basis, orthonormalize, remove_subspace};
use ndarray::prelude::*;

/// Analysis schemes for the Hessian processor. All of them share the
/// projection-then-diagonalize skeleton and only differ in how the
/// projection basis is constructed.
#[derive(Clone, Debug)]
pub enum Scheme {
    /// Diagonalize the full mass-weighted Hessian. The external modes stay
    /// in the spectrum and are tagged as zeros by magnitude.
    Full,
    /// Project out translations, rotations and the given reaction
    /// coordinate vectors (Cartesian, length 3N) before diagonalization.
    ConstrainExt {
        reaction_coordinates: Vec<Array1<f64>>,
    },
    /// Partial Hessian vibrational analysis: the listed atoms are frozen
    /// and only the subblock of the remaining atoms is diagonalized.
    Phva { fixed: Vec<usize> },
    /// Mobile block Hessian: the listed atom blocks move as rigid bodies,
    /// all other atoms keep their Cartesian freedom.
    Mbh { blocks: Vec<Vec<usize>> },
}

impl Scheme {
    /// The plain external projection without reaction coordinates.
    pub fn constrain_ext() -> Self {
        Scheme::ConstrainExt {
            reaction_coordinates: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scheme::Full => "full",
            Scheme::ConstrainExt { .. } => "constrain-ext",
            Scheme::Phva { .. } => "phva",
            Scheme::Mbh { .. } => "mbh",
        }
    }

    /// Construct the reduced space this scheme diagonalizes in.
    pub(crate) fn reduced_space(&self, mol: &Molecule, config: &NmaConfig) -> Result<ReducedSpace> {
        match self {
            Scheme::Full => Ok(ReducedSpace {
                basis: None,
                external: None,
                expected_zeros: None,
            }),
            Scheme::ConstrainExt {
                reaction_coordinates,
            } => {
                let external: Array2<f64> =
                    external_basis(mol, reaction_coordinates, config.rank_tolerance)?;
                let expected: usize = external.ncols();
                Ok(ReducedSpace {
                    basis: None,
                    external: Some(external),
                    expected_zeros: Some(expected),
                })
            }
            Scheme::Phva { fixed } => {
                let free: Vec<usize> = free_atoms(mol, fixed)?;
                if free.is_empty() {
                    return Err(AnalysisError::InvalidInput(
                        "all atoms are fixed, nothing to analyze".to_string(),
                    ));
                }
                let mut basis: Array2<f64> = Array2::zeros([mol.size(), 3 * free.len()]);
                for (j, atom) in free.iter().enumerate() {
                    for k in 0..3 {
                        basis[[3 * atom + k, 3 * j + k]] = 1.0;
                    }
                }
                Ok(ReducedSpace {
                    basis: Some(basis),
                    external: None,
                    expected_zeros: None,
                })
            }
            Scheme::Mbh { blocks } => {
                let basis: Array2<f64> = block_basis(mol, blocks, config.rank_tolerance)?;
                let external: Array2<f64> = external_basis(mol, &[], config.rank_tolerance)?;
                let cleaned: Array2<f64> =
                    remove_subspace(&basis, &external, config.rank_tolerance);
                Ok(ReducedSpace {
                    basis: Some(cleaned),
                    external: None,
                    expected_zeros: Some(0),
                })
            }
        }
    }
}

/// The space a scheme diagonalizes the mass-weighted Hessian in.
pub(crate) struct ReducedSpace {
    /// Orthonormal subspace basis in mass-weighted coordinates, or `None`
    /// for the full Cartesian space.
    pub basis: Option<Array2<f64>>,
    /// External basis to project out symmetrically before diagonalization.
    pub external: Option<Array2<f64>>,
    /// Number of near-zero modes that must show up (and are dropped); any
    /// other count is a data inconsistency. `None` disables the check and
    /// keeps the zeros tagged in the result.
    pub expected_zeros: Option<usize>,
}

fn free_atoms(mol: &Molecule, fixed: &[usize]) -> Result<Vec<usize>> {
    let mut taken: Vec<bool> = vec![false; mol.n_atoms()];
    for atom in fixed.iter() {
        if *atom >= mol.n_atoms() {
            return Err(AnalysisError::InvalidInput(format!(
                "fixed atom index {} out of range for {} atoms",
                atom,
                mol.n_atoms()
            )));
        }
        if taken[*atom] {
            return Err(AnalysisError::InvalidInput(format!(
                "atom {} is fixed twice",
                atom
            )));
        }
        taken[*atom] = true;
    }
    Ok((0..mol.n_atoms()).filter(|i| !taken[*i]).collect())
}

/// Rigid-body basis of the mobile block scheme: per block the three
/// translations and the rotations about the block center of mass, plus the
/// Cartesian axes of every atom outside the blocks. Columns are
/// mass-weighted and orthonormalized; rotations of linear or single-atom
/// blocks drop out as rank deficiencies.
fn block_basis(mol: &Molecule, blocks: &[Vec<usize>], rank_tolerance: f64) -> Result<Array2<f64>> {
    let size: usize = mol.size();
    let mut taken: Vec<bool> = vec![false; mol.n_atoms()];
    let mut raw: Vec<Array1<f64>> = Vec::new();

    for block in blocks.iter() {
        if block.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "empty block in the mobile block scheme".to_string(),
            ));
        }
        for atom in block.iter() {
            if *atom >= mol.n_atoms() {
                return Err(AnalysisError::InvalidInput(format!(
                    "block atom index {} out of range for {} atoms",
                    atom,
                    mol.n_atoms()
                )));
            }
            if taken[*atom] {
                return Err(AnalysisError::InvalidInput(format!(
                    "atom {} appears in more than one block",
                    atom
                )));
            }
            taken[*atom] = true;
        }

        // block translations
        for k in 0..3 {
            let mut trans: Array1<f64> = Array1::zeros(size);
            for atom in block.iter() {
                trans[3 * atom + k] = mol.masses[*atom].sqrt();
            }
            raw.push(trans);
        }

        // block rotations about the block center of mass
        let block_mass: f64 = block.iter().map(|atom| mol.masses[*atom]).sum();
        let mut com: Array1<f64> = Array1::zeros(3);
        for atom in block.iter() {
            com.scaled_add(mol.masses[*atom], &mol.coordinates.slice(s![*atom, ..]));
        }
        com /= block_mass;
        for axis in 0..3 {
            let mut rot: Array1<f64> = Array1::zeros(size);
            for atom in block.iter() {
                let r: Array1<f64> = &mol.coordinates.slice(s![*atom, ..]) - &com;
                let sqm: f64 = mol.masses[*atom].sqrt();
                match axis {
                    0 => {
                        rot[3 * atom + 1] = -sqm * r[2];
                        rot[3 * atom + 2] = sqm * r[1];
                    }
                    1 => {
                        rot[3 * atom] = sqm * r[2];
                        rot[3 * atom + 2] = -sqm * r[0];
                    }
                    _ => {
                        rot[3 * atom] = -sqm * r[1];
                        rot[3 * atom + 1] = sqm * r[0];
                    }
                }
            }
            raw.push(rot);
        }
    }

    // free atoms keep their Cartesian axes
    for atom in 0..mol.n_atoms() {
        if !taken[atom] {
            for k in 0..3 {
                let mut axis: Array1<f64> = Array1::zeros(size);
                axis[3 * atom + k] = 1.0;
                raw.push(axis);
            }
        }
    }

    let mut stacked: Array2<f64> = Array2::zeros([size, raw.len()]);
    for (j, column) in raw.iter().enumerate() {
        stacked.slice_mut(s![.., j]).assign(column);
    }
    Ok(orthonormalize(stacked.view(), rank_tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NmaConfig;
    use crate::utils::tests::water_like;

    #[test]
    fn phva_selection_basis() {
        let mol = water_like();
        let config = NmaConfig::default();
        let scheme = Scheme::Phva { fixed: vec![0] };
        let space = scheme.reduced_space(&mol, &config).unwrap();
        let basis = space.basis.unwrap();
        assert_eq!(basis.shape(), &[9, 6]);
        assert!(space.expected_zeros.is_none());
    }

    #[test]
    fn phva_rejects_bad_indices() {
        let mol = water_like();
        let config = NmaConfig::default();
        assert!(Scheme::Phva { fixed: vec![7] }
            .reduced_space(&mol, &config)
            .is_err());
        assert!(Scheme::Phva { fixed: vec![0, 0] }
            .reduced_space(&mol, &config)
            .is_err());
        assert!(Scheme::Phva {
            fixed: vec![0, 1, 2]
        }
        .reduced_space(&mol, &config)
        .is_err());
    }

    #[test]
    fn single_rigid_block_leaves_no_internal_freedom() {
        let mol = water_like();
        let config = NmaConfig::default();
        let scheme = Scheme::Mbh {
            blocks: vec![vec![0, 1, 2]],
        };
        let space = scheme.reduced_space(&mol, &config).unwrap();
        // the rigid-body motion of the only block is exactly the external
        // motion of the molecule
        assert_eq!(space.basis.unwrap().ncols(), 0);
    }

    #[test]
    fn overlapping_blocks_are_rejected() {
        let mol = water_like();
        let config = NmaConfig::default();
        assert!(Scheme::Mbh {
            blocks: vec![vec![0, 1], vec![1, 2]]
        }
        .reduced_space(&mol, &config)
        .is_err());
    }
}
