use crate::errors::{AnalysisError, Result};
use crate::initialization::Molecule;
use ndarray::prelude::*;
use ndarray_linalg::{Eigh, SVD, UPLO};

/// Orthonormal basis (columns) of the external degrees of freedom in
/// mass-weighted coordinates: the three translations, the rotations about
/// the principal axes through the center of mass (skipped for periodic
/// systems and single atoms) and optional reaction-coordinate vectors
/// supplied in Cartesian coordinates. Rank deficiencies, e.g. the missing
/// rotation of a linear molecule, are removed by the SVD.
pub(crate) fn external_basis(
    mol: &Molecule,
    reaction_coordinates: &[Array1<f64>],
    rank_tolerance: f64,
) -> Result<Array2<f64>> {
    let size: usize = mol.size();
    let mut raw: Vec<Array1<f64>> = Vec::new();

    for k in 0..3 {
        let mut trans: Array1<f64> = Array1::zeros(size);
        for (i, mass) in mol.masses.iter().enumerate() {
            trans[3 * i + k] = mass.sqrt();
        }
        raw.push(trans);
    }

    if !mol.is_periodic() && mol.n_atoms() > 1 {
        let com: Array1<f64> = mol.center_of_mass();
        let (_moments, axes): (Array1<f64>, Array2<f64>) =
            mol.inertia_tensor().eigh(UPLO::Lower).unwrap();
        for axis in axes.columns() {
            let mut rot: Array1<f64> = Array1::zeros(size);
            for (i, (pos, mass)) in mol
                .coordinates
                .outer_iter()
                .zip(mol.masses.iter())
                .enumerate()
            {
                let r: Array1<f64> = &pos - &com;
                rot[3 * i] = mass.sqrt() * (axis[1] * r[2] - axis[2] * r[1]);
                rot[3 * i + 1] = mass.sqrt() * (axis[2] * r[0] - axis[0] * r[2]);
                rot[3 * i + 2] = mass.sqrt() * (axis[0] * r[1] - axis[1] * r[0]);
            }
            raw.push(rot);
        }
    }

    for rc in reaction_coordinates.iter() {
        if rc.len() != size {
            return Err(AnalysisError::InvalidInput(format!(
                "a reaction coordinate vector has length {}, expected {}",
                rc.len(),
                size
            )));
        }
        let mut vector: Array1<f64> = rc.clone();
        for (i, mass) in mol.masses.iter().enumerate() {
            for k in 0..3 {
                vector[3 * i + k] *= mass.sqrt();
            }
        }
        raw.push(vector);
    }

    let mut stacked: Array2<f64> = Array2::zeros([size, raw.len()]);
    for (j, column) in raw.iter().enumerate() {
        stacked.slice_mut(s![.., j]).assign(column);
    }
    Ok(orthonormalize(stacked.view(), rank_tolerance))
}

/// Orthonormalize the columns of a basis with an SVD. Singular values
/// below `rank_tolerance` times the largest one are dropped as rank
/// deficiencies. The reference scale never drops below one, so a basis
/// that is numerically zero altogether comes back empty instead of being
/// rescued by its own rounding noise.
pub(crate) fn orthonormalize(basis: ArrayView2<f64>, rank_tolerance: f64) -> Array2<f64> {
    let (u, sigma, _vt): (Option<Array2<f64>>, Array1<f64>, Option<Array2<f64>>) =
        basis.svd(true, false).unwrap();
    let u: Array2<f64> = u.unwrap();
    let sigma_max: f64 = sigma.iter().fold(0.0_f64, |acc, s| acc.max(*s));
    let cutoff: f64 = rank_tolerance * sigma_max.max(1.0);
    let rank: usize = sigma.iter().filter(|s| **s > cutoff).count();
    u.slice(s![.., ..rank]).to_owned()
}

/// Symmetric projection of a matrix onto the orthogonal complement of the
/// span of `basis`: (I - P) H (I - P) with P = D D^T.
pub(crate) fn project_out(hessian: &Array2<f64>, basis: &Array2<f64>) -> Array2<f64> {
    let projector: Array2<f64> = Array2::eye(hessian.nrows()) - basis.dot(&basis.t());
    projector.dot(hessian).dot(&projector)
}

/// Remove the span of `external` from the columns of `basis` and
/// re-orthonormalize what is left.
pub(crate) fn remove_subspace(
    basis: &Array2<f64>,
    external: &Array2<f64>,
    rank_tolerance: f64,
) -> Array2<f64> {
    let overlap: Array2<f64> = external.t().dot(basis);
    let cleaned: Array2<f64> = basis - &external.dot(&overlap);
    orthonormalize(cleaned.view(), rank_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::utils::tests::{co2_like, n2_like, water_like};
    use approx::assert_relative_eq;

    fn check_orthonormal(basis: &Array2<f64>) {
        let overlap: Array2<f64> = basis.t().dot(basis);
        let eye: Array2<f64> = Array2::eye(basis.ncols());
        for (a, b) in overlap.iter().zip(eye.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-8);
        }
    }

    #[test]
    fn bent_molecule_has_six_external_modes() {
        let mol = water_like();
        let basis = external_basis(&mol, &[], defaults::RANK_TOLERANCE).unwrap();
        assert_eq!(basis.ncols(), 6);
        check_orthonormal(&basis);
    }

    #[test]
    fn linear_molecule_has_five_external_modes() {
        let mol = co2_like();
        let basis = external_basis(&mol, &[], defaults::RANK_TOLERANCE).unwrap();
        assert_eq!(basis.ncols(), 5);
        check_orthonormal(&basis);
    }

    #[test]
    fn diatomic_has_five_external_modes() {
        let mol = n2_like();
        let basis = external_basis(&mol, &[], defaults::RANK_TOLERANCE).unwrap();
        assert_eq!(basis.ncols(), 5);
    }

    #[test]
    fn reaction_coordinate_extends_the_basis() {
        let mol = water_like();
        let mut rc: Array1<f64> = Array1::zeros(mol.size());
        rc[2] = 1.0;
        rc[5] = -1.0;
        let basis = external_basis(&mol, &[rc], defaults::RANK_TOLERANCE).unwrap();
        assert_eq!(basis.ncols(), 7);
        check_orthonormal(&basis);
    }

    #[test]
    fn mismatched_reaction_coordinate_is_rejected() {
        let mol = water_like();
        let rc: Array1<f64> = Array1::zeros(4);
        assert!(external_basis(&mol, &[rc], defaults::RANK_TOLERANCE).is_err());
    }

    #[test]
    fn projection_annihilates_the_basis() {
        let mol = water_like();
        let basis = external_basis(&mol, &[], defaults::RANK_TOLERANCE).unwrap();
        let mut matrix: Array2<f64> = Array2::eye(mol.size());
        matrix[[0, 0]] = 5.0;
        let projected = project_out(&matrix, &basis);
        let image: Array2<f64> = projected.dot(&basis);
        for value in image.iter() {
            assert_relative_eq!(*value, 0.0, epsilon = 1e-8);
        }
    }
}
