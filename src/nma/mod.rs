mod logging;
pub(crate) mod projection;
mod schemes;

pub use schemes::Scheme;

use crate::errors::{AnalysisError, Result};
use crate::initialization::Molecule;
use crate::io::NmaConfig;
use ndarray::prelude::*;
use ndarray_linalg::{into_col, into_row, Eigh, UPLO};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The result of one normal mode analysis: frequencies, reduced masses
/// and Cartesian mode vectors, ordered by ascending frequency magnitude
/// with the sign preserved for imaginary modes. Immutable once derived.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Modes {
    /// Frequencies in a.u.; a negative value encodes an imaginary mode.
    pub freqs: Array1<f64>,
    /// Reduced masses in a.u., one per mode.
    pub reduced_masses: Array1<f64>,
    /// Cartesian mode vectors as unit-norm columns, 3N x n_modes.
    pub cartesian: Array2<f64>,
    /// Mass vector of length 3N, kept for re-weighting the mode vectors.
    pub masses: Array1<f64>,
    /// Indices of the residual zero modes, for schemes that keep them in
    /// the spectrum.
    pub zeros: Vec<usize>,
    /// Number of degrees of freedom removed by the scheme.
    pub n_removed: usize,
}

impl Modes {
    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Number of imaginary modes, residual zeros not counted.
    pub fn imaginary_count(&self) -> usize {
        self.freqs
            .iter()
            .enumerate()
            .filter(|(idx, freq)| **freq < 0.0 && !self.zeros.contains(idx))
            .count()
    }

    /// Zero-point energy, sum of h*nu/2 over the real non-zero modes.
    pub fn zero_point_energy(&self) -> f64 {
        self.freqs
            .iter()
            .enumerate()
            .filter(|(idx, freq)| **freq > 0.0 && !self.zeros.contains(idx))
            .map(|(_, freq)| PI * freq)
            .sum()
    }

    /// The mode vectors in mass-weighted coordinates, unit-norm columns.
    pub fn mass_weighted(&self) -> Array2<f64> {
        let sqrt_masses: Array1<f64> = self.masses.map(|mass| mass.sqrt());
        let mut weighted: Array2<f64> = Array2::zeros(self.cartesian.raw_dim());
        for (j, column) in self.cartesian.columns().into_iter().enumerate() {
            let w: Array1<f64> = &column * &sqrt_masses;
            let norm: f64 = w.dot(&w).sqrt();
            weighted.slice_mut(s![.., j]).assign(&(&w / norm));
        }
        weighted
    }
}

/// Run the normal mode analysis of one molecule with the given scheme:
/// mass-weight the Hessian, reduce it to the scheme's subspace, project
/// out the scheme's external basis, diagonalize and convert eigenvalues to
/// signed frequencies. The number of near-zero eigenvalues is checked
/// against the projected-out count where the scheme defines one; a
/// mismatch is reported as [AnalysisError::DataInconsistency], never
/// silently repaired.
pub fn analyze(mol: &Molecule, scheme: &Scheme, config: &NmaConfig) -> Result<Modes> {
    let size: usize = mol.size();
    let masses3: Array1<f64> = mol.masses3();

    // mass-weight the Hessian with the outer product of the mass vector
    let masses_matrix: Array2<f64> = into_col(masses3.view())
        .dot(&into_row(masses3.view()))
        .map(|val| val.sqrt());
    let mw_hessian: Array2<f64> = &mol.hessian / &masses_matrix;

    let space = scheme.reduced_space(mol, config)?;
    let (omega2, vectors): (Array1<f64>, Array2<f64>) = match &space.basis {
        Some(basis) => {
            if basis.ncols() == 0 {
                (Array1::zeros(0), Array2::zeros([size, 0]))
            } else {
                let compact: Array2<f64> = basis.t().dot(&mw_hessian).dot(basis);
                let (vals, vecs): (Array1<f64>, Array2<f64>) =
                    compact.eigh(UPLO::Lower).unwrap();
                (vals, basis.dot(&vecs))
            }
        }
        None => {
            let projected: Array2<f64> = match &space.external {
                Some(external) => projection::project_out(&mw_hessian, external),
                None => mw_hessian,
            };
            let (vals, vecs): (Array1<f64>, Array2<f64>) =
                projected.eigh(UPLO::Lower).unwrap();
            (vals, vecs)
        }
    };

    let freqs_all: Array1<f64> = omega2.map(|val| {
        let freq: f64 = val.abs().sqrt() / (2.0 * PI);
        if *val < 0.0 {
            -freq
        } else {
            freq
        }
    });

    // ascending magnitude, sign preserved; the near-zero modes lead
    let mut order: Vec<usize> = (0..freqs_all.len()).collect();
    order.sort_by(|a, b| freqs_all[*a].abs().total_cmp(&freqs_all[*b].abs()));
    let n_zero: usize = order
        .iter()
        .filter(|idx| freqs_all[**idx].abs() < config.zero_tolerance)
        .count();

    let (retained, zeros): (Vec<usize>, Vec<usize>) = match space.expected_zeros {
        Some(expected) => {
            if n_zero != expected {
                return Err(AnalysisError::DataInconsistency {
                    expected,
                    found: n_zero,
                });
            }
            (order[n_zero..].to_vec(), Vec::new())
        }
        None => (order, (0..n_zero).collect()),
    };

    let n_modes: usize = retained.len();
    let sqrt_masses: Array1<f64> = masses3.map(|mass| mass.sqrt());
    let mut freqs: Array1<f64> = Array1::zeros(n_modes);
    let mut reduced_masses: Array1<f64> = Array1::zeros(n_modes);
    let mut cartesian: Array2<f64> = Array2::zeros([size, n_modes]);
    for (j, idx) in retained.iter().enumerate() {
        freqs[j] = freqs_all[*idx];
        // un-weight the unit eigenvector; its inverse square norm is the
        // reduced mass of the mode
        let displacement: Array1<f64> = &vectors.slice(s![.., *idx]) / &sqrt_masses;
        let norm2: f64 = displacement.dot(&displacement);
        reduced_masses[j] = 1.0 / norm2;
        cartesian
            .slice_mut(s![.., j])
            .assign(&(&displacement / norm2.sqrt()));
    }

    let modes = Modes {
        freqs,
        reduced_masses,
        cartesian,
        masses: masses3,
        zeros,
        n_removed: size - n_modes,
    };
    logging::print_modes(scheme.label(), mol, &modes);
    Ok(modes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AMU, WAVENUMBER};
    use crate::utils::tests::{
        co2_like, diatomic, saddle_like, water_like, with_target_frequencies,
    };
    use approx::assert_relative_eq;

    #[test]
    fn diatomic_matches_the_closed_form() {
        // N2-like spring: nu = sqrt(k/mu)/(2 pi)
        let force_constant: f64 = 1.2;
        let mol = diatomic("N", "N", 1.1, force_constant);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        assert_eq!(modes.len(), 1);
        let mu: f64 = mol.masses[0] / 2.0;
        let expected: f64 = (force_constant / mu).sqrt() / (2.0 * PI);
        assert_relative_eq!(modes.freqs[0], expected, max_relative = 1e-8);
        assert_relative_eq!(modes.reduced_masses[0], mu, max_relative = 1e-6);
    }

    #[test]
    fn bent_triatomic_recovers_target_frequencies() {
        let targets = [1600.0, 3650.0, 3750.0];
        let mol = with_target_frequencies(water_like(), &targets);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        assert_eq!(modes.len(), 3);
        assert_eq!(modes.n_removed, 6);
        for (freq, target) in modes.freqs.iter().zip(targets.iter()) {
            assert_relative_eq!(freq / WAVENUMBER, *target, max_relative = 1e-6);
        }
    }

    #[test]
    fn linear_triatomic_keeps_four_modes() {
        let targets = [667.0, 667.0, 1333.0, 2349.0];
        let mol = with_target_frequencies(co2_like(), &targets);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        assert_eq!(modes.len(), 4);
        assert_eq!(modes.n_removed, 5);
    }

    #[test]
    fn eigenvectors_are_orthonormal_in_mass_weighted_space(){
        let mol = with_target_frequencies(water_like(), &[1600.0, 3650.0, 3750.0]);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        let weighted = modes.mass_weighted();
        let overlap: Array2<f64> = weighted.t().dot(&weighted);
        for ((i, j), value) in overlap.indexed_iter() {
            let expected: f64 = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(*value, expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn saddle_point_keeps_the_signed_frequency() {
        let mol = saddle_like();
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        assert_eq!(modes.imaginary_count(), 1);
        // ordering is by magnitude, so the imaginary mode leads here
        assert!(modes.freqs[0] < 0.0);
        assert_relative_eq!(modes.freqs[0] / WAVENUMBER, -500.0, max_relative = 1e-6);
    }

    #[test]
    fn full_scheme_tags_the_external_zeros() {
        let mol = with_target_frequencies(water_like(), &[1600.0, 3650.0, 3750.0]);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::Full, &config).unwrap();
        assert_eq!(modes.len(), 9);
        assert_eq!(modes.zeros.len(), 6);
        assert_eq!(modes.n_removed, 0);
        assert_eq!(modes.imaginary_count(), 0);
    }

    #[test]
    fn phva_restricts_the_motion_to_the_free_atoms() {
        let force_constant: f64 = 0.8;
        let mol = diatomic("C", "O", 1.2, force_constant);
        let config = NmaConfig::default();
        let scheme = Scheme::Phva { fixed: vec![1] };
        let modes = analyze(&mol, &scheme, &config).unwrap();
        assert_eq!(modes.len(), 3);
        // the stretch now moves atom 0 against a fixed wall, so the
        // relevant mass is the atomic one, not the reduced pair mass
        let expected: f64 = (force_constant / mol.masses[0]).sqrt() / (2.0 * PI);
        let stretch: f64 = modes.freqs[modes.len() - 1];
        assert_relative_eq!(stretch, expected, max_relative = 1e-8);
        assert_eq!(modes.zeros.len(), 2);
        // fixed atom does not move
        for k in 0..3 {
            assert_relative_eq!(modes.cartesian[[3 + k, 2]], 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn mbh_with_one_rigid_block_has_no_modes() {
        let mol = with_target_frequencies(water_like(), &[1600.0, 3650.0, 3750.0]);
        let config = NmaConfig::default();
        let scheme = Scheme::Mbh {
            blocks: vec![vec![0, 1, 2]],
        };
        let modes = analyze(&mol, &scheme, &config).unwrap();
        assert!(modes.is_empty());
        assert_eq!(modes.n_removed, 9);
    }

    #[test]
    fn mbh_without_blocks_reduces_to_the_external_projection() {
        let targets = [1600.0, 3650.0, 3750.0];
        let mol = with_target_frequencies(water_like(), &targets);
        let config = NmaConfig::default();
        let reference = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        let modes = analyze(&mol, &Scheme::Mbh { blocks: vec![] }, &config).unwrap();
        assert_eq!(modes.len(), reference.len());
        for (a, b) in modes.freqs.iter().zip(reference.freqs.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-8);
        }
    }

    #[test]
    fn soft_modes_below_the_tolerance_are_reported() {
        // a vibration below the zero tolerance is indistinguishable from a
        // leftover external mode; the count check has to flag it
        let mol = with_target_frequencies(water_like(), &[0.01, 3650.0, 3750.0]);
        let config = NmaConfig::default();
        let result = analyze(&mol, &Scheme::constrain_ext(), &config);
        assert!(matches!(
            result,
            Err(AnalysisError::DataInconsistency {
                expected: 6,
                found: 7
            })
        ));
    }

    #[test]
    fn reduced_mass_of_a_homonuclear_stretch() {
        let mol = diatomic("H", "H", 0.74, 0.37);
        let config = NmaConfig::default();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &config).unwrap();
        assert_relative_eq!(
            modes.reduced_masses[0] / AMU,
            1.0078250319 / 2.0,
            max_relative = 1e-6
        );
    }
}
