use crate::errors::{AnalysisError, Result};
use crate::nma::Modes;
use ndarray::prelude::*;
use ndarray_linalg::{into_col, into_row};

/// Overlap matrix between the mass-weighted mode vectors of two analyses,
/// modes1^T . modes2. Rows follow the first set of modes, columns the
/// second. Useful to map the modes of a reduced scheme onto a full
/// analysis of the same system.
pub fn overlap(modes1: &Modes, modes2: &Modes) -> Result<Array2<f64>> {
    if modes1.masses.len() != modes2.masses.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "mode vectors have different lengths: {} and {}",
            modes1.masses.len(),
            modes2.masses.len()
        )));
    }
    Ok(modes1.mass_weighted().t().dot(&modes2.mass_weighted()))
}

/// Sensitivity of one frequency to changes of the mass-weighted Hessian
/// elements: the outer product of the mode vector with itself. With
/// `symmetric` the off-diagonal elements are folded together, so the
/// matrix weights each independent element of a symmetric perturbation.
pub fn sensitivity(modes: &Modes, index: usize, symmetric: bool) -> Result<Array2<f64>> {
    if index >= modes.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "mode index {} out of range for {} modes",
            index,
            modes.len()
        )));
    }
    let weighted: Array2<f64> = modes.mass_weighted();
    let mode: Array1<f64> = weighted.slice(s![.., index]).to_owned();
    let mut matrix: Array2<f64> = into_col(mode.view()).dot(&into_row(mode.view()));
    if symmetric {
        matrix *= 2.0;
        for i in 0..mode.len() {
            matrix[[i, i]] -= mode[i] * mode[i];
        }
    }
    Ok(matrix)
}
