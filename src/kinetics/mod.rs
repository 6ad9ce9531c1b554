use crate::constants::{BOLTZMANN, KJMOL, PLANCK};
use crate::defaults;
use crate::errors::{AnalysisError, Result};
use crate::partition::{PartFun, PartFunRatio, Statistics};
use crate::utils::Timer;
use itertools::izip;
use log::{info, log_enabled, Level};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tunneling corrections for the reaction coordinate; a closed strategy
/// set selected by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Tunneling {
    None,
    /// Wigner correction, from the imaginary frequency alone.
    Wigner,
    /// Eckart correction, from the imaginary frequency and the forward
    /// and reverse barrier heights in Hartree. The transmission integral
    /// is evaluated numerically.
    Eckart {
        forward_barrier: f64,
        reverse_barrier: f64,
    },
}

impl Tunneling {
    /// The multiplicative correction factor at the given temperature.
    /// `freq` is the magnitude of the imaginary frequency in a.u.
    pub fn correction(&self, freq: f64, temp: f64) -> Result<f64> {
        if freq <= 0.0 {
            return Err(AnalysisError::Domain(format!(
                "the reaction coordinate frequency has to be > 0, but it is {}",
                freq
            )));
        }
        match self {
            Tunneling::None => Ok(1.0),
            Tunneling::Wigner => {
                let u: f64 = PLANCK * freq / (BOLTZMANN * temp);
                Ok(1.0 + u * u / 24.0)
            }
            Tunneling::Eckart {
                forward_barrier,
                reverse_barrier,
            } => eckart(*forward_barrier, *reverse_barrier, freq, temp),
        }
    }
}

/// ln cosh(x), safe against overflow for large |x|.
fn ln_cosh(x: f64) -> f64 {
    x.abs() + (-2.0 * x.abs()).exp().ln_1p() - 2.0_f64.ln()
}

/// Eckart transmission coefficient after Johnston and Heicklen: the
/// thermally averaged transmission probability of the unsymmetric Eckart
/// barrier matching the two barrier heights and the curvature at the top.
fn eckart(v1: f64, v2: f64, freq: f64, temp: f64) -> Result<f64> {
    if v1 <= 0.0 || v2 <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "the Eckart barrier heights have to be > 0, but they are {} and {}",
            v1, v2
        )));
    }
    let h_nu: f64 = PLANCK * freq;
    let alpha1: f64 = 2.0 * PI * v1 / h_nu;
    let alpha2: f64 = 2.0 * PI * v2 / h_nu;
    let denom: f64 = 1.0 / alpha1.sqrt() + 1.0 / alpha2.sqrt();
    let disc: f64 = alpha1 * alpha2 - PI * PI / 4.0;

    let transmission = |xi: f64| -> f64 {
        let two_pi_a: f64 = 2.0 * (alpha1 * xi).max(0.0).sqrt() / denom;
        let two_pi_b: f64 = 2.0 * ((xi - 1.0) * alpha1 + alpha2).max(0.0).sqrt() / denom;
        let lc_p: f64 = ln_cosh(two_pi_a + two_pi_b);
        let lc_m: f64 = ln_cosh(two_pi_a - two_pi_b);
        let ratio_d: f64 = if disc >= 0.0 {
            (ln_cosh(2.0 * disc.sqrt()) - lc_p).exp()
        } else {
            (2.0 * (-disc).sqrt()).cos() * (-lc_p).exp()
        };
        (1.0 - (lc_m - lc_p).exp()) / (1.0 + ratio_d)
    };

    // thermal average of the transmission probability over the energy
    // grid, relative to the classical barrier crossing
    let beta1: f64 = v1 / (BOLTZMANN * temp);
    let xi_min: f64 = (1.0 - alpha2 / alpha1).max(0.0);
    let xi_max: f64 = 1.0 + defaults::ECKART_WINDOW / beta1;
    let n_points: usize = defaults::ECKART_GRID_POINTS;
    let step: f64 = (xi_max - xi_min) / n_points as f64;
    let mut integral: f64 = 0.0;
    for i in 0..=n_points {
        let xi: f64 = xi_min + i as f64 * step;
        let weight: f64 = if i == 0 || i == n_points { 0.5 } else { 1.0 };
        integral += weight * transmission(xi) * (beta1 * (1.0 - xi)).exp();
    }
    Ok(integral * beta1 * step)
}

/// ln of the Eyring rate constant: (kB T / h) (Q'/ Prod Q_r) exp(-dE/kB T),
/// with the reaction coordinate mode already excluded from Q'. The
/// partition function helpers exclude the reference electronic energies,
/// so the barrier enters only through the explicit argument; since the
/// zero-point energies sit inside the vibrational helpers, a bare
/// electronic barrier is zero-point corrected automatically. One volume
/// factor per reactant converts bimolecular and higher rates to
/// concentration units.
pub fn ln_rate_constant(
    reactants: &[&PartFun],
    ts: &PartFun,
    barrier: f64,
    temp: f64,
    tunneling: &Tunneling,
) -> Result<f64> {
    if temp <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "the temperature has to be > 0, but it is {}",
            temp
        )));
    }
    if reactants.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "at least one reactant partition function is required".to_string(),
        ));
    }
    let freq: f64 = ts
        .vibration
        .reaction_coordinate()
        .ok_or(AnalysisError::MissingMode)?;
    let kappa: f64 = tunneling.correction(freq.abs(), temp)?;

    let ratio: PartFunRatio = ts.ratio(reactants);
    let mut ln_k: f64 = (BOLTZMANN * temp / PLANCK).ln() + ratio.ln_partition(temp)
        - barrier / (BOLTZMANN * temp)
        + kappa.ln();
    for pf in reactants.iter() {
        ln_k += pf.ln_volume(temp);
    }
    ln_k -= ts.ln_volume(temp);
    Ok(ln_k)
}

/// The Eyring rate constant itself; see [ln_rate_constant].
pub fn rate_constant(
    reactants: &[&PartFun],
    ts: &PartFun,
    barrier: f64,
    temp: f64,
    tunneling: &Tunneling,
) -> Result<f64> {
    ln_rate_constant(reactants, ts, barrier, temp, tunneling).map(f64::exp)
}

/// Equilibrium constant between the two sides of a reaction.
/// `delta_energy` is the zero-point uncorrected energy of the products
/// minus that of the reactants.
pub fn equilibrium_constant(
    reactants: &[&PartFun],
    products: &[&PartFun],
    delta_energy: f64,
    temp: f64,
) -> Result<f64> {
    if temp <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "the temperature has to be > 0, but it is {}",
            temp
        )));
    }
    let ratio = PartFunRatio {
        numerators: products.to_vec(),
        denominators: reactants.to_vec(),
    };
    let mut ln_k: f64 = ratio.ln_partition(temp) - delta_energy / (BOLTZMANN * temp);
    for pf in reactants.iter() {
        ln_k += pf.ln_volume(temp);
    }
    for pf in products.iter() {
        ln_k -= pf.ln_volume(temp);
    }
    Ok(ln_k.exp())
}

/// Rate constants on a temperature grid with a least-squares Arrhenius
/// fit, ln k = ln A - Ea/(kB T).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactionRates {
    pub temperatures: Vec<f64>,
    pub rates: Vec<f64>,
    /// Fitted activation energy in Hartree.
    pub activation_energy: f64,
    /// Fitted pre-exponential factor.
    pub prefactor: f64,
}

/// Evaluate the rate on every grid point (in parallel, the evaluations
/// are independent) and fit the kinetic parameters.
pub fn reaction_analysis(
    reactants: &[&PartFun],
    ts: &PartFun,
    barrier: f64,
    temperatures: &[f64],
    tunneling: &Tunneling,
) -> Result<ReactionRates> {
    if temperatures.len() < 2 {
        return Err(AnalysisError::InvalidInput(
            "the Arrhenius fit needs at least two temperatures".to_string(),
        ));
    }
    let timer: Timer = Timer::start();
    let ln_rates: Vec<f64> = temperatures
        .par_iter()
        .map(|temp| ln_rate_constant(reactants, ts, barrier, *temp, tunneling))
        .collect::<Result<Vec<f64>>>()?;

    let x: Vec<f64> = temperatures.iter().map(|temp| 1.0 / temp).collect();
    let x_mean: f64 = x.iter().sum::<f64>() / x.len() as f64;
    let y_mean: f64 = ln_rates.iter().sum::<f64>() / ln_rates.len() as f64;
    let mut covariance: f64 = 0.0;
    let mut variance: f64 = 0.0;
    for (xi, yi) in izip!(x.iter(), ln_rates.iter()) {
        covariance += (xi - x_mean) * (yi - y_mean);
        variance += (xi - x_mean) * (xi - x_mean);
    }
    let slope: f64 = covariance / variance;
    let activation_energy: f64 = -BOLTZMANN * slope;
    let prefactor: f64 = (y_mean - slope * x_mean).exp();

    let rates = ReactionRates {
        temperatures: temperatures.to_vec(),
        rates: ln_rates.iter().map(|ln_k| ln_k.exp()).collect(),
        activation_energy,
        prefactor,
    };
    rates.log();
    if log_enabled!(Level::Info) {
        info!("{}", timer);
    }
    Ok(rates)
}

impl ReactionRates {
    pub fn log(&self) {
        if !log_enabled!(Level::Info) {
            return;
        }
        info!("{:^80}", "");
        info!("{: ^80}", "Reaction Kinetics");
        info!("{:-^80}", "");
        info!(
            "{: <30} {:.4} kJ/mol",
            "activation energy:",
            self.activation_energy / KJMOL
        );
        info!("{: <30} {:.6e} a.u.", "pre-exponential factor:", self.prefactor);
        info!("{:^80}", "");
        info!("{: >9} {: >18}", "T [K]", "k [a.u.]");
        info!("{:-^30} ", "");
        for (temp, rate) in izip!(self.temperatures.iter(), self.rates.iter()) {
            info!("{: >9.2} {: >18.6e}", temp, rate);
        }
        info!("{:-^30} ", "");
    }
}
