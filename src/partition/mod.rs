mod contributions;
mod logging;
mod vibrations;

pub use contributions::{Electronic, Ensemble, Rotation, Translation};
pub use vibrations::{ModeTreatment, Vibration};

use crate::constants::BOLTZMANN;
use crate::errors::Result;
use crate::initialization::Molecule;
use crate::io::PartitionConfig;
use crate::nma::Modes;
use serde::{Deserialize, Serialize};

/// The T^n-weighted logarithm contract shared by every contribution:
/// `helper0` returns T^n ln Z, `helper1` and `helper2` the first and
/// second temperature derivatives of ln Z, each multiplied by T^n. All
/// derivatives are analytic; the thermodynamic functions below follow
/// from them without any finite differences. Temperatures are assumed to
/// be > 0, the public entry points enforce this.
pub trait Statistics {
    fn helper0(&self, temp: f64, n: i32) -> f64;
    fn helper1(&self, temp: f64, n: i32) -> f64;
    fn helper2(&self, temp: f64, n: i32) -> f64;

    /// Logarithm of the partition function.
    fn ln_partition(&self, temp: f64) -> f64 {
        self.helper0(temp, 0)
    }

    /// First temperature derivative of the logarithm.
    fn dln_partition(&self, temp: f64) -> f64 {
        self.helper1(temp, 0)
    }

    /// Second temperature derivative of the logarithm.
    fn ddln_partition(&self, temp: f64) -> f64 {
        self.helper2(temp, 0)
    }

    /// Internal energy per molecule, kB T^2 (d ln Z / dT).
    fn internal_energy(&self, temp: f64) -> f64 {
        BOLTZMANN * self.helper1(temp, 2)
    }

    /// Heat capacity per molecule.
    fn heat_capacity(&self, temp: f64) -> f64 {
        BOLTZMANN * (2.0 * self.helper1(temp, 1) + self.helper2(temp, 2))
    }

    /// Entropy per molecule.
    fn entropy(&self, temp: f64) -> f64 {
        BOLTZMANN * (self.helper0(temp, 0) + self.helper1(temp, 1))
    }

    /// Free energy per molecule, -kB T ln Z.
    fn free_energy(&self, temp: f64) -> f64 {
        -BOLTZMANN * self.helper0(temp, 1)
    }
}

/// The partition function of one structure: the product of its
/// translational, rotational, vibrational and electronic contributions.
/// Immutable once built; combined into new values by [PartFunRatio] or by
/// the pressure override, never mutated in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartFun {
    /// Reference electronic energy in Hartree. Not part of the helper
    /// sums; the thermodynamic methods add it explicitly.
    pub energy: f64,
    pub title: String,
    /// Absent for periodic systems.
    pub translation: Option<Translation>,
    /// Absent for periodic systems and single atoms.
    pub rotation: Option<Rotation>,
    pub vibration: Vibration,
    pub electronic: Electronic,
}

impl PartFun {
    /// Compose the partition function of a molecule from its normal modes
    /// and the partition options. Fails when a non-excluded mode is
    /// imaginary, or when an option is non-physical.
    pub fn build(mol: &Molecule, modes: &Modes, config: &PartitionConfig) -> Result<PartFun> {
        let treatment: ModeTreatment = vibrations::parse_treatment(config)?;
        let vibration = Vibration::new(
            modes,
            treatment,
            config.frequency_scaling,
            config.zero_point_scaling,
            config.saddle_point,
        )?;
        let electronic = Electronic::from_molecule(mol)?;

        let (translation, rotation) = if mol.is_periodic() {
            (None, None)
        } else {
            let ensemble: Ensemble = match config.volume {
                Some(volume) => Ensemble::ConstantVolume { volume },
                None => Ensemble::ConstantPressure {
                    pressure: config.pressure,
                },
            };
            let translation = Translation::new(mol.total_mass(), ensemble)?;
            let rotation = Rotation::new(mol, config.symmetry_number)?;
            (Some(translation), rotation)
        };

        let pf = PartFun {
            energy: mol.energy,
            title: mol.title.clone(),
            translation,
            rotation,
            vibration,
            electronic,
        };
        logging::print_partfun(&pf);
        Ok(pf)
    }

    /// A copy of this partition function evaluated at another external
    /// pressure.
    pub fn with_pressure(&self, pressure: f64) -> Result<PartFun> {
        let mut pf = self.clone();
        if let Some(translation) = pf.translation.take() {
            pf.translation = Some(Translation::new(
                translation.mass,
                Ensemble::ConstantPressure { pressure },
            )?);
        }
        Ok(pf)
    }

    /// Zero-point energy of the retained real modes.
    pub fn zero_point_energy(&self) -> f64 {
        self.vibration.zero_point_energy()
    }

    /// ln of the volume per molecule, used by the kinetics module to
    /// convert rates to concentration units. Zero without a translational
    /// contribution.
    pub fn ln_volume(&self, temp: f64) -> f64 {
        self.translation
            .as_ref()
            .map(|translation| translation.ln_volume(temp))
            .unwrap_or(0.0)
    }

    /// The log-space quotient of this partition function over the given
    /// denominators, e.g. a transition state over its reactants.
    pub fn ratio<'a>(&'a self, denominators: &[&'a PartFun]) -> PartFunRatio<'a> {
        PartFunRatio {
            numerators: vec![self],
            denominators: denominators.to_vec(),
        }
    }

    fn terms(&self) -> Vec<&dyn Statistics> {
        let mut terms: Vec<&dyn Statistics> = Vec::with_capacity(4);
        if let Some(translation) = &self.translation {
            terms.push(translation);
        }
        if let Some(rotation) = &self.rotation {
            terms.push(rotation);
        }
        terms.push(&self.vibration);
        terms.push(&self.electronic);
        terms
    }
}

impl Statistics for PartFun {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        self.terms().iter().map(|term| term.helper0(temp, n)).sum()
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        self.terms().iter().map(|term| term.helper1(temp, n)).sum()
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        self.terms().iter().map(|term| term.helper2(temp, n)).sum()
    }

    /// Internal energy including the reference energy. For the constant
    /// pressure ensemble this is the enthalpy.
    fn internal_energy(&self, temp: f64) -> f64 {
        BOLTZMANN * self.helper1(temp, 2) + self.energy
    }

    /// Free energy including the reference energy. For the constant
    /// pressure ensemble this is the Gibbs free energy.
    fn free_energy(&self, temp: f64) -> f64 {
        -BOLTZMANN * self.helper0(temp, 1) + self.energy
    }
}

/// Log-space combination of partition functions: the numerators are
/// multiplied, the denominators divide. Satisfies the same [Statistics]
/// contract, so the quotient is itself an evaluable partition function
/// value. Reference energies are deliberately not part of the quotient;
/// energy differences enter the kinetics expressions explicitly.
#[derive(Clone, Debug)]
pub struct PartFunRatio<'a> {
    pub numerators: Vec<&'a PartFun>,
    pub denominators: Vec<&'a PartFun>,
}

impl Statistics for PartFunRatio<'_> {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        let num: f64 = self.numerators.iter().map(|pf| pf.helper0(temp, n)).sum();
        let den: f64 = self.denominators.iter().map(|pf| pf.helper0(temp, n)).sum();
        num - den
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        let num: f64 = self.numerators.iter().map(|pf| pf.helper1(temp, n)).sum();
        let den: f64 = self.denominators.iter().map(|pf| pf.helper1(temp, n)).sum();
        num - den
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        let num: f64 = self.numerators.iter().map(|pf| pf.helper2(temp, n)).sum();
        let den: f64 = self.denominators.iter().map(|pf| pf.helper2(temp, n)).sum();
        num - den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalysisError;
    use crate::io::{NmaConfig, PartitionConfig};
    use crate::nma::{analyze, Scheme};
    use crate::utils::tests::{saddle_like, water_like, with_target_frequencies};
    use approx::assert_relative_eq;

    fn water_partfun(config: &PartitionConfig) -> PartFun {
        let mol = with_target_frequencies(water_like(), &[1600.0, 3650.0, 3750.0]);
        let modes = analyze(&mol, &Scheme::constrain_ext(), &NmaConfig::default()).unwrap();
        PartFun::build(&mol, &modes, config).unwrap()
    }

    #[test]
    fn all_contributions_are_positive() {
        let pf = water_partfun(&PartitionConfig::default());
        for temp in [50.0, 298.15, 1000.0, 3000.0] {
            for term in pf.terms() {
                assert!(term.helper0(temp, 0).is_finite());
            }
            // ln Q finite means Q > 0
            assert!(pf.ln_partition(temp).is_finite());
        }
    }

    #[test]
    fn derivatives_match_numerical_differentiation() {
        let pf = water_partfun(&PartitionConfig::default());
        let temp: f64 = 298.15;
        let step: f64 = 1.0e-3;
        let numerical: f64 =
            (pf.ln_partition(temp + step) - pf.ln_partition(temp - step)) / (2.0 * step);
        assert_relative_eq!(pf.dln_partition(temp), numerical, max_relative = 1e-6);
        let numerical2: f64 = (pf.dln_partition(temp + step) - pf.dln_partition(temp - step))
            / (2.0 * step);
        assert_relative_eq!(pf.ddln_partition(temp), numerical2, max_relative = 1e-5);
    }

    #[test]
    fn entropy_is_consistent_with_energy_and_free_energy() {
        let pf = water_partfun(&PartitionConfig::default());
        let temp: f64 = 298.15;
        let lhs: f64 = pf.entropy(temp);
        let rhs: f64 = (pf.internal_energy(temp) - pf.free_energy(temp)) / temp;
        assert_relative_eq!(lhs, rhs, max_relative = 1e-10);
    }

    #[test]
    fn saddle_point_requires_the_flag() {
        let mol = saddle_like();
        let modes = analyze(&mol, &Scheme::constrain_ext(), &NmaConfig::default()).unwrap();
        let result = PartFun::build(&mol, &modes, &PartitionConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::NegativeFrequency { count: 1 })
        ));

        let config = PartitionConfig {
            saddle_point: true,
            ..PartitionConfig::default()
        };
        let pf = PartFun::build(&mol, &modes, &config).unwrap();
        assert_eq!(pf.vibration.imaginary_freqs.len(), 1);
        assert_eq!(pf.vibration.freqs.len(), 2);
    }

    #[test]
    fn ratio_of_a_partition_function_with_itself_vanishes() {
        let pf = water_partfun(&PartitionConfig::default());
        let ratio = pf.ratio(&[&pf]);
        assert_relative_eq!(ratio.ln_partition(298.15), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ratio.dln_partition(298.15), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pressure_override_shifts_only_the_volume_term() {
        let pf = water_partfun(&PartitionConfig::default());
        let doubled = pf.with_pressure(2.0 * crate::constants::ATM).unwrap();
        let temp: f64 = 298.15;
        let delta: f64 = pf.ln_partition(temp) - doubled.ln_partition(temp);
        assert_relative_eq!(delta, 2.0_f64.ln(), max_relative = 1e-10);
    }
}
