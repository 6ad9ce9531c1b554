use crate::constants::{BOLTZMANN, WAVENUMBER};
use crate::errors::{AnalysisError, Result};
use crate::io::PartitionConfig;
use crate::nma::Modes;
use crate::partition::Statistics;
use libm::{expm1, sinh};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-mode vibrational treatment. The set is closed and small, so the
/// dispatch is a tagged variant instead of a trait object.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ModeTreatment {
    /// Quantum harmonic oscillator, zero-point referenced.
    Quantum,
    /// Classical limit kB T / (h nu).
    Classical,
    /// Quantum harmonic oscillator, with modes below the cutoff frequency
    /// (a.u.) replaced by a one-dimensional free rotor with the effective
    /// moment hbar / (4 pi nu).
    QuasiHarmonic { cutoff: f64 },
}

pub(crate) fn parse_treatment(config: &PartitionConfig) -> Result<ModeTreatment> {
    match config.treatment.as_str() {
        "quantum" => Ok(ModeTreatment::Quantum),
        "classical" => Ok(ModeTreatment::Classical),
        "quasi-harmonic" => {
            if config.low_frequency_cutoff <= 0.0 {
                return Err(AnalysisError::Domain(format!(
                    "the low frequency cutoff has to be > 0, but it is {}",
                    config.low_frequency_cutoff
                )));
            }
            Ok(ModeTreatment::QuasiHarmonic {
                cutoff: config.low_frequency_cutoff * WAVENUMBER,
            })
        }
        other => Err(AnalysisError::InvalidInput(format!(
            "unknown vibrational treatment: {}",
            other
        ))),
    }
}

/// The vibrational contribution: a product over the retained real modes.
/// Residual zero modes are dropped; imaginary modes are excluded only in
/// a transition-state context, where exactly one of them is set aside as
/// the reaction coordinate for the kinetics module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vibration {
    /// Real frequencies entering the product, in a.u.
    pub freqs: Vec<f64>,
    /// Excluded reaction-coordinate frequencies (signed, negative).
    pub imaginary_freqs: Vec<f64>,
    /// Residual zero frequencies dropped from the product.
    pub zero_freqs: Vec<f64>,
    pub treatment: ModeTreatment,
    pub freq_scaling: f64,
    pub zp_scaling: f64,
}

impl Vibration {
    pub fn new(
        modes: &Modes,
        treatment: ModeTreatment,
        freq_scaling: f64,
        zp_scaling: f64,
        saddle_point: bool,
    ) -> Result<Vibration> {
        if freq_scaling <= 0.0 || zp_scaling <= 0.0 {
            return Err(AnalysisError::Domain(format!(
                "scaling factors have to be > 0, but they are {} and {}",
                freq_scaling, zp_scaling
            )));
        }
        let mut freqs: Vec<f64> = Vec::new();
        let mut imaginary_freqs: Vec<f64> = Vec::new();
        let mut zero_freqs: Vec<f64> = Vec::new();
        for (idx, freq) in modes.freqs.iter().enumerate() {
            if modes.zeros.contains(&idx) {
                zero_freqs.push(*freq);
            } else if *freq < 0.0 {
                imaginary_freqs.push(*freq);
            } else {
                freqs.push(*freq);
            }
        }
        if saddle_point {
            if imaginary_freqs.is_empty() {
                return Err(AnalysisError::MissingMode);
            }
            if imaginary_freqs.len() > 1 {
                return Err(AnalysisError::NegativeFrequency {
                    count: imaginary_freqs.len(),
                });
            }
        } else if !imaginary_freqs.is_empty() {
            return Err(AnalysisError::NegativeFrequency {
                count: imaginary_freqs.len(),
            });
        }
        Ok(Vibration {
            freqs,
            imaginary_freqs,
            zero_freqs,
            treatment,
            freq_scaling,
            zp_scaling,
        })
    }

    /// Zero-point energy, h nu / 2 summed over the retained modes and
    /// scaled with the zero-point factor.
    pub fn zero_point_energy(&self) -> f64 {
        self.zp_scaling * self.freqs.iter().map(|freq| PI * freq).sum::<f64>()
    }

    /// The signed frequency of the reaction coordinate, if one was
    /// excluded.
    pub fn reaction_coordinate(&self) -> Option<f64> {
        self.imaginary_freqs.first().cloned()
    }

    fn mode_helper0(&self, temp: f64, n: i32, freq: f64) -> f64 {
        let fs: f64 = self.freq_scaling;
        match self.treatment {
            ModeTreatment::Classical => {
                temp.powi(n) * (0.5 * BOLTZMANN * temp / (PI * fs * freq)).ln()
            }
            ModeTreatment::QuasiHarmonic { cutoff } if fs * freq < cutoff => {
                // free rotor with the effective moment 1/(4 pi nu)
                let moment: f64 = 1.0 / (4.0 * PI * fs * freq);
                temp.powi(n) * 0.5 * (temp.ln() + (2.0 * PI * moment * BOLTZMANN).ln())
            }
            _ => {
                let pfb: f64 = PI * freq / BOLTZMANN;
                -self.zp_scaling * pfb * temp.powi(n - 1)
                    - temp.powi(n) * (-expm1(-2.0 * fs * pfb / temp)).ln()
            }
        }
    }

    fn mode_helper1(&self, temp: f64, n: i32, freq: f64) -> f64 {
        let fs: f64 = self.freq_scaling;
        match self.treatment {
            ModeTreatment::Classical => temp.powi(n - 1),
            ModeTreatment::QuasiHarmonic { cutoff } if fs * freq < cutoff => {
                0.5 * temp.powi(n - 1)
            }
            _ => {
                let pfb: f64 = PI * freq / BOLTZMANN;
                pfb * temp.powi(n - 2)
                    * (self.zp_scaling - 2.0 * fs / (1.0 - (2.0 * fs * pfb / temp).exp()))
            }
        }
    }

    fn mode_helper2(&self, temp: f64, n: i32, freq: f64) -> f64 {
        let fs: f64 = self.freq_scaling;
        match self.treatment {
            ModeTreatment::Classical => -temp.powi(n - 2),
            ModeTreatment::QuasiHarmonic { cutoff } if fs * freq < cutoff => {
                -0.5 * temp.powi(n - 2)
            }
            _ => {
                let pfb: f64 = PI * freq / BOLTZMANN;
                -2.0 * pfb
                    * temp.powi(n - 3)
                    * (self.zp_scaling - 2.0 * fs / (1.0 - (2.0 * fs * pfb / temp).exp()))
                    + temp.powi(n - 4) * (fs * pfb / sinh(fs * pfb / temp)).powi(2)
            }
        }
    }
}

impl Statistics for Vibration {
    fn helper0(&self, temp: f64, n: i32) -> f64 {
        self.freqs
            .iter()
            .map(|freq| self.mode_helper0(temp, n, *freq))
            .sum()
    }

    fn helper1(&self, temp: f64, n: i32) -> f64 {
        self.freqs
            .iter()
            .map(|freq| self.mode_helper1(temp, n, *freq))
            .sum()
    }

    fn helper2(&self, temp: f64, n: i32) -> f64 {
        self.freqs
            .iter()
            .map(|freq| self.mode_helper2(temp, n, *freq))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NmaConfig;
    use crate::nma::{analyze, Scheme};
    use crate::utils::tests::{water_like, with_target_frequencies};
    use approx::assert_relative_eq;

    fn water_modes() -> Modes {
        let mol = with_target_frequencies(water_like(), &[1600.0, 3650.0, 3750.0]);
        analyze(&mol, &Scheme::constrain_ext(), &NmaConfig::default()).unwrap()
    }

    #[test]
    fn classical_contribution_is_the_closed_form() {
        let modes = water_modes();
        let vibration =
            Vibration::new(&modes, ModeTreatment::Classical, 1.0, 1.0, false).unwrap();
        let temp: f64 = 298.15;
        let expected: f64 = modes
            .freqs
            .iter()
            .map(|freq| (0.5 * BOLTZMANN * temp / (PI * freq)).ln())
            .sum();
        assert_relative_eq!(vibration.ln_partition(temp), expected, max_relative = 1e-12);
        assert_relative_eq!(
            vibration.dln_partition(temp),
            3.0 / temp,
            max_relative = 1e-12
        );
    }

    #[test]
    fn quantum_contribution_approaches_the_classical_limit() {
        let modes = water_modes();
        let quantum = Vibration::new(&modes, ModeTreatment::Quantum, 1.0, 1.0, false).unwrap();
        let classical =
            Vibration::new(&modes, ModeTreatment::Classical, 1.0, 1.0, false).unwrap();
        let temp: f64 = 2.0e6;
        // q = 1/(2 sinh(h nu / 2 kB T)) tends to kB T / (h nu) from below
        assert_relative_eq!(
            quantum.ln_partition(temp),
            classical.ln_partition(temp),
            max_relative = 1e-6
        );
        assert!(quantum.ln_partition(temp) < classical.ln_partition(temp));
    }

    #[test]
    fn quantum_derivatives_match_numerical_differentiation() {
        let modes = water_modes();
        let vibration = Vibration::new(&modes, ModeTreatment::Quantum, 1.0, 1.0, false).unwrap();
        let temp: f64 = 400.0;
        let step: f64 = 1.0e-3;
        let numerical: f64 =
            (vibration.ln_partition(temp + step) - vibration.ln_partition(temp - step))
                / (2.0 * step);
        assert_relative_eq!(
            vibration.dln_partition(temp),
            numerical,
            max_relative = 1e-6
        );
        let numerical2: f64 =
            (vibration.dln_partition(temp + step) - vibration.dln_partition(temp - step))
                / (2.0 * step);
        assert_relative_eq!(
            vibration.ddln_partition(temp),
            numerical2,
            max_relative = 1e-5
        );
    }

    #[test]
    fn free_rotor_replaces_soft_quantum_modes() {
        let mol = with_target_frequencies(water_like(), &[40.0, 3650.0, 3750.0]);
        let modes = analyze(&mol, &Scheme::constrain_ext(), &NmaConfig::default()).unwrap();
        let cutoff: f64 = 100.0 * WAVENUMBER;
        let hybrid = Vibration::new(
            &modes,
            ModeTreatment::QuasiHarmonic { cutoff },
            1.0,
            1.0,
            false,
        )
        .unwrap();
        let quantum = Vibration::new(&modes, ModeTreatment::Quantum, 1.0, 1.0, false).unwrap();
        let temp: f64 = 298.15;
        assert!(hybrid.ln_partition(temp).is_finite());
        // the soft mode is treated differently, the stiff ones identically
        let delta: f64 = hybrid.ln_partition(temp) - quantum.ln_partition(temp);
        assert!(delta.abs() > 1e-3);
        let soft_quantum: f64 = quantum.mode_helper0(temp, 0, modes.freqs[0]);
        let soft_hybrid: f64 = hybrid.mode_helper0(temp, 0, modes.freqs[0]);
        assert_relative_eq!(delta, soft_hybrid - soft_quantum, max_relative = 1e-10);
    }

    #[test]
    fn frequency_scaling_shifts_the_quantum_exponent() {
        let modes = water_modes();
        let unscaled = Vibration::new(&modes, ModeTreatment::Quantum, 1.0, 1.0, false).unwrap();
        let scaled = Vibration::new(&modes, ModeTreatment::Quantum, 0.96, 1.0, false).unwrap();
        // softer effective modes mean a larger partition function
        assert!(scaled.ln_partition(298.15) > unscaled.ln_partition(298.15));
    }

    #[test]
    fn zero_point_energy_sums_half_quanta() {
        let modes = water_modes();
        let vibration = Vibration::new(&modes, ModeTreatment::Quantum, 1.0, 1.0, false).unwrap();
        let expected: f64 = modes.freqs.iter().map(|freq| PI * freq).sum();
        assert_relative_eq!(
            vibration.zero_point_energy(),
            expected,
            max_relative = 1e-12
        );
    }
}
