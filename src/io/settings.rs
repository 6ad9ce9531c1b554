use crate::defaults::*;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_zero_tolerance() -> f64 {
    ZERO_FREQ_TOLERANCE
}
fn default_rank_tolerance() -> f64 {
    RANK_TOLERANCE
}
fn default_pressure() -> f64 {
    PRESSURE
}
fn default_symmetry_number() -> usize {
    SYMMETRY_NUMBER
}
fn default_treatment() -> String {
    String::from("quantum")
}
fn default_low_frequency_cutoff() -> f64 {
    LOW_FREQ_CUTOFF
}
fn default_frequency_scaling() -> f64 {
    FREQ_SCALING
}
fn default_zero_point_scaling() -> f64 {
    ZP_SCALING
}
fn default_tunneling() -> String {
    String::from("none")
}
fn default_temperature() -> f64 {
    TEMPERATURE
}

/// The complete configuration of an analysis. Every field carries a
/// default, so an empty TOML document is a valid configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Configuration {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nma: NmaConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub kinetics: KineticsConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NmaConfig {
    /// Frequencies below this magnitude (a.u.) are counted as external
    /// zero modes. Results near this boundary are sensitive to it.
    #[serde(default = "default_zero_tolerance")]
    pub zero_tolerance: f64,
    /// Relative singular value cutoff used when projection bases are
    /// orthonormalized.
    #[serde(default = "default_rank_tolerance")]
    pub rank_tolerance: f64,
}

impl Default for NmaConfig {
    fn default() -> Self {
        NmaConfig {
            zero_tolerance: default_zero_tolerance(),
            rank_tolerance: default_rank_tolerance(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PartitionConfig {
    /// External pressure in a.u. for the constant-pressure ensemble.
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// Volume per molecule in bohr^3; switches the translational
    /// contribution to the constant-volume ensemble when set.
    #[serde(default)]
    pub volume: Option<f64>,
    /// Rotational symmetry number.
    #[serde(default = "default_symmetry_number")]
    pub symmetry_number: usize,
    /// Vibrational treatment: "quantum", "classical" or "quasi-harmonic".
    #[serde(default = "default_treatment")]
    pub treatment: String,
    /// Wavenumber cutoff (cm^-1) for the free-rotor interpolation in the
    /// quasi-harmonic treatment.
    #[serde(default = "default_low_frequency_cutoff")]
    pub low_frequency_cutoff: f64,
    /// Scale factor applied to the vibrational frequencies.
    #[serde(default = "default_frequency_scaling")]
    pub frequency_scaling: f64,
    /// Scale factor applied to the zero-point energies.
    #[serde(default = "default_zero_point_scaling")]
    pub zero_point_scaling: f64,
    /// Marks a transition-state structure; exactly one imaginary mode is
    /// then excluded from the vibrational product.
    #[serde(default)]
    pub saddle_point: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            pressure: default_pressure(),
            volume: None,
            symmetry_number: default_symmetry_number(),
            treatment: default_treatment(),
            low_frequency_cutoff: default_low_frequency_cutoff(),
            frequency_scaling: default_frequency_scaling(),
            zero_point_scaling: default_zero_point_scaling(),
            saddle_point: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct KineticsConfig {
    /// Tunneling correction: "none", "wigner" or "eckart".
    #[serde(default = "default_tunneling")]
    pub tunneling: String,
    /// Reverse barrier height in Hartree, required for "eckart".
    #[serde(default)]
    pub reverse_barrier: Option<f64>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for KineticsConfig {
    fn default() -> Self {
        KineticsConfig {
            tunneling: default_tunneling(),
            reverse_barrier: None,
            temperature: default_temperature(),
        }
    }
}

impl Configuration {
    /// Read a [Configuration] from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let content: String = fs::read_to_string(&path).with_context(|| {
            format!(
                "could not read the configuration file {}",
                path.as_ref().display()
            )
        })?;
        toml::from_str(&content).context("could not parse the configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Configuration = toml::from_str("").unwrap();
        assert_eq!(config.partition.symmetry_number, SYMMETRY_NUMBER);
        assert_eq!(config.partition.treatment, "quantum");
        assert_eq!(config.kinetics.tunneling, "none");
        assert!(config.nma.zero_tolerance > 0.0);
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let config: Configuration = toml::from_str(
            r#"
            [partition]
            symmetry_number = 2
            treatment = "quasi-harmonic"

            [kinetics]
            tunneling = "wigner"
            "#,
        )
        .unwrap();
        assert_eq!(config.partition.symmetry_number, 2);
        assert_eq!(config.partition.treatment, "quasi-harmonic");
        assert_eq!(config.kinetics.tunneling, "wigner");
        assert_eq!(config.partition.pressure, PRESSURE);
    }
}
