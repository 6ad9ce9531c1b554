use crate::constants::KJMOL;
use crate::errors::{AnalysisError, Result};
use crate::partition::{PartFun, Statistics};
use log::{info, log_enabled, Level};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Standard thermodynamic functions of one structure at one temperature,
/// in atomic units. In the constant pressure ensemble the internal energy
/// is an enthalpy and the free energy a Gibbs free energy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThermoResult {
    pub temperature: f64,
    pub ln_partition: f64,
    pub internal_energy: f64,
    pub entropy: f64,
    pub free_energy: f64,
    pub heat_capacity: f64,
}

/// Evaluate the thermodynamic functions at one temperature. All values
/// derive from the analytic helper derivatives of the partition function.
pub fn evaluate(pf: &PartFun, temp: f64) -> Result<ThermoResult> {
    if temp <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "the temperature has to be > 0, but it is {}",
            temp
        )));
    }
    Ok(ThermoResult {
        temperature: temp,
        ln_partition: pf.ln_partition(temp),
        internal_energy: pf.internal_energy(temp),
        entropy: pf.entropy(temp),
        free_energy: pf.free_energy(temp),
        heat_capacity: pf.heat_capacity(temp),
    })
}

/// Lazy scan over a temperature sequence: one independent evaluation per
/// requested temperature, nothing is computed ahead of time.
pub struct ThermoScan<'a> {
    pf: &'a PartFun,
    temperatures: std::slice::Iter<'a, f64>,
}

impl<'a> ThermoScan<'a> {
    pub fn new(pf: &'a PartFun, temperatures: &'a [f64]) -> Self {
        ThermoScan {
            pf,
            temperatures: temperatures.iter(),
        }
    }
}

impl Iterator for ThermoScan<'_> {
    type Item = Result<ThermoResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.temperatures
            .next()
            .map(|temp| evaluate(self.pf, *temp))
    }
}

/// Thermodynamic functions on a temperature grid, evaluated in parallel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThermoTable {
    pub rows: Vec<ThermoResult>,
}

impl ThermoTable {
    pub fn compute(pf: &PartFun, temperatures: &[f64]) -> Result<ThermoTable> {
        let rows: Vec<ThermoResult> = temperatures
            .par_iter()
            .map(|temp| evaluate(pf, *temp))
            .collect::<Result<Vec<ThermoResult>>>()?;
        let table = ThermoTable { rows };
        table.log();
        Ok(table)
    }

    pub fn log(&self) {
        if !log_enabled!(Level::Info) {
            return;
        }
        info!("{:^80}", "");
        info!("{: ^80}", "Thermochemistry");
        info!("{:-^80}", "");
        info!(
            "{: >9} {: >14} {: >14} {: >14} {: >14}",
            "T [K]", "U [kJ/mol]", "S [J/mol/K]", "G [kJ/mol]", "Cv [J/mol/K]"
        );
        info!("{:-^72} ", "");
        for row in self.rows.iter() {
            info!(
                "{: >9.2} {: >14.3} {: >14.3} {: >14.3} {: >14.3}",
                row.temperature,
                row.internal_energy / KJMOL,
                1000.0 * row.entropy / KJMOL,
                row.free_energy / KJMOL,
                1000.0 * row.heat_capacity / KJMOL
            );
        }
        info!("{:-^72} ", "");
    }
}
