use crate::constants::{AMU, ATOMIC_MASSES, ATOMIC_NUMBERS};
use crate::errors::{AnalysisError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize};

/// `Atom` type that contains the chemical element, its mass and its
/// position. The mass is resolved from the static isotope table unless an
/// explicit value is given (isotope substitution).
#[derive(Clone, Debug, Serialize)]
pub struct Atom {
    /// Symbol of the chemical element
    pub name: &'static str,
    /// Ordinary number of the element
    pub number: u8,
    /// Mass in atomic units
    pub mass: f64,
    /// Position of the atom in bohr
    pub xyz: Vector3<f64>,
}

impl Atom {
    /// Create a new [Atom] from the element symbol and the position in bohr.
    /// The mass of the most abundant isotope is taken from the static table.
    pub fn new(symbol: &str, xyz: Vector3<f64>) -> Result<Self> {
        let (name, number) = lookup_element(symbol)?;
        let mass_amu: f64 = match ATOMIC_MASSES.get(&number) {
            Some(mass) => *mass,
            None => {
                return Err(AnalysisError::InvalidInput(format!(
                    "no tabulated mass for element {}",
                    symbol
                )))
            }
        };
        Ok(Atom {
            name,
            number,
            mass: mass_amu * AMU,
            xyz,
        })
    }

    /// Create a new [Atom] with an explicit isotope mass in amu.
    pub fn with_mass(symbol: &str, xyz: Vector3<f64>, mass_amu: f64) -> Result<Self> {
        if mass_amu <= 0.0 {
            return Err(AnalysisError::Domain(format!(
                "atomic mass has to be > 0, but it is {}",
                mass_amu
            )));
        }
        let (name, number) = lookup_element(symbol)?;
        Ok(Atom {
            name,
            number,
            mass: mass_amu * AMU,
            xyz,
        })
    }
}

// the element symbol is deserialized through the static table, so the
// stored name keeps its 'static lifetime
impl<'de> Deserialize<'de> for Atom {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Atom, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawAtom {
            name: String,
            number: u8,
            mass: f64,
            xyz: Vector3<f64>,
        }
        let raw = RawAtom::deserialize(deserializer)?;
        let (name, number) = lookup_element(&raw.name)
            .map_err(|err| serde::de::Error::custom(err.to_string()))?;
        if number != raw.number {
            return Err(serde::de::Error::custom(format!(
                "element {} does not have atomic number {}",
                raw.name, raw.number
            )));
        }
        Ok(Atom {
            name,
            number,
            mass: raw.mass,
            xyz: raw.xyz,
        })
    }
}

fn lookup_element(symbol: &str) -> Result<(&'static str, u8)> {
    match ATOMIC_NUMBERS.get_entry(symbol) {
        Some((name, number)) => Ok((*name, *number)),
        None => Err(AnalysisError::InvalidInput(format!(
            "unknown element symbol: {}",
            symbol
        ))),
    }
}
