//! Physical constants and conversion factors in Hartree atomic units.
//!
//! All quantities inside the crate are kept in atomic units (hbar = 1,
//! electron mass = 1, Hartree energies, bohr lengths). Frequencies are
//! ordinary frequencies (cycles per atomic time unit), so the Planck
//! constant is 2*pi and hbar*omega = 2*pi*nu.
use std::f64::consts::PI;

/// Boltzmann constant in Hartree/K (CODATA 2018).
pub const BOLTZMANN: f64 = 3.166811563e-6;
/// Planck constant, h = 2*pi in atomic units.
pub const PLANCK: f64 = 2.0 * PI;
/// Speed of light in atomic units.
pub const LIGHTSPEED: f64 = 137.035999084;

/// One Angstrom in bohr.
pub const ANGSTROM: f64 = 1.8897261246;
/// One centimeter in bohr.
pub const CENTIMETER: f64 = 1.0e8 * ANGSTROM;
/// Conversion from Angstrom to bohr and back.
pub const BOHR_TO_ANGS: f64 = 1.0 / ANGSTROM;
/// One atomic mass unit in electron masses.
pub const AMU: f64 = 1822.888486209;

/// One wavenumber (cm^-1) expressed as a frequency in atomic units.
/// Divide an internal frequency by this factor to print cm^-1.
pub const WAVENUMBER: f64 = LIGHTSPEED / CENTIMETER;
/// One atmosphere in Hartree/bohr^3.
pub const ATM: f64 = 3.443974e-9;
/// One bar in Hartree/bohr^3.
pub const BAR: f64 = 3.398930e-9;
/// One kJ/mol in Hartree.
pub const KJMOL: f64 = 3.808798847e-4;

/// Atomic masses of the most abundant isotopes in amu, keyed by the
/// atomic number. Multiply by [AMU] to obtain atomic units.
pub static ATOMIC_MASSES: phf::Map<u8, f64> = phf::phf_map! {
    1u8 => 1.0078250319,
    2u8 => 4.0026032497,
    3u8 => 7.0160040,
    4u8 => 9.0121821,
    5u8 => 11.0093055,
    6u8 => 12.0,
    7u8 => 14.0030740052,
    8u8 => 15.9949146221,
    9u8 => 18.9984032,
    10u8 => 19.9924401759,
    11u8 => 22.98976928,
    12u8 => 23.9850419,
    13u8 => 26.98153844,
    14u8 => 27.9769265327,
    15u8 => 30.97376151,
    16u8 => 31.97207069,
    17u8 => 34.96885271,
    18u8 => 39.962383123,
    19u8 => 38.9637069,
    20u8 => 39.9625912,
    21u8 => 44.9559102,
    22u8 => 47.9479471,
    23u8 => 50.9439637,
    24u8 => 51.9405119,
    25u8 => 54.9380496,
    26u8 => 55.9349421,
    27u8 => 58.9332002,
    28u8 => 57.9353479,
    29u8 => 62.9296011,
    30u8 => 63.9291466,
    31u8 => 68.925581,
    32u8 => 73.9211782,
    33u8 => 74.9215964,
    34u8 => 79.9165218,
    35u8 => 78.9183376,
    36u8 => 83.911507,
};

/// Atomic numbers keyed by the element symbol.
pub static ATOMIC_NUMBERS: phf::Map<&'static str, u8> = phf::phf_map! {
    "H" => 1u8,
    "He" => 2u8,
    "Li" => 3u8,
    "Be" => 4u8,
    "B" => 5u8,
    "C" => 6u8,
    "N" => 7u8,
    "O" => 8u8,
    "F" => 9u8,
    "Ne" => 10u8,
    "Na" => 11u8,
    "Mg" => 12u8,
    "Al" => 13u8,
    "Si" => 14u8,
    "P" => 15u8,
    "S" => 16u8,
    "Cl" => 17u8,
    "Ar" => 18u8,
    "K" => 19u8,
    "Ca" => 20u8,
    "Sc" => 21u8,
    "Ti" => 22u8,
    "V" => 23u8,
    "Cr" => 24u8,
    "Mn" => 25u8,
    "Fe" => 26u8,
    "Co" => 27u8,
    "Ni" => 28u8,
    "Cu" => 29u8,
    "Zn" => 30u8,
    "Ga" => 31u8,
    "Ge" => 32u8,
    "As" => 33u8,
    "Se" => 34u8,
    "Br" => 35u8,
    "Kr" => 36u8,
};
