use crate::constants;

// MOLECULE SPECIFICATION
// spin multiplicity 2S + 1
pub const MULTIPLICITY: u8 = 1;
// config file
pub const CONFIG_FILE_NAME: &str = "vibtherm.toml";

// NORMAL MODE ANALYSIS
// relative tolerance for the symmetry check of the input Hessian
pub const HESSIAN_SYMMETRY_TOLERANCE: f64 = 1.0e-8;
// frequencies with a magnitude below this value (0.1 cm^-1) count as
// projected-out external modes; results near the boundary are sensitive
// to this choice
pub const ZERO_FREQ_TOLERANCE: f64 = 0.1 * constants::WAVENUMBER;
// singular values below this fraction of the largest one are treated as
// rank deficiencies when a projection basis is orthonormalized
pub const RANK_TOLERANCE: f64 = 1.0e-8;
// moments of inertia below this value (a.u.) count as zero; decides
// linearity and the number of external rotations
pub const MOMENT_THRESHOLD: f64 = 1.0;

// PARTITION FUNCTION
pub const PRESSURE: f64 = constants::ATM;
pub const SYMMETRY_NUMBER: usize = 1;
pub const FREQ_SCALING: f64 = 1.0;
pub const ZP_SCALING: f64 = 1.0;
// wavenumber cutoff below which the free-rotor interpolation replaces
// the harmonic oscillator in the quasi-harmonic treatment
pub const LOW_FREQ_CUTOFF: f64 = 100.0;

// THERMOCHEMISTRY / KINETICS
pub const TEMPERATURE: f64 = 298.15;
// energy grid points for the numerical Eckart transmission integral
pub const ECKART_GRID_POINTS: usize = 1000;
// integration window in units of kT beyond the forward barrier
pub const ECKART_WINDOW: f64 = 20.0;
