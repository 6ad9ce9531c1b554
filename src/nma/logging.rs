use crate::constants::{AMU, WAVENUMBER};
use crate::initialization::Molecule;
use crate::nma::Modes;
use log::{info, log_enabled, warn, Level};
use ndarray_stats::QuantileExt;

pub fn print_modes(scheme: &str, mol: &Molecule, modes: &Modes) {
    if !log_enabled!(Level::Info) {
        return;
    }
    info!("{:^80}", "");
    info!("{: ^80}", "Normal Mode Analysis");
    info!("{:-^80}", "");
    info!("{: <25} {}", "scheme:", scheme);
    info!("{: <25} {}", "atoms:", mol.n_atoms());
    info!("{: <25} {}", "removed modes:", modes.n_removed);
    info!("{: <25} {}", "residual zero modes:", modes.zeros.len());
    info!("{: <25} {}", "imaginary modes:", modes.imaginary_count());
    info!("{:^80}", "");
    info!(
        "{: <5} {: >16} {: >18}",
        "Mode", "Freq. [1/cm]", "Red. mass [amu]"
    );
    info!("{:-^42} ", "");
    for (idx, (freq, mu)) in modes
        .freqs
        .iter()
        .zip(modes.reduced_masses.iter())
        .enumerate()
    {
        info!(
            "{: >5} {:>16.2} {:>18.4}",
            idx + 1,
            freq / WAVENUMBER,
            mu / AMU
        );
    }
    info!("{:-^42} ", "");
    if modes.imaginary_count() > 0 {
        if let Ok(min_freq) = modes.freqs.min() {
            warn!(
                "{} imaginary frequencies detected, lowest at {:.1}i 1/cm",
                modes.imaginary_count(),
                min_freq.abs() / WAVENUMBER
            );
        }
    }
}
