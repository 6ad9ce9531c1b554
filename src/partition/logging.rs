use crate::constants::{AMU, KJMOL, WAVENUMBER};
use crate::partition::contributions::Ensemble;
use crate::partition::PartFun;
use log::{info, log_enabled, Level};

pub fn print_partfun(pf: &PartFun) {
    if !log_enabled!(Level::Info) {
        return;
    }
    info!("{:^80}", "");
    info!("{: ^80}", "Partition Function");
    info!("{:-^80}", "");
    if !pf.title.is_empty() {
        info!("{: <30} {}", "title:", pf.title);
    }
    info!("{: <30} {:.8} Hartree", "electronic energy:", pf.energy);
    info!(
        "{: <30} {:.4} kJ/mol",
        "zero-point energy:",
        pf.zero_point_energy() / KJMOL
    );
    if let Some(translation) = &pf.translation {
        info!("  TRANSLATIONAL");
        info!("{: <30} {:.6} amu", "    mass:", translation.mass / AMU);
        match translation.ensemble {
            Ensemble::ConstantPressure { pressure } => {
                info!("{: <30} {:.6e} a.u.", "    pressure:", pressure);
            }
            Ensemble::ConstantVolume { volume } => {
                info!("{: <30} {:.6e} bohr^3", "    volume:", volume);
            }
        }
    }
    if let Some(rotation) = &pf.rotation {
        info!("  ROTATIONAL");
        info!(
            "{: <30} {}",
            "    symmetry number:", rotation.symmetry_number
        );
        info!(
            "{: <30} {}",
            "    non-zero moments:", rotation.count
        );
        for moment in rotation.moments.iter() {
            info!("{: <30} {:.4} amu bohr^2", "    moment:", moment / AMU);
        }
    }
    info!("  VIBRATIONAL");
    info!(
        "{: <30} {}",
        "    real modes:",
        pf.vibration.freqs.len()
    );
    info!(
        "{: <30} {}",
        "    zero modes:",
        pf.vibration.zero_freqs.len()
    );
    info!(
        "{: <30} {}",
        "    imaginary modes:",
        pf.vibration.imaginary_freqs.len()
    );
    for freq in pf.vibration.freqs.iter() {
        info!("{: <30} {:>10.1}", "    wavenumber [1/cm]:", freq / WAVENUMBER);
    }
    for freq in pf.vibration.imaginary_freqs.iter() {
        info!(
            "{: <30} {:>10.1}i",
            "    wavenumber [1/cm]:",
            freq.abs() / WAVENUMBER
        );
    }
    info!("  ELECTRONIC");
    info!(
        "{: <30} {}",
        "    levels:",
        pf.electronic.levels.len()
    );
    info!("{:-^80}", "");
}
