
use log::LevelFilter;
use std::fmt;
use std::io::Write;
use std::time::Instant;

/// A simple timer based on std::time::Instant, to implement the
/// std::fmt::Display trait on
pub struct Timer {
    time: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Timer {
            time: Instant::now(),
        }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:>68} {:>8.2} s",
            "elapsed time:",
            self.time.elapsed().as_secs_f32()
        )
    }
}

/// Build the message-only logger used by the formatted tables of this
/// crate. Consumers that already install their own logger should skip
/// this helper.
pub fn init_logger(verbose: i8) {
    let log_level: LevelFilter = match verbose {
        2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let _ = env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .try_init();
}
