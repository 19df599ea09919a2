//! Logging facade and `env_logger` bring-up

pub use log::{debug, error, info, trace, warn};

use log::LevelFilter;

/// Initialize logging from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    init_with_level("info");
}

/// Initialize logging with `level` as the default filter.
///
/// `RUST_LOG` still overrides the default when set. An unparseable level
/// falls back to `info` with a warning once the logger is up.
pub fn init_with_level(level: &str) {
    let parsed = level.parse::<LevelFilter>().ok();
    let filter = parsed.unwrap_or(LevelFilter::Info);

    let installed = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init()
        .is_ok();

    if installed && parsed.is_none() {
        warn!("Unknown log level '{}', using 'info'", level);
    }
}
