//! Logger setup.

/// Initializes env_logger.
///
/// Verbose runs log every artifact at debug level; otherwise only warnings
/// and errors are shown. `RUST_LOG` still overrides both.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_target(false)
        .parse_default_env()
        .init();
}
