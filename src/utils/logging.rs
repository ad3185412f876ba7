use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Install the viewer logger at `level`.
///
/// Hosts that already installed a logger keep it; only the max level moves.
pub fn set_log_level(level: LevelFilter) {
    if SimpleLogger::new().with_level(level).init().is_err() {
        log::debug!("Logger already installed, adjusting level to {}", level);
    }
    log::set_max_level(level);
}

/// Initialize viewer logging: `Debug` when tracing TOC internals, `Info` otherwise
pub fn init_logging(debug: bool) -> LevelFilter {
    let log_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    set_log_level(log_level);
    log_level
}
