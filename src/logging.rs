use log;
use env_logger;

/// Installs the global logger at `level`; `RUST_LOG` takes precedence. \
/// Only the first call has any effect.
pub fn init(level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();

    match result {
        Ok(()) => debug!("logging at {}", log::max_level()),
        Err(_) => trace!("logger already installed"),
    }
}

#[cfg(test)]
mod tests {
    use log;
    use logging::*;

    #[test]
    fn repeated_init() {
        init(log::LevelFilter::Warn);
        init(log::LevelFilter::Trace);

        warn!("still logging");
    }
}
