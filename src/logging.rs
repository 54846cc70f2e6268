use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber for hosts that load the library
/// without one (the Python module calls this on import).
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a subscriber was
/// already installed.
pub fn init_logging(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}
