use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout carries only command output. `RUST_LOG` wins over
/// the configured level.
pub(crate) fn init(configured_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
