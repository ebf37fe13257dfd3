use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Sends tracing events to stderr, keeping stdout for tables and charts.
/// `RUST_LOG`, when set, replaces the level passed on the command line.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };
    // A second initialisation (e.g. from tests) is harmless, so the error is dropped.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
