use tracing_subscriber::{fmt, EnvFilter};

/// Log to stderr so stdout stays parseable. Level comes from FASTROOM_LOG,
/// e.g. `FASTROOM_LOG=fastroom_core=debug`; defaults to warnings only.
pub fn init() {
    let filter = EnvFilter::try_from_env("FASTROOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
