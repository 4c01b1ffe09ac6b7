use tracing_subscriber::EnvFilter;

/// Install the JSON tracing subscriber used by both binaries.
///
/// `RUST_LOG` takes precedence; otherwise `level` (e.g. `INFO` from config) is used.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_ascii_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}
