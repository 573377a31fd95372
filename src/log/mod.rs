use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "kazeta=info";

/// Logs go to stderr so the status line keeps stdout to itself.
pub(crate) fn initialize_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}
