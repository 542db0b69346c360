use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` is honored unless `verbose`
/// forces debug output. Stdout stays reserved for reports.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
