use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sends log output to stderr.
///
/// Only warnings are shown by default, or everything down to debug level if
/// `verbose` is set. `RUST_LOG` overrides both.
pub fn init_logger(verbose: bool) {
    let default = if verbose {
        "sales_report=debug,info"
    } else {
        "sales_report=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}
