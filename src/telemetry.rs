use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostics go to stderr so stdout carries only the mirror's own output.
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,page_mirror=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
