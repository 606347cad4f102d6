use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global `tracing` subscriber.
///
/// This should be called once, at the very start of `main`. Verbosity is
/// controlled by the `RUST_LOG` environment variable; if unset, defaults to
/// `info`. Timestamps use the same `%Y-%m-%d %H:%M:%S` local-time format the
/// reference repo's `fern`-based logger printed, now produced by
/// `tracing-subscriber`'s `chrono` timer instead.
pub fn init() {
    // `reqwest` (the launchTask HTTP client) logs through the `log` facade;
    // bridge it into `tracing` so its records pass through the same filter
    // and formatter as everything else instead of going to stderr raw.
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!("failed to install log-to-tracing bridge: {error}");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string());

    fmt().with_env_filter(filter).with_timer(timer).with_target(true).with_level(true).init();

    tracing::info!("logger initialized");
}
