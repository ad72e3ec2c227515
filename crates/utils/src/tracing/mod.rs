use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn, Level};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing system
///
/// Honours `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Logs go to stderr
/// through a compact formatter; ANSI colours only when stderr is a terminal.
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = env_filter(DEFAULT_FILTER)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Install a subscriber that writes through the test harness capture.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_for_tests() {
    let Ok(filter) = env_filter("debug") else {
        return;
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().with_ansi(false))
        .try_init();
}

fn env_filter(default: &str) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
