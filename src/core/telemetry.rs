use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| format!("paybridge={}", level).into())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
///
/// Panics if a global subscriber is already set; use [`try_init`] in tests.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Same as [`init`] with one JSON object per event, for log shippers
pub fn init_json(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Like [`init`], but returns false instead of panicking when a subscriber exists
pub fn try_init(level: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init()
        .is_ok()
}
