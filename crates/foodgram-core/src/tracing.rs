use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when `RUST_LOG` is unset: service logs at `info`,
/// per-statement sqlx logs only when slow or failing.
pub const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn";

fn filter_from(env: Option<&str>) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the JSON stdout subscriber filtered by `RUST_LOG`.
/// Later calls are no-ops.
pub fn init_tracing() {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(filter_from(env.as_deref()))
        .with(fmt::layer().json().with_current_span(false))
        .try_init();
}
