//! Tracing subscriber setup for embedding applications.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// Format is chosen by the `LOG_FORMAT` env var (`pretty` for local
/// development, anything else for JSON). Filtering follows `RUST_LOG`,
/// defaulting to info for this crate. Safe to call once per process;
/// later calls fail quietly if a subscriber is already set.
pub fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagegen_kernel=info".into());

    if log_format == "pretty" {
        // Pretty format for local development
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init();
    } else {
        // Flattened JSON lines, one event per line, for log pipelines.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .try_init();
    }
}
