//! Tracing bootstrap and the per-request root span.

use once_cell::sync::OnceCell;
use tracing::{Level, Span, info};
use tracing_subscriber::{EnvFilter, fmt};

use crate::ids::CorrelationId;

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// Install the process-wide fmt subscriber. First call wins, so the CLI and
/// tests can both bootstrap without tripping over each other.
///
/// `RUST_LOG` overrides the default filter, which keeps gateway decisions at
/// info and quiets sqlx chatter.
pub fn init_logger(service_name: &'static str) {
    SUBSCRIBER.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .init();

        info!(service = service_name, "logging initialized");
    });
}

/// Create the root span for one pipeline run.
///
/// The correlation id is recorded once here and inherited by every event
/// emitted while the span is entered.
pub fn pipeline_span(name: &'static str, correlation_id: &CorrelationId) -> Span {
    tracing::span!(
        Level::INFO,
        "pipeline",
        name = %name,
        correlation_id = %correlation_id.as_str()
    )
}
