//! Tracing subscriber setup.
//!
//! Provisioning records who it acted for as `#[instrument]` span fields
//! (`user_id`, `admin_id`, `email`, `company`, `role`). The JSON format lifts
//! the current span's fields onto every event so a single log line carries
//! them, and span close events report how long each operation took.

use crate::config::{Environment, LogFormat};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "expense_portal_backend=debug,tower_http=debug,info",
        Environment::Staging => "expense_portal_backend=debug,tower_http=info,info",
        Environment::Prod => "expense_portal_backend=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev())
        .with_span_events(FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                fmt_layer
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
    }

    tracing::info!(?format, "Logging initialized for {:?} environment", env);
}
