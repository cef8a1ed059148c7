//! Logging setup: `RUST_LOG` wins, otherwise the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(level: &str) {
    let default_filter = format!("{level},food_insights={level},eframe=warn,egui=warn,wgpu=warn");

    let result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .compact(),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!(level, "logging initialised");
    }
}
