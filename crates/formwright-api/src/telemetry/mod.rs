//! Tracing subscriber setup

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "formwright=debug,tower_http=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this twice fails, so
/// tests build their router without it.
pub fn init_telemetry(environment: &str) -> Result<(), Box<dyn std::error::Error>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(console_fmt)
        .try_init()?;

    tracing::info!(environment = %environment, "Tracing initialized");
    Ok(())
}
