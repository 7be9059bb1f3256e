//! Tracing subscriber setup

use barrage_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter from the configured level, then `RUST_LOG`, then `info`
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(config.level.as_str())
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_layer(config: &LoggingConfig) -> BoxedLayer {
    let location = config.include_location;
    let target = config.include_target;

    match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_file(location)
            .with_line_number(location)
            .with_target(target)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_file(location)
            .with_line_number(location)
            .with_target(target)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(location)
            .with_line_number(location)
            .with_target(target)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_file(location)
            .with_line_number(location)
            .with_target(target)
            .boxed(),
    }
}

/// Install the global subscriber. A second call leaves the first one in place.
pub fn init_logging(config: &LoggingConfig) {
    let subscriber = tracing_subscriber::registry()
        .with(build_layer(config))
        .with(build_filter(config));

    if subscriber.try_init().is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }
}
