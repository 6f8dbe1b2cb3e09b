use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::OffsetTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = env_filter(&cfg.filter)?;
    tracing_subscriber::registry()
        .with(output_layer(cfg).with_filter(filter))
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))
}

fn output_layer(cfg: &LoggerConfig) -> BoxedLayer {
    // Events go to stderr; stdout is reserved for the batch report.
    match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(cfg.ansi)
            .with_target(cfg.show_target)
            .with_timer(local_rfc3339())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .with_target(cfg.show_target)
            .with_timer(local_rfc3339())
            .boxed(),
    }
}

pub(crate) fn env_filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    OffsetTime::new(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC), Rfc3339)
}
