use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{Error, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (for example the
/// configured `log_level`) is used as the filter.
pub fn init(default_level: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| Error::Logging {
            message: e.to_string(),
        })?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging {
            message: e.to_string(),
        })
}
