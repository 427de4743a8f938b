//! tracing subscriber setup shared by the binaries.

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a formatting subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (e.g. `"info"` or
/// `"connectn=debug"`) is used as the filter directive.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| Error::InvalidConfiguration {
            message: format!("invalid log level '{}': {}", level, e),
        })?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .map_err(|e| Error::InvalidConfiguration {
            message: format!("tracing already initialised: {}", e),
        })
}
