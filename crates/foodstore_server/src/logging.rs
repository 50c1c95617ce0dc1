//! Structured logging setup for the server
//!
//! Filtering follows `RUST_LOG` and falls back to `info`, so request and store
//! events of the catalog are printed by default.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Installs the global subscriber, once.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(true).compact().with_target(false))
            .init();
    });
}
