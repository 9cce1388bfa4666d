//! subtrack: subscription ledger normalization and aggregation
//!
//! Loads origin-tagged feed records, normalizes their heterogeneous keys,
//! aggregates them in one pass and serves the frozen result to the CLI, the
//! HTTP API and the terminal dashboard.

pub mod cli;
pub mod config;
pub mod parsers;
pub mod server;
pub mod services;
pub mod tui;
pub mod types;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "subtrack=warn";

/// Initialize the global tracing subscriber (stderr, `RUST_LOG` aware).
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        // A subscriber installed elsewhere (e.g. by a test harness) wins
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
