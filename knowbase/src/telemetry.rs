//! Tracing initialisation for the `knowbase` binary.
//!
//! Log output goes to stderr so that response bodies printed on stdout stay machine-readable.
//! The filter comes from `RUST_LOG` when set, otherwise from the configured `log_filter`:
//!
//! ```bash
//! RUST_LOG=knowbase=debug knowbase chat "What is in the handbook?"
//! ```

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with a console (fmt) layer.
///
/// Parameters:
/// - `default_filter`: directive used when `RUST_LOG` is unset or invalid
pub fn init_telemetry(default_filter: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    debug!("Telemetry initialized");
    Ok(())
}
