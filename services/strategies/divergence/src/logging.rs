//! Standardized logging initialization for strategy services

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for a strategy binary.
///
/// Honors `RUST_LOG` when set; otherwise defaults the whole service to
/// `info` with the named service at `debug`.
pub fn init_strategy_logging(service_name: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info").add_directive(format!("{service_name}=debug").parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}
