//! Divergence Strategy Main Entry Point

use std::io::BufReader;

use anyhow::{Context, Result};
use divergence_strategy::config::{load_config_file, resolve_config_path};
use divergence_strategy::feed::{DryRunExecution, JsonlTickSource, LogNotifier, PaperAccount};
use divergence_strategy::logging::init_strategy_logging;
use divergence_strategy::{DivergenceStrategy, StrategyConfig};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_strategy_logging("divergence_strategy")?;

    info!("Starting Divergence Strategy");

    let config = load_config().context("Failed to load divergence strategy configuration")?;

    info!(
        symbol = %config.symbol,
        interval_secs = config.candle_interval_secs,
        min_history = config.min_history,
        "Configuration loaded"
    );

    let paper_equity = config.paper_equity;
    let mut strategy =
        DivergenceStrategy::new(config).context("Invalid divergence strategy configuration")?;

    // Replay ticks from stdin; real deployments swap in a venue feed
    let strategy_handle = tokio::spawn(async move {
        let mut source = JsonlTickSource::new(BufReader::new(std::io::stdin()));
        let accounts = PaperAccount::new(paper_equity);
        let mut execution = DryRunExecution::default();
        let mut notifier = LogNotifier;

        strategy
            .run(&mut source, &accounts, &mut execution, &mut notifier)
            .await
    });

    info!("Divergence Strategy running. Press Ctrl+C to stop.");

    tokio::select! {
        result = strategy_handle => {
            match result {
                Ok(Ok(())) => info!("Strategy finished"),
                Ok(Err(e)) => error!("Strategy failed: {:?}", e),
                Err(e) => error!("Strategy task panicked: {:?}", e),
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutting down Divergence Strategy");
        }
    }

    Ok(())
}

fn load_config() -> Result<StrategyConfig> {
    let config_path = resolve_config_path(
        "DIVERGENCE_STRATEGY_CONFIG_PATH",
        "configs/divergence.toml",
    );

    load_config_file(&config_path, StrategyConfig::default())
}
