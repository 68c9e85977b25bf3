//! Strategy configuration

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Instrument being traded
    pub symbol: String,

    /// Candle duration in seconds
    pub candle_interval_secs: u64,
    /// Feed ticks folded into one candle before it closes on count
    pub max_ticks_per_candle: u32,
    /// Closed candles required before detection runs
    pub min_history: usize,

    /// Indicator periods
    pub rsi_period: usize,
    pub atr_period: usize,
    pub ema_fast_period: usize,
    pub ema_mid_period: usize,
    pub ema_slow_period: usize,

    /// Symmetric half-window for pivot confirmation
    pub pivot_lookback: usize,
    /// Pivot retention relative to the newest pivot, in bars
    pub max_lookback_bars: usize,
    /// Minimum bars between the two pivots of a divergence
    pub min_pivot_separation: usize,
    /// Bars suppressed after an emitted signal
    pub cooldown_bars: usize,

    /// Confidence threshold on [0, 1]
    pub min_confidence: Decimal,

    /// Fraction of equity risked per trade
    pub risk_per_trade: Decimal,
    /// Stop distance as a multiple of ATR
    pub stop_multiplier: Decimal,
    /// Profit targets as R-multiples of the stop distance
    pub target_rr: [Decimal; 3],
    /// Decimal places for order quantity
    pub qty_precision: u32,
    /// Plans below this notional are flagged in the log
    pub min_notional: Decimal,

    /// Equity reported by the paper account collaborator
    pub paper_equity: Decimal,
    /// Log signals and plans without submitting orders
    pub log_signals_only: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC/USD".to_string(),
            candle_interval_secs: 300,
            max_ticks_per_candle: 5,
            min_history: 100,
            rsi_period: 11,
            atr_period: 14,
            ema_fast_period: 20,
            ema_mid_period: 50,
            ema_slow_period: 100,
            pivot_lookback: 3,
            max_lookback_bars: 50,
            min_pivot_separation: 8,
            cooldown_bars: 10,
            min_confidence: dec!(0.40),
            risk_per_trade: dec!(0.10),
            stop_multiplier: dec!(1.5),
            target_rr: [dec!(1.5), dec!(2.5), dec!(3.5)],
            qty_precision: 6,
            min_notional: dec!(10),
            paper_equity: dec!(100000),
            log_signals_only: true,
        }
    }
}

impl StrategyConfig {
    /// Validate at startup, before any tick is processed. This is the only
    /// fatal error path in the engine.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            bail!("symbol must not be empty");
        }
        if self.candle_interval_secs == 0 {
            bail!("candle_interval_secs must be positive");
        }
        if self.max_ticks_per_candle == 0 {
            bail!("max_ticks_per_candle must be positive");
        }
        if self.rsi_period == 0 || self.atr_period == 0 {
            bail!("indicator periods must be positive");
        }
        if self.ema_fast_period == 0
            || self.ema_fast_period >= self.ema_mid_period
            || self.ema_mid_period >= self.ema_slow_period
        {
            bail!(
                "EMA periods must be positive and strictly ascending (fast < mid < slow), got {}/{}/{}",
                self.ema_fast_period,
                self.ema_mid_period,
                self.ema_slow_period
            );
        }
        if self.pivot_lookback == 0 {
            bail!("pivot_lookback must be positive");
        }
        if self.max_lookback_bars == 0 || self.min_pivot_separation == 0 {
            bail!("pivot window settings must be positive");
        }
        if self.min_confidence < Decimal::ZERO || self.min_confidence > Decimal::ONE {
            bail!("min_confidence must be within [0, 1]");
        }
        if self.risk_per_trade <= Decimal::ZERO || self.risk_per_trade > Decimal::ONE {
            bail!("risk_per_trade must be within (0, 1]");
        }
        if self.stop_multiplier <= Decimal::ZERO {
            bail!("stop_multiplier must be positive");
        }
        let [t1, t2, t3] = self.target_rr;
        if t1 <= Decimal::ZERO || t1 >= t2 || t2 >= t3 {
            bail!("target_rr must be positive and strictly ascending");
        }
        if self.paper_equity <= Decimal::ZERO {
            bail!("paper_equity must be positive");
        }
        Ok(())
    }
}

/// Resolve the configuration path from an environment variable, falling back
/// to a repo-relative default.
pub fn resolve_config_path(env_var: &str, default_path: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default_path))
}

/// Load configuration from a TOML file, falling back to `default` when the
/// file does not exist.
pub fn load_config_file(path: &Path, default: StrategyConfig) -> Result<StrategyConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(default);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_periods() {
        let mut config = StrategyConfig::default();
        config.rsi_period = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unordered_emas() {
        let mut config = StrategyConfig::default();
        config.ema_mid_period = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_risk() {
        let mut config = StrategyConfig::default();
        config.risk_per_trade = dec!(1.5);
        assert!(config.validate().is_err());

        config.risk_per_trade = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unordered_targets() {
        let mut config = StrategyConfig::default();
        config.target_rr = [dec!(2.5), dec!(1.5), dec!(3.5)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "symbol = \"ETH/USD\"\nrsi_period = 14\nmin_confidence = 0.55").unwrap();

        let config = load_config_file(file.path(), StrategyConfig::default()).unwrap();
        assert_eq!(config.symbol, "ETH/USD");
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.min_confidence, dec!(0.55));
        // Untouched fields keep their defaults
        assert_eq!(config.atr_period, 14);
        assert_eq!(config.cooldown_bars, 10);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config =
            load_config_file(Path::new("/nonexistent/divergence.toml"), StrategyConfig::default())
                .unwrap();
        assert_eq!(config.symbol, "BTC/USD");
    }
}
