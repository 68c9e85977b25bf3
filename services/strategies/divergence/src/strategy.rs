//! Divergence strategy: wires the streaming core to its collaborators

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use types::Tick;

use crate::candles::CandleAggregator;
use crate::config::StrategyConfig;
use crate::detector::DivergenceDetector;
use crate::error::{Result, StrategyError};
use crate::indicators::{compute_indicators, IndicatorParams};
use crate::signals::{OrderPlan, Signal, SignalStats};
use crate::sizing::{size_position, RiskParams};
use crate::traits::{AccountProvider, ExecutionSink, NotificationSink, TickSource};

/// The complete signal engine for one instrument.
///
/// Single-writer: ticks must be delivered one at a time, in non-decreasing
/// timestamp order, with no overlapping calls. All per-tick work runs to
/// completion synchronously; only the collaborator shell is async.
#[derive(Debug)]
pub struct DivergenceStrategy {
    config: StrategyConfig,
    aggregator: CandleAggregator,
    detector: DivergenceDetector,
    indicator_params: IndicatorParams,
    risk_params: RiskParams,
    stats: SignalStats,
    trading_enabled: bool,
}

impl DivergenceStrategy {
    /// Construct from validated configuration. Invalid configuration is the
    /// only fatal error and surfaces here, before any tick is processed.
    pub fn new(config: StrategyConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| StrategyError::Configuration { message: e.to_string() })?;

        Ok(Self {
            aggregator: CandleAggregator::new(
                config.candle_interval_secs,
                config.max_ticks_per_candle,
            ),
            detector: DivergenceDetector::new(&config),
            indicator_params: IndicatorParams::from_config(&config),
            risk_params: RiskParams::from_config(&config),
            stats: SignalStats::default(),
            trading_enabled: false,
            config,
        })
    }

    /// Core per-tick transition. Returns a signal when the tick closed a
    /// candle and that candle completed a qualifying divergence.
    pub fn on_tick(&mut self, tick: &Tick) -> Option<Signal> {
        let _closed = self.aggregator.ingest(tick)?;

        if !self.trading_enabled {
            if !self.aggregator.has_minimum(self.config.min_history) {
                if self.aggregator.len() % 5 == 0 {
                    debug!(
                        candles = self.aggregator.len(),
                        required = self.config.min_history,
                        "collecting warmup candles"
                    );
                }
                return None;
            }
            self.trading_enabled = true;
            info!(candles = self.aggregator.len(), "warmup complete, trading enabled");
        }

        let series = compute_indicators(self.aggregator.candles(), &self.indicator_params);
        let signal = self.detector.detect(&series)?;
        self.stats.record_signal(&signal);
        Some(signal)
    }

    /// Size an accepted signal against a fresh equity snapshot.
    pub fn plan_for(
        &self,
        signal: &Signal,
        current_price: Decimal,
        equity: Decimal,
    ) -> Option<OrderPlan> {
        size_position(signal, current_price, equity, &self.risk_params)
    }

    pub fn stats(&self) -> &SignalStats {
        &self.stats
    }

    pub fn candle_count(&self) -> usize {
        self.aggregator.len()
    }

    pub fn is_trading_enabled(&self) -> bool {
        self.trading_enabled
    }

    /// Drive the strategy from a tick source until the feed is exhausted.
    ///
    /// Signals are notified best-effort; order plans are submitted unless the
    /// configuration asks for log-only operation. Sizing rejections are
    /// expected and silently drop the signal.
    pub async fn run<S, A, E, N>(
        &mut self,
        source: &mut S,
        accounts: &A,
        execution: &mut E,
        notifier: &mut N,
    ) -> Result<()>
    where
        S: TickSource,
        A: AccountProvider,
        E: ExecutionSink,
        N: NotificationSink,
    {
        info!(symbol = %self.config.symbol, "strategy processing ticks");

        while let Some(tick) = source
            .next_tick()
            .await
            .map_err(|e| StrategyError::MarketData { message: e.to_string() })?
        {
            let Some(signal) = self.on_tick(&tick) else {
                continue;
            };

            let equity = match accounts.equity().await {
                Ok(equity) => equity,
                Err(e) => {
                    warn!(error = %e, "equity lookup failed, dropping signal");
                    continue;
                }
            };

            if let Err(e) = notifier.notify_signal(&signal, equity).await {
                warn!(error = %e, "signal notification failed");
            }

            // Entry at the latest observed close
            let Some(plan) = self.plan_for(&signal, tick.close, equity) else {
                debug!("signal discarded by position sizing");
                continue;
            };

            if self.config.log_signals_only {
                info!(
                    side = ?plan.side,
                    qty = %plan.quantity,
                    entry = %plan.entry,
                    stop = %plan.stop,
                    "log-only mode, order not submitted"
                );
            } else {
                match execution.submit(&plan).await {
                    Ok(order_id) => info!(%order_id, side = ?plan.side, qty = %plan.quantity, "order submitted"),
                    Err(e) => error!(error = %e, "order submission failed"),
                }
            }

            if let Err(e) = notifier.notify_plan(&plan).await {
                warn!(error = %e, "plan notification failed");
            }
        }

        info!(
            candles = self.aggregator.len(),
            signals = self.stats.total_signals,
            "tick feed exhausted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn flat_tick(secs: i64, price: Decimal) -> Tick {
        Tick {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: dec!(1),
        }
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let mut config = StrategyConfig::default();
        config.risk_per_trade = dec!(2);
        let err = DivergenceStrategy::new(config).unwrap_err();
        assert!(matches!(err, StrategyError::Configuration { .. }));
    }

    #[test]
    fn warmup_gate_blocks_detection_until_min_history() {
        let mut config = StrategyConfig::default();
        config.min_history = 3;
        let mut strategy = DivergenceStrategy::new(config).unwrap();

        // 13 ticks at one-minute cadence: candles close at ticks 5, 9, 13
        for i in 0..13 {
            let signal = strategy.on_tick(&flat_tick(i * 60, dec!(100)));
            assert!(signal.is_none()); // flat series never diverges
        }

        assert_eq!(strategy.candle_count(), 3);
        assert!(strategy.is_trading_enabled());
        assert_eq!(strategy.stats().total_signals, 0);
    }

    #[test]
    fn ticks_within_a_period_produce_no_candles() {
        let mut strategy = DivergenceStrategy::new(StrategyConfig::default()).unwrap();
        for i in 0..4 {
            assert!(strategy.on_tick(&flat_tick(i * 60, dec!(100))).is_none());
        }
        assert_eq!(strategy.candle_count(), 0);
        assert!(!strategy.is_trading_enabled());
    }
}
