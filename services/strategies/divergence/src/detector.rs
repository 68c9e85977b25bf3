//! Divergence detection over the augmented candle series
//!
//! The detector keeps only two pieces of state across calls: a pruned window
//! of recently confirmed pivots and the candidate index of the last emitted
//! signal (for cooldown). Everything else is recomputed from the series
//! passed in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};
use types::AugmentedCandle;

use crate::confidence;
use crate::config::StrategyConfig;
use crate::signals::{Direction, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotKind {
    High,
    Low,
}

/// A confirmed local extremum in the candle series.
#[derive(Debug, Clone)]
pub struct Pivot {
    pub index: usize,
    pub kind: PivotKind,
    pub price: Decimal,
    pub rsi: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// Detects price/RSI divergences at confirmed pivots.
#[derive(Debug)]
pub struct DivergenceDetector {
    pivot_lookback: usize,
    max_lookback_bars: usize,
    min_pivot_separation: usize,
    cooldown_bars: usize,
    min_confidence: Decimal,
    min_history: usize,

    /// Recent pivots, newest last
    pivots: Vec<Pivot>,
    /// Candidate index of the last emitted signal
    last_signal_index: Option<usize>,
}

impl DivergenceDetector {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            pivot_lookback: config.pivot_lookback,
            max_lookback_bars: config.max_lookback_bars,
            min_pivot_separation: config.min_pivot_separation,
            cooldown_bars: config.cooldown_bars,
            min_confidence: config.min_confidence,
            min_history: config.min_history,
            pivots: Vec::new(),
            last_signal_index: None,
        }
    }

    /// Evaluate the series after a new candle has closed.
    ///
    /// The candidate index trails the series end by `pivot_lookback + 1` so
    /// that its full symmetric confirmation window has been observed. At most
    /// one signal is returned per call; a candidate that fails the pattern or
    /// confidence gate still leaves its pivot in the window for future
    /// matching.
    pub fn detect(&mut self, series: &[AugmentedCandle]) -> Option<Signal> {
        if series.len() < self.min_history {
            return None;
        }
        if series.len() < self.pivot_lookback + 1 {
            return None;
        }
        let candidate_index = series.len() - self.pivot_lookback - 1;
        if candidate_index < self.pivot_lookback {
            return None;
        }

        // Cooldown is measured between candidate indices: a signal at index i
        // suppresses candidates through i + cooldown_bars - 1.
        if let Some(last) = self.last_signal_index {
            if candidate_index.saturating_sub(last) < self.cooldown_bars {
                return None;
            }
        }

        let row = &series[candidate_index];
        let kind = if row.pivot_high {
            PivotKind::High
        } else if row.pivot_low {
            PivotKind::Low
        } else {
            return None;
        };

        let pivot = Pivot {
            index: candidate_index,
            kind,
            price: match kind {
                PivotKind::High => row.high(),
                PivotKind::Low => row.low(),
            },
            rsi: row.rsi,
            timestamp: row.timestamp(),
        };
        debug!(index = pivot.index, kind = ?pivot.kind, price = %pivot.price, "pivot confirmed");

        self.pivots.push(pivot.clone());
        self.pivots
            .retain(|p| candidate_index - p.index <= self.max_lookback_bars);

        // Nearest prior same-type pivot with enough separation; older pivots
        // are not consulted even if this one fails the pattern test.
        let prior = self
            .pivots
            .iter()
            .rev()
            .skip(1)
            .find(|p| p.kind == kind && candidate_index - p.index >= self.min_pivot_separation)?;

        let rsi = pivot.rsi?;
        let prior_rsi = prior.rsi?;

        let direction = match kind {
            PivotKind::Low
                if pivot.price < prior.price && rsi > prior_rsi && rsi < dec!(40) =>
            {
                Direction::Bullish
            }
            PivotKind::High
                if pivot.price > prior.price && rsi < prior_rsi && rsi > dec!(60) =>
            {
                Direction::Bearish
            }
            _ => return None,
        };

        let bars_between = candidate_index - prior.index;
        let confidence = confidence::score(series, candidate_index, direction.is_bullish());
        if confidence < self.min_confidence {
            debug!(
                index = candidate_index,
                ?direction,
                %confidence,
                threshold = %self.min_confidence,
                "divergence below confidence threshold"
            );
            return None;
        }

        let atr = row.atr?;
        self.last_signal_index = Some(candidate_index);

        info!(
            ?direction,
            index = candidate_index,
            price = %pivot.price,
            %rsi,
            %confidence,
            bars_between,
            "divergence signal"
        );

        Some(Signal {
            direction,
            timestamp: pivot.timestamp,
            price: pivot.price,
            rsi,
            atr,
            confidence,
            bars_between,
        })
    }

    /// Pivots currently retained for matching, oldest first.
    pub fn pivot_window(&self) -> &[Pivot] {
        &self.pivots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use types::Candle;

    fn test_config() -> StrategyConfig {
        let mut config = StrategyConfig::default();
        config.min_history = 5;
        config.pivot_lookback = 3;
        config.max_lookback_bars = 50;
        config.min_pivot_separation = 8;
        config.cooldown_bars = 10;
        config.min_confidence = dec!(0.40);
        config
    }

    /// Build an augmented row directly; detection consumes precomputed flags.
    fn row(i: usize, price: Decimal, rsi: Option<Decimal>, pivot_low: bool, pivot_high: bool) -> AugmentedCandle {
        AugmentedCandle {
            candle: Candle {
                timestamp: Utc.timestamp_opt(i as i64 * 300, 0).unwrap(),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: dec!(1),
                tick_count: 5,
            },
            rsi,
            // Non-monotonic EMA spread below the close: range conditions with
            // a negative dma, so bullish candidates clear the 0.40 gate.
            atr: Some(dec!(10)),
            ema_fast: price + dec!(5),
            ema_mid: price + dec!(8),
            ema_slow: price + dec!(6),
            pivot_high,
            pivot_low,
        }
    }

    fn plain(i: usize, price: Decimal) -> AugmentedCandle {
        row(i, price, Some(dec!(38)), false, false)
    }

    /// Series with pivot lows at `first` and `second`; replays `detect` over
    /// growing prefixes the way the strategy does per closed candle.
    fn replay(detector: &mut DivergenceDetector, series: &[AugmentedCandle]) -> Vec<(usize, Signal)> {
        let mut out = Vec::new();
        for k in 1..=series.len() {
            if let Some(signal) = detector.detect(&series[..k]) {
                out.push((k, signal));
            }
        }
        out
    }

    fn divergence_series(len: usize) -> Vec<AugmentedCandle> {
        let mut series: Vec<AugmentedCandle> = (0..len).map(|i| plain(i, dec!(100))).collect();
        // Prior pivot low: price 100, RSI 25
        series[10] = row(10, dec!(100), Some(dec!(25)), true, false);
        // Candidate pivot low: lower low 95 with higher RSI 32
        series[20] = row(20, dec!(95), Some(dec!(32)), true, false);
        series
    }

    #[test]
    fn emits_bullish_divergence_signal() {
        let mut detector = DivergenceDetector::new(&test_config());
        let series = divergence_series(30);
        let signals = replay(&mut detector, &series);

        assert_eq!(signals.len(), 1);
        let (at_len, signal) = &signals[0];
        // Candidate 20 is evaluated once 24 candles exist (lookback 3 + 1)
        assert_eq!(*at_len, 24);
        assert_eq!(signal.direction, Direction::Bullish);
        assert_eq!(signal.price, dec!(95));
        assert_eq!(signal.rsi, dec!(32));
        assert_eq!(signal.bars_between, 10);
        assert!(signal.confidence >= dec!(0.40));
        assert!(signal.confidence <= Decimal::ONE);
    }

    #[test]
    fn requires_minimum_bar_separation() {
        let mut detector = DivergenceDetector::new(&test_config());
        let mut series: Vec<AugmentedCandle> = (0..30).map(|i| plain(i, dec!(100))).collect();
        series[10] = row(10, dec!(100), Some(dec!(25)), true, false);
        // Only 7 bars apart: below the 8-bar minimum
        series[17] = row(17, dec!(95), Some(dec!(32)), true, false);

        assert!(replay(&mut detector, &series).is_empty());
    }

    #[test]
    fn rejects_divergence_without_rsi_improvement() {
        let mut detector = DivergenceDetector::new(&test_config());
        let mut series: Vec<AugmentedCandle> = (0..30).map(|i| plain(i, dec!(100))).collect();
        series[10] = row(10, dec!(100), Some(dec!(25)), true, false);
        // Lower low and lower RSI: momentum confirms the move, no divergence
        series[20] = row(20, dec!(95), Some(dec!(20)), true, false);

        assert!(replay(&mut detector, &series).is_empty());
    }

    #[test]
    fn bullish_requires_rsi_below_forty() {
        let mut detector = DivergenceDetector::new(&test_config());
        let mut series: Vec<AugmentedCandle> = (0..30).map(|i| plain(i, dec!(100))).collect();
        series[10] = row(10, dec!(100), Some(dec!(41)), true, false);
        series[20] = row(20, dec!(95), Some(dec!(45)), true, false);

        assert!(replay(&mut detector, &series).is_empty());
    }

    #[test]
    fn emits_bearish_divergence_signal() {
        let mut config = test_config();
        config.min_confidence = dec!(0.20);
        let mut detector = DivergenceDetector::new(&config);

        let mut series: Vec<AugmentedCandle> = (0..30)
            .map(|i| row(i, dec!(100), Some(dec!(62)), false, false))
            .collect();
        series[10] = row(10, dec!(100), Some(dec!(75)), false, true);
        // Higher high with weaker RSI
        series[20] = row(20, dec!(105), Some(dec!(68)), false, true);

        let signals = replay(&mut detector, &series);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].1.direction, Direction::Bearish);
        assert_eq!(signals[0].1.price, dec!(105));
    }

    #[test]
    fn cooldown_suppresses_nearby_candidates() {
        let mut detector = DivergenceDetector::new(&test_config());
        let mut series = divergence_series(40);
        // Qualifying pivot 8 bars after the signal at 20: separation passes,
        // cooldown (10 bars) does not
        series[28] = row(28, dec!(92), Some(dec!(34)), true, false);
        // First eligible candidate after cooldown
        series[30] = row(30, dec!(90), Some(dec!(35)), true, false);

        let signals = replay(&mut detector, &series);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].1.price, dec!(95));
        // Index 28 was skipped; index 30 matched against the pivot at 20
        assert_eq!(signals[1].1.price, dec!(90));
        assert_eq!(signals[1].1.bars_between, 10);
    }

    #[test]
    fn stale_pivots_are_pruned_from_the_window() {
        let mut config = test_config();
        config.max_lookback_bars = 15;
        let mut detector = DivergenceDetector::new(&config);

        let mut series: Vec<AugmentedCandle> = (0..50).map(|i| plain(i, dec!(100))).collect();
        series[10] = row(10, dec!(100), Some(dec!(25)), true, false);
        // 20 bars later: the pivot at 10 has aged out, so nothing matches
        series[30] = row(30, dec!(95), Some(dec!(32)), true, false);

        assert!(replay(&mut detector, &series).is_empty());
        assert_eq!(detector.pivot_window().len(), 1);
        assert_eq!(detector.pivot_window()[0].index, 30);
    }

    #[test]
    fn undefined_rsi_at_either_pivot_yields_no_signal() {
        let mut detector = DivergenceDetector::new(&test_config());
        let mut series: Vec<AugmentedCandle> = (0..30).map(|i| plain(i, dec!(100))).collect();
        series[10] = row(10, dec!(100), None, true, false);
        series[20] = row(20, dec!(95), Some(dec!(32)), true, false);

        assert!(replay(&mut detector, &series).is_empty());
    }

    #[test]
    fn respects_minimum_history() {
        let mut config = test_config();
        config.min_history = 100;
        let mut detector = DivergenceDetector::new(&config);
        let series = divergence_series(30);

        assert!(replay(&mut detector, &series).is_empty());
    }
}
