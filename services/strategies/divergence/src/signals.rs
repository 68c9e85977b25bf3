//! Trading signal and order plan definitions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a divergence signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Direction::Bullish)
    }
}

/// Order side derived from the signal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// A confirmed divergence between price extrema and RSI.
///
/// Produced by the detector once per accepted candidate; consumed by the
/// position sizer and the notification sink, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// Timestamp of the pivot candle that completed the pattern
    pub timestamp: DateTime<Utc>,
    /// Extremum price at that pivot
    pub price: Decimal,
    pub rsi: Decimal,
    pub atr: Decimal,
    /// Confidence on [0, 1]
    pub confidence: Decimal,
    /// Bars between the matched pivots
    pub bars_between: usize,
}

/// A risk-bounded order plan derived from an accepted signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub side: Side,
    pub quantity: Decimal,
    pub entry: Decimal,
    pub stop: Decimal,
    pub targets: [Decimal; 3],
    pub stop_distance: Decimal,
    /// Dollars at risk if the stop is hit
    pub risk_dollars: Decimal,
    /// Profit at each target for the planned quantity
    pub potential_profit: [Decimal; 3],
    /// Equity snapshot the plan was sized against
    pub account_balance: Decimal,
}

/// Signal generation statistics
#[derive(Debug, Default, Clone)]
pub struct SignalStats {
    pub total_signals: u64,
    pub bullish_signals: u64,
    pub bearish_signals: u64,
    pub avg_confidence: Decimal,
    pub last_signal_at: Option<DateTime<Utc>>,
}

impl SignalStats {
    /// Update stats with a new signal
    pub fn record_signal(&mut self, signal: &Signal) {
        self.total_signals += 1;

        match signal.direction {
            Direction::Bullish => self.bullish_signals += 1,
            Direction::Bearish => self.bearish_signals += 1,
        }

        let previous = self.avg_confidence * Decimal::from(self.total_signals - 1);
        self.avg_confidence = (previous + signal.confidence) / Decimal::from(self.total_signals);

        self.last_signal_at = Some(signal.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn signal(direction: Direction, confidence: Decimal) -> Signal {
        Signal {
            direction,
            timestamp: Utc.timestamp_opt(1_000, 0).unwrap(),
            price: dec!(50000),
            rsi: dec!(28),
            atr: dec!(120),
            confidence,
            bars_between: 9,
        }
    }

    #[test]
    fn stats_track_counts_and_average_confidence() {
        let mut stats = SignalStats::default();
        stats.record_signal(&signal(Direction::Bullish, dec!(0.5)));
        stats.record_signal(&signal(Direction::Bearish, dec!(0.7)));

        assert_eq!(stats.total_signals, 2);
        assert_eq!(stats.bullish_signals, 1);
        assert_eq!(stats.bearish_signals, 1);
        assert_eq!(stats.avg_confidence, dec!(0.6));
        assert_eq!(stats.last_signal_at, Some(Utc.timestamp_opt(1_000, 0).unwrap()));
    }
}
