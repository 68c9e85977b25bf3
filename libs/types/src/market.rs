//! Market data primitives: feed bars, closed candles, augmented candles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single sub-interval OHLCV bar as delivered by the market data feed.
///
/// Ticks are ephemeral: the aggregator consumes them immediately and they are
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A completed fixed-duration candle.
///
/// `timestamp` is the period start (the timestamp of the first tick folded
/// in). Once a candle has been closed and appended to a series its OHLCV
/// values never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Number of feed ticks folded into this candle.
    pub tick_count: u32,
}

impl Candle {
    /// Seed a new working candle from the first tick of its period.
    pub fn from_tick(tick: &Tick) -> Self {
        Self {
            timestamp: tick.timestamp,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
            volume: tick.volume,
            tick_count: 1,
        }
    }

    /// Fold a subsequent tick into this (still-open) candle.
    pub fn merge_tick(&mut self, tick: &Tick) {
        self.high = self.high.max(tick.high);
        self.low = self.low.min(tick.low);
        self.close = tick.close;
        self.volume += tick.volume;
        self.tick_count += 1;
    }
}

/// A `Candle` plus indicator values computed over the containing series.
///
/// RSI and ATR are `None` until their trailing windows are full (and RSI is
/// `None` whenever the average loss over its window is zero). The EMAs are
/// seeded from the first close and therefore defined at every index. Pivot
/// flags are always `false` within `lookback` of either end of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedCandle {
    pub candle: Candle,
    pub rsi: Option<Decimal>,
    pub atr: Option<Decimal>,
    pub ema_fast: Decimal,
    pub ema_mid: Decimal,
    pub ema_slow: Decimal,
    pub pivot_high: bool,
    pub pivot_low: bool,
}

impl AugmentedCandle {
    pub fn close(&self) -> Decimal {
        self.candle.close
    }

    pub fn high(&self) -> Decimal {
        self.candle.high
    }

    pub fn low(&self) -> Decimal {
        self.candle.low
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.candle.timestamp
    }
}
