//! Streaming tick-to-candle aggregation

use chrono::Duration;
use tracing::{debug, warn};
use types::{Candle, Tick};

/// Aggregation state: either waiting for the first tick or accumulating a
/// working candle.
#[derive(Debug, Clone)]
enum AggregatorState {
    Empty,
    Accumulating(Candle),
}

/// Folds sub-interval feed ticks into completed fixed-duration candles.
///
/// The working candle closes when either the elapsed time since its period
/// start reaches the configured interval or its tick count reaches
/// `max_ticks_per_candle`, whichever comes first. The triggering tick is
/// merged into the closing candle and also seeds the next one; it is never
/// dropped.
///
/// Ticks older than the working candle's period start are rejected — the
/// caller must deliver ticks one at a time in non-decreasing timestamp order.
#[derive(Debug)]
pub struct CandleAggregator {
    interval: Duration,
    max_ticks_per_candle: u32,
    state: AggregatorState,
    series: Vec<Candle>,
}

impl CandleAggregator {
    pub fn new(interval_secs: u64, max_ticks_per_candle: u32) -> Self {
        Self {
            interval: Duration::seconds(interval_secs as i64),
            max_ticks_per_candle,
            state: AggregatorState::Empty,
            series: Vec::new(),
        }
    }

    /// Consume one tick. Returns the newly closed candle, or `None` when the
    /// tick only updated the in-progress candle.
    pub fn ingest(&mut self, tick: &Tick) -> Option<Candle> {
        match &mut self.state {
            AggregatorState::Empty => {
                self.state = AggregatorState::Accumulating(Candle::from_tick(tick));
                None
            }
            AggregatorState::Accumulating(working) => {
                if tick.timestamp < working.timestamp {
                    warn!(
                        tick_ts = %tick.timestamp,
                        period_start = %working.timestamp,
                        "rejecting out-of-order tick"
                    );
                    return None;
                }

                working.merge_tick(tick);

                let elapsed = tick.timestamp - working.timestamp;
                if elapsed >= self.interval || working.tick_count >= self.max_ticks_per_candle {
                    let closed = working.clone();
                    self.state = AggregatorState::Accumulating(Candle::from_tick(tick));
                    debug!(
                        period_start = %closed.timestamp,
                        close = %closed.close,
                        ticks = closed.tick_count,
                        total = self.series.len() + 1,
                        "candle closed"
                    );
                    self.series.push(closed.clone());
                    Some(closed)
                } else {
                    None
                }
            }
        }
    }

    /// The closed candle series, oldest first.
    pub fn candles(&self) -> &[Candle] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn has_minimum(&self, min_count: usize) -> bool {
        self.series.len() >= min_count
    }
}
