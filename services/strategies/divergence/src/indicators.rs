//! Technical indicators over the closed-candle series
//!
//! Indicators are recomputed as pure functions over the full series on each
//! update rather than maintained incrementally. Values that lack a full
//! trailing window are `None`; downstream components treat `None` as "no
//! signal possible" and skip.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::{AugmentedCandle, Candle};

use crate::config::StrategyConfig;

/// Indicator parameters, immutable for the life of the engine.
#[derive(Debug, Clone)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub atr_period: usize,
    pub ema_fast_period: usize,
    pub ema_mid_period: usize,
    pub ema_slow_period: usize,
    pub pivot_lookback: usize,
}

impl IndicatorParams {
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            rsi_period: config.rsi_period,
            atr_period: config.atr_period,
            ema_fast_period: config.ema_fast_period,
            ema_mid_period: config.ema_mid_period,
            ema_slow_period: config.ema_slow_period,
            pivot_lookback: config.pivot_lookback,
        }
    }
}

/// Compute the augmented series: one `AugmentedCandle` per input candle.
pub fn compute_indicators(series: &[Candle], params: &IndicatorParams) -> Vec<AugmentedCandle> {
    if series.is_empty() {
        return Vec::new();
    }

    let rsi = rsi_series(series, params.rsi_period);
    let atr = atr_series(series, params.atr_period);
    let ema_fast = ema_series(series, params.ema_fast_period);
    let ema_mid = ema_series(series, params.ema_mid_period);
    let ema_slow = ema_series(series, params.ema_slow_period);

    (0..series.len())
        .map(|i| AugmentedCandle {
            candle: series[i].clone(),
            rsi: rsi[i],
            atr: atr[i],
            ema_fast: ema_fast[i],
            ema_mid: ema_mid[i],
            ema_slow: ema_slow[i],
            pivot_high: is_pivot_high(series, i, params.pivot_lookback),
            pivot_low: is_pivot_low(series, i, params.pivot_lookback),
        })
        .collect()
}

/// RSI over simple rolling means of gains and losses (not Wilder smoothing;
/// the simple mean is intentional). Undefined until `period` deltas exist and
/// whenever the average loss over the window is zero.
fn rsi_series(series: &[Candle], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; series.len()];
    for i in period..series.len() {
        let mut gains = Decimal::ZERO;
        let mut losses = Decimal::ZERO;
        for j in (i - period + 1)..=i {
            let delta = series[j].close - series[j - 1].close;
            if delta > Decimal::ZERO {
                gains += delta;
            } else {
                losses -= delta;
            }
        }
        let avg_gain = gains / Decimal::from(period);
        let avg_loss = losses / Decimal::from(period);
        if avg_loss.is_zero() {
            continue; // undefined, not 100
        }
        let rs = avg_gain / avg_loss;
        out[i] = Some(dec!(100) - dec!(100) / (Decimal::ONE + rs));
    }
    out
}

/// True range of candle `i`; the first element has no previous close and
/// falls back to high-low.
fn true_range(series: &[Candle], i: usize) -> Decimal {
    let hl = series[i].high - series[i].low;
    if i == 0 {
        return hl;
    }
    let prev_close = series[i - 1].close;
    hl.max((series[i].high - prev_close).abs())
        .max((series[i].low - prev_close).abs())
}

/// ATR as a trailing simple rolling mean of true range.
fn atr_series(series: &[Candle], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; series.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..series.len() {
        let mut sum = Decimal::ZERO;
        for j in (i + 1 - period)..=i {
            sum += true_range(series, j);
        }
        out[i] = Some(sum / Decimal::from(period));
    }
    out
}

/// Standard EMA with smoothing `2 / (period + 1)`, seeded from the first
/// close. Defined at every index of a non-empty series.
fn ema_series(series: &[Candle], period: usize) -> Vec<Decimal> {
    let alpha = dec!(2) / Decimal::from(period + 1);
    let mut out = Vec::with_capacity(series.len());
    let mut ema = series[0].close;
    out.push(ema);
    for candle in &series[1..] {
        ema = alpha * candle.close + (Decimal::ONE - alpha) * ema;
        out.push(ema);
    }
    out
}

/// A pivot high requires every other high in the symmetric window to be
/// strictly lower; any tie disqualifies. Always false within `lookback` of
/// either end of the series.
pub fn is_pivot_high(series: &[Candle], index: usize, lookback: usize) -> bool {
    if index < lookback || index + lookback >= series.len() {
        return false;
    }
    let current = series[index].high;
    for j in (index - lookback)..=(index + lookback) {
        if j != index && series[j].high >= current {
            return false;
        }
    }
    true
}

/// Mirror of [`is_pivot_high`] on lows.
pub fn is_pivot_low(series: &[Candle], index: usize, lookback: usize) -> bool {
    if index < lookback || index + lookback >= series.len() {
        return false;
    }
    let current = series[index].low;
    for j in (index - lookback)..=(index + lookback) {
        if j != index && series[j].low <= current {
            return false;
        }
    }
    true
}
