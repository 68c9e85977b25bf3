//! Multi-factor confidence scoring for divergence candidates

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::AugmentedCandle;

/// Score a divergence candidate at `index` on a [0, 1] scale.
///
/// Returns exactly zero when RSI or ATR is undefined at the index or ATR is
/// zero — degenerate inputs can never produce a tradable signal.
pub fn score(series: &[AugmentedCandle], index: usize, is_bullish: bool) -> Decimal {
    let Some(row) = series.get(index) else {
        return Decimal::ZERO;
    };
    let (Some(rsi), Some(atr)) = (row.rsi, row.atr) else {
        return Decimal::ZERO;
    };
    if atr.is_zero() {
        return Decimal::ZERO;
    }

    let close = row.close();
    let (ema_fast, ema_mid, ema_slow) = (row.ema_fast, row.ema_mid, row.ema_slow);

    let mut confidence = Decimal::ZERO;

    // Trend conviction: a monotonic EMA stack marks a strong prevailing
    // trend, and reversals score better without one.
    let trend_conviction = if (ema_fast > ema_mid && ema_mid > ema_slow)
        || (ema_fast < ema_mid && ema_mid < ema_slow)
    {
        dec!(0.4)
    } else {
        Decimal::ZERO
    };
    confidence += dec!(0.25) * (Decimal::ONE - trend_conviction);

    // Exhaustion: RSI extremes plus stretch from the fast EMA in ATR units.
    let mut exhaustion = Decimal::ZERO;
    if rsi > dec!(75) || rsi < dec!(25) {
        exhaustion += dec!(0.4);
    } else if rsi > dec!(70) || rsi < dec!(30) {
        exhaustion += dec!(0.25);
    }
    let distance = (close - ema_fast).abs() / atr;
    if distance > dec!(2.5) {
        exhaustion += dec!(0.3);
    } else if distance > dec!(1.5) {
        exhaustion += dec!(0.2);
    }
    confidence += dec!(0.30) * exhaustion;

    // Directional RSI bonus.
    if is_bullish && rsi < dec!(30) {
        confidence += dec!(0.25);
    } else if is_bullish && rsi < dec!(35) {
        confidence += dec!(0.20);
    } else if !is_bullish && rsi > dec!(70) {
        confidence += dec!(0.25);
    } else if !is_bullish && rsi > dec!(65) {
        confidence += dec!(0.20);
    }

    // Pullback quality: stretched, but not blown out.
    if distance > dec!(0.3) && distance < dec!(2.0) {
        confidence += dec!(0.10);
    }

    // Momentum alignment: entering against the short-term EMA spread.
    let dma = (ema_fast - ema_mid) / atr;
    if (is_bullish && dma < Decimal::ZERO) || (!is_bullish && dma > Decimal::ZERO) {
        confidence += dec!(0.10);
    }

    confidence.min(Decimal::ONE)
}
