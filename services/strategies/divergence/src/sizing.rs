//! Risk-bounded position sizing

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::StrategyConfig;
use crate::signals::{Direction, OrderPlan, Side, Signal};

/// Risk parameters, immutable for the life of the engine.
#[derive(Debug, Clone)]
pub struct RiskParams {
    pub risk_per_trade: Decimal,
    pub stop_multiplier: Decimal,
    pub target_rr: [Decimal; 3],
    pub qty_precision: u32,
    pub min_notional: Decimal,
}

impl RiskParams {
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            risk_per_trade: config.risk_per_trade,
            stop_multiplier: config.stop_multiplier,
            target_rr: config.target_rr,
            qty_precision: config.qty_precision,
            min_notional: config.min_notional,
        }
    }
}

/// Convert an accepted signal into a concrete order plan.
///
/// Returns `None` when the stop distance or the rounded quantity is not
/// positive; a discarded signal is expected behavior, not a fault, and is
/// not retried.
pub fn size_position(
    signal: &Signal,
    current_price: Decimal,
    equity: Decimal,
    params: &RiskParams,
) -> Option<OrderPlan> {
    let stop_distance = signal.atr * params.stop_multiplier;
    if stop_distance <= Decimal::ZERO {
        return None;
    }

    let entry = current_price;
    if entry <= Decimal::ZERO {
        return None;
    }

    let (side, stop, targets) = match signal.direction {
        Direction::Bullish => (
            Side::Buy,
            entry - stop_distance,
            params.target_rr.map(|r| entry + stop_distance * r),
        ),
        Direction::Bearish => (
            Side::Sell,
            entry + stop_distance,
            params.target_rr.map(|r| entry - stop_distance * r),
        ),
    };

    let risk_amount = equity * params.risk_per_trade;
    let quantity = ((risk_amount / stop_distance) / entry).round_dp(params.qty_precision);
    if quantity <= Decimal::ZERO {
        return None;
    }

    let notional = quantity * entry;
    if notional < params.min_notional {
        warn!(%notional, min = %params.min_notional, "order notional below configured minimum");
    }

    Some(OrderPlan {
        side,
        quantity,
        entry,
        stop,
        targets,
        stop_distance,
        risk_dollars: quantity * stop_distance,
        potential_profit: targets.map(|t| quantity * (t - entry).abs()),
        account_balance: equity,
    })
}
