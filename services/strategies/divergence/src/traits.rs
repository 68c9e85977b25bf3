//! Collaborator seams for the strategy service
//!
//! The engine core performs no I/O of its own; everything it needs from the
//! outside world arrives through these traits. Real feed, brokerage, and
//! chat integrations implement them out of tree.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use types::Tick;

use crate::signals::{OrderPlan, Signal};

/// Source of sub-interval OHLCV bars, delivered one at a time in
/// non-decreasing timestamp order.
#[async_trait]
pub trait TickSource: Send {
    /// Next tick, or `None` once the feed is exhausted.
    async fn next_tick(&mut self) -> Result<Option<Tick>>;
}

/// Account state provider queried per accepted signal.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn equity(&self) -> Result<Decimal>;
}

/// Order execution sink. Accepts a fully-formed plan and returns the venue's
/// order identifier.
#[async_trait]
pub trait ExecutionSink: Send {
    async fn submit(&mut self, plan: &OrderPlan) -> Result<String>;
}

/// Best-effort notification channel. Failures are logged by the caller and
/// never affect engine state.
#[async_trait]
pub trait NotificationSink: Send {
    async fn notify_signal(&mut self, signal: &Signal, equity: Decimal) -> Result<()>;
    async fn notify_plan(&mut self, plan: &OrderPlan) -> Result<()>;
}
