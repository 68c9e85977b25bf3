//! Reference collaborators for paper trading
//!
//! A JSONL tick reader, a fixed-equity account, a dry-run execution sink
//! that mints sequential paper order ids, and a log-based notifier. Enough
//! to replay a recorded feed end to end without touching a venue.

use std::io::BufRead;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;
use types::Tick;

use crate::signals::{OrderPlan, Signal};
use crate::traits::{AccountProvider, ExecutionSink, NotificationSink, TickSource};

/// Tick source reading one JSON-encoded tick per line.
///
/// Blank lines are skipped; a malformed line is a hard error so a corrupt
/// recording fails loudly instead of silently skewing the candle series.
pub struct JsonlTickSource<R: BufRead + Send> {
    reader: R,
    line: String,
    lines_read: u64,
}

impl<R: BufRead + Send> JsonlTickSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            lines_read: 0,
        }
    }
}

#[async_trait]
impl<R: BufRead + Send> TickSource for JsonlTickSource<R> {
    async fn next_tick(&mut self) -> Result<Option<Tick>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("failed to read tick line")?;
            if read == 0 {
                return Ok(None);
            }
            self.lines_read += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let tick: Tick = serde_json::from_str(trimmed)
                .with_context(|| format!("malformed tick on line {}", self.lines_read))?;
            return Ok(Some(tick));
        }
    }
}

/// Account with a fixed paper balance.
pub struct PaperAccount {
    equity: Decimal,
}

impl PaperAccount {
    pub fn new(equity: Decimal) -> Self {
        Self { equity }
    }
}

#[async_trait]
impl AccountProvider for PaperAccount {
    async fn equity(&self) -> Result<Decimal> {
        Ok(self.equity)
    }
}

/// Execution sink that accepts every plan and assigns sequential paper ids.
#[derive(Default)]
pub struct DryRunExecution {
    next_order_id: u64,
}

#[async_trait]
impl ExecutionSink for DryRunExecution {
    async fn submit(&mut self, plan: &OrderPlan) -> Result<String> {
        self.next_order_id += 1;
        let order_id = format!("paper-{}", self.next_order_id);
        info!(
            %order_id,
            side = ?plan.side,
            qty = %plan.quantity,
            entry = %plan.entry,
            "dry-run order accepted"
        );
        Ok(order_id)
    }
}

/// Notifier that writes signal and plan summaries to the log.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify_signal(&mut self, signal: &Signal, equity: Decimal) -> Result<()> {
        info!(
            direction = ?signal.direction,
            price = %signal.price,
            rsi = %signal.rsi,
            confidence = %signal.confidence,
            bars_between = signal.bars_between,
            %equity,
            "divergence signal"
        );
        Ok(())
    }

    async fn notify_plan(&mut self, plan: &OrderPlan) -> Result<()> {
        info!(
            side = ?plan.side,
            qty = %plan.quantity,
            entry = %plan.entry,
            stop = %plan.stop,
            t1 = %plan.targets[0],
            t2 = %plan.targets[1],
            t3 = %plan.targets[2],
            risk = %plan.risk_dollars,
            "order plan"
        );
        Ok(())
    }
}
