//! # Divergence Strategy - RSI Divergence Signal Generation
//!
//! ## Purpose
//!
//! Streaming signal engine that aggregates sub-interval price bars into
//! fixed-duration candles, derives RSI/ATR/EMA state over the candle series,
//! detects price/RSI divergences at confirmed pivot extrema, scores each
//! candidate with a multi-factor confidence heuristic, and converts accepted
//! signals into risk-bounded order plans (size, stop, three profit targets).
//!
//! ## Architecture Role
//!
//! ```text
//! Tick Feed → [CandleAggregator] → [IndicatorEngine] → [DivergenceDetector]
//!                                                             ↓
//!             Execution Sink ← [PositionSizer] ← [ConfidenceScorer]
//! ```
//!
//! The core pipeline is single-threaded and synchronous; ticks must arrive
//! one at a time in non-decreasing timestamp order. Network feeds, brokerage
//! clients, and chat notifiers are external collaborators behind the traits
//! in [`traits`] — the engine itself never performs I/O and never owns
//! credentials.
//!
//! ## Strategy Components
//!
//! - **Candle aggregation**: EMPTY/ACCUMULATING state machine closing candles
//!   on elapsed interval or tick count, whichever first
//! - **Indicators**: simple-rolling-mean RSI, ATR, three EMAs, strict
//!   symmetric pivot confirmation
//! - **Divergence detection**: pruned pivot window, nearest-prior matching
//!   with minimum bar separation, per-candidate cooldown
//! - **Confidence scoring**: trend/exhaustion/pullback/momentum factors on a
//!   [0, 1] scale
//! - **Position sizing**: fraction-of-equity risk converted through an
//!   ATR-multiple stop into quantity and R-multiple targets

pub mod candles;
pub mod config;
pub mod confidence;
pub mod detector;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod logging;
pub mod signals;
pub mod sizing;
pub mod strategy;
pub mod traits;

pub use config::StrategyConfig;
pub use error::{Result, StrategyError};
pub use signals::{Direction, OrderPlan, Side, Signal, SignalStats};
pub use strategy::DivergenceStrategy;

/// Re-export the shared market data model.
pub use types::{AugmentedCandle, Candle, Tick};
pub use rust_decimal::Decimal;
