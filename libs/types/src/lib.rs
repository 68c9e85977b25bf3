//! # Divergence Engine Types Library
//!
//! Shared market-data model for the streaming signal engine: raw feed bars
//! (`Tick`), closed fixed-duration candles (`Candle`), and candles augmented
//! with derived indicator state (`AugmentedCandle`).
//!
//! All prices and volumes are `rust_decimal::Decimal` — no floating-point
//! money anywhere in the pipeline. Indicator fields that need warmup history
//! are `Option<Decimal>`; `None` means "undefined at this index" and is the
//! only representation of missing data (no NaN sentinels).

pub mod market;

pub use market::{AugmentedCandle, Candle, Tick};

pub use rust_decimal::Decimal;
