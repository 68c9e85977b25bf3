//! Error types for the divergence strategy

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Market data error: {message}")]
    MarketData { message: String },

    #[error("Signal generation error: {message}")]
    SignalGeneration { message: String },
}

pub type Result<T> = std::result::Result<T, StrategyError>;
