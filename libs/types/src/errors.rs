//! Error types for the data model
//!
//! Parsing of enum-like fields coming from config files or seed JSON.

use thiserror::Error;

/// Errors raised while parsing model values from strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Unknown trend: {0}")]
    UnknownTrend(String),

    #[error("Unknown order side: {0}")]
    UnknownSide(String),

    #[error("Unknown order type: {0}")]
    UnknownOrderType(String),

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Unknown stat key: {0}")]
    UnknownStat(String),
}
