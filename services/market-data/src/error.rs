//! Errors at the engine's fallible edges
//!
//! Ticking never fails. Only configuration loading and publishing to a
//! closed feed can.

/// Invalid or unreadable engine configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid delay range for {dataset}: min {min_ms}ms > max {max_ms}ms")]
    DelayRange {
        dataset: String,
        min_ms: u64,
        max_ms: u64,
    },

    #[error("invalid span for {field}: [{min}, {max})")]
    Span { field: String, min: f64, max: f64 },

    #[error("probability out of range for {field}: {value}")]
    Probability { field: String, value: f64 },

    #[error("price band must be in (0, 1): {0}")]
    PriceBand(f64),

    #[error("activity history cap must be positive")]
    EmptyHistory,

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Publishing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("feed {feed} is closed")]
    Closed { feed: String },

    #[error("stale snapshot for {feed}: current version {current}, offered {offered}")]
    StaleVersion {
        feed: String,
        current: u64,
        offered: u64,
    },
}
