//! Chart seeds and trend hints for sparkline rendering

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ModelError;
use crate::ids::RowId;

/// Direction a sparkline should read, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
        }
    }

    /// Trend implied by a signed percent change (zero reads as up).
    pub fn from_change(change_pct: f64) -> Self {
        if change_pct >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl FromStr for Trend {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Trend::Up),
            "down" => Ok(Trend::Down),
            other => Err(ModelError::UnknownTrend(other.to_string())),
        }
    }
}

/// Stable key that maps a row to a reproducible sparkline shape.
///
/// Format: `{id}-{slug}-{purpose}`. The same key always yields the same
/// chart, so re-renders never jitter the line even while prices tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSeed(String);

impl ChartSeed {
    pub fn new(id: &RowId, slug: &str, purpose: &str) -> Self {
        Self(format!("{}-{}-{}", id, slug, purpose))
    }

    /// Wrap an already-formatted key.
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ChartSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
