//! Headline statistics and aggregate gauges
//!
//! - `StatValue`: labeled integer with a clamp range and per-tick delta range
//! - `SentimentGauge`: top metrics bar (24h volume, fear & greed, altcoin season)
//! - `BottomStats`: footer totals

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ModelError;

/// Which headline stat a value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKey {
    Volume,
    Users,
    Settled,
    Blockchain,
}

impl StatKey {
    /// Translation key of the label.
    pub fn label_key(&self) -> &'static str {
        match self {
            StatKey::Volume => "stats.volume",
            StatKey::Users => "stats.users",
            StatKey::Settled => "stats.settled",
            StatKey::Blockchain => "stats.blockchain",
        }
    }
}

impl FromStr for StatKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volume" | "stats.volume" => Ok(StatKey::Volume),
            "users" | "stats.users" => Ok(StatKey::Users),
            "settled" | "stats.settled" => Ok(StatKey::Settled),
            "blockchain" | "stats.blockchain" => Ok(StatKey::Blockchain),
            other => Err(ModelError::UnknownStat(other.to_string())),
        }
    }
}

/// A labeled scalar nudged one step at a time within `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub key: StatKey,
    pub value: i64,
    pub suffix: String,
    pub min: i64,
    pub max: i64,
    /// Inclusive magnitude range of one step; the sign is drawn separately.
    pub delta: (i64, i64),
}

impl StatValue {
    /// Display string, e.g. `330M+`. Changes whenever the value changes.
    pub fn raw(&self) -> String {
        format!("{}{}", self.value, self.suffix)
    }
}

/// Coarse market mood derived from the fear & greed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Sentiment {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=24 => Sentiment::ExtremeFear,
            25..=39 => Sentiment::Fear,
            40..=59 => Sentiment::Neutral,
            60..=74 => Sentiment::Greed,
            _ => Sentiment::ExtremeGreed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::ExtremeFear => "Extreme Fear",
            Sentiment::Fear => "Fear",
            Sentiment::Neutral => "Neutral",
            Sentiment::Greed => "Greed",
            Sentiment::ExtremeGreed => "Extreme Greed",
        }
    }
}

/// Upper bound for both gauge scores.
pub const GAUGE_SCORE_MAX: u32 = 100;

/// Top metrics bar values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentGauge {
    pub volume_24h: f64,
    pub volume_24h_change_pct: f64,
    pub fear_greed: u32,
    pub altcoin_season: u32,
}

impl SentimentGauge {
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_score(self.fear_greed)
    }
}

/// Footer totals; both only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottomStats {
    pub total_volume: f64,
    pub volume_24h: f64,
}
