//! Market row types
//!
//! Three datasets share the same descriptive identity:
//! - `MarketRow`: live/settling markets with a random-walking price
//! - `UpcomingRow`: pre-launch markets with social counters
//! - `EndedRow`: closed markets, static
//!
//! Descriptive fields never change after seeding. Only the numeric
//! fields are touched by the simulators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chart::{ChartSeed, Trend};
use crate::errors::ModelError;
use crate::ids::RowId;

/// Chain a market settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Ethereum,
    Sui,
    Hyperliquid,
    Bnb,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Ethereum => "ethereum",
            Chain::Sui => "sui",
            Chain::Hyperliquid => "hyperliquid",
            Chain::Bnb => "bnb",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solana" => Ok(Chain::Solana),
            "ethereum" => Ok(Chain::Ethereum),
            "sui" => Ok(Chain::Sui),
            "hyperliquid" => Ok(Chain::Hyperliquid),
            "bnb" => Ok(Chain::Bnb),
            other => Err(ModelError::UnknownChain(other.to_string())),
        }
    }
}

/// Lifecycle status of a row in the live dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Live,
    Settling,
}

/// Immutable descriptive fields shared by every dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIdentity {
    pub id: RowId,
    pub slug: String,
    pub name: String,
    pub symbol: String,
    pub protocol: String,
    pub chain: Chain,
    pub logo_url: String,
    pub chain_logo_url: String,
}

impl MarketIdentity {
    /// Case-insensitive substring match against name, symbol and
    /// protocol. The query is used as typed, whitespace included.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.symbol.to_lowercase().contains(&needle)
            || self.protocol.to_lowercase().contains(&needle)
    }
}

/// A live (or settling) pre-market row.
///
/// Every `*_change_pct` field is measured against the row's seed value,
/// never against the previous tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    #[serde(flatten)]
    pub identity: MarketIdentity,
    pub status: MarketStatus,
    pub settle_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_new: bool,
    /// Shape hint for the sparkline; independent of price ticks.
    pub trend: Trend,

    pub last_price: f64,
    pub price_change_pct: f64,
    pub volume_24h: f64,
    pub volume_24h_change_pct: f64,
    pub total_volume: f64,
    pub total_volume_change_pct: f64,
    pub implied_fdv: f64,
}

impl MarketRow {
    pub fn id(&self) -> &RowId {
        &self.identity.id
    }

    /// Seed key for this row's sparkline.
    pub fn chart_seed(&self) -> ChartSeed {
        ChartSeed::new(&self.identity.id, &self.identity.slug, "chart")
    }

    /// Color direction for the sparkline: follows the live price change,
    /// not the shape hint.
    pub fn display_trend(&self) -> Trend {
        Trend::from_change(self.price_change_pct)
    }
}

/// A pre-launch market row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRow {
    #[serde(flatten)]
    pub identity: MarketIdentity,
    pub watcher_count: u64,
    /// Social score, always within `[0, MONI_SCORE_MAX]`.
    pub moni_score: u32,
    pub investor_avatars: Vec<String>,
    /// The "+N" shown after the avatar stack.
    pub investor_extra_count: u32,
    pub narratives: Vec<String>,
    pub narrative_extra_count: u32,
    #[serde(default)]
    pub is_new: bool,
}

/// Upper bound of the moni social score.
pub const MONI_SCORE_MAX: u32 = 40_000;

impl UpcomingRow {
    pub fn id(&self) -> &RowId {
        &self.identity.id
    }

    /// Total investors: shown avatars plus the hidden extra count.
    pub fn investor_total(&self) -> u32 {
        self.investor_avatars.len() as u32 + self.investor_extra_count
    }
}

/// A market that has stopped trading. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndedRow {
    #[serde(flatten)]
    pub identity: MarketIdentity,
    pub last_price: f64,
    pub total_volume: f64,
    /// `None` renders as TBA.
    pub settle_start: Option<DateTime<Utc>>,
    pub settle_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_settling: bool,
}

impl EndedRow {
    pub fn id(&self) -> &RowId {
        &self.identity.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> MarketIdentity {
        MarketIdentity {
            id: RowId::from("1"),
            slug: "skate".to_string(),
            name: "SKATE".to_string(),
            symbol: "SKATE".to_string(),
            protocol: "SKATEON".to_string(),
            chain: Chain::Solana,
            logo_url: "/assets/tokens/skate.png".to_string(),
            chain_logo_url: "/assets/tokens/chain-solana.png".to_string(),
        }
    }

    #[test]
    fn test_chain_roundtrip() {
        for chain in [Chain::Solana, Chain::Ethereum, Chain::Sui, Chain::Hyperliquid, Chain::Bnb] {
            assert_eq!(chain.as_str().parse::<Chain>().unwrap(), chain);
        }
        assert_eq!(
            "avax".parse::<Chain>().unwrap_err(),
            ModelError::UnknownChain("avax".to_string())
        );
    }

    #[test]
    fn test_identity_query() {
        let id = identity();
        assert!(id.matches_query("skate"));
        assert!(id.matches_query("SKATEON"));
        assert!(id.matches_query(""));
        assert!(!id.matches_query("grass"));
        // No trimming: padding must appear in the text
        assert!(!id.matches_query("  SKATEON "));
        assert!(!id.matches_query(" ate"));
    }

    #[test]
    fn test_market_row_chart_seed_and_trend() {
        let row = MarketRow {
            identity: identity(),
            status: MarketStatus::Settling,
            settle_time: None,
            is_new: false,
            trend: Trend::Up,
            last_price: 0.055,
            price_change_pct: -3.0,
            volume_24h: 7375.62,
            volume_24h_change_pct: 0.0,
            total_volume: 25197.18,
            total_volume_change_pct: 0.0,
            implied_fdv: 38.1e6,
        };
        assert_eq!(row.chart_seed().as_str(), "1-skate-chart");
        assert_eq!(row.display_trend(), Trend::Down);
        assert_eq!(row.trend, Trend::Up);
    }

    #[test]
    fn test_market_row_serialization_flattens_identity() {
        let row = EndedRow {
            identity: identity(),
            last_price: 0.055,
            total_volume: 25197.18,
            settle_start: None,
            settle_end: None,
            is_settling: false,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["slug"], "skate");
        assert_eq!(json["chain"], "solana");

        let back: EndedRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_investor_total() {
        let row = UpcomingRow {
            identity: identity(),
            watcher_count: 4572,
            moni_score: 10844,
            investor_avatars: vec!["a".into(), "b".into()],
            investor_extra_count: 24,
            narratives: vec!["GAMEFI".into()],
            narrative_extra_count: 0,
            is_new: false,
        };
        assert_eq!(row.investor_total(), 26);
    }
}
