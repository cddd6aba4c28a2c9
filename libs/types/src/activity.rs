//! Recent trading activity entries
//!
//! Each entry is a fake fill or open order shown in the activity table.
//! The size tier is derived from the collateral amount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ModelError;
use crate::ids::ActivityId;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(ModelError::UnknownSide(s.to_string())),
        }
    }
}

/// Whether the order was matched or is still resting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Filled,
    Open,
}

impl FromStr for OrderType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "filled" => Ok(OrderType::Filled),
            "open" => Ok(OrderType::Open),
            _ => Err(ModelError::UnknownOrderType(s.to_string())),
        }
    }
}

/// Trader size tier, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Shrimp,
    Fish,
    Dolphin,
    Shark,
    Whale,
}

impl Tier {
    /// Tier for a collateral amount in USD.
    ///
    /// shrimp < $100 ≤ fish < $500 ≤ dolphin < $1K ≤ shark < $5K ≤ whale
    pub fn from_collateral(collateral: f64) -> Self {
        if collateral < 100.0 {
            Tier::Shrimp
        } else if collateral < 500.0 {
            Tier::Fish
        } else if collateral < 1_000.0 {
            Tier::Dolphin
        } else if collateral < 5_000.0 {
            Tier::Shark
        } else {
            Tier::Whale
        }
    }
}

impl FromStr for Tier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shrimp" => Ok(Tier::Shrimp),
            "fish" => Ok(Tier::Fish),
            "dolphin" => Ok(Tier::Dolphin),
            "shark" => Ok(Tier::Shark),
            "whale" => Ok(Tier::Whale),
            other => Err(ModelError::UnknownTier(other.to_string())),
        }
    }
}

/// One row of the recent activities table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub created_at: DateTime<Utc>,
    pub order_type: OrderType,
    pub side: Side,
    pub token_name: String,
    pub token_logo_url: String,
    pub price: f64,
    pub amount: f64,
    pub collateral: f64,
    pub tier: Tier,
}

impl Activity {
    /// Relative age shown in the time column ("just now", "5m ago", ...).
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.created_at).num_seconds().max(0);
        match secs {
            0..=59 => "just now".to_string(),
            60..=3_599 => format!("{}m ago", secs / 60),
            3_600..=86_399 => format!("{}h ago", secs / 3_600),
            _ => format!("{}d ago", secs / 86_400),
        }
    }
}
