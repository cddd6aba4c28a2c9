//! Table queries over published snapshots
//!
//! Column sorting cycles none → desc → asc → none. With no sort the seed
//! order is kept. All functions borrow from the snapshot; nothing here
//! mutates rows.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use types::activity::{Activity, OrderType, Side, Tier};
use types::errors::ModelError;
use types::market::{Chain, EndedRow, MarketRow, UpcomingRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Desc,
    Asc,
}

impl SortDirection {
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
            SortDirection::Asc => SortDirection::None,
        }
    }
}

/// Numeric column a row can be sorted by.
pub trait SortKey<Row>: Copy + PartialEq {
    fn value(&self, row: &Row) -> f64;
}

/// Active column and direction for one table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortState<K> {
    pub key: Option<K>,
    pub direction: SortDirection,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::None,
        }
    }
}

impl<K: Copy + PartialEq> SortState<K> {
    /// Header click: same column advances the cycle, a new column starts
    /// at descending.
    pub fn toggle(&mut self, key: K) {
        if self.key == Some(key) {
            self.direction = self.direction.next();
            if self.direction == SortDirection::None {
                self.key = None;
            }
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Desc;
        }
    }
}

/// Stable sort by the active column.
pub fn sort_rows<'a, Row, K, I>(rows: I, state: &SortState<K>) -> Vec<&'a Row>
where
    Row: 'a,
    K: SortKey<Row>,
    I: IntoIterator<Item = &'a Row>,
{
    let mut out: Vec<&Row> = rows.into_iter().collect();
    let Some(key) = state.key else {
        return out;
    };
    let cmp = |a: &&Row, b: &&Row| key.value(a).total_cmp(&key.value(b));
    match state.direction {
        SortDirection::None => {}
        SortDirection::Asc => out.sort_by(cmp),
        SortDirection::Desc => out.sort_by(|a, b| cmp(b, a)),
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveSortKey {
    LastPrice,
    Volume24h,
    TotalVolume,
    ImpliedFdv,
}

impl SortKey<MarketRow> for LiveSortKey {
    fn value(&self, row: &MarketRow) -> f64 {
        match self {
            LiveSortKey::LastPrice => row.last_price,
            LiveSortKey::Volume24h => row.volume_24h,
            LiveSortKey::TotalVolume => row.total_volume,
            LiveSortKey::ImpliedFdv => row.implied_fdv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpcomingSortKey {
    Watchers,
    MoniScore,
}

impl SortKey<UpcomingRow> for UpcomingSortKey {
    fn value(&self, row: &UpcomingRow) -> f64 {
        match self {
            UpcomingSortKey::Watchers => row.watcher_count as f64,
            UpcomingSortKey::MoniScore => row.moni_score as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndedSortKey {
    LastPrice,
    TotalVolume,
}

impl SortKey<EndedRow> for EndedSortKey {
    fn value(&self, row: &EndedRow) -> f64 {
        match self {
            EndedSortKey::LastPrice => row.last_price,
            EndedSortKey::TotalVolume => row.total_volume,
        }
    }
}

/// Network dropdown of the ended table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetworkFilter {
    #[default]
    All,
    Chain(Chain),
}

impl NetworkFilter {
    pub fn matches(&self, chain: Chain) -> bool {
        match self {
            NetworkFilter::All => true,
            NetworkFilter::Chain(c) => *c == chain,
        }
    }
}

impl FromStr for NetworkFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(NetworkFilter::All),
            other => other.parse().map(NetworkFilter::Chain),
        }
    }
}

/// Filters and sort of the ended table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndedQuery {
    pub network: NetworkFilter,
    pub search: String,
    pub sort: SortState<EndedSortKey>,
}

impl EndedQuery {
    pub fn run<'a, I>(&self, rows: I) -> Vec<&'a EndedRow>
    where
        I: IntoIterator<Item = &'a EndedRow>,
    {
        let filtered = rows.into_iter().filter(|row| {
            self.network.matches(row.identity.chain) && row.identity.matches_query(&self.search)
        });
        sort_rows(filtered, &self.sort)
    }
}

/// Filter panel of the recent activities table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub min_tier: Option<Tier>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.side.map_or(true, |s| s == activity.side)
            && self.order_type.map_or(true, |t| t == activity.order_type)
            && self
                .min_tier
                .map_or(true, |t| activity.tier.cmp(&t) != Ordering::Less)
    }

    pub fn apply<'a, I>(&self, activities: I) -> Vec<&'a Activity>
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        activities.into_iter().filter(|a| self.matches(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_sort_cycle() {
        let mut state = SortState::default();
        state.toggle(LiveSortKey::LastPrice);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(LiveSortKey::LastPrice);
        assert_eq!(state.direction, SortDirection::Asc);
        state.toggle(LiveSortKey::LastPrice);
        assert_eq!(state, SortState::default());

        state.toggle(LiveSortKey::LastPrice);
        state.toggle(LiveSortKey::TotalVolume);
        assert_eq!(state.key, Some(LiveSortKey::TotalVolume));
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn test_live_sort_by_price() {
        let rows = seed::home_live(seed::reference_time());
        let state = SortState {
            key: Some(LiveSortKey::LastPrice),
            direction: SortDirection::Desc,
        };
        let sorted = sort_rows(&rows, &state);
        assert_eq!(sorted[0].identity.slug, "loud");
        assert_eq!(sorted[5].identity.slug, "era");

        let unsorted = sort_rows(&rows, &SortState::<LiveSortKey>::default());
        assert_eq!(unsorted[0].identity.slug, "skate");
    }

    #[test]
    fn test_upcoming_sort_by_moni() {
        let rows = seed::home_upcoming();
        let state = SortState {
            key: Some(UpcomingSortKey::MoniScore),
            direction: SortDirection::Asc,
        };
        let sorted = sort_rows(&rows, &state);
        assert_eq!(sorted[0].moni_score, 10_844);
        assert_eq!(sorted[5].moni_score, 32_195);
    }

    #[test]
    fn test_ended_network_and_search() {
        let rows = seed::ended_markets(seed::reference_time());
        let query = EndedQuery {
            network: "ethereum".parse().unwrap(),
            ..Default::default()
        };
        let slugs: Vec<_> = query.run(&rows).iter().map(|r| r.identity.slug.as_str()).collect();
        assert_eq!(slugs, vec!["era-ended", "pengu-ended", "ondo-ended"]);

        let query = EndedQuery {
            search: "skate".to_string(),
            sort: SortState {
                key: Some(EndedSortKey::LastPrice),
                direction: SortDirection::Desc,
            },
            ..Default::default()
        };
        let prices: Vec<_> = query.run(&rows).iter().map(|r| r.last_price).collect();
        assert_eq!(prices, vec![0.119, 0.055]);

        assert!("avax".parse::<NetworkFilter>().is_err());
        assert_eq!("all".parse::<NetworkFilter>().unwrap(), NetworkFilter::All);
    }

    #[test]
    fn test_activity_filter() {
        let acts = seed::activities(seed::reference_time());
        let sells = ActivityFilter {
            side: Some(Side::Sell),
            ..Default::default()
        };
        assert_eq!(sells.apply(&acts).len(), 2);

        let big = ActivityFilter {
            min_tier: Some(Tier::Shark),
            ..Default::default()
        };
        let tiers: Vec<_> = big.apply(&acts).iter().map(|a| a.tier).collect();
        assert_eq!(tiers, vec![Tier::Shark, Tier::Whale]);

        let open = ActivityFilter {
            order_type: Some(OrderType::Open),
            side: Some(Side::Buy),
            ..Default::default()
        };
        assert_eq!(open.apply(&acts).len(), 2);
        assert_eq!(ActivityFilter::default().apply(&acts).len(), 10);
    }
}
