//! Fixed seed datasets for the demo pages
//!
//! Relative timestamps (settle times, activity ages) are offsets from the
//! `now` passed in, so tests can pin them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use types::activity::{Activity, OrderType, Side, Tier};
use types::chart::Trend;
use types::ids::{ActivityId, RowId};
use types::market::{Chain, EndedRow, MarketIdentity, MarketRow, MarketStatus, UpcomingRow};
use types::stat::{BottomStats, SentimentGauge, StatKey, StatValue};
use uuid::Builder;

const TOKENS: &str = "/assets/tokens";

/// Fixed instant for runs whose checksums must repeat.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().unwrap_or_default()
}

const BACKERS: &str = "/assets/backers";

fn chain_logo(chain: Chain) -> String {
    match chain {
        Chain::Sui => format!("{TOKENS}/chain-sui.svg"),
        other => format!("{TOKENS}/chain-{}.png", other.as_str()),
    }
}

fn identity(id: &str, slug: &str, name: &str, protocol: &str, logo: &str, chain: Chain) -> MarketIdentity {
    MarketIdentity {
        id: RowId::from(id),
        slug: slug.to_string(),
        name: name.to_string(),
        symbol: name.to_string(),
        protocol: protocol.to_string(),
        chain,
        logo_url: format!("{TOKENS}/{logo}"),
        chain_logo_url: chain_logo(chain),
    }
}

fn backers(indices: &[u8]) -> Vec<String> {
    indices
        .iter()
        .map(|i| format!("{BACKERS}/backer-{i}.png"))
        .collect()
}

fn utc(y: i32, m: u32, d: u32, h: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn live_row(
    identity: MarketIdentity,
    status: MarketStatus,
    settle_time: Option<DateTime<Utc>>,
    trend: Trend,
    last_price: f64,
    price_change_pct: f64,
    volume_24h: f64,
    volume_24h_change_pct: f64,
    total_volume: f64,
    total_volume_change_pct: f64,
    implied_fdv: f64,
) -> MarketRow {
    MarketRow {
        identity,
        status,
        settle_time,
        is_new: false,
        trend,
        last_price,
        price_change_pct,
        volume_24h,
        volume_24h_change_pct,
        total_volume,
        total_volume_change_pct,
        implied_fdv,
    }
}

/// Home page live table.
pub fn home_live(now: DateTime<Utc>) -> Vec<MarketRow> {
    use MarketStatus::{Live, Settling};

    let mut mmt = live_row(
        identity("6", "mmt", "MMT", "Momentum", "mmt.png", Chain::Solana),
        Live, None, Trend::Up, 0.65, 48.32, 0.0, -100.0, 7_244.16, 0.0, 9.1e6,
    );
    mmt.is_new = true;

    vec![
        live_row(
            identity("1", "skate", "SKATE", "SKATEON", "skate.png", Chain::Solana),
            Settling, None, Trend::Up, 0.055, 162.18, 7_375.62, -16.18, 25_197.18, 6.38, 38.1e6,
        ),
        live_row(
            identity("2", "shake", "SKATE", "Skate Chain", "skate-2.png", Chain::Solana),
            Settling,
            Some(now + Duration::milliseconds(66_960_000)),
            Trend::Up, 0.119, 63.8, 445.86, 1_159.36, 21_904.26, 19.12, 48.3e3,
        ),
        live_row(
            identity("3", "era", "ERA", "Caldera", "era.png", Chain::Ethereum),
            Live, utc(2025, 5, 30, 13), Trend::Up, 0.0464, 98.31, 418_326.12, -32.16, 7_483_875.48, 9.18, 22.2e6,
        ),
        live_row(
            identity("4", "grass", "GRASS", "Grass", "grass.png", Chain::Solana),
            Live, None, Trend::Up, 0.11, 124.52, 10_418.71, 228.25, 64_110.29, 0.81, 36.1e6,
        ),
        live_row(
            identity("5", "loud", "LOUD", "Loud", "loud.png", Chain::Solana),
            Live, None, Trend::Down, 0.9638, -22.6, 18_312.61, 49.13, 628_875.43, 8.42, 8.3e6,
        ),
        mmt,
    ]
}

fn upcoming(
    identity: MarketIdentity,
    watcher_count: u64,
    investor_avatars: Vec<String>,
    investor_extra_count: u32,
    narratives: Vec<String>,
    narrative_extra_count: u32,
    moni_score: u32,
) -> UpcomingRow {
    UpcomingRow {
        identity,
        watcher_count,
        moni_score,
        investor_avatars,
        investor_extra_count,
        narratives,
        narrative_extra_count,
        is_new: false,
    }
}

/// Home page upcoming table.
pub fn home_upcoming() -> Vec<UpcomingRow> {
    let mut mmt = upcoming(
        identity("u6", "mmt-upcoming", "MMT", "Momentum", "mmt.png", Chain::Sui),
        3_164, backers(&[2, 3, 1]), 0, strings(&["GAMEFI", "NFT"]), 0, 14_572,
    );
    mmt.is_new = true;

    vec![
        upcoming(
            identity("u1", "skate-upcoming", "SKATE", "SKATEON", "skate.png", Chain::Solana),
            4_572, backers(&[1, 2, 3, 4, 5]), 24, strings(&["GAMEFI", "NFT"]), 24, 10_844,
        ),
        upcoming(
            identity("u2", "shake-upcoming", "SKATE", "Skate Chain", "skate-2.png", Chain::Solana),
            2_381, Vec::new(), 0, strings(&["GAMEFI", "NFT"]), 0, 24_396,
        ),
        upcoming(
            identity("u3", "era-upcoming", "ERA", "Caldera", "era.png", Chain::Ethereum),
            7_215, backers(&[2, 3, 1, 5]), 0, Vec::new(), 0, 11_732,
        ),
        upcoming(
            identity("u4", "grass-upcoming", "GRASS", "Grass", "grass.png", Chain::Solana),
            5_893, backers(&[4, 5, 3, 1, 2]), 16, strings(&["GAMEFI"]), 0, 18_283,
        ),
        upcoming(
            identity("u5", "loud-upcoming", "LOUD", "Loud", "loud.png", Chain::Solana),
            1_847, backers(&[3, 1, 2, 4, 5]), 27, strings(&["GAMEFI", "NFT"]), 0, 32_195,
        ),
        mmt,
    ]
}

fn ended(
    identity: MarketIdentity,
    last_price: f64,
    total_volume: f64,
    settle_start: Option<DateTime<Utc>>,
    settle_end: Option<DateTime<Utc>>,
) -> EndedRow {
    EndedRow {
        identity,
        last_price,
        total_volume,
        settle_start,
        settle_end,
        is_settling: false,
    }
}

/// Home page ended table. Static.
pub fn ended_markets(now: DateTime<Utc>) -> Vec<EndedRow> {
    let mut skate = ended(
        identity("e1", "skate-ended", "SKATE", "SKATEON", "skate.png", Chain::Solana),
        0.055, 25_197.18, utc(2025, 5, 30, 13), Some(now + Duration::milliseconds(11_880_000)),
    );
    skate.is_settling = true;

    vec![
        skate,
        ended(
            identity("e2", "skate2-ended", "SKATE", "Skate Chain", "skate-2.png", Chain::Solana),
            0.119, 21_904.26, utc(2025, 6, 10, 15), utc(2025, 6, 10, 19),
        ),
        ended(
            identity("e3", "era-ended", "ERA", "Caldera", "era.png", Chain::Ethereum),
            0.0464, 7_483_875.48, None, None,
        ),
        ended(
            identity("e4", "grass-ended", "GRASS", "Grass", "grass.png", Chain::Solana),
            0.11, 64_110.29, None, None,
        ),
        ended(
            identity("e5", "loud-ended", "LOUD", "Loud", "loud.png", Chain::Solana),
            0.9638, 628_875.43, None, None,
        ),
        ended(
            identity("e6", "mmt-ended", "MMT", "Momentum", "mmt.png", Chain::Sui),
            0.65, 7_244.16, None, None,
        ),
        ended(
            identity("e7", "pengu-ended", "PENGU", "Pudgy Penguins", "skate.png", Chain::Ethereum),
            0.012, 1_234_567.89, utc(2025, 6, 15, 14), utc(2025, 6, 15, 18),
        ),
        ended(
            identity("e8", "jup-ended", "JUP", "Jupiter", "grass.png", Chain::Solana),
            1.24, 2_345_678.90, utc(2025, 6, 20, 10), utc(2025, 6, 20, 14),
        ),
        ended(
            identity("e9", "ondo-ended", "ONDO", "Ondo Finance", "era.png", Chain::Ethereum),
            0.87, 567_890.12, None, None,
        ),
        ended(
            identity("e10", "wen-ended", "WEN", "Wen", "loud.png", Chain::Solana),
            0.00034, 89_456.78, None, None,
        ),
    ]
}

/// Pre-market page live table. No 24h volume or FDV on this page.
pub fn premarket_live() -> Vec<MarketRow> {
    [
        ("skate", "SKATE", "SKATEON", Chain::Solana, 7_375.62),
        ("era", "ERA", "Caldera", Chain::Ethereum, 11_056.21),
        ("grass", "GRASS", "Grass", Chain::Solana, 33_768.12),
    ]
    .into_iter()
    .map(|(slug, name, protocol, chain, total_volume)| {
        live_row(
            identity(slug, slug, name, protocol, &format!("{slug}.png"), chain),
            MarketStatus::Live,
            None,
            Trend::Up,
            0.3499,
            10.0,
            0.0,
            0.0,
            total_volume,
            -16.18,
            0.0,
        )
    })
    .collect()
}

/// Pre-market page upcoming table.
pub fn premarket_upcoming() -> Vec<UpcomingRow> {
    vec![
        upcoming(
            identity("skate", "skate", "SKATE", "SKATEON", "skate.png", Chain::Solana),
            4_572, backers(&[1, 2, 3, 4, 5]), 24, Vec::new(), 0, 0,
        ),
        upcoming(
            identity("era", "era", "ERA", "Caldera", "era.png", Chain::Ethereum),
            178_622, backers(&[6, 7, 8, 9]), 0, Vec::new(), 0, 0,
        ),
        upcoming(
            identity("grass", "grass", "GRASS", "Grass", "grass.png", Chain::Solana),
            40_964, backers(&[6, 7, 8]), 0, Vec::new(), 0, 0,
        ),
    ]
}

fn stat(key: StatKey, value: i64, suffix: &str, min: i64, max: i64, delta: (i64, i64)) -> StatValue {
    StatValue {
        key,
        value,
        suffix: suffix.to_string(),
        min,
        max,
        delta,
    }
}

/// Pre-market page headline stats.
pub fn stats() -> Vec<StatValue> {
    vec![
        stat(StatKey::Volume, 330, "M+", 300, 380, (1, 4)),
        stat(StatKey::Users, 200, "K+", 180, 240, (1, 3)),
        stat(StatKey::Settled, 251, "", 240, 280, (1, 2)),
        stat(StatKey::Blockchain, 24, "", 20, 30, (0, 1)),
    ]
}

/// Home page top metrics bar.
pub fn sentiment() -> SentimentGauge {
    SentimentGauge {
        volume_24h: 4_200_000.0,
        volume_24h_change_pct: 12.5,
        fear_greed: 43,
        altcoin_season: 70,
    }
}

/// Home page footer totals.
pub fn bottom_stats() -> BottomStats {
    BottomStats {
        total_volume: 3_375_052.31,
        volume_24h: 203_155.4,
    }
}

/// Home page recent activities, newest first.
pub fn activities(now: DateTime<Utc>) -> Vec<Activity> {
    use OrderType::{Filled, Open};
    use Side::{Buy, Sell};

    let rows: [(i64, OrderType, Side, &str, &str, f64, f64, f64); 10] = [
        (1, Filled, Sell, "GRASS", "grass.png", 0.055, 3_640.0, 200.0),
        (5, Filled, Sell, "GRASS", "grass.png", 0.055, 18_180.0, 1_000.0),
        (9, Filled, Buy, "IKA", "era.png", 0.119, 4_200.0, 500.0),
        (12, Open, Buy, "PENGU", "skate.png", 0.005, 85_350.0, 3.0),
        (14, Filled, Buy, "GRASS", "grass.png", 0.069, 3_620.0, 250.0),
        (16, Filled, Buy, "SKATE", "skate.png", 0.005, 100_000.0, 500.0),
        (38, Open, Buy, "SKATE", "skate.png", 0.005, 40_000.0, 200.0),
        (42, Filled, Buy, "SKATE", "skate.png", 0.005, 100_000.0, 8_500.0),
        (60, Filled, Buy, "SKATE", "skate.png", 0.0613, 3_620.0, 50.0),
        (60, Filled, Buy, "SKATE", "skate.png", 0.0055, 1_820.0, 100.0),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, &(minutes_ago, order_type, side, token, logo, price, amount, collateral))| {
            let created_at = now - Duration::minutes(minutes_ago);
            let millis = created_at.timestamp_millis().max(0) as u64;
            let id = Builder::from_unix_timestamp_millis(millis, &[i as u8; 10]).into_uuid();
            Activity {
                id: ActivityId::from_uuid(id),
                created_at,
                order_type,
                side,
                token_name: token.to_string(),
                token_logo_url: format!("{TOKENS}/{logo}"),
                price,
                amount,
                collateral,
                tier: Tier::from_collateral(collateral),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_time_pins_settle_times() {
        let a = home_live(reference_time());
        let b = home_live(reference_time());
        assert_eq!(reference_time().timestamp(), 1_748_779_200);
        assert!(a.iter().zip(&b).all(|(x, y)| x.settle_time == y.settle_time));
    }

    #[test]
    fn test_dataset_sizes() {
        let now = Utc::now();
        assert_eq!(home_live(now).len(), 6);
        assert_eq!(home_upcoming().len(), 6);
        assert_eq!(ended_markets(now).len(), 10);
        assert_eq!(premarket_live().len(), 3);
        assert_eq!(premarket_upcoming().len(), 3);
        assert_eq!(stats().len(), 4);
        assert_eq!(activities(now).len(), 10);
    }

    #[test]
    fn test_relative_settle_times() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let live = home_live(now);
        assert_eq!(live[1].settle_time, Some(now + Duration::minutes(1_116)));
        assert_eq!(live[2].settle_time, utc(2025, 5, 30, 13));

        let ended = ended_markets(now);
        assert!(ended[0].is_settling);
        assert_eq!(ended[0].settle_end, Some(now + Duration::minutes(198)));
        assert!(ended[2].settle_start.is_none());
    }

    #[test]
    fn test_seed_tiers_match_collateral() {
        let tiers: Vec<Tier> = activities(Utc::now()).iter().map(|a| a.tier).collect();
        assert_eq!(
            tiers,
            vec![
                Tier::Fish,
                Tier::Shark,
                Tier::Dolphin,
                Tier::Shrimp,
                Tier::Fish,
                Tier::Dolphin,
                Tier::Fish,
                Tier::Whale,
                Tier::Shrimp,
                Tier::Fish,
            ]
        );
    }

    #[test]
    fn test_ids_unique() {
        let mut ids: Vec<String> = home_live(Utc::now())
            .iter()
            .map(|r| r.id().to_string())
            .chain(home_upcoming().iter().map(|r| r.id().to_string()))
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);

        let acts = activities(Utc::now());
        let mut act_ids: Vec<_> = acts.iter().map(|a| a.id).collect();
        act_ids.dedup();
        assert_eq!(act_ids.len(), 10);
    }

    #[test]
    fn test_sui_chain_logo() {
        let ended = ended_markets(Utc::now());
        assert_eq!(ended[5].identity.chain_logo_url, "/assets/tokens/chain-sui.svg");
        assert_eq!(ended[0].identity.chain_logo_url, "/assets/tokens/chain-solana.png");
    }
}
