//! Recent activity simulator
//!
//! Each tick invents one fill or open order on a random token, priced
//! near the token's reference price, and prepends it to a bounded
//! history. Collateral is drawn log-uniformly so every tier shows up.
//!
//! When following a live table the reference price is read from its
//! latest snapshot at tick time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use types::activity::{Activity, OrderType, Side, Tier};
use types::ids::{ActivityId, RowId};
use types::market::MarketRow;
use uuid::Builder;

use crate::clock::Clock;
use crate::config::ActivityConfig;
use crate::feed::FeedReader;
use crate::scheduler::Simulator;
use crate::snapshot::Snapshot;

/// A token activities can be generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityToken {
    /// Live row the token was taken from.
    pub row_id: RowId,
    pub name: String,
    pub logo_url: String,
    pub price: f64,
}

impl From<&MarketRow> for ActivityToken {
    fn from(row: &MarketRow) -> Self {
        Self {
            row_id: row.identity.id.clone(),
            name: row.identity.symbol.clone(),
            logo_url: row.identity.logo_url.clone(),
            price: row.last_price,
        }
    }
}

/// The random part of one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityDraw {
    pub token_index: usize,
    pub side: Side,
    pub order_type: OrderType,
    /// Fractional offset from the token price.
    pub price_offset: f64,
    pub collateral: f64,
    pub id_bytes: [u8; 10],
}

pub struct ActivitySimulator {
    config: ActivityConfig,
    tokens: Vec<ActivityToken>,
    prices: Option<FeedReader<MarketRow>>,
    clock: Arc<dyn Clock>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl ActivitySimulator {
    pub fn new(config: ActivityConfig, tokens: Vec<ActivityToken>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            tokens,
            prices: None,
            clock,
        }
    }

    /// Price activities off the latest snapshot of a live table.
    pub fn with_live_prices(mut self, prices: FeedReader<MarketRow>) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Tokens taken from a live market seed.
    pub fn from_markets(config: ActivityConfig, markets: &Snapshot<MarketRow>, clock: Arc<dyn Clock>) -> Self {
        Self::new(config, markets.iter().map(ActivityToken::from).collect(), clock)
    }

    pub fn tokens(&self) -> &[ActivityToken] {
        &self.tokens
    }

    /// Current price for a token: its live row when following a table
    /// and the row is still there, else the price captured up front.
    pub fn reference_price(&self, token_index: usize) -> Option<f64> {
        let token = self.tokens.get(token_index)?;
        let live = self.prices.as_ref().and_then(|reader| {
            reader
                .latest()
                .iter()
                .find(|row| row.identity.id == token.row_id)
                .map(|row| row.last_price)
        });
        Some(live.unwrap_or(token.price))
    }

    /// `None` when there are no tokens to trade.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ActivityDraw> {
        if self.tokens.is_empty() {
            return None;
        }
        let token_index = rng.gen_range(0..self.tokens.len());
        let side = if rng.gen_bool(self.config.buy_probability) {
            Side::Buy
        } else {
            Side::Sell
        };
        let order_type = if rng.gen_bool(self.config.filled_probability) {
            OrderType::Filled
        } else {
            OrderType::Open
        };
        let jitter = self.config.price_jitter.abs();
        let price_offset = if jitter > 0.0 {
            rng.gen_range(-jitter..jitter)
        } else {
            0.0
        };

        let span = self.config.collateral;
        let (lo, hi) = (span.min.max(f64::MIN_POSITIVE).ln(), span.max.max(span.min).ln());
        let collateral = if hi > lo {
            rng.gen_range(lo..hi).exp().clamp(span.min, span.max)
        } else {
            span.min
        };

        let mut id_bytes = [0u8; 10];
        rng.fill(&mut id_bytes);

        Some(ActivityDraw {
            token_index,
            side,
            order_type,
            price_offset,
            collateral,
            id_bytes,
        })
    }

    /// Build the activity for a draw, stamped `now`.
    pub fn build(&self, draw: ActivityDraw, now: DateTime<Utc>) -> Option<Activity> {
        let token = self.tokens.get(draw.token_index)?;
        let base = self.reference_price(draw.token_index)?;
        let price = round_to(base * (1.0 + draw.price_offset), 6);
        let collateral = round_to(draw.collateral, 2);
        let amount = if price > 0.0 {
            (collateral / price).round()
        } else {
            0.0
        };
        let millis = now.timestamp_millis().max(0) as u64;
        let id = Builder::from_unix_timestamp_millis(millis, &draw.id_bytes).into_uuid();

        Some(Activity {
            id: ActivityId::from_uuid(id),
            created_at: now,
            order_type: draw.order_type,
            side: draw.side,
            token_name: token.name.clone(),
            token_logo_url: token.logo_url.clone(),
            price,
            amount,
            collateral,
            tier: Tier::from_collateral(collateral),
        })
    }
}

impl Simulator for ActivitySimulator {
    type Row = Activity;

    fn name(&self) -> &str {
        "activity"
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<Activity>, rng: &mut R) -> Option<Snapshot<Activity>> {
        let draw = self.draw(rng)?;
        let activity = self.build(draw, self.clock.now())?;
        Some(current.with_prepended(activity, self.config.history_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::feed::SnapshotFeed;
    use crate::seed;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn simulator(clock: Arc<ManualClock>) -> ActivitySimulator {
        let markets = Snapshot::initial(seed::home_live(start()));
        ActivitySimulator::from_markets(ActivityConfig::default(), &markets, clock)
    }

    #[test]
    fn test_build_derives_tier_and_amount() {
        let sim = simulator(Arc::new(ManualClock::new(start())));
        let draw = ActivityDraw {
            token_index: 3,
            side: Side::Sell,
            order_type: OrderType::Filled,
            price_offset: 0.0,
            collateral: 1_000.0,
            id_bytes: [7; 10],
        };
        let activity = sim.build(draw, start()).unwrap();
        assert_eq!(activity.token_name, "GRASS");
        assert_eq!(activity.price, 0.11);
        assert_eq!(activity.amount, 9_091.0);
        assert_eq!(activity.tier, Tier::Shark);
        assert_eq!(activity.id.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let clock = Arc::new(ManualClock::new(start()));
        let sim = simulator(Arc::clone(&clock));
        let mut snap = Snapshot::initial(seed::activities(start()));
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..30 {
            clock.advance(Duration::seconds(4));
            snap = sim.tick(&snap, &mut rng).unwrap();
        }
        assert_eq!(snap.len(), 20);
        let times: Vec<_> = snap.iter().map(|a| a.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(snap.get(0).unwrap().created_at, clock.now());
    }

    #[test]
    fn test_draws_stay_in_configured_ranges() {
        let sim = simulator(Arc::new(ManualClock::new(start())));
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..1_000 {
            let draw = sim.draw(&mut rng).unwrap();
            assert!(draw.collateral >= 3.0 && draw.collateral <= 8_000.0);
            assert!(draw.price_offset.abs() <= 0.02);
            assert!(draw.token_index < sim.tokens().len());
        }
    }

    #[test]
    fn test_prices_follow_live_table() {
        let clock = Arc::new(ManualClock::new(start()));
        let seed_rows = Snapshot::initial(seed::home_live(start()));
        let live = SnapshotFeed::new("home_live", seed_rows.clone());
        let sim = ActivitySimulator::from_markets(ActivityConfig::default(), &seed_rows, clock)
            .with_live_prices(live.subscribe());

        let mut moved = seed_rows.get(3).unwrap().clone();
        moved.last_price = 0.08;
        live.publish(seed_rows.with_replaced(vec![(3, moved)])).unwrap();
        assert_eq!(sim.reference_price(3), Some(0.08));

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let draw = ActivityDraw {
                token_index: 3,
                ..sim.draw(&mut rng).unwrap()
            };
            let activity = sim.build(draw, start()).unwrap();
            assert!((activity.price / 0.08 - 1.0).abs() <= 0.02 + 1e-6);
        }
    }

    #[test]
    fn test_unfollowed_prices_stay_at_seed() {
        let sim = simulator(Arc::new(ManualClock::new(start())));
        assert_eq!(sim.reference_price(3), Some(0.11));
        assert_eq!(sim.reference_price(99), None);
    }

    #[test]
    fn test_no_tokens_no_activity() {
        let sim = ActivitySimulator::new(
            ActivityConfig::default(),
            Vec::new(),
            Arc::new(ManualClock::new(start())),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(sim.tick(&Snapshot::empty(), &mut rng).is_none());
    }
}
