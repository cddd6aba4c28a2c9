//! Live market simulator
//!
//! Per tick, picks one or two rows and moves:
//! - `last_price` by a ±0.5-2% step, held within ±20% of its seed
//! - `volume_24h` (home only) and `total_volume` upward
//!
//! All change percents and the implied FDV are recomputed against the
//! seed values captured at construction.

use rand::Rng;
use types::market::MarketRow;

use crate::config::LiveMarketConfig;
use crate::scheduler::Simulator;
use crate::snapshot::Snapshot;
use crate::walk::{implied_fdv, percent_change};

/// Seed values of one row. Never written after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveAnchor {
    pub last_price: f64,
    pub volume_24h: f64,
    pub total_volume: f64,
    pub implied_fdv: f64,
}

impl From<&MarketRow> for LiveAnchor {
    fn from(row: &MarketRow) -> Self {
        Self {
            last_price: row.last_price,
            volume_24h: row.volume_24h,
            total_volume: row.total_volume,
            implied_fdv: row.implied_fdv,
        }
    }
}

/// The random part of one row update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveDraw {
    /// Signed fractional price step.
    pub price_delta: f64,
    pub volume_24h_delta: f64,
    pub total_volume_delta: f64,
}

pub struct LiveMarketSimulator {
    name: String,
    config: LiveMarketConfig,
    anchors: Vec<LiveAnchor>,
}

impl LiveMarketSimulator {
    /// Capture anchors from the seed snapshot.
    pub fn new(name: impl Into<String>, config: LiveMarketConfig, seed: &Snapshot<MarketRow>) -> Self {
        Self {
            name: name.into(),
            config,
            anchors: seed.iter().map(LiveAnchor::from).collect(),
        }
    }

    pub fn anchors(&self) -> &[LiveAnchor] {
        &self.anchors
    }

    pub fn config(&self) -> &LiveMarketConfig {
        &self.config
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> LiveDraw {
        LiveDraw {
            price_delta: self.config.price.draw(rng),
            volume_24h_delta: self
                .config
                .volume_24h
                .map(|walk| walk.step.sample(rng))
                .unwrap_or(0.0),
            total_volume_delta: self.config.total_volume.step.sample(rng),
        }
    }

    /// Apply a draw to row `index`. `None` when the row has no anchor.
    pub fn apply(&self, index: usize, row: &MarketRow, draw: LiveDraw) -> Option<MarketRow> {
        let anchor = self.anchors.get(index)?;
        let mut next = row.clone();

        next.last_price = self
            .config
            .price
            .apply(row.last_price, anchor.last_price, draw.price_delta);
        next.price_change_pct = percent_change(next.last_price, anchor.last_price);
        next.implied_fdv = implied_fdv(anchor.implied_fdv, anchor.last_price, next.last_price);

        if let Some(walk) = self.config.volume_24h {
            next.volume_24h = walk.apply(row.volume_24h, draw.volume_24h_delta);
            next.volume_24h_change_pct = percent_change(next.volume_24h, anchor.volume_24h);
        }

        next.total_volume = self
            .config
            .total_volume
            .apply(row.total_volume, draw.total_volume_delta);
        next.total_volume_change_pct = percent_change(next.total_volume, anchor.total_volume);

        Some(next)
    }
}

impl Simulator for LiveMarketSimulator {
    type Row = MarketRow;

    fn name(&self) -> &str {
        &self.name
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<MarketRow>, rng: &mut R) -> Option<Snapshot<MarketRow>> {
        if current.is_empty() {
            return None;
        }
        let updates = self
            .config
            .pick
            .pick(current.len(), rng)
            .into_iter()
            .filter_map(|index| {
                let row = current.get(index)?;
                let draw = self.draw(rng);
                self.apply(index, row, draw).map(|next| (index, next))
            })
            .collect();
        Some(current.with_replaced(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn premarket() -> (LiveMarketSimulator, Snapshot<MarketRow>) {
        let seed = Snapshot::initial(seed::premarket_live());
        (
            LiveMarketSimulator::new("premarket_live", LiveMarketConfig::premarket(), &seed),
            seed,
        )
    }

    #[test]
    fn test_apply_injected_price_step() {
        let (sim, seed) = premarket();
        let draw = LiveDraw {
            price_delta: 0.02,
            volume_24h_delta: 0.0,
            total_volume_delta: 100.0,
        };
        let next = sim.apply(0, seed.get(0).unwrap(), draw).unwrap();

        assert!(approx(next.last_price, 0.356898));
        assert!(approx(next.price_change_pct, 2.0));
        assert!(approx(next.total_volume, 7475.62));
        assert!(approx(
            next.total_volume_change_pct,
            100.0 / 7375.62 * 100.0
        ));
        // Premarket preset leaves 24h volume alone
        assert_eq!(next.volume_24h, seed.get(0).unwrap().volume_24h);
    }

    #[test]
    fn test_price_clamped_at_band_edge() {
        let (sim, seed) = premarket();
        let mut row = seed.get(1).unwrap().clone();
        row.last_price = 0.3499 * 1.19;
        let draw = LiveDraw {
            price_delta: 0.02,
            volume_24h_delta: 0.0,
            total_volume_delta: 50.0,
        };
        let next = sim.apply(1, &row, draw).unwrap();
        assert!(approx(next.last_price, 0.3499 * 1.2));
        assert!(approx(next.price_change_pct, 20.0));
    }

    #[test]
    fn test_zero_anchor_volume_uses_unit_denominator() {
        let seed = Snapshot::initial(seed::home_live(Utc::now()));
        let sim = LiveMarketSimulator::new("home_live", LiveMarketConfig::home(), &seed);
        let mmt = 5;
        assert_eq!(seed.get(mmt).unwrap().volume_24h, 0.0);

        let draw = LiveDraw {
            price_delta: 0.0,
            volume_24h_delta: 25.0,
            total_volume_delta: 60.0,
        };
        let next = sim.apply(mmt, seed.get(mmt).unwrap(), draw).unwrap();
        assert!(approx(next.volume_24h, 25.0));
        assert!(approx(next.volume_24h_change_pct, 2_500.0));
    }

    #[test]
    fn test_implied_fdv_follows_price() {
        let seed = Snapshot::initial(seed::home_live(Utc::now()));
        let sim = LiveMarketSimulator::new("home_live", LiveMarketConfig::home(), &seed);
        let draw = LiveDraw {
            price_delta: 0.1,
            volume_24h_delta: 20.0,
            total_volume_delta: 50.0,
        };
        let next = sim.apply(0, seed.get(0).unwrap(), draw).unwrap();
        assert!(approx(next.implied_fdv, 38.1e6 * 1.1));
    }

    #[test]
    fn test_tick_touches_at_most_two_rows() {
        let seed = Snapshot::initial(seed::home_live(Utc::now()));
        let sim = LiveMarketSimulator::new("home_live", LiveMarketConfig::home(), &seed);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut snap = seed.clone();
        for _ in 0..200 {
            let next = sim.tick(&snap, &mut rng).unwrap();
            let changed = next.changed_indices(&snap);
            assert!(!changed.is_empty() && changed.len() <= 2);
            assert_eq!(next.version(), snap.version() + 1);
            snap = next;
        }
        // Descriptive fields never change
        for (a, b) in seed.iter().zip(snap.iter()) {
            assert_eq!(a.identity, b.identity);
            assert_eq!(a.trend, b.trend);
        }
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let empty = Snapshot::<MarketRow>::empty();
        let sim = LiveMarketSimulator::new("empty", LiveMarketConfig::home(), &empty);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(sim.tick(&empty, &mut rng).is_none());
    }
}
