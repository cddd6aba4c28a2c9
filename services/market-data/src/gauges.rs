//! Aggregate gauge simulators
//!
//! - `SentimentSimulator`: top metrics bar. Fear & greed drifts with a
//!   pull toward neutral, altcoin season wanders, 24h volume grows.
//! - `BottomStatsSimulator`: footer totals, both monotonic.
//!
//! Each dataset is a single-row snapshot.

use rand::Rng;
use types::stat::{BottomStats, SentimentGauge};

use crate::config::{BottomStatsConfig, SentimentConfig};
use crate::scheduler::Simulator;
use crate::snapshot::Snapshot;
use crate::walk::percent_change;

/// The random part of one sentiment update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentDraw {
    pub volume_delta: f64,
    pub fear_greed_delta: i64,
    pub altcoin_delta: i64,
}

pub struct SentimentSimulator {
    config: SentimentConfig,
    anchor_volume: f64,
}

impl SentimentSimulator {
    pub fn new(config: SentimentConfig, seed: &Snapshot<SentimentGauge>) -> Self {
        // Volume the seed change percent was measured against
        let anchor_volume = seed
            .get(0)
            .map(|g| g.volume_24h / (1.0 + g.volume_24h_change_pct / 100.0))
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        Self {
            config,
            anchor_volume,
        }
    }

    pub fn anchor_volume(&self) -> f64 {
        self.anchor_volume
    }

    pub fn draw<R: Rng + ?Sized>(&self, gauge: &SentimentGauge, rng: &mut R) -> SentimentDraw {
        SentimentDraw {
            volume_delta: self.config.volume_24h.step.sample(rng),
            fear_greed_delta: self.config.fear_greed.draw(gauge.fear_greed, rng),
            altcoin_delta: self.config.altcoin_season.draw(gauge.altcoin_season, rng),
        }
    }

    pub fn apply(&self, gauge: &SentimentGauge, draw: SentimentDraw) -> SentimentGauge {
        let volume_24h = self.config.volume_24h.apply(gauge.volume_24h, draw.volume_delta);
        SentimentGauge {
            volume_24h,
            volume_24h_change_pct: percent_change(volume_24h, self.anchor_volume),
            fear_greed: self.config.fear_greed.apply(gauge.fear_greed, draw.fear_greed_delta),
            altcoin_season: self
                .config
                .altcoin_season
                .apply(gauge.altcoin_season, draw.altcoin_delta),
        }
    }
}

impl Simulator for SentimentSimulator {
    type Row = SentimentGauge;

    fn name(&self) -> &str {
        "sentiment"
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<SentimentGauge>, rng: &mut R) -> Option<Snapshot<SentimentGauge>> {
        let gauge = current.get(0)?;
        let draw = self.draw(gauge, rng);
        Some(current.with_replaced(vec![(0, self.apply(gauge, draw))]))
    }
}

pub struct BottomStatsSimulator {
    config: BottomStatsConfig,
}

impl BottomStatsSimulator {
    pub fn new(config: BottomStatsConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, stats: &BottomStats, total_delta: f64, volume_delta: f64) -> BottomStats {
        BottomStats {
            total_volume: self.config.total_volume.apply(stats.total_volume, total_delta),
            volume_24h: self.config.volume_24h.apply(stats.volume_24h, volume_delta),
        }
    }
}

impl Simulator for BottomStatsSimulator {
    type Row = BottomStats;

    fn name(&self) -> &str {
        "bottom_stats"
    }

    fn tick<R: Rng + ?Sized>(&self, current: &Snapshot<BottomStats>, rng: &mut R) -> Option<Snapshot<BottomStats>> {
        let stats = current.get(0)?;
        let total_delta = self.config.total_volume.step.sample(rng);
        let volume_delta = self.config.volume_24h.step.sample(rng);
        Some(current.with_replaced(vec![(0, self.apply(stats, total_delta, volume_delta))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use types::stat::{Sentiment, GAUGE_SCORE_MAX};

    #[test]
    fn test_seed_change_percent_preserved() {
        let seed = Snapshot::initial(vec![seed::sentiment()]);
        let sim = SentimentSimulator::new(SentimentConfig::default(), &seed);
        let gauge = seed.get(0).unwrap();
        assert_eq!(gauge.sentiment(), Sentiment::Neutral);

        let still = sim.apply(
            gauge,
            SentimentDraw {
                volume_delta: 0.0,
                fear_greed_delta: 0,
                altcoin_delta: 0,
            },
        );
        assert!((still.volume_24h_change_pct - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_scores_clamped() {
        let seed = Snapshot::initial(vec![seed::sentiment()]);
        let sim = SentimentSimulator::new(SentimentConfig::default(), &seed);
        let next = sim.apply(
            seed.get(0).unwrap(),
            SentimentDraw {
                volume_delta: 10.0,
                fear_greed_delta: 500,
                altcoin_delta: -500,
            },
        );
        assert_eq!(next.fear_greed, GAUGE_SCORE_MAX);
        assert_eq!(next.altcoin_season, 0);
        assert_eq!(next.sentiment(), Sentiment::ExtremeGreed);
    }

    #[test]
    fn test_sentiment_ticks_stay_in_range() {
        let seed = Snapshot::initial(vec![seed::sentiment()]);
        let sim = SentimentSimulator::new(SentimentConfig::default(), &seed);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut snap = seed.clone();
        let mut last_volume = snap.get(0).unwrap().volume_24h;
        for _ in 0..5_000 {
            snap = sim.tick(&snap, &mut rng).unwrap();
            let g = snap.get(0).unwrap();
            assert!(g.fear_greed <= GAUGE_SCORE_MAX);
            assert!(g.altcoin_season <= GAUGE_SCORE_MAX);
            assert!(g.volume_24h >= last_volume);
            last_volume = g.volume_24h;
        }
    }

    #[test]
    fn test_bottom_stats_monotonic() {
        let sim = BottomStatsSimulator::new(BottomStatsConfig::default());
        let mut snap = Snapshot::initial(vec![seed::bottom_stats()]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1_000 {
            let next = sim.tick(&snap, &mut rng).unwrap();
            let (a, b) = (snap.get(0).unwrap(), next.get(0).unwrap());
            assert!(b.total_volume >= a.total_volume);
            assert!(b.volume_24h >= a.volume_24h);
            snap = next;
        }
    }

    #[test]
    fn test_empty_gauge_yields_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sim = BottomStatsSimulator::new(BottomStatsConfig::default());
        assert!(sim.tick(&Snapshot::empty(), &mut rng).is_none());
    }
}
