//! Engine configuration
//!
//! Every dataset has a named preset matching the demo pages. Presets are
//! the `Default`; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::scheduler::{DelayRange, TickDelays};
use crate::walk::{Bump, CounterWalk, MeanReversion, MonotonicWalk, PriceWalk, RowPick, ScoreWalk, Span};

fn check_span(field: &str, span: &Span) -> Result<(), ConfigError> {
    if !span.is_valid() || span.min < 0.0 {
        return Err(ConfigError::Span {
            field: field.to_string(),
            min: span.min,
            max: span.max,
        });
    }
    Ok(())
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_pick(field: &str, pick: &RowPick) -> Result<(), ConfigError> {
    match pick {
        RowPick::Single => Ok(()),
        RowPick::OneOrTwo { single_probability } => check_probability(field, *single_probability),
    }
}

/// Live market feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMarketConfig {
    pub delays: TickDelays,
    pub pick: RowPick,
    pub price: PriceWalk,
    /// `None` leaves the 24h volume at its seed value.
    pub volume_24h: Option<MonotonicWalk>,
    pub total_volume: MonotonicWalk,
}

impl LiveMarketConfig {
    /// Home page table: 1-2 rows every 3-5s.
    pub fn home() -> Self {
        Self {
            delays: TickDelays::uniform(DelayRange::secs(3, 5)),
            pick: RowPick::default(),
            price: PriceWalk::default(),
            volume_24h: Some(MonotonicWalk::new(20.0, 350.0)),
            total_volume: MonotonicWalk::new(50.0, 500.0),
        }
    }

    /// Pre-market page: one row, first after 4-6s then every 2-4s.
    pub fn premarket() -> Self {
        Self {
            delays: TickDelays {
                initial: DelayRange::secs(4, 6),
                repeat: DelayRange::secs(2, 4),
            },
            pick: RowPick::Single,
            price: PriceWalk::default(),
            volume_24h: None,
            total_volume: MonotonicWalk::new(20.0, 350.0),
        }
    }

    pub fn validate(&self, dataset: &str) -> Result<(), ConfigError> {
        self.delays.validate(dataset)?;
        check_pick(&format!("{dataset}.pick"), &self.pick)?;
        check_span(&format!("{dataset}.price.step"), &self.price.step)?;
        if !(self.price.band > 0.0 && self.price.band < 1.0) {
            return Err(ConfigError::PriceBand(self.price.band));
        }
        if let Some(walk) = &self.volume_24h {
            check_span(&format!("{dataset}.volume_24h"), &walk.step)?;
        }
        check_span(&format!("{dataset}.total_volume"), &self.total_volume.step)
    }
}

/// Upcoming market feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMarketConfig {
    pub delays: TickDelays,
    pub pick: RowPick,
    pub watchers: CounterWalk,
    /// `None` leaves the moni score untouched.
    pub moni: Option<ScoreWalk>,
    pub investor_bump: Bump,
}

impl UpcomingMarketConfig {
    pub fn home() -> Self {
        Self {
            delays: TickDelays::uniform(DelayRange::secs(6, 10)),
            pick: RowPick::default(),
            watchers: CounterWalk::default(),
            moni: Some(ScoreWalk {
                step: Span::new(50.0, 200.0),
                up_probability: 0.6,
                max: types::market::MONI_SCORE_MAX,
                reversion: None,
            }),
            investor_bump: Bump::new(0.15),
        }
    }

    pub fn premarket() -> Self {
        Self {
            delays: TickDelays {
                initial: DelayRange::secs(10, 15),
                repeat: DelayRange::secs(6, 10),
            },
            pick: RowPick::Single,
            watchers: CounterWalk::default(),
            moni: None,
            investor_bump: Bump::new(0.2),
        }
    }

    pub fn validate(&self, dataset: &str) -> Result<(), ConfigError> {
        self.delays.validate(dataset)?;
        check_pick(&format!("{dataset}.pick"), &self.pick)?;
        check_span(&format!("{dataset}.watchers"), &self.watchers.step)?;
        if let Some(moni) = &self.moni {
            check_span(&format!("{dataset}.moni"), &moni.step)?;
            check_probability(&format!("{dataset}.moni.up_probability"), moni.up_probability)?;
        }
        check_probability(&format!("{dataset}.investor_bump"), self.investor_bump.probability)
    }
}

/// Headline stats: one stat per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub delays: TickDelays,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            delays: TickDelays {
                initial: DelayRange::fixed(8_000),
                repeat: DelayRange::secs(6, 9),
            },
        }
    }
}

/// Top metrics bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub delays: TickDelays,
    pub volume_24h: MonotonicWalk,
    pub fear_greed: ScoreWalk,
    pub altcoin_season: ScoreWalk,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            delays: TickDelays::uniform(DelayRange::secs(6, 15)),
            volume_24h: MonotonicWalk::new(1_000.0, 15_000.0),
            fear_greed: ScoreWalk {
                step: Span::new(1.0, 4.0),
                up_probability: 0.5,
                max: types::stat::GAUGE_SCORE_MAX,
                reversion: Some(MeanReversion {
                    centre: 50,
                    strength: 0.05,
                }),
            },
            altcoin_season: ScoreWalk {
                step: Span::new(1.0, 3.0),
                up_probability: 0.5,
                max: types::stat::GAUGE_SCORE_MAX,
                reversion: None,
            },
        }
    }
}

/// Footer totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottomStatsConfig {
    pub delays: TickDelays,
    pub total_volume: MonotonicWalk,
    pub volume_24h: MonotonicWalk,
}

impl Default for BottomStatsConfig {
    fn default() -> Self {
        Self {
            delays: TickDelays::uniform(DelayRange::secs(3, 5)),
            total_volume: MonotonicWalk::new(50.0, 500.0),
            volume_24h: MonotonicWalk::new(20.0, 350.0),
        }
    }
}

/// Recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub delays: TickDelays,
    /// Entries kept, newest first.
    pub history_cap: usize,
    /// Collateral in USD, drawn log-uniformly.
    pub collateral: Span,
    /// Price offset from the token's reference price, as a fraction.
    pub price_jitter: f64,
    pub filled_probability: f64,
    pub buy_probability: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            delays: TickDelays::uniform(DelayRange::secs(2, 6)),
            history_cap: 20,
            collateral: Span::new(3.0, 8_000.0),
            price_jitter: 0.02,
            filled_probability: 0.7,
            buy_probability: 0.5,
        }
    }
}

/// All datasets of both pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub home_live: LiveMarketConfig,
    pub home_upcoming: UpcomingMarketConfig,
    pub premarket_live: LiveMarketConfig,
    pub premarket_upcoming: UpcomingMarketConfig,
    pub stats: StatsConfig,
    pub sentiment: SentimentConfig,
    pub bottom_stats: BottomStatsConfig,
    pub activity: ActivityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            home_live: LiveMarketConfig::home(),
            home_upcoming: UpcomingMarketConfig::home(),
            premarket_live: LiveMarketConfig::premarket(),
            premarket_upcoming: UpcomingMarketConfig::premarket(),
            stats: StatsConfig::default(),
            sentiment: SentimentConfig::default(),
            bottom_stats: BottomStatsConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate. Missing sections fall back to their presets.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse, or fall back to the presets with a warning.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Invalid engine config, using presets");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.home_live.validate("home_live")?;
        self.home_upcoming.validate("home_upcoming")?;
        self.premarket_live.validate("premarket_live")?;
        self.premarket_upcoming.validate("premarket_upcoming")?;
        self.stats.delays.validate("stats")?;

        self.sentiment.delays.validate("sentiment")?;
        check_span("sentiment.volume_24h", &self.sentiment.volume_24h.step)?;
        check_span("sentiment.fear_greed", &self.sentiment.fear_greed.step)?;
        check_span("sentiment.altcoin_season", &self.sentiment.altcoin_season.step)?;

        self.bottom_stats.delays.validate("bottom_stats")?;
        check_span("bottom_stats.total_volume", &self.bottom_stats.total_volume.step)?;
        check_span("bottom_stats.volume_24h", &self.bottom_stats.volume_24h.step)?;

        let activity = &self.activity;
        activity.delays.validate("activity")?;
        if activity.history_cap == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        if activity.collateral.min <= 0.0 {
            return Err(ConfigError::Span {
                field: "activity.collateral".to_string(),
                min: activity.collateral.min,
                max: activity.collateral.max,
            });
        }
        check_span("activity.collateral", &activity.collateral)?;
        check_probability("activity.filled_probability", activity.filled_probability)?;
        check_probability("activity.buy_probability", activity.buy_probability)
    }
}
