//! Simulated Market Data Engine
//!
//! Produces the "live" numbers of the demo pages:
//! - Seeded sparkline shapes, stable per row
//! - Random-walk mutators for prices, volumes, counters and scores
//! - Per-dataset simulators emitting immutable, versioned snapshots
//! - Tick schedulers publishing those snapshots on jittered timers
//!
//! # Architecture
//!
//! ```text
//!   seed datasets ──▶ Snapshot v0
//!                        │
//!   ┌────────────────────▼─────────────────────┐
//!   │ TickScheduler (one per dataset)           │
//!   │   sleep(jitter) ─▶ Simulator::tick ─┐     │
//!   │        ▲                            │     │
//!   │        └──────── publish ◀──────────┘     │
//!   └────────────────────┬─────────────────────┘
//!                        │
//!                  SnapshotFeed (watch)
//!                        │
//!                  FeedReader(s) ─▶ query / render
//! ```
//!
//! Schedulers never share rows. Each owns its dataset's feed, and
//! cancellation is synchronous.

pub mod activity;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod gauges;
pub mod live;
pub mod metrics;
pub mod query;
pub mod rng;
pub mod scheduler;
pub mod seed;
pub mod snapshot;
pub mod sparkline;
pub mod stats;
pub mod upcoming;
pub mod walk;

pub use config::EngineConfig;
pub use error::{ConfigError, FeedError};
pub use feed::{FeedReader, SnapshotFeed};
pub use scheduler::{DelayRange, SchedulerState, Simulator, TickDelays, TickScheduler};
pub use snapshot::{Snapshot, SnapshotDigest};
pub use sparkline::Sparkline;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
