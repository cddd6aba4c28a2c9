//! Simulation Harness
//!
//! Headless, deterministic runs of the market data engine on a virtual
//! clock. Every run is fully determined by its RNG seed, so runs can be
//! compared, replayed and exported.
//!
//! # Modules
//! - `engine`: Virtual-clock harness driving one simulator
//! - `invariants`: Drift, monotonicity, score range, percent change, partial mutation checks
//! - `scenarios`: Named scenarios with injected draws
//! - `metrics`: Fire counters and inter-fire delay histogram
//! - `multi_feed`: All page datasets on one virtual clock
//! - `replay`: Digest capture and replay validation
//! - `export`: JSON export of metrics and scenario results

pub mod engine;
pub mod export;
pub mod invariants;
pub mod metrics;
pub mod multi_feed;
pub mod replay;
pub mod scenarios;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
