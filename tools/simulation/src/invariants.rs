//! Invariant checks over snapshots
//!
//! Each check returns the violations it found; an empty vector means the
//! invariant holds. The `audit_*` helpers run a harness tick by tick and
//! apply every check to each consecutive pair of snapshots.

use market_data::live::LiveMarketSimulator;
use market_data::upcoming::UpcomingMarketSimulator;
use market_data::walk::percent_change;
use market_data::Snapshot;
use serde::{Deserialize, Serialize};
use types::market::{MarketRow, UpcomingRow};

use crate::engine::Harness;

/// Float slack for band comparisons.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub check: String,
    pub row: Option<usize>,
    pub detail: String,
}

impl Violation {
    fn new(check: &str, row: Option<usize>, detail: String) -> Self {
        Self {
            check: check.to_string(),
            row,
            detail,
        }
    }
}

/// Every price stays within `seed * (1 ± band)`.
pub fn check_bounded_drift(seed: &Snapshot<MarketRow>, snap: &Snapshot<MarketRow>, band: f64) -> Vec<Violation> {
    seed.iter()
        .zip(snap.iter())
        .enumerate()
        .filter_map(|(i, (anchor, row))| {
            let lo = anchor.last_price * (1.0 - band) - EPSILON;
            let hi = anchor.last_price * (1.0 + band) + EPSILON;
            (row.last_price < lo || row.last_price > hi).then(|| {
                Violation::new(
                    "bounded_drift",
                    Some(i),
                    format!("price {} outside [{lo}, {hi}]", row.last_price),
                )
            })
        })
        .collect()
}

/// Volumes never decrease between consecutive snapshots.
pub fn check_monotonic_volumes(prev: &Snapshot<MarketRow>, next: &Snapshot<MarketRow>) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, (a, b)) in prev.iter().zip(next.iter()).enumerate() {
        if b.total_volume < a.total_volume {
            out.push(Violation::new(
                "monotonic_volume",
                Some(i),
                format!("total volume {} -> {}", a.total_volume, b.total_volume),
            ));
        }
        if b.volume_24h < a.volume_24h {
            out.push(Violation::new(
                "monotonic_volume",
                Some(i),
                format!("24h volume {} -> {}", a.volume_24h, b.volume_24h),
            ));
        }
    }
    out
}

/// Change percentages of every mutated row match the seed anchor
/// exactly. Rows still shared with the seed keep their literal values.
pub fn check_percent_change(seed: &Snapshot<MarketRow>, snap: &Snapshot<MarketRow>) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, (anchor, row)) in seed.iter().zip(snap.iter()).enumerate() {
        if snap.shares_row(seed, i) {
            continue;
        }
        let expected = percent_change(row.last_price, anchor.last_price);
        if row.price_change_pct != expected {
            out.push(Violation::new(
                "percent_change",
                Some(i),
                format!("price change {} != {expected}", row.price_change_pct),
            ));
        }
        let expected = percent_change(row.total_volume, anchor.total_volume);
        if row.total_volume_change_pct != expected {
            out.push(Violation::new(
                "percent_change",
                Some(i),
                format!("total volume change {} != {expected}", row.total_volume_change_pct),
            ));
        }
    }
    out
}

/// At most `max_rows` rows differ; all others are the same allocation.
pub fn check_partial_mutation<T>(prev: &Snapshot<T>, next: &Snapshot<T>, max_rows: usize) -> Vec<Violation> {
    let changed = next.changed_indices(prev);
    if changed.len() > max_rows {
        vec![Violation::new(
            "partial_mutation",
            None,
            format!("{} rows changed ({changed:?}), limit {max_rows}", changed.len()),
        )]
    } else {
        Vec::new()
    }
}

/// Scores stay in `[0, max]` and watcher counts never decrease.
pub fn check_upcoming(prev: &Snapshot<UpcomingRow>, next: &Snapshot<UpcomingRow>, max_score: u32) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, (a, b)) in prev.iter().zip(next.iter()).enumerate() {
        if b.moni_score > max_score {
            out.push(Violation::new(
                "score_range",
                Some(i),
                format!("moni {} > {max_score}", b.moni_score),
            ));
        }
        if b.watcher_count < a.watcher_count {
            out.push(Violation::new(
                "monotonic_watchers",
                Some(i),
                format!("watchers {} -> {}", a.watcher_count, b.watcher_count),
            ));
        }
    }
    out
}

/// Run `ticks` fires and check every live-table invariant after each.
pub fn audit_live_run(harness: &mut Harness<LiveMarketSimulator>, ticks: usize) -> Vec<Violation> {
    let seed = harness.seed_snapshot().clone();
    let band = harness.simulator().config().price.band;
    let max_rows = harness.simulator().config().pick.max_rows();
    let mut out = Vec::new();

    let mut prev = harness.snapshot();
    for _ in 0..ticks {
        if harness.run_ticks(1) == 0 {
            break;
        }
        let next = harness.snapshot();
        out.extend(check_bounded_drift(&seed, &next, band));
        out.extend(check_monotonic_volumes(&prev, &next));
        out.extend(check_percent_change(&seed, &next));
        out.extend(check_partial_mutation(&prev, &next, max_rows));
        prev = next;
    }
    out
}

/// Run `ticks` fires and check every upcoming-table invariant after each.
pub fn audit_upcoming_run(harness: &mut Harness<UpcomingMarketSimulator>, ticks: usize) -> Vec<Violation> {
    let max_score = harness
        .simulator()
        .config()
        .moni
        .map(|walk| walk.max)
        .unwrap_or(u32::MAX);
    let max_rows = harness.simulator().config().pick.max_rows();
    let mut out = Vec::new();

    let mut prev = harness.snapshot();
    for _ in 0..ticks {
        if harness.run_ticks(1) == 0 {
            break;
        }
        let next = harness.snapshot();
        out.extend(check_upcoming(&prev, &next, max_score));
        out.extend(check_partial_mutation(&prev, &next, max_rows));
        prev = next;
    }
    out
}
