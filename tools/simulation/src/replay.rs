//! Digest capture and deterministic replay validation
//!
//! Same seed, same dataset, same number of fires → same event log and
//! same final snapshot.

use market_data::snapshot::verify_digest;
use market_data::{Simulator, SnapshotDigest};
use serde::{Deserialize, Serialize};

use crate::engine::Harness;

/// What a run produced, compactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDigest {
    pub seed: u64,
    pub fires: u64,
    pub virtual_ms: u64,
    pub final_snapshot: SnapshotDigest,
    pub checksums: Vec<String>,
}

/// Capture a digest of the harness state.
pub fn capture<S>(harness: &Harness<S>) -> RunDigest
where
    S: Simulator,
    S::Row: Serialize,
{
    RunDigest {
        seed: harness.seed(),
        fires: harness.metrics.fires + harness.metrics.empty_ticks,
        virtual_ms: harness.now_ms(),
        final_snapshot: harness.snapshot().digest(),
        checksums: harness.checksums().into_iter().map(str::to_string).collect(),
    }
}

/// Build a fresh harness with `make`, run it for `fires` fires and
/// capture the result.
pub fn replay_and_capture<S, F>(make: F, seed: u64, fires: usize) -> RunDigest
where
    S: Simulator,
    S::Row: Serialize,
    F: Fn(u64) -> Harness<S>,
{
    let mut harness = make(seed);
    harness.run_ticks(fires);
    capture(&harness)
}

/// Result of replay validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub matches: bool,
    /// Index of the first published snapshot that differs.
    pub first_divergence: Option<usize>,
    pub original: RunDigest,
    pub replayed: RunDigest,
}

/// Re-run `expected.seed` for the same number of fires and compare.
pub fn validate_replay<S, F>(make: F, expected: &RunDigest) -> ReplayValidation
where
    S: Simulator,
    S::Row: Serialize,
    F: Fn(u64) -> Harness<S>,
{
    let replayed = replay_and_capture(make, expected.seed, expected.fires as usize);
    let first_divergence = expected
        .checksums
        .iter()
        .zip(&replayed.checksums)
        .position(|(a, b)| a != b)
        .or_else(|| {
            (expected.checksums.len() != replayed.checksums.len())
                .then(|| expected.checksums.len().min(replayed.checksums.len()))
        });

    ReplayValidation {
        matches: replayed == *expected,
        first_divergence,
        original: expected.clone(),
        replayed,
    }
}

/// Whether the harness's current snapshot is the one a digest describes.
pub fn verify_final<S>(harness: &Harness<S>, digest: &RunDigest) -> bool
where
    S: Simulator,
    S::Row: Serialize,
{
    verify_digest(&harness.snapshot(), &digest.final_snapshot)
}
