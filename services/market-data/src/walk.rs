//! Random-walk field mutators
//!
//! Each walker has two halves:
//! - `draw`: samples a step from the supplied RNG
//! - `apply`: pure function of `(current, anchor, step)`
//!
//! Simulators call `step` (draw + apply). Scenario tests call `apply`
//! directly with a hand-picked step.
//!
//! Anchors are the seed values captured when the simulator is built.
//! Bounds and percent changes are always measured against the anchor,
//! never against the previous tick.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive-exclusive uniform range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Uniform sample. A degenerate span yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

fn signed<R: Rng + ?Sized>(magnitude: f64, up_probability: f64, rng: &mut R) -> f64 {
    if rng.gen_bool(up_probability.clamp(0.0, 1.0)) {
        magnitude
    } else {
        -magnitude
    }
}

/// Multiplicative walk clamped to a band around the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceWalk {
    /// Magnitude of one step as a fraction of the current value.
    pub step: Span,
    /// Allowed deviation from the anchor as a fraction (0.2 = ±20%).
    pub band: f64,
}

impl Default for PriceWalk {
    fn default() -> Self {
        Self {
            step: Span::new(0.005, 0.02),
            band: 0.2,
        }
    }
}

impl PriceWalk {
    /// `[anchor * (1 - band), anchor * (1 + band)]`
    pub fn bounds(&self, anchor: f64) -> (f64, f64) {
        let a = anchor * (1.0 - self.band);
        let b = anchor * (1.0 + self.band);
        (a.min(b), a.max(b))
    }

    /// `current * (1 + delta)`, clamped to the anchor band.
    pub fn apply(&self, current: f64, anchor: f64, delta: f64) -> f64 {
        let (lo, hi) = self.bounds(anchor);
        (current * (1.0 + delta)).clamp(lo, hi)
    }

    /// Signed fractional step, sign is a fair coin.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let magnitude = self.step.sample(rng);
        signed(magnitude, 0.5, rng)
    }

    pub fn step<R: Rng + ?Sized>(&self, current: f64, anchor: f64, rng: &mut R) -> f64 {
        self.apply(current, anchor, self.draw(rng))
    }
}

/// Additive walk that never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonotonicWalk {
    pub step: Span,
}

impl MonotonicWalk {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            step: Span::new(min, max),
        }
    }

    /// Negative steps are ignored.
    pub fn apply(&self, current: f64, delta: f64) -> f64 {
        current + delta.max(0.0)
    }

    pub fn step<R: Rng + ?Sized>(&self, current: f64, rng: &mut R) -> f64 {
        self.apply(current, self.step.sample(rng))
    }
}

/// Integer counter bumped by `floor(uniform(step))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterWalk {
    pub step: Span,
}

impl Default for CounterWalk {
    fn default() -> Self {
        Self {
            step: Span::new(1.0, 15.0),
        }
    }
}

impl CounterWalk {
    pub fn apply(&self, current: u64, draw: f64) -> u64 {
        current.saturating_add(draw.max(0.0).floor() as u64)
    }

    pub fn step<R: Rng + ?Sized>(&self, current: u64, rng: &mut R) -> u64 {
        self.apply(current, self.step.sample(rng))
    }
}

/// Occasional +1 on a secondary counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bump {
    pub probability: f64,
}

impl Bump {
    pub const fn new(probability: f64) -> Self {
        Self { probability }
    }

    pub fn apply(&self, current: u32, hit: bool) -> u32 {
        if hit {
            current.saturating_add(1)
        } else {
            current
        }
    }

    pub fn step<R: Rng + ?Sized>(&self, current: u32, rng: &mut R) -> u32 {
        let hit = rng.gen_bool(self.probability.clamp(0.0, 1.0));
        self.apply(current, hit)
    }
}

/// Pull toward a centre value, as a fraction of the distance per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanReversion {
    pub centre: u32,
    pub strength: f64,
}

impl MeanReversion {
    pub fn pull(&self, current: u32) -> i64 {
        ((self.centre as f64 - current as f64) * self.strength).round() as i64
    }
}

/// Integer score in `[0, max]` with biased direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWalk {
    pub step: Span,
    pub up_probability: f64,
    pub max: u32,
    #[serde(default)]
    pub reversion: Option<MeanReversion>,
}

impl ScoreWalk {
    /// `current + delta`, clamped to `[0, max]`.
    pub fn apply(&self, current: u32, delta: i64) -> u32 {
        (current as i64 + delta).clamp(0, self.max as i64) as u32
    }

    /// `floor(uniform(step))` with the biased sign, plus any reversion pull.
    pub fn draw<R: Rng + ?Sized>(&self, current: u32, rng: &mut R) -> i64 {
        let magnitude = self.step.sample(rng).floor();
        let delta = signed(magnitude, self.up_probability, rng) as i64;
        match self.reversion {
            Some(rev) => delta + rev.pull(current),
            None => delta,
        }
    }

    pub fn step<R: Rng + ?Sized>(&self, current: u32, rng: &mut R) -> u32 {
        let delta = self.draw(current, rng);
        self.apply(current, delta)
    }
}

/// One step of an integer stat: `randInt(dmin, dmax)` with a fair sign,
/// clamped to `[min, max]`.
pub fn stat_apply(value: i64, delta: i64, min: i64, max: i64) -> i64 {
    (value.saturating_add(delta)).clamp(min.min(max), max.max(min))
}

pub fn stat_draw<R: Rng + ?Sized>(delta: (i64, i64), rng: &mut R) -> i64 {
    let (lo, hi) = (delta.0.min(delta.1), delta.0.max(delta.1));
    let magnitude = rng.gen_range(lo..=hi);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// `(current - anchor) / anchor * 100`. A zero anchor divides by 1.
pub fn percent_change(current: f64, anchor: f64) -> f64 {
    let denom = if anchor == 0.0 { 1.0 } else { anchor };
    (current - anchor) / denom * 100.0
}

/// FDV scaled by the price move since seeding.
pub fn implied_fdv(anchor_fdv: f64, anchor_price: f64, price: f64) -> f64 {
    if anchor_price == 0.0 {
        return anchor_fdv;
    }
    anchor_fdv * price / anchor_price
}

/// How many rows a single tick touches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowPick {
    Single,
    /// One row with `single_probability`, otherwise two distinct rows.
    OneOrTwo { single_probability: f64 },
}

impl Default for RowPick {
    fn default() -> Self {
        RowPick::OneOrTwo {
            single_probability: 0.6,
        }
    }
}

impl RowPick {
    /// Distinct row indices, never more than `len`. Empty when `len == 0`.
    pub fn pick<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        let wanted = match *self {
            RowPick::Single => 1,
            RowPick::OneOrTwo { single_probability } => {
                if rng.gen_bool(single_probability.clamp(0.0, 1.0)) {
                    1
                } else {
                    2
                }
            }
        };
        index::sample(rng, len, wanted.min(len)).into_vec()
    }

    pub fn max_rows(&self) -> usize {
        match self {
            RowPick::Single => 1,
            RowPick::OneOrTwo { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_price_step_unclamped() {
        let walk = PriceWalk::default();
        assert!(approx(walk.apply(0.3499, 0.3499, 0.02), 0.356898));
    }

    #[test]
    fn test_price_clamped_to_band() {
        let walk = PriceWalk::default();
        assert!(approx(walk.apply(0.1275, 0.10, 0.02), 0.12));
        assert!(approx(walk.apply(0.081, 0.10, -0.02), 0.08));
    }

    #[test]
    fn test_price_draw_range() {
        let walk = PriceWalk::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut saw_up = false;
        let mut saw_down = false;
        for _ in 0..1_000 {
            let d = walk.draw(&mut rng);
            assert!(d.abs() >= 0.005 && d.abs() < 0.02);
            saw_up |= d > 0.0;
            saw_down |= d < 0.0;
        }
        assert!(saw_up && saw_down);
    }

    #[test]
    fn test_monotonic_ignores_negative() {
        let walk = MonotonicWalk::new(20.0, 350.0);
        assert_eq!(walk.apply(100.0, -5.0), 100.0);
        assert_eq!(walk.apply(100.0, 25.5), 125.5);
    }

    #[test]
    fn test_counter_floors() {
        let walk = CounterWalk::default();
        assert_eq!(walk.apply(4572, 14.99), 4586);
        assert_eq!(walk.apply(4572, 1.0), 4573);
    }

    #[test]
    fn test_score_clamps_at_max() {
        let walk = ScoreWalk {
            step: Span::new(50.0, 200.0),
            up_probability: 0.6,
            max: 40_000,
            reversion: None,
        };
        assert_eq!(walk.apply(39_950, 200), 40_000);
        assert_eq!(walk.apply(30, -200), 0);
    }

    #[test]
    fn test_mean_reversion_pulls_toward_centre() {
        let rev = MeanReversion {
            centre: 50,
            strength: 0.1,
        };
        assert_eq!(rev.pull(90), -4);
        assert_eq!(rev.pull(10), 4);
        assert_eq!(rev.pull(50), 0);
    }

    #[test]
    fn test_percent_change() {
        assert!(approx(percent_change(110.0, 100.0), 10.0));
        assert!(approx(percent_change(90.0, 100.0), -10.0));
        // Zero anchor divides by one
        assert!(approx(percent_change(25.0, 0.0), 2_500.0));
    }

    #[test]
    fn test_implied_fdv_tracks_price() {
        assert!(approx(implied_fdv(38.1e6, 0.055, 0.0605), 41.91e6));
        assert_eq!(implied_fdv(1.0, 0.0, 2.0), 1.0);
    }

    #[test]
    fn test_row_pick_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!(RowPick::default().pick(0, &mut rng).is_empty());
        assert_eq!(RowPick::default().pick(1, &mut rng), vec![0]);
        for _ in 0..500 {
            let picked = RowPick::default().pick(6, &mut rng);
            assert!(picked.len() == 1 || picked.len() == 2);
            if picked.len() == 2 {
                assert_ne!(picked[0], picked[1]);
            }
            assert!(picked.iter().all(|&i| i < 6));
            assert_eq!(RowPick::Single.pick(6, &mut rng).len(), 1);
        }
    }

    #[test]
    fn test_row_pick_serde() {
        let json = r#"{"kind":"one_or_two","single_probability":0.6}"#;
        let pick: RowPick = serde_json::from_str(json).unwrap();
        assert_eq!(pick, RowPick::default());
        let single: RowPick = serde_json::from_str(r#"{"kind":"single"}"#).unwrap();
        assert_eq!(single, RowPick::Single);
    }

    proptest! {
        #[test]
        fn prop_price_stays_in_band(anchor in 0.0001f64..10_000.0, seed in any::<u64>()) {
            let walk = PriceWalk::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut price = anchor;
            for _ in 0..200 {
                price = walk.step(price, anchor, &mut rng);
                prop_assert!(price >= anchor * 0.8 - 1e-12);
                prop_assert!(price <= anchor * 1.2 + 1e-12);
            }
        }

        #[test]
        fn prop_stat_stays_clamped(value in 240i64..=280, d in 0i64..=5, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut v = value;
            for _ in 0..100 {
                v = stat_apply(v, stat_draw((0, d), &mut rng), 240, 280);
                prop_assert!((240..=280).contains(&v));
            }
        }
    }
}
