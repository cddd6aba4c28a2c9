//! Seeded sparkline shape generator
//!
//! Maps a chart seed and a trend hint to a smooth 96×44 sparkline. The
//! seed drives a [`SeededRng`] which picks, in order:
//! 1. one of eight shape presets,
//! 2. a point count in 12..=17,
//! 3. a volatility magnitude,
//! 4. per-point jitter on top of the preset curve.
//!
//! Output is a pure function of `(seed, trend)`: charts never jitter on
//! re-render even though the prices next to them tick.

use std::f64::consts::PI;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use types::chart::{ChartSeed, Trend};

use crate::rng::SeededRng;

/// Chart viewport width.
pub const VIEW_WIDTH: f64 = 96.0;
/// Chart viewport height.
pub const VIEW_HEIGHT: f64 = 44.0;

const MIN_POINTS: usize = 12;
const POINT_SPREAD: f64 = 6.0;
const BASE_VOLATILITY: f64 = 0.04;
const VOLATILITY_SPREAD: f64 = 0.1;
const TOP_PAD: f64 = 3.0;
const PLOT_RANGE: f64 = 38.0;
const MIN_Y: f64 = 2.0;
const MAX_Y: f64 = 42.0;
/// Horizontal reach of each cubic control point, as a share of the segment.
const CONTROL_REACH: f64 = 0.35;

/// Seed used when a row has no usable key.
pub const DEFAULT_SEED: &str = "sparkline-default";

/// Shape presets. Each maps `t ∈ [0,1]` to `v ∈ [0,1]` where 0 is the
/// top of the chart (high price) for a down-trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Flat, then a sharp rise.
    LatePump,
    /// Drops mid-way, then recovers.
    VDip,
    /// Two plateaus joined by a step.
    Staircase,
    /// Big early peak, slow decline.
    SpikeThenFade,
    /// Sine oscillation riding a trend.
    GradualWave,
    /// Double dip.
    WShape,
    /// Sideways chop, then a breakout.
    Breakout,
    /// Steady climb with a pullback.
    ClimbWithPullback,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::LatePump,
        ShapeKind::VDip,
        ShapeKind::Staircase,
        ShapeKind::SpikeThenFade,
        ShapeKind::GradualWave,
        ShapeKind::WShape,
        ShapeKind::Breakout,
        ShapeKind::ClimbWithPullback,
    ];

    /// Height of the preset curve at `t`.
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            ShapeKind::LatePump => {
                if t < 0.6 {
                    0.85 - t * 0.15
                } else {
                    0.85 - 0.15 * 0.6 - (t - 0.6) * 1.6
                }
            }
            ShapeKind::VDip => {
                let mid = 0.4;
                if t < mid {
                    t / mid * 0.7
                } else {
                    0.7 - (t - mid) / (1.0 - mid) * 0.7
                }
            }
            ShapeKind::Staircase => {
                if t < 0.45 {
                    0.75
                } else if t < 0.55 {
                    0.75 - (t - 0.45) / 0.1 * 0.45
                } else {
                    0.3
                }
            }
            ShapeKind::SpikeThenFade => {
                if t < 0.2 {
                    0.8 - t / 0.2 * 0.8
                } else {
                    (t - 0.2) / 0.8 * 0.55
                }
            }
            ShapeKind::GradualWave => 0.7 - t * 0.5 + (t * PI * 3.0).sin() * 0.15,
            ShapeKind::WShape => 0.5 + (t * PI * 2.0).sin() * 0.35 - t * 0.25,
            ShapeKind::Breakout => {
                if t < 0.7 {
                    0.65 + (t * 14.0).sin() * 0.08
                } else {
                    0.65 - (t - 0.7) / 0.3 * 0.55
                }
            }
            ShapeKind::ClimbWithPullback => {
                let base = 0.85 - t * 0.75;
                let pullback = if t > 0.5 && t < 0.7 {
                    (t - 0.5) * 1.5
                } else if t >= 0.7 {
                    0.3 - (t - 0.7)
                } else {
                    0.0
                };
                base + pullback
            }
        }
    }
}

/// A point in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One cubic Bézier segment ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub control_1: Point,
    pub control_2: Point,
    pub end: Point,
}

/// A generated sparkline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    pub shape: ShapeKind,
    pub trend: Trend,
    pub volatility: f64,
    pub points: Vec<Point>,
    /// `points.len() - 1` segments, one per consecutive point pair.
    pub segments: Vec<CubicSegment>,
}

impl Sparkline {
    /// Generate the sparkline for a chart seed.
    pub fn generate(seed: &ChartSeed, trend: Trend) -> Self {
        Self::from_key(seed.as_str(), trend)
    }

    /// Generate from a raw key. An empty key uses [`DEFAULT_SEED`].
    pub fn from_key(key: &str, trend: Trend) -> Self {
        let key = if key.is_empty() { DEFAULT_SEED } else { key };
        let mut rng = SeededRng::from_seed(key);

        let shape = ShapeKind::ALL[rng.next_index(ShapeKind::ALL.len())];
        let count = MIN_POINTS + (rng.next_f64() * POINT_SPREAD) as usize;
        let volatility = BASE_VOLATILITY + rng.next_f64() * VOLATILITY_SPREAD;

        let points: Vec<Point> = (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                let jitter = (rng.next_f64() - 0.5) * volatility;
                let v = (shape.eval(t) + jitter).clamp(0.0, 1.0);
                let mut y = TOP_PAD + v * PLOT_RANGE;
                if trend == Trend::Up {
                    y = VIEW_HEIGHT - y;
                }
                Point {
                    x: t * VIEW_WIDTH,
                    y: y.clamp(MIN_Y, MAX_Y),
                }
            })
            .collect();

        let segments = points
            .windows(2)
            .map(|pair| {
                let (prev, cur) = (pair[0], pair[1]);
                let dx = (cur.x - prev.x) * CONTROL_REACH;
                CubicSegment {
                    control_1: Point { x: prev.x + dx, y: prev.y },
                    control_2: Point { x: cur.x - dx, y: cur.y },
                    end: cur,
                }
            })
            .collect();

        Self {
            shape,
            trend,
            volatility,
            points,
            segments,
        }
    }

    /// SVG path data for the stroke, one decimal per coordinate.
    pub fn path(&self) -> String {
        let mut d = String::with_capacity(32 + self.segments.len() * 40);
        if let Some(first) = self.points.first() {
            let _ = write!(d, "M{:.1} {:.1}", first.x, first.y);
        }
        for seg in &self.segments {
            let _ = write!(
                d,
                " C{:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
                seg.control_1.x,
                seg.control_1.y,
                seg.control_2.x,
                seg.control_2.y,
                seg.end.x,
                seg.end.y,
            );
        }
        d
    }

    /// SVG path data for the gradient fill under the stroke.
    pub fn area_path(&self) -> String {
        format!(
            "{} L{} {} L0 {} Z",
            self.path(),
            VIEW_WIDTH,
            VIEW_HEIGHT,
            VIEW_HEIGHT
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::RowId;

    fn seed(id: &str, slug: &str) -> ChartSeed {
        ChartSeed::new(&RowId::from(id), slug, "chart")
    }

    #[test]
    fn test_same_seed_same_output() {
        let s = seed("1", "skate");
        let a = Sparkline::generate(&s, Trend::Up);
        let b = Sparkline::generate(&s, Trend::Up);
        assert_eq!(a, b);
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn test_point_count_and_bounds() {
        for (id, slug) in [("1", "skate"), ("2", "shake"), ("3", "era"), ("4", "grass"), ("5", "loud"), ("6", "mmt")] {
            let line = Sparkline::generate(&seed(id, slug), Trend::Down);
            assert!((12..=17).contains(&line.points.len()));
            assert_eq!(line.segments.len(), line.points.len() - 1);
            assert_eq!(line.points.first().unwrap().x, 0.0);
            assert_eq!(line.points.last().unwrap().x, VIEW_WIDTH);
            for p in &line.points {
                assert!(p.y >= MIN_Y && p.y <= MAX_Y, "y out of range: {}", p.y);
            }
            assert!(line.volatility >= BASE_VOLATILITY);
            assert!(line.volatility < BASE_VOLATILITY + VOLATILITY_SPREAD);
        }
    }

    #[test]
    fn test_trend_flips_vertically() {
        let s = seed("4", "grass");
        let down = Sparkline::generate(&s, Trend::Down);
        let up = Sparkline::generate(&s, Trend::Up);

        assert_eq!(down.shape, up.shape);
        assert_eq!(down.points.len(), up.points.len());
        for (d, u) in down.points.iter().zip(&up.points) {
            assert_eq!(d.x, u.x);
            // Unclamped points mirror around the chart's midline
            if d.y > MIN_Y && d.y < MAX_Y && u.y > MIN_Y && u.y < MAX_Y {
                assert!((d.y + u.y - VIEW_HEIGHT).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_seed_uses_default() {
        let empty = Sparkline::from_key("", Trend::Up);
        let default = Sparkline::from_key(DEFAULT_SEED, Trend::Up);
        assert_eq!(empty, default);
    }

    #[test]
    fn test_path_format() {
        let line = Sparkline::generate(&seed("3", "era"), Trend::Up);
        let path = line.path();
        assert!(path.starts_with("M0.0 "));
        assert_eq!(path.matches(" C").count(), line.points.len() - 1);
        assert!(path.ends_with(&format!("96.0 {:.1}", line.points.last().unwrap().y)));

        let area = line.area_path();
        assert!(area.starts_with(&path));
        assert!(area.ends_with(" L96 44 L0 44 Z"));
    }

    #[test]
    fn test_control_points_keep_endpoint_heights() {
        let line = Sparkline::generate(&seed("5", "loud"), Trend::Down);
        for (i, seg) in line.segments.iter().enumerate() {
            assert_eq!(seg.control_1.y, line.points[i].y);
            assert_eq!(seg.control_2.y, seg.end.y);
            assert!(seg.control_1.x < seg.control_2.x);
        }
    }

    #[test]
    fn test_shapes_stay_roughly_in_unit_range() {
        for shape in ShapeKind::ALL {
            for i in 0..=100 {
                let v = shape.eval(i as f64 / 100.0);
                assert!((-0.2..=1.2).contains(&v), "{:?} at {} gave {}", shape, i, v);
            }
        }
    }

    #[test]
    fn test_seeds_cover_several_shapes() {
        let shapes: std::collections::HashSet<ShapeKind> = (0..200)
            .map(|i| Sparkline::from_key(&format!("{}-row-chart", i), Trend::Up).shape)
            .collect();
        assert!(shapes.len() >= 6);
    }
}
