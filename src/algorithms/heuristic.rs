use crate::grid::Point;
use clap::ValueEnum;
use std::f64::consts::SQRT_2;
use std::fmt;

/// Distance estimates to the goal used by the informed agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Heuristic {
    /// Straight-line distance.
    Euclidean,
    /// `|dx| + |dy|`.
    Manhattan,
    /// `|dx| + |dy| + (sqrt(2) - 2) * min(|dx|, |dy|)`.
    #[default]
    Octile,
    /// `max(|dx|, |dy|)`, the exact step count on an open 8-connected grid.
    Chebyshev,
}

impl Heuristic {
    pub fn distance(self, from: Point, to: Point) -> f64 {
        match self {
            Heuristic::Euclidean => euclidean_distance(from, to),
            Heuristic::Manhattan => manhattan_distance(from, to),
            Heuristic::Octile => octile_distance(from, to),
            Heuristic::Chebyshev => chebyshev_distance(from, to),
        }
    }

    /// Whether the estimate never exceeds the true remaining cost when every
    /// move, diagonal or not, costs one step.
    pub fn is_admissible(self) -> bool {
        matches!(self, Heuristic::Chebyshev)
    }

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Euclidean => "euclidean",
            Heuristic::Manhattan => "manhattan",
            Heuristic::Octile => "octile",
            Heuristic::Chebyshev => "chebyshev",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn deltas(from: Point, to: Point) -> (f64, f64) {
    (
        f64::from((from.x - to.x).abs()),
        f64::from((from.y - to.y).abs()),
    )
}

pub fn euclidean_distance(from: Point, to: Point) -> f64 {
    let (dx, dy) = deltas(from, to);
    dx.hypot(dy)
}

pub fn manhattan_distance(from: Point, to: Point) -> f64 {
    let (dx, dy) = deltas(from, to);
    dx + dy
}

pub fn octile_distance(from: Point, to: Point) -> f64 {
    let (dx, dy) = deltas(from, to);
    dx + dy + (SQRT_2 - 2.0) * dx.min(dy)
}

pub fn chebyshev_distance(from: Point, to: Point) -> f64 {
    let (dx, dy) = deltas(from, to);
    dx.max(dy)
}
