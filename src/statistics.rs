use crate::grid::Point;
use std::fmt;
use std::ops::AddAssign;
use std::time::Duration;

/// Work done by one traversal call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes taken off the frontier (or, for RRT, sampling attempts made).
    pub expanded: usize,
    /// Nodes added to the frontier or tree.
    pub generated: usize,
    pub elapsed: Duration,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: SearchStats) {
        self.expanded += other.expanded;
        self.generated += other.generated;
        self.elapsed += other.elapsed;
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expanded {}, generated {}, {:.2?}",
            self.expanded, self.generated, self.elapsed
        )
    }
}

#[derive(Debug, Clone)]
pub enum AlgorithmStats {
    /// A single traversal call.
    Search(SearchStats),
    /// A real-time session driven over several calls.
    RealTime { calls: usize, search: SearchStats },
}

impl AlgorithmStats {
    pub fn total_calls(&self) -> usize {
        match self {
            AlgorithmStats::Search(_) => 1,
            AlgorithmStats::RealTime { calls, .. } => *calls,
        }
    }

    pub fn search(&self) -> &SearchStats {
        match self {
            AlgorithmStats::Search(search) => search,
            AlgorithmStats::RealTime { search, .. } => search,
        }
    }
}

impl fmt::Display for AlgorithmStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmStats::Search(search) => write!(f, "{}", search),
            AlgorithmStats::RealTime { calls, search } => {
                write!(f, "{} calls, {}", calls, search)
            }
        }
    }
}

/// Quality of a returned path against the reference optimum.
#[derive(Debug, Clone)]
pub struct Statistics {
    /// Moves along the path (points minus one).
    pub path_moves: usize,
    /// Sum of straight-line segment lengths along the path.
    pub path_distance: f64,
    pub optimal_path_length: usize,
    pub occupied_cells: usize,
    pub route_efficiency: f64,
}

impl Statistics {
    pub fn new(occupied_cells: usize, optimal_path_length: usize) -> Self {
        Statistics {
            path_moves: 0,
            path_distance: 0.0,
            optimal_path_length,
            occupied_cells,
            route_efficiency: 0.0,
        }
    }

    pub fn record_path(&mut self, path: &[Point]) {
        self.path_moves = path.len().saturating_sub(1);
        self.path_distance = path_distance(path);
        self.calculate_efficiency();
    }

    pub fn calculate_efficiency(&mut self) {
        if self.path_moves > 0 && self.optimal_path_length > 0 {
            self.route_efficiency = self.path_moves as f64 / self.optimal_path_length as f64;
        } else {
            self.route_efficiency = 0.0;
        }
    }
}

/// Total straight-line length of a path.
pub fn path_distance(path: &[Point]) -> f64 {
    path.windows(2)
        .map(|w| f64::from(w[0].x - w[1].x).hypot(f64::from(w[0].y - w[1].y)))
        .sum()
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path Moves: {}", self.path_moves)?;
        writeln!(f, "Path Distance: {:.3}", self.path_distance)?;
        writeln!(f, "Optimal Path Length: {}", self.optimal_path_length)?;
        writeln!(f, "Occupied Cells: {}", self.occupied_cells)?;
        writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;

        if self.route_efficiency > 0.0 && self.route_efficiency < 1.0 {
            writeln!(f, "Note: fewer moves than the reference optimum (path skips cells)")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path() {
        let mut stats = Statistics::new(3, 2);
        stats.record_path(&[Point::new(0, 0), Point::new(1, 0), Point::new(1, 1), Point::new(2, 2)]);
        assert_eq!(stats.path_moves, 3);
        assert!((stats.route_efficiency - 1.5).abs() < 1e-10);
        assert!((stats.path_distance - (2.0 + std::f64::consts::SQRT_2)).abs() < 1e-10);
    }

    #[test]
    fn test_efficiency_without_reference() {
        let mut stats = Statistics::new(0, 0);
        stats.record_path(&[Point::new(0, 0), Point::new(1, 0)]);
        assert_eq!(stats.route_efficiency, 0.0);
    }

    #[test]
    fn test_search_stats_accumulate() {
        let mut total = SearchStats::default();
        total += SearchStats {
            expanded: 3,
            generated: 5,
            elapsed: Duration::from_millis(2),
        };
        total += SearchStats {
            expanded: 1,
            generated: 2,
            elapsed: Duration::from_millis(1),
        };
        assert_eq!(total.expanded, 4);
        assert_eq!(total.generated, 7);
        assert_eq!(total.elapsed, Duration::from_millis(3));
        let stats = AlgorithmStats::RealTime {
            calls: 2,
            search: total,
        };
        assert_eq!(stats.total_calls(), 2);
        assert_eq!(stats.search().expanded, 4);
    }
}
