use crate::error::{PlanningError, Result};
use rand::Rng;
use std::fmt;

/// Occupancy used when a requested fraction falls outside `[0, MAX_OCCUPANCY]`.
pub const DEFAULT_OCCUPANCY: f64 = 0.2;
/// Upper bound on the fraction of the grid covered by obstacle anchors.
pub const MAX_OCCUPANCY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// True when `other` is one of the eight cells surrounding `self`.
    pub fn is_adjacent(&self, other: &Point) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Empty,
    Occupied,
    /// Traversable, but obstacle placement never overwrites it.
    Protected,
    /// Presentation marker written by `mark_path`.
    Path,
}

impl CellState {
    pub fn is_traversable(self) -> bool {
        self != CellState::Occupied
    }

    fn symbol(self) -> char {
        match self {
            CellState::Occupied => 'O',
            CellState::Path => 'P',
            CellState::Empty | CellState::Protected => '-',
        }
    }
}

/// A rectangular occupancy grid with a designated start and goal.
///
/// Cells are stored column-major (`cells[x][y]`). The grid is only mutated by
/// obstacle placement and clearing; agents borrow it immutably while searching.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    width: usize,
    height: usize,
    cells: Vec<Vec<CellState>>,
    start: Point,
    goal: Point,
    obstacle_width: usize,
    obstacle_height: usize,
    occupancy: f64,
}

impl GridEnvironment {
    /// Creates an empty grid. The start defaults to the top-left cell and the
    /// goal to the bottom-right cell.
    pub fn new(
        width: usize,
        height: usize,
        obstacle_width: usize,
        obstacle_height: usize,
        occupancy: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PlanningError::InvalidDimensions { width, height });
        }
        let mut grid = GridEnvironment {
            width,
            height,
            cells: vec![vec![CellState::Empty; height]; width],
            start: Point::new(0, 0),
            goal: Point::new(width as i32 - 1, height as i32 - 1),
            obstacle_width,
            obstacle_height,
            occupancy: DEFAULT_OCCUPANCY,
        };
        grid.set_occupancy(occupancy);
        Ok(grid)
    }

    /// Builder form of `set_start` followed by `set_goal`.
    pub fn with_endpoints(mut self, start: Point, goal: Point) -> Result<Self> {
        self.set_start(start)?;
        self.set_goal(goal)?;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn set_start(&mut self, start: Point) -> Result<()> {
        self.check_bounds(start.x, start.y)?;
        self.start = start;
        Ok(())
    }

    pub fn set_goal(&mut self, goal: Point) -> Result<()> {
        self.check_bounds(goal.x, goal.y)?;
        self.goal = goal;
        Ok(())
    }

    pub fn obstacle_width(&self) -> usize {
        self.obstacle_width
    }

    pub fn set_obstacle_width(&mut self, width: usize) {
        self.obstacle_width = width;
    }

    pub fn obstacle_height(&self) -> usize {
        self.obstacle_height
    }

    pub fn set_obstacle_height(&mut self, height: usize) {
        self.obstacle_height = height;
    }

    pub fn occupancy(&self) -> f64 {
        self.occupancy
    }

    /// Sets the obstacle fraction. Values outside `[0, MAX_OCCUPANCY]` (and NaN)
    /// are replaced by `DEFAULT_OCCUPANCY`.
    pub fn set_occupancy(&mut self, occupancy: f64) {
        if (0.0..=MAX_OCCUPANCY).contains(&occupancy) {
            self.occupancy = occupancy;
        } else {
            log::warn!(
                "occupancy {} outside [0, {}], using {}",
                occupancy,
                MAX_OCCUPANCY,
                DEFAULT_OCCUPANCY
            );
            self.occupancy = DEFAULT_OCCUPANCY;
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        self.in_bounds(point.x, point.y)
    }

    fn check_bounds(&self, x: i32, y: i32) -> Result<()> {
        if self.in_bounds(x, y) {
            Ok(())
        } else {
            Err(PlanningError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn state(&self, x: i32, y: i32) -> Result<CellState> {
        self.check_bounds(x, y)?;
        Ok(self.cells[x as usize][y as usize])
    }

    pub fn set_state(&mut self, x: i32, y: i32, state: CellState) -> Result<()> {
        self.check_bounds(x, y)?;
        self.cells[x as usize][y as usize] = state;
        Ok(())
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool> {
        Ok(self.state(x, y)? == CellState::Occupied)
    }

    /// In bounds and not occupied.
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.cells[x as usize][y as usize].is_traversable()
    }

    pub fn is_goal(&self, point: Point) -> bool {
        point == self.goal
    }

    // Cells beyond the border count as occupied for visibility checks.
    fn blocked(&self, x: i32, y: i32) -> bool {
        !self.is_valid(x, y)
    }

    /// The up-to-eight traversable cells around `(x, y)`, row by row from the
    /// top-left. The origin cell is never included.
    pub fn neighbors(&self, x: i32, y: i32) -> Vec<Point> {
        let mut neighbors = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.is_valid(x + dx, y + dy) {
                    neighbors.push(Point::new(x + dx, y + dy));
                }
            }
        }
        neighbors
    }

    /// Whether the segment between two grid vertices crosses no occupied cell.
    ///
    /// Coordinates are treated as cell corners: cell `(x, y)` spans the square
    /// from vertex `(x, y)` to `(x + 1, y + 1)`. The walk steps along the
    /// dominant axis with an integer error term and checks the cell on the
    /// side given by the step sign. A segment running exactly along a grid
    /// line is only blocked when the cells on both sides are occupied.
    /// Endpoints outside the grid are never visible.
    pub fn line_of_sight(&self, from: Point, to: Point) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }

        let (mut x, mut y) = (from.x, from.y);
        let mut dx = to.x - from.x;
        let mut dy = to.y - from.y;
        let sy = if dy < 0 {
            dy = -dy;
            -1
        } else {
            1
        };
        let sx = if dx < 0 {
            dx = -dx;
            -1
        } else {
            1
        };
        // 0 when stepping forward, -1 when stepping backward
        let ox = (sx - 1) / 2;
        let oy = (sy - 1) / 2;
        let mut f = 0;

        if dx >= dy {
            while x != to.x {
                f += dy;
                if f >= dx {
                    if self.blocked(x + ox, y + oy) {
                        return false;
                    }
                    y += sy;
                    f -= dx;
                }
                if f != 0 && self.blocked(x + ox, y + oy) {
                    return false;
                }
                if dy == 0 && self.blocked(x + ox, y) && self.blocked(x + ox, y - 1) {
                    return false;
                }
                x += sx;
            }
        } else {
            while y != to.y {
                f += dx;
                if f >= dy {
                    if self.blocked(x + ox, y + oy) {
                        return false;
                    }
                    x += sx;
                    f -= dy;
                }
                if f != 0 && self.blocked(x + ox, y + oy) {
                    return false;
                }
                if dx == 0 && self.blocked(x, y + oy) && self.blocked(x - 1, y + oy) {
                    return false;
                }
                y += sy;
            }
        }
        true
    }

    /// Occupies the `width x height` rectangle anchored at `(x, y)`, clipped to
    /// the grid. Protected cells are left untouched. Returns how many cells
    /// became occupied.
    pub fn place_obstacle(&mut self, x: i32, y: i32, width: usize, height: usize) -> Result<usize> {
        self.check_bounds(x, y)?;
        let mut placed = 0;
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                let (cx, cy) = (x + dx, y + dy);
                if !self.in_bounds(cx, cy) {
                    continue;
                }
                let cell = &mut self.cells[cx as usize][cy as usize];
                if *cell != CellState::Protected && *cell != CellState::Occupied {
                    *cell = CellState::Occupied;
                    placed += 1;
                }
            }
        }
        Ok(placed)
    }

    /// Marks the 3x3 neighbourhood around `(x, y)` as protected so later
    /// obstacle placement cannot seal the cell in.
    pub fn protect(&mut self, x: i32, y: i32) -> Result<()> {
        self.check_bounds(x, y)?;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.in_bounds(x + dx, y + dy) {
                    self.cells[(x + dx) as usize][(y + dy) as usize] = CellState::Protected;
                }
            }
        }
        Ok(())
    }

    /// Scatters `floor(occupancy * width * height)` random rectangles over the
    /// grid, each at most `obstacle_width x obstacle_height`. Returns how many
    /// cells became occupied.
    pub fn create_obstacles<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.obstacle_width == 0 || self.obstacle_height == 0 {
            return 0;
        }
        let count = (self.occupancy * (self.width * self.height) as f64) as usize;
        let mut placed = 0;
        for _ in 0..count {
            let anchor = self.random_point(rng);
            let w = rng.gen_range(1..=self.obstacle_width);
            let h = rng.gen_range(1..=self.obstacle_height);
            // the anchor is sampled in bounds
            placed += self.place_obstacle(anchor.x, anchor.y, w, h).unwrap_or(0);
        }
        log::debug!("placed {} obstacles covering {} cells", count, placed);
        placed
    }

    /// Resets every cell to `Empty`.
    pub fn clear(&mut self) {
        for column in &mut self.cells {
            column.fill(CellState::Empty);
        }
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.gen_range(0..self.width) as i32,
            rng.gen_range(0..self.height) as i32,
        )
    }

    /// Writes the `Path` marker onto every non-occupied cell of `path`.
    pub fn mark_path(&mut self, path: &[Point]) -> Result<()> {
        for p in path {
            if !self.is_occupied(p.x, p.y)? {
                self.cells[p.x as usize][p.y as usize] = CellState::Path;
            }
        }
        Ok(())
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == CellState::Occupied)
            .count()
    }
}

impl fmt::Display for GridEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            write!(f, "|")?;
            for x in 0..self.width {
                write!(f, "{}|", self.cells[x][y].symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty(width: usize, height: usize) -> GridEnvironment {
        GridEnvironment::new(width, height, 0, 0, 0.0).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            GridEnvironment::new(0, 4, 1, 1, 0.1).unwrap_err(),
            PlanningError::InvalidDimensions { width: 0, height: 4 }
        );
    }

    #[test]
    fn test_default_endpoints() {
        let grid = empty(4, 3);
        assert_eq!(grid.start(), Point::new(0, 0));
        assert_eq!(grid.goal(), Point::new(3, 2));
    }

    #[test]
    fn test_set_start_out_of_bounds() {
        let mut grid = empty(4, 3);
        assert!(matches!(
            grid.set_start(Point::new(4, 0)),
            Err(PlanningError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert_eq!(grid.start(), Point::new(0, 0));
    }

    #[test]
    fn test_occupancy_normalised() {
        let mut grid = empty(3, 3);
        grid.set_occupancy(0.4);
        assert_eq!(grid.occupancy(), 0.4);
        grid.set_occupancy(0.75);
        assert_eq!(grid.occupancy(), DEFAULT_OCCUPANCY);
        grid.set_occupancy(-0.1);
        assert_eq!(grid.occupancy(), DEFAULT_OCCUPANCY);
        grid.set_occupancy(f64::NAN);
        assert_eq!(grid.occupancy(), DEFAULT_OCCUPANCY);
    }

    #[test]
    fn test_state_out_of_bounds() {
        let grid = empty(3, 3);
        assert_eq!(grid.state(2, 2).unwrap(), CellState::Empty);
        assert!(grid.state(3, 0).is_err());
        assert!(grid.state(0, -1).is_err());
    }

    #[test]
    fn test_is_valid() {
        let mut grid = empty(3, 3);
        grid.set_state(1, 1, CellState::Occupied).unwrap();
        grid.set_state(2, 2, CellState::Protected).unwrap();
        assert!(!grid.is_valid(1, 1));
        assert!(grid.is_valid(2, 2));
        assert!(!grid.is_valid(-1, 0));
        assert!(!grid.is_valid(0, 3));
    }

    #[test]
    fn test_neighbors_center_and_corner() {
        let grid = empty(3, 3);
        let center = grid.neighbors(1, 1);
        assert_eq!(center.len(), 8);
        assert!(!center.contains(&Point::new(1, 1)));

        let corner = grid.neighbors(0, 0);
        assert_eq!(
            corner,
            vec![Point::new(1, 0), Point::new(0, 1), Point::new(1, 1)]
        );
    }

    #[test]
    fn test_neighbors_skip_occupied() {
        let mut grid = empty(3, 3);
        grid.set_state(1, 0, CellState::Occupied).unwrap();
        grid.set_state(1, 1, CellState::Path).unwrap();
        let neighbors = grid.neighbors(0, 0);
        assert_eq!(neighbors, vec![Point::new(0, 1), Point::new(1, 1)]);
    }

    #[test]
    fn test_line_of_sight_same_point() {
        let grid = empty(4, 4);
        for x in 0..4 {
            for y in 0..4 {
                let p = Point::new(x, y);
                assert!(grid.line_of_sight(p, p));
            }
        }
    }

    #[test]
    fn test_line_of_sight_out_of_bounds_endpoint() {
        let grid = empty(4, 4);
        assert!(!grid.line_of_sight(Point::new(0, 0), Point::new(4, 0)));
        assert!(!grid.line_of_sight(Point::new(-1, 2), Point::new(1, 1)));
    }

    #[test]
    fn test_line_of_sight_diagonal_blocked() {
        let mut grid = empty(3, 3);
        grid.set_state(1, 1, CellState::Occupied).unwrap();
        assert!(!grid.line_of_sight(Point::new(0, 0), Point::new(2, 2)));
        assert!(!grid.line_of_sight(Point::new(2, 2), Point::new(0, 0)));
        assert!(grid.line_of_sight(Point::new(0, 0), Point::new(2, 0)));
    }

    #[test]
    fn test_line_of_sight_wall() {
        let mut grid = empty(5, 5);
        grid.place_obstacle(2, 0, 1, 5).unwrap();
        assert!(!grid.line_of_sight(Point::new(0, 0), Point::new(4, 4)));
        assert!(!grid.line_of_sight(Point::new(0, 2), Point::new(4, 2)));
        assert!(!grid.line_of_sight(Point::new(4, 1), Point::new(0, 3)));
        assert!(grid.line_of_sight(Point::new(0, 0), Point::new(0, 4)));
    }

    #[test]
    fn test_line_of_sight_grid_line_needs_both_sides_blocked() {
        let mut grid = empty(5, 5);
        grid.set_state(1, 1, CellState::Occupied).unwrap();
        // runs between rows 1 and 2, only row 1 is blocked
        assert!(grid.line_of_sight(Point::new(0, 2), Point::new(4, 2)));
        grid.set_state(1, 2, CellState::Occupied).unwrap();
        assert!(!grid.line_of_sight(Point::new(0, 2), Point::new(4, 2)));
    }

    #[test]
    fn test_line_of_sight_symmetric() {
        let mut grid = empty(6, 6);
        grid.place_obstacle(2, 1, 2, 2).unwrap();
        grid.set_state(4, 4, CellState::Occupied).unwrap();
        grid.set_state(0, 5, CellState::Occupied).unwrap();
        for x1 in 0..6 {
            for y1 in 0..6 {
                for x2 in 0..6 {
                    for y2 in 0..6 {
                        let a = Point::new(x1, y1);
                        let b = Point::new(x2, y2);
                        assert_eq!(
                            grid.line_of_sight(a, b),
                            grid.line_of_sight(b, a),
                            "asymmetric visibility between {} and {}",
                            a,
                            b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_place_obstacle_clips_and_skips_protected() {
        let mut grid = empty(4, 4);
        grid.set_state(3, 3, CellState::Protected).unwrap();
        let placed = grid.place_obstacle(2, 2, 5, 5).unwrap();
        assert_eq!(placed, 3);
        assert_eq!(grid.state(3, 3).unwrap(), CellState::Protected);
        assert_eq!(grid.state(2, 2).unwrap(), CellState::Occupied);
        assert!(grid.place_obstacle(4, 0, 1, 1).is_err());
    }

    #[test]
    fn test_protect_corner() {
        let mut grid = empty(4, 4);
        grid.protect(0, 0).unwrap();
        assert_eq!(grid.state(0, 0).unwrap(), CellState::Protected);
        assert_eq!(grid.state(1, 1).unwrap(), CellState::Protected);
        assert_eq!(grid.state(2, 2).unwrap(), CellState::Empty);
        assert!(grid.protect(-1, 0).is_err());
    }

    #[test]
    fn test_create_obstacles_respects_protection() {
        let mut grid = GridEnvironment::new(20, 20, 4, 4, 0.5).unwrap();
        grid.protect(0, 0).unwrap();
        grid.protect(19, 19).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let placed = grid.create_obstacles(&mut rng);
        assert!(placed > 0);
        assert_eq!(placed, grid.occupied_count());
        assert!(grid.is_valid(0, 0));
        assert!(grid.is_valid(1, 1));
        assert!(grid.is_valid(19, 19));
        assert!(grid.is_valid(18, 18));
    }

    #[test]
    fn test_create_obstacles_without_size_places_nothing() {
        let mut grid = GridEnvironment::new(10, 10, 0, 3, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(grid.create_obstacles(&mut rng), 0);
    }

    #[test]
    fn test_obstacle_size_setters_enable_generation() {
        let mut grid = GridEnvironment::new(10, 10, 0, 3, 0.5).unwrap();
        assert_eq!(grid.obstacle_width(), 0);
        assert_eq!(grid.obstacle_height(), 3);

        grid.set_obstacle_width(2);
        grid.set_obstacle_height(1);
        assert_eq!(grid.obstacle_width(), 2);
        assert_eq!(grid.obstacle_height(), 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(grid.create_obstacles(&mut rng) > 0);
    }

    #[test]
    fn test_clear() {
        let mut grid = empty(3, 3);
        grid.place_obstacle(0, 0, 3, 3).unwrap();
        assert_eq!(grid.occupied_count(), 9);
        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_random_point_in_bounds() {
        let grid = empty(7, 3);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(grid.contains(grid.random_point(&mut rng)));
        }
    }

    #[test]
    fn test_display_and_mark_path() {
        let mut grid = empty(3, 2);
        grid.set_state(1, 0, CellState::Occupied).unwrap();
        grid.set_state(2, 1, CellState::Protected).unwrap();
        grid.mark_path(&[Point::new(0, 0), Point::new(1, 0), Point::new(0, 1)])
            .unwrap();
        assert_eq!(grid.to_string(), "|P|O|-|\n|P|-|-|\n");
    }

    #[test]
    fn test_point_adjacency() {
        let p = Point::new(2, 2);
        assert!(p.is_adjacent(&Point::new(3, 3)));
        assert!(p.is_adjacent(&Point::new(2, 1)));
        assert!(!p.is_adjacent(&p));
        assert!(!p.is_adjacent(&Point::new(4, 2)));
    }
}
