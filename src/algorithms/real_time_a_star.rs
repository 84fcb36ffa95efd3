use crate::algorithms::a_star::{expand, AStarState, Expansion};
use crate::algorithms::common::{check_endpoints, Path, PathfindingAgent};
use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::node::TieBreak;
use crate::error::Result;
use crate::grid::{GridEnvironment, Point};
use crate::statistics::SearchStats;
use std::time::{Duration, Instant};

pub const DEFAULT_PLANNING_TIME: Duration = Duration::from_millis(1000);
pub const MIN_PLANNING_TIME: Duration = Duration::from_millis(500);

/// Result of one real-time planning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealTimeOutcome {
    /// The goal was reached; the path runs from the session's first start.
    Complete(Path),
    /// The call ran out of time. The path runs from the session's first start
    /// to the committed frontier head, which is now the agent's start.
    Partial(Path),
    /// The frontier emptied without reaching the goal.
    Exhausted,
}

impl RealTimeOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RealTimeOutcome::Complete(path) | RealTimeOutcome::Partial(path) => Some(path),
            RealTimeOutcome::Exhausted => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            RealTimeOutcome::Complete(path) | RealTimeOutcome::Partial(path) => Some(path),
            RealTimeOutcome::Exhausted => None,
        }
    }
}

/// Time-bounded A* that keeps its frontier and closed set between calls.
///
/// Each call expands until the goal is reached or the planning time runs
/// out. On timeout the agent commits to the current frontier head, moves its
/// start there and hands back the partial path; the next call resumes the
/// same search. The session is discarded once the goal has been found or the
/// search space is exhausted. The grid must not change during a session.
#[derive(Debug)]
pub struct RealTimeAStarAgent {
    start: Point,
    goal: Point,
    heuristic: Heuristic,
    tie_break: TieBreak,
    planning_time: Duration,
    expansion_budget: Option<usize>,
    state: AStarState,
    path_found: bool,
    exhausted: bool,
    stats: SearchStats,
}

impl RealTimeAStarAgent {
    pub fn new(start: Point, goal: Point, heuristic: Heuristic, planning_time: Duration) -> Self {
        let mut agent = RealTimeAStarAgent {
            start,
            goal,
            heuristic,
            tie_break: TieBreak::default(),
            planning_time: DEFAULT_PLANNING_TIME,
            expansion_budget: None,
            state: AStarState::new(),
            path_found: false,
            exhausted: false,
            stats: SearchStats::default(),
        };
        agent.set_planning_time(planning_time);
        agent
    }

    /// Uses the grid's start and goal.
    pub fn from_grid(grid: &GridEnvironment, heuristic: Heuristic, planning_time: Duration) -> Self {
        Self::new(grid.start(), grid.goal(), heuristic, planning_time)
    }

    /// Caps the number of expansions per call in addition to the deadline.
    /// A budget of zero is raised to one.
    pub fn with_expansion_budget(mut self, budget: usize) -> Self {
        self.expansion_budget = Some(budget.max(1));
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn set_heuristic(&mut self, heuristic: Heuristic) {
        self.heuristic = heuristic;
    }

    pub fn planning_time(&self) -> Duration {
        self.planning_time
    }

    /// Planning times below `MIN_PLANNING_TIME` are replaced by
    /// `DEFAULT_PLANNING_TIME`.
    pub fn set_planning_time(&mut self, planning_time: Duration) {
        if planning_time < MIN_PLANNING_TIME {
            log::warn!(
                "planning time {:?} below minimum {:?}, using {:?}",
                planning_time,
                MIN_PLANNING_TIME,
                DEFAULT_PLANNING_TIME
            );
            self.planning_time = DEFAULT_PLANNING_TIME;
        } else {
            self.planning_time = planning_time;
        }
    }

    pub fn expansion_budget(&self) -> Option<usize> {
        self.expansion_budget
    }

    pub fn is_path_found(&self) -> bool {
        self.path_found
    }

    /// Whether a search session is in progress.
    pub fn in_session(&self) -> bool {
        !self.state.is_empty() && !self.path_found && !self.exhausted
    }

    /// Drops the current session; the next call starts a fresh search from the
    /// current start.
    pub fn reset(&mut self) {
        self.state.clear();
        self.path_found = false;
        self.exhausted = false;
    }

    /// Runs one time-bounded planning step.
    pub fn plan_step(&mut self, grid: &GridEnvironment) -> Result<RealTimeOutcome> {
        check_endpoints(grid, self.start, self.goal)?;
        if self.path_found || self.exhausted {
            self.reset();
        }
        if self.state.is_empty() {
            let h = self.heuristic.distance(self.start, self.goal);
            self.state.push_root(self.start, h, self.tie_break);
        }

        let timer = Instant::now();
        let deadline = timer + self.planning_time;
        let budget = self.expansion_budget;
        let mut pops = 0usize;
        let mut stats = SearchStats::default();

        let expansion = expand(
            grid,
            self.goal,
            self.heuristic,
            self.tie_break,
            &mut self.state,
            &mut stats,
            || {
                let stop = Instant::now() > deadline || budget.is_some_and(|b| pops >= b);
                pops += 1;
                stop
            },
        );

        let outcome = match expansion {
            Expansion::Goal(id) => {
                self.path_found = true;
                RealTimeOutcome::Complete(self.state.arena().reconstruct_path(id))
            }
            Expansion::Exhausted => {
                self.exhausted = true;
                RealTimeOutcome::Exhausted
            }
            Expansion::Interrupted => match self.state.head() {
                Some(head) => {
                    let path = self.state.arena().reconstruct_path(head.id);
                    self.start = self.state.arena().position(head.id);
                    log::trace!("committed to {} (f = {:.3})", self.start, head.f);
                    RealTimeOutcome::Partial(path)
                }
                // out of time with nothing left to expand
                None => {
                    self.exhausted = true;
                    RealTimeOutcome::Exhausted
                }
            },
        };

        stats.elapsed = timer.elapsed();
        self.stats = stats;
        log::debug!(
            "real-time a* step toward {}: {} ({})",
            self.goal,
            match &outcome {
                RealTimeOutcome::Complete(_) => "complete",
                RealTimeOutcome::Partial(_) => "partial",
                RealTimeOutcome::Exhausted => "exhausted",
            },
            stats
        );
        Ok(outcome)
    }
}

impl PathfindingAgent for RealTimeAStarAgent {
    fn name(&self) -> &'static str {
        "real_time_a_star"
    }

    /// Partial and complete plans both come back as `Some`; check
    /// `is_path_found` to tell them apart.
    fn traverse(&mut self, grid: &GridEnvironment) -> Result<Option<Path>> {
        Ok(self.plan_step(grid)?.into_path())
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}
