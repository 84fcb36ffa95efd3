pub mod a_star;
pub mod common;
pub mod heuristic;
pub mod node;
pub mod real_time_a_star;
pub mod rrt;
pub mod uninformed;

pub use a_star::{AStarAgent, AStarState};
pub use common::{Path, PathfindingAgent};
pub use heuristic::Heuristic;
pub use node::{NodeArena, NodeId, ScoredSearchNode, SearchNode, TieBreak};
pub use real_time_a_star::{RealTimeAStarAgent, RealTimeOutcome};
pub use rrt::RrtAgent;
pub use uninformed::{FrontierOrder, UninformedAgent, UninformedState};
