use crate::grid::Point;
use std::cmp::Ordering;

/// Index of a node inside a `NodeArena`.
pub type NodeId = usize;

/// A position plus a link to the node it was reached from. The root has no
/// parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    pub position: Point,
    pub parent: Option<NodeId>,
}

/// Append-only storage for search nodes.
///
/// A parent is always inserted before its children, so every parent id is
/// smaller than the id of the node that points at it and walking parent links
/// always terminates at a root.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn insert_root(&mut self, position: Point) -> NodeId {
        self.nodes.push(SearchNode {
            position,
            parent: None,
        });
        self.nodes.len() - 1
    }

    pub fn insert(&mut self, position: Point, parent: NodeId) -> NodeId {
        debug_assert!(parent < self.nodes.len(), "parent {} not in arena", parent);
        self.nodes.push(SearchNode {
            position,
            parent: Some(parent),
        });
        self.nodes.len() - 1
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    pub fn position(&self, id: NodeId) -> Point {
        self.nodes[id].position
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> {
        self.nodes.iter().enumerate()
    }

    /// Positions from the root of `id`'s branch down to `id` itself.
    pub fn reconstruct_path(&self, id: NodeId) -> Vec<Point> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(index) = current {
            let node = &self.nodes[index];
            path.push(node.position);
            current = node.parent;
        }
        path.reverse();
        path
    }
}

/// How the priority frontier orders entries whose f-scores are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The entry pushed earliest is extracted first.
    #[default]
    FirstInserted,
    /// The entry pushed most recently is extracted first.
    LastInserted,
}

/// Frontier entry for A* style searches: an arena node with its cost so far
/// (`g`, in unit steps) and its estimated total cost (`f = g + h`).
///
/// Ordering is reversed on `f` so that `BinaryHeap` pops the lowest score.
/// Equal scores fall back to the insertion rank chosen by the `TieBreak`.
#[derive(Debug, Clone, Copy)]
pub struct ScoredSearchNode {
    pub id: NodeId,
    pub g: u32,
    pub f: f64,
    rank: i64,
}

impl ScoredSearchNode {
    pub fn new(id: NodeId, g: u32, f: f64, sequence: u64, tie_break: TieBreak) -> Self {
        let rank = match tie_break {
            TieBreak::FirstInserted => -(sequence as i64),
            TieBreak::LastInserted => sequence as i64,
        };
        ScoredSearchNode { id, g, f, rank }
    }
}

impl PartialEq for ScoredSearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredSearchNode {}

impl PartialOrd for ScoredSearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredSearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.rank.cmp(&other.rank))
    }
}
