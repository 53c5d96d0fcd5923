//! A* over positions of a grid, in the style of
//! [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html).
//! Discovered nodes live in a single [IndexMap] which doubles as the arena (parents are indices)
//! and as the map from position to open-set slot. The open set is a [BinaryHeap] of cost holders;
//! relaxing a node pushes a fresh holder and stale ones are skipped when popped.
use crate::node::{NodeState, SearchNode};
use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::Add;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder<K> {
    estimated_cost: K,
    heuristic: K,
    index: usize,
}

impl<K: PartialOrd> Eq for SmallestCostHolder<K> {}

impl<K: PartialOrd> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: PartialOrd> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: PartialOrd> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest element, so every key is reversed: lowest estimated cost
        // first, then lowest heuristic, then the node discovered earliest.
        let by_cost = |a: &K, b: &K| b.partial_cmp(a).unwrap_or(Ordering::Equal);
        by_cost(&self.estimated_cost, &other.estimated_cost)
            .then_with(|| by_cost(&self.heuristic, &other.heuristic))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome<C> {
    /// Path from the start (excluded) to the goal (included) and its cost.
    Found(Vec<Point>, C),
    /// The open set ran empty.
    Exhausted,
    /// The open set grew past its capacity.
    Aborted,
}

/// Frontier state of a single search. [astar](Self::astar) clears it before starting, so no
/// state carries over between calls.
pub struct SearchContext<C> {
    nodes: FxIndexMap<Point, SearchNode<C>>,
    to_see: BinaryHeap<SmallestCostHolder<C>>,
    open_len: usize,
    peak_open: usize,
    expanded: usize,
}

impl<C: PartialOrd> Default for SearchContext<C> {
    fn default() -> Self {
        SearchContext {
            nodes: FxIndexMap::default(),
            to_see: BinaryHeap::new(),
            open_len: 0,
            peak_open: 0,
            expanded: 0,
        }
    }
}

impl<C> SearchContext<C>
where
    C: Zero + Add<Output = C> + PartialOrd + Copy,
{
    pub fn new() -> SearchContext<C> {
        SearchContext::default()
    }

    /// Number of nodes moved to the closed set by the last search.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Largest size the open set reached during the last search.
    pub fn peak_open(&self) -> usize {
        self.peak_open
    }

    /// Number of distinct positions discovered by the last search.
    pub fn discovered(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    fn node(&self, position: &Point) -> Option<&SearchNode<C>> {
        self.nodes.get(position)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.to_see.clear();
        self.open_len = 0;
        self.peak_open = 0;
        self.expanded = 0;
    }

    fn push(&mut self, index: usize, node: &SearchNode<C>) {
        self.to_see.push(SmallestCostHolder {
            estimated_cost: node.f,
            heuristic: node.h,
            index,
        });
    }

    fn reverse_path(&self, index: usize) -> Vec<Point> {
        let mut path: Vec<Point> = std::iter::successors(
            self.nodes.get_index(index).map(|(_, node)| node),
            |node| {
                node.parent
                    .and_then(|parent| self.nodes.get_index(parent))
                    .map(|(_, node)| node)
            },
        )
        .filter(|node| node.parent.is_some())
        .map(|node| node.position)
        .collect();
        path.reverse();
        path
    }

    /// Runs A* from `start` until `success` accepts an expanded node, the open set empties, or
    /// the open set holds more than `max_open_size` nodes.
    pub fn astar<FN, IN, FH, FS>(
        &mut self,
        start: Point,
        max_open_size: usize,
        mut successors: FN,
        mut heuristic: FH,
        mut success: FS,
    ) -> SearchOutcome<C>
    where
        FN: FnMut(&Point) -> IN,
        IN: IntoIterator<Item = (Point, C)>,
        FH: FnMut(&Point) -> C,
        FS: FnMut(&Point) -> bool,
    {
        self.clear();
        let start_node = SearchNode::start(start, heuristic(&start));
        self.push(0, &start_node);
        self.nodes.insert(start, start_node);
        self.open_len = 1;
        self.peak_open = 1;

        loop {
            if self.open_len > max_open_size {
                return SearchOutcome::Aborted;
            }
            let Some(SmallestCostHolder {
                estimated_cost,
                index,
                ..
            }) = self.to_see.pop()
            else {
                return SearchOutcome::Exhausted;
            };
            let (current, cost) = match self.nodes.get_index_mut(index) {
                Some((_, node)) => {
                    // A node may sit in the heap several times if a cheaper way to it was
                    // found; only the entry matching its current cost is live.
                    if node.is_closed() || estimated_cost > node.f {
                        continue;
                    }
                    node.state = NodeState::Closed;
                    (node.position, node.g)
                }
                None => continue,
            };
            self.open_len -= 1;
            self.expanded += 1;

            if success(&current) {
                return SearchOutcome::Found(self.reverse_path(index), cost);
            }

            for (successor, move_cost) in successors(&current) {
                let new_cost = cost + move_cost;
                let (n, node) = match self.nodes.entry(successor) {
                    Vacant(e) => {
                        let node = SearchNode::new(successor, index, new_cost, heuristic(e.key()));
                        let n = e.index();
                        e.insert(node.clone());
                        self.open_len += 1;
                        (n, node)
                    }
                    Occupied(mut e) => {
                        let n = e.index();
                        let existing = e.get_mut();
                        if existing.is_closed() || !(existing.g > new_cost) {
                            continue;
                        }
                        existing.relax(index, new_cost);
                        (n, existing.clone())
                    }
                };
                self.push(n, &node);
            }
            self.peak_open = self.peak_open.max(self.open_len);
        }
    }
}
