use grid_util::point::Point;
use num_traits::Zero;
use std::ops::Add;

/// Which side of the frontier a [SearchNode] is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Open,
    Closed,
}

/// A record allocated for every position discovered during one search. Parents are referred to
/// by their index in the search arena rather than by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchNode<C = f64> {
    pub position: Point,
    pub parent: Option<usize>,
    /// Cost of the best known path from the start.
    pub g: C,
    /// Estimated cost to the target.
    pub h: C,
    pub f: C,
    pub state: NodeState,
}

impl<C> SearchNode<C>
where
    C: Zero + Add<Output = C> + Copy,
{
    pub fn start(position: Point, h: C) -> SearchNode<C> {
        SearchNode {
            position,
            parent: None,
            g: Zero::zero(),
            h,
            f: h,
            state: NodeState::Open,
        }
    }

    pub fn new(position: Point, parent: usize, g: C, h: C) -> SearchNode<C> {
        SearchNode {
            position,
            parent: Some(parent),
            g,
            h,
            f: g + h,
            state: NodeState::Open,
        }
    }

    /// Records a cheaper way of reaching this node.
    pub fn relax(&mut self, parent: usize, g: C) {
        self.parent = Some(parent);
        self.g = g;
        self.f = g + self.h;
    }

    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }
}
