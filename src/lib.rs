//! # cordon
//!
//! Shortest paths on a grid of empty, obstacle, start and target cells using
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm). Movement is either restricted to the
//! four cardinal directions or extended with diagonals; step costs and the heuristic are both the
//! straight-line (Euclidean) distance, so the paths found are optimal. A
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory)) structure is
//! maintained on the grid to avoid flood-filling behaviour if no path exists.
//!
//! ```
//! use cordon::{Grid, PathFinder};
//! use grid_util::point::Point;
//!
//! let grid: Grid = "
//!     S..
//!     .#.
//!     ..G
//! "
//! .parse()
//! .unwrap();
//! let path = PathFinder::new().solve(&grid).unwrap();
//! assert_eq!(path.last(), Some(&Point::new(2, 2)));
//! ```
pub mod astar;
pub mod cell;
pub mod error;
pub mod finder;
pub mod grid;
pub mod node;

pub use crate::cell::CellKind;
pub use crate::error::{ArgumentError, PathError, Result};
pub use crate::finder::{PathFinder, Solution};
pub use crate::grid::Grid;
pub use crate::node::{NodeState, SearchNode};

use grid_util::point::Point;

/// Default bound on the number of simultaneously open nodes before a search is aborted.
pub const DEFAULT_MAX_OPEN_SIZE: usize = 10_000;
/// Inline capacity for neighbourhood lists, enough for a full 8-neighbourhood.
pub const N_SMALLVEC_SIZE: usize = 8;

/// Straight-line distance between two points.
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    let dx = (p1.x - p2.x) as f64;
    let dy = (p1.y - p2.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean length of a path as returned by [PathFinder::solve], which leaves out `start`.
pub fn path_cost(start: Point, path: &[Point]) -> f64 {
    std::iter::once(&start)
        .chain(path)
        .zip(path)
        .map(|(a, b)| euclidean_distance(a, b))
        .sum()
}
