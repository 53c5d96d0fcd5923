use crate::astar::{SearchContext, SearchOutcome};
use crate::cell::CellKind;
use crate::error::{PathError, Result};
use crate::grid::Grid;
use crate::{euclidean_distance, DEFAULT_MAX_OPEN_SIZE};
use grid_util::point::Point;
use log::{debug, info, warn};

/// A route produced by [PathFinder::solve_detailed].
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Positions from the start (excluded) to the target (included).
    pub path: Vec<Point>,
    /// Euclidean length of the path.
    pub cost: f64,
    /// Number of nodes expanded to find it.
    pub expanded: usize,
}

/// Runs A* searches over a [Grid]. Steps and heuristic both use Euclidean distance, so a
/// `heuristic_factor` of 1.0 yields shortest paths.
#[derive(Clone, Debug)]
pub struct PathFinder {
    /// A search is aborted once more than this many nodes are open at the same time.
    pub max_open_size: usize,
    /// Scales the heuristic. Values above 1.0 give Weighted A*: faster, no longer optimal.
    pub heuristic_factor: f64,
    /// Consult the grid's connected components before searching, so that an unreachable
    /// target is reported without exploring the grid.
    pub check_reachability: bool,
}

impl Default for PathFinder {
    fn default() -> PathFinder {
        PathFinder {
            max_open_size: DEFAULT_MAX_OPEN_SIZE,
            heuristic_factor: 1.0,
            check_reachability: true,
        }
    }
}

impl PathFinder {
    pub fn new() -> PathFinder {
        PathFinder::default()
    }

    pub fn with_max_open_size(mut self, max_open_size: usize) -> PathFinder {
        self.max_open_size = max_open_size;
        self
    }

    pub fn with_heuristic_factor(mut self, heuristic_factor: f64) -> PathFinder {
        self.heuristic_factor = heuristic_factor;
        self
    }

    pub fn with_reachability_check(mut self, check_reachability: bool) -> PathFinder {
        self.check_reachability = check_reachability;
        self
    }

    /// Straight-line distance times the heuristic factor.
    pub fn heuristic(&self, p1: &Point, p2: &Point) -> f64 {
        euclidean_distance(p1, p2) * self.heuristic_factor
    }

    /// Computes a route from the grid's start cell to its target cell. The returned positions
    /// exclude the start and end with the target.
    pub fn solve(&self, grid: &Grid) -> Result<Vec<Point>> {
        self.solve_detailed(grid).map(|solution| solution.path)
    }

    /// Like [solve](Self::solve), also reporting the path cost and search effort.
    pub fn solve_detailed(&self, grid: &Grid) -> Result<Solution> {
        grid.validate()?;
        let (start, target) = match (
            grid.find_cell(CellKind::Start),
            grid.find_cell(CellKind::Target),
        ) {
            (Some(start), Some(target)) => (start, target),
            _ => {
                return Err(PathError::InvalidGrid {
                    starts: grid.count(CellKind::Start),
                    targets: grid.count(CellKind::Target),
                })
            }
        };

        if self.check_reachability && grid.unreachable(&start, &target) {
            info!("{} is not reachable from {}", target, start);
            return Err(PathError::NoPathFound { start, target });
        }
        info!("Computing path from {} to {}", start, target);

        let mut ct = SearchContext::new();
        let outcome = ct.astar(
            start,
            self.max_open_size,
            |node| grid.neighborhood_points_and_cost(node),
            |point| self.heuristic(point, &target),
            |point| *point == target,
        );
        debug!(
            "Search finished: {} expanded, {} discovered, open set peaked at {}",
            ct.expanded(),
            ct.discovered(),
            ct.peak_open()
        );

        match outcome {
            SearchOutcome::Found(path, cost) => Ok(Solution {
                path,
                cost,
                expanded: ct.expanded(),
            }),
            SearchOutcome::Exhausted => {
                if self.check_reachability {
                    warn!("Reachable target could not be pathed to, are the components correct?");
                }
                Err(PathError::NoPathFound { start, target })
            }
            SearchOutcome::Aborted => {
                warn!(
                    "Open set exceeded {} nodes, aborting search from {} to {}",
                    self.max_open_size, start, target
                );
                Err(PathError::SearchAborted {
                    max_open_size: self.max_open_size,
                    expanded: ct.expanded(),
                })
            }
        }
    }
}
