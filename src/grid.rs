use crate::cell::CellKind;
use crate::error::{ArgumentError, PathError, Result};
use crate::{euclidean_distance, N_SMALLVEC_SIZE};
use core::fmt;
use grid_util::point::Point;
use itertools::{iproduct, Itertools};
use log::info;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use std::str::FromStr;

/// Offsets expanded on every grid.
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
/// Offsets expanded additionally when diagonal movement is enabled.
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// A rectangular table of [CellKind] values. Besides the raw cells it maintains a [UnionFind]
/// over cells that are connected through passable neighbours, which lets a search report an
/// unreachable target without flood-filling the grid.
///
/// Cells are stored column by column, so index order matches the scan order of
/// [find_cell](Self::find_cell): x ascending, then y ascending.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    allow_diagonal_move: bool,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl Grid {
    /// Creates a `width` x `height` grid of empty cells, marking `start` and `target` if given.
    pub fn new(
        width: usize,
        height: usize,
        start: Option<Point>,
        target: Option<Point>,
        allow_diagonal_move: bool,
    ) -> Result<Grid> {
        // Coordinates are i32, so both sides must fit one.
        let n_cells = width
            .checked_mul(height)
            .filter(|&n| n > 0 && i32::try_from(width).is_ok() && i32::try_from(height).is_ok())
            .ok_or(ArgumentError::InvalidDimensions { width, height })?;
        let mut grid = Grid {
            width,
            height,
            cells: vec![CellKind::Empty; n_cells],
            allow_diagonal_move,
            components: UnionFind::new(n_cells),
            components_dirty: false,
        };
        grid.generate_components();
        if let Some(start) = start {
            grid.set_cell(start.x, start.y, CellKind::Start)?;
        }
        if let Some(target) = target {
            grid.set_cell(target.x, target.y, CellKind::Target)?;
        }
        Ok(grid)
    }

    /// An empty grid with diagonal movement enabled.
    pub fn empty(width: usize, height: usize) -> Result<Grid> {
        Grid::new(width, height, None, None, true)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn allow_diagonal_move(&self) -> bool {
        self.allow_diagonal_move
    }

    /// Switches between 4- and 8-neighbourhoods. Changing the neighbourhood changes which cells
    /// are connected, so the components are flagged as dirty.
    pub fn set_allow_diagonal(&mut self, allow: bool) {
        if self.allow_diagonal_move != allow {
            self.allow_diagonal_move = allow;
            self.components_dirty = true;
        }
    }

    pub fn point_in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.width
            && (point.y as usize) < self.height
    }

    fn compute_ix(&self, x: i32, y: i32) -> usize {
        x as usize * self.height + y as usize
    }

    fn get_ix_point(&self, point: &Point) -> usize {
        self.compute_ix(point.x, point.y)
    }

    fn checked_ix(&self, x: i32, y: i32) -> std::result::Result<usize, ArgumentError> {
        if self.point_in_bounds(Point::new(x, y)) {
            Ok(self.compute_ix(x, y))
        } else {
            Err(ArgumentError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The kind of the cell at `(x, y)`, or [None] outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<CellKind> {
        self.get_point(Point::new(x, y))
    }

    pub fn get_point(&self, point: Point) -> Option<CellKind> {
        if self.point_in_bounds(point) {
            Some(self.cells[self.get_ix_point(&point)])
        } else {
            None
        }
    }

    /// Overwrites the cell at `(x, y)`. The one start / one target rule is not enforced here,
    /// see [is_valid](Self::is_valid).
    ///
    /// Joins newly connected components when an obstacle is cleared and flags the components
    /// as dirty when one is placed, since that may break a component apart.
    pub fn set_cell(&mut self, x: i32, y: i32, kind: CellKind) -> Result<()> {
        let ix = self.checked_ix(x, y)?;
        let was_passable = self.cells[ix].passable();
        self.cells[ix] = kind;
        if was_passable && !kind.passable() {
            self.components_dirty = true;
        } else if !was_passable && kind.passable() {
            let point = Point::new(x, y);
            for n in self.neighborhood_points(&point) {
                if self.can_move_to(n) {
                    let n_ix = self.get_ix_point(&n);
                    self.components.union(ix, n_ix);
                }
            }
        }
        Ok(())
    }

    /// Like [set_cell](Self::set_cell) but takes the numeric cell code
    /// (0 empty, 1 obstacle, 2 start, 3 target).
    pub fn set_cell_code(&mut self, x: i32, y: i32, code: u8) -> Result<()> {
        let kind = CellKind::try_from(code)?;
        self.set_cell(x, y, kind)
    }

    /// Position of the first cell of the given kind, scanning x ascending, then y ascending.
    pub fn find_cell(&self, kind: CellKind) -> Option<Point> {
        self.iter()
            .find(|&(_, cell)| cell == kind)
            .map(|(point, _)| point)
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|&&cell| cell == kind).count()
    }

    /// True iff the grid holds exactly one start and exactly one target cell.
    pub fn is_valid(&self) -> bool {
        self.count(CellKind::Start) == 1 && self.count(CellKind::Target) == 1
    }

    /// Checks the start/target invariant, reporting the offending counts.
    pub fn validate(&self) -> Result<()> {
        let starts = self.count(CellKind::Start);
        let targets = self.count(CellKind::Target);
        if starts == 1 && targets == 1 {
            Ok(())
        } else {
            Err(PathError::InvalidGrid { starts, targets })
        }
    }

    /// All cells with their positions in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, CellKind)> + '_ {
        iproduct!(0..self.width as i32, 0..self.height as i32)
            .map(|(x, y)| Point::new(x, y))
            .zip(self.cells.iter().copied())
    }

    pub fn can_move_to(&self, pos: Point) -> bool {
        self.get_point(pos).map_or(false, CellKind::passable)
    }

    /// The neighbouring points of `point` under the current neighbourhood, unfiltered.
    pub fn neighborhood_points(&self, point: &Point) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        let diagonal: &[(i32, i32)] = if self.allow_diagonal_move {
            &DIAGONAL_OFFSETS
        } else {
            &[]
        };
        ORTHOGONAL_OFFSETS
            .iter()
            .chain(diagonal)
            .map(|(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .collect()
    }

    /// Passable neighbours of `pos` together with the Euclidean cost of stepping onto them.
    pub fn neighborhood_points_and_cost(
        &self,
        pos: &Point,
    ) -> SmallVec<[(Point, f64); N_SMALLVEC_SIZE]> {
        self.neighborhood_points(pos)
            .into_iter()
            .filter(|p| self.can_move_to(*p))
            .map(|p| (p, euclidean_distance(pos, &p)))
            .collect()
    }

    /// Retrieves the component id a given [Point] belongs to. Only meaningful when the
    /// components are not dirty, see [update](Self::update).
    pub fn get_component(&self, point: &Point) -> usize {
        self.components.find(self.get_ix_point(point))
    }

    /// Checks if start and goal are on the same component. Falls back to a fresh component
    /// computation when the cached one is dirty.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        if !self.point_in_bounds(*start) || !self.point_in_bounds(*goal) {
            return false;
        }
        let start_ix = self.get_ix_point(start);
        let goal_ix = self.get_ix_point(goal);
        if self.components_dirty {
            self.compute_components().equiv(start_ix, goal_ix)
        } else {
            self.components.equiv(start_ix, goal_ix)
        }
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }

    pub fn components_dirty(&self) -> bool {
        self.components_dirty
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up grid neighbours to the same components.
    pub fn generate_components(&mut self) {
        self.components = self.compute_components();
        self.components_dirty = false;
    }

    fn compute_components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.width * self.height);
        // Linking each cell to its forward neighbours covers every edge once.
        let forward: &[(i32, i32)] = if self.allow_diagonal_move {
            &[(0, 1), (1, 0), (1, 1), (1, -1)]
        } else {
            &[(0, 1), (1, 0)]
        };
        for (x, y) in iproduct!(0..self.width as i32, 0..self.height as i32) {
            let point = Point::new(x, y);
            if !self.can_move_to(point) {
                continue;
            }
            let parent_ix = self.get_ix_point(&point);
            for (dx, dy) in forward {
                let n = Point::new(x + dx, y + dy);
                if self.can_move_to(n) {
                    components.union(parent_ix, self.get_ix_point(&n));
                }
            }
        }
        components
    }
}

/// Renders the grid as a text map, one line per row.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height as i32 {
            let row = (0..self.width as i32)
                .filter_map(|x| self.get(x, y))
                .map(CellKind::symbol)
                .join("");
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Parses a text map: one line per row, `.` empty, `#` obstacle, `S` start, `G` target.
/// Blank lines and surrounding whitespace are ignored. Diagonal movement is enabled.
impl FromStr for Grid {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Grid> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(CellKind::try_from)
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, cells)) = rows.iter().find_position(|cells| cells.len() != width) {
            return Err(ArgumentError::RaggedRow {
                row,
                len: cells.len(),
                expected: width,
            }
            .into());
        }
        let mut grid = Grid::empty(width, height)?;
        for (y, cells) in rows.iter().enumerate() {
            for (x, &kind) in cells.iter().enumerate() {
                if kind != CellKind::Empty {
                    grid.set_cell(x as i32, y as i32, kind)?;
                }
            }
        }
        grid.update();
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_marks_start_and_target() {
        let grid = Grid::new(4, 3, Some(Point::new(0, 1)), Some(Point::new(3, 2)), true).unwrap();
        assert_eq!(grid.get(0, 1), Some(CellKind::Start));
        assert_eq!(grid.get(3, 2), Some(CellKind::Target));
        assert_eq!(grid.count(CellKind::Empty), 10);
        assert!(grid.is_valid());
    }

    #[test]
    fn construct_rejects_bad_arguments() {
        assert_eq!(
            Grid::empty(0, 5).unwrap_err(),
            PathError::InvalidArgument(ArgumentError::InvalidDimensions {
                width: 0,
                height: 5
            })
        );
        // The cell count overflows usize.
        assert_eq!(
            Grid::empty(usize::MAX, 2).unwrap_err(),
            PathError::InvalidArgument(ArgumentError::InvalidDimensions {
                width: usize::MAX,
                height: 2
            })
        );
        // Fits in memory terms but not in i32 coordinates.
        let too_wide = i32::MAX as usize + 1;
        assert!(matches!(
            Grid::empty(too_wide, 1).unwrap_err(),
            PathError::InvalidArgument(ArgumentError::InvalidDimensions { width, height: 1 })
                if width == too_wide
        ));
        let err = Grid::new(3, 3, Some(Point::new(3, 0)), None, true).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidArgument(ArgumentError::OutOfBounds { x: 3, y: 0, .. })
        ));
        let err = Grid::new(3, 3, None, Some(Point::new(0, -1)), false).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidArgument(ArgumentError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn set_cell_checks_bounds_and_codes() {
        let mut grid = Grid::empty(2, 2).unwrap();
        assert!(grid.set_cell(2, 0, CellKind::Obstacle).is_err());
        assert!(grid.set_cell(-1, 1, CellKind::Obstacle).is_err());
        assert_eq!(
            grid.set_cell_code(0, 0, 9),
            Err(PathError::InvalidArgument(ArgumentError::UnknownCellCode(9)))
        );
        grid.set_cell_code(1, 1, 1).unwrap();
        assert_eq!(grid.get(1, 1), Some(CellKind::Obstacle));
        assert_eq!(grid.get(0, 0), Some(CellKind::Empty));
    }

    #[test]
    fn edits_may_break_the_invariant() {
        let mut grid = Grid::new(3, 3, Some(Point::new(0, 0)), Some(Point::new(2, 2)), true).unwrap();
        grid.set_cell(1, 1, CellKind::Start).unwrap();
        assert!(!grid.is_valid());
        assert_eq!(
            grid.validate(),
            Err(PathError::InvalidGrid {
                starts: 2,
                targets: 1
            })
        );
        grid.set_cell(0, 0, CellKind::Empty).unwrap();
        assert!(grid.is_valid());
        grid.set_cell(2, 2, CellKind::Obstacle).unwrap();
        assert!(!grid.is_valid());
    }

    #[test]
    fn find_cell_scans_x_major() {
        let mut grid = Grid::empty(3, 3).unwrap();
        assert_eq!(grid.find_cell(CellKind::Target), None);
        grid.set_cell(2, 0, CellKind::Target).unwrap();
        grid.set_cell(1, 2, CellKind::Target).unwrap();
        grid.set_cell(1, 1, CellKind::Target).unwrap();
        assert_eq!(grid.find_cell(CellKind::Target), Some(Point::new(1, 1)));
        assert_eq!(grid.find_cell(CellKind::Empty), Some(Point::new(0, 0)));
    }

    #[test]
    fn neighbourhood_follows_diagonal_flag() {
        let mut grid = Grid::empty(3, 3).unwrap();
        let centre = Point::new(1, 1);
        assert_eq!(grid.neighborhood_points_and_cost(&centre).len(), 8);
        grid.set_allow_diagonal(false);
        let neighbours = grid.neighborhood_points_and_cost(&centre);
        assert_eq!(neighbours.len(), 4);
        assert!(neighbours.iter().all(|&(_, cost)| cost == 1.0));

        let corner = grid.neighborhood_points_and_cost(&Point::new(0, 0));
        assert_eq!(corner.len(), 2);
    }

    #[test]
    fn diagonal_steps_cost_sqrt_two() {
        let mut grid = Grid::empty(2, 2).unwrap();
        grid.set_cell(1, 0, CellKind::Obstacle).unwrap();
        let neighbours = grid.neighborhood_points_and_cost(&Point::new(0, 0));
        assert_eq!(neighbours.len(), 2);
        let (p, cost) = neighbours[1];
        assert_eq!(p, Point::new(1, 1));
        assert!((cost - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // Corresponds to the following 3x2 grid:
        //  ___
        // | # |
        // | # |
        //  ___
        let mut grid = Grid::empty(3, 2).unwrap();
        grid.set_cell(1, 0, CellKind::Obstacle).unwrap();
        grid.set_cell(1, 1, CellKind::Obstacle).unwrap();
        assert!(grid.components_dirty());
        grid.update();
        assert!(!grid.components_dirty());
        let p1 = Point::new(0, 0);
        let p2 = Point::new(1, 1);
        let p3 = Point::new(0, 1);
        let p4 = Point::new(2, 0);
        assert_ne!(grid.get_component(&p1), grid.get_component(&p2));
        assert_eq!(grid.get_component(&p1), grid.get_component(&p3));
        assert_ne!(grid.get_component(&p1), grid.get_component(&p4));
    }

    #[test]
    fn clearing_an_obstacle_joins_components() {
        let mut grid: Grid = "
            .#.
            .#.
        "
        .parse()
        .unwrap();
        let left = Point::new(0, 0);
        let right = Point::new(2, 1);
        assert!(grid.unreachable(&left, &right));
        grid.set_cell(1, 1, CellKind::Empty).unwrap();
        assert!(!grid.components_dirty());
        assert!(grid.reachable(&left, &right));
    }

    #[test]
    fn dirty_components_are_recomputed_on_query() {
        let mut grid = Grid::empty(3, 1).unwrap();
        let left = Point::new(0, 0);
        let right = Point::new(2, 0);
        assert!(grid.reachable(&left, &right));
        grid.set_cell(1, 0, CellKind::Obstacle).unwrap();
        assert!(grid.components_dirty());
        assert!(grid.unreachable(&left, &right));
        assert!(grid.unreachable(&left, &Point::new(5, 0)));
    }

    // Tests whether allowing diagonals has the expected effect on diagonal reachability in a minimal setting.
    #[test]
    fn test_diagonal_switch_reachable() {
        //  __
        // | #|
        // |# |
        //  __
        let mut grid: Grid = "
            .#
            #.
        "
        .parse()
        .unwrap();
        let start = Point::new(0, 0);
        let end = Point::new(1, 1);
        assert!(grid.reachable(&start, &end));
        grid.set_allow_diagonal(false);
        assert!(grid.unreachable(&start, &end));
        grid.update();
        assert!(grid.unreachable(&start, &end));
    }

    #[test]
    fn text_maps_round_trip() {
        let map = "S..#\n.#..\n...G\n";
        let grid: Grid = map.parse().unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.find_cell(CellKind::Start), Some(Point::new(0, 0)));
        assert_eq!(grid.find_cell(CellKind::Target), Some(Point::new(3, 2)));
        assert_eq!(grid.get(3, 0), Some(CellKind::Obstacle));
        assert_eq!(grid.to_string(), map);
    }

    #[test]
    fn malformed_text_maps_are_rejected() {
        assert_eq!(
            "S.\n.x".parse::<Grid>().unwrap_err(),
            PathError::InvalidArgument(ArgumentError::UnknownCellSymbol('x'))
        );
        assert_eq!(
            "S..\n.G".parse::<Grid>().unwrap_err(),
            PathError::InvalidArgument(ArgumentError::RaggedRow {
                row: 1,
                len: 2,
                expected: 3
            })
        );
        assert!(matches!(
            "\n\n".parse::<Grid>().unwrap_err(),
            PathError::InvalidArgument(ArgumentError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn iter_visits_cells_in_scan_order() {
        let grid = Grid::new(2, 2, Some(Point::new(1, 0)), None, true).unwrap();
        let cells = grid.iter().collect::<Vec<_>>();
        assert_eq!(
            cells,
            vec![
                (Point::new(0, 0), CellKind::Empty),
                (Point::new(0, 1), CellKind::Empty),
                (Point::new(1, 0), CellKind::Start),
                (Point::new(1, 1), CellKind::Empty),
            ]
        );
    }
}
