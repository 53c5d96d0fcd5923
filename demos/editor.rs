use cordon::{CellKind, Grid, PathError, PathFinder};
use grid_util::point::Point;
use std::collections::HashSet;

// Stand-in for an interactive editor: a wall is painted one cell at a time, and after every
// edit the route is solved again and drawn over the grid with `*`. Once the wall is closed the
// target can no longer be reached.
//
// Run with RUST_LOG=debug to see the search statistics.

fn render(grid: &Grid, path: &[Point]) -> String {
    let on_path = path.iter().copied().collect::<HashSet<_>>();
    let mut out = String::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let p = Point::new(x, y);
            match grid.get_point(p) {
                Some(CellKind::Empty) if on_path.contains(&p) => out.push('*'),
                Some(kind) => out.push(kind.symbol()),
                None => {}
            }
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), PathError> {
    env_logger::init();
    let mut grid = Grid::new(20, 12, Some(Point::new(3, 6)), Some(Point::new(16, 6)), true)?;
    let finder = PathFinder::new();

    // Brush strokes down column 10, top to bottom.
    let strokes = (0..grid.height() as i32).map(|y| Point::new(10, y));
    for brush in std::iter::once(None).chain(strokes.map(Some)) {
        if let Some(p) = brush {
            grid.set_cell(p.x, p.y, CellKind::Obstacle)?;
        }
        match finder.solve(&grid) {
            Ok(path) => {
                println!("{} steps:", path.len());
                print!("{}", render(&grid, &path));
            }
            Err(err @ (PathError::NoPathFound { .. } | PathError::SearchAborted { .. })) => {
                println!("No route: {err}");
                print!("{}", render(&grid, &[]));
            }
            Err(err) => return Err(err),
        }
        println!();
    }
    Ok(())
}
