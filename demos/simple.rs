use cordon::{CellKind, Grid, PathFinder};
use grid_util::point::Point;

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  G|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - G marks the target
//
// Nodes have a 4-neighborhood

fn main() {
    let mut grid = Grid::new(3, 3, Some(Point::new(0, 0)), Some(Point::new(2, 2)), false).unwrap();
    grid.set_cell(1, 1, CellKind::Obstacle).unwrap();
    println!("{}", grid);
    let path = PathFinder::new().solve(&grid).unwrap();
    println!("Path:");
    for p in path {
        println!("{:?}", p);
    }
}
