use grid_util::point::Point;
use thiserror::Error;

/// Everything that can go wrong when building, editing or searching a [Grid](crate::Grid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Malformed construction or cell-edit parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    /// The grid does not hold exactly one start and one target cell.
    #[error("grid needs exactly one start and one target, found {starts} start and {targets} target cells")]
    InvalidGrid { starts: usize, targets: usize },
    /// Every reachable cell was explored without meeting the target.
    #[error("no path from {start} to {target}")]
    NoPathFound { start: Point, target: Point },
    /// The open set grew past the configured capacity before the target was reached.
    #[error("search aborted: open set exceeded {max_open_size} nodes after {expanded} expansions")]
    SearchAborted { max_open_size: usize, expanded: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("grid dimensions must be positive and addressable, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("({x}, {y}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error("unknown cell code {0}")]
    UnknownCellCode(u8),
    #[error("unknown cell symbol {0:?}")]
    UnknownCellSymbol(char),
    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow { row: usize, len: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, PathError>;
