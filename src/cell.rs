use crate::error::ArgumentError;
use core::fmt;

/// What occupies a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellKind {
    #[default]
    Empty,
    Obstacle,
    Start,
    Target,
}

impl CellKind {
    /// Every kind except [CellKind::Obstacle] can be walked through.
    pub fn passable(self) -> bool {
        self != CellKind::Obstacle
    }

    /// Numeric code used by [Grid::set_cell_code](crate::Grid::set_cell_code).
    pub fn code(self) -> u8 {
        match self {
            CellKind::Empty => 0,
            CellKind::Obstacle => 1,
            CellKind::Start => 2,
            CellKind::Target => 3,
        }
    }

    /// Character used in text maps.
    pub fn symbol(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Obstacle => '#',
            CellKind::Start => 'S',
            CellKind::Target => 'G',
        }
    }
}

impl TryFrom<u8> for CellKind {
    type Error = ArgumentError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CellKind::Empty),
            1 => Ok(CellKind::Obstacle),
            2 => Ok(CellKind::Start),
            3 => Ok(CellKind::Target),
            _ => Err(ArgumentError::UnknownCellCode(code)),
        }
    }
}

impl TryFrom<char> for CellKind {
    type Error = ArgumentError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '.' => Ok(CellKind::Empty),
            '#' => Ok(CellKind::Obstacle),
            'S' => Ok(CellKind::Start),
            'G' => Ok(CellKind::Target),
            _ => Err(ArgumentError::UnknownCellSymbol(symbol)),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
