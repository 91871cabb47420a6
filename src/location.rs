use std::num::NonZero;

use ndarray::Ix;
use strum::VariantArray;

/// The integer type used for cell coordinates.
pub type Coord = usize;
/// A board dimension; boards cannot be zero-sized.
pub type Dimension = NonZero<Coord>;

/// A cell position on a board, in `(x, y)` order with the origin at the top left.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// The canonical row-major linear index of this location on a board `width` cells wide.
    pub fn linear_index(&self, width: Coord) -> usize {
        self.1 * width + self.0
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

/// The four orthogonal steps possible on a square grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) enum SquareStep {
    Up,
    Down,
    Left,
    Right,
}

impl SquareStep {
    /// Attempt the step from `location` in the direction specified by `self` and return the
    /// resultant [`Location`]. Steps off the top or left edge wrap to huge coordinates, which
    /// no board contains.
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }
}
