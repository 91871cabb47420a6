#![warn(missing_docs)]

//! # `nurikabe`
//!
//! A solver for 5×5 [Nurikabe](https://en.wikipedia.org/wiki/Nurikabe_(puzzle)) grids as
//! produced by a photographed-puzzle pipeline: the upstream detection and classification
//! stages reduce a photo to 25 integers in row-major order, and this crate turns those into
//! a colored board. Build a [`Board`] with [`Board::from_numbers`], then hand it to a
//! [`Solver`]; on success every cell carries its final color and, for white cells, the
//! pivot whose island it belongs to.
//!
//! The rules being enforced: every pivot cell (a nonzero input number) heads a connected
//! white island with exactly that many cells, no two islands touch orthogonally, the black
//! cells form one connected region, and no 2×2 block is entirely black.
//!
//! # Internals
//! The solver is not SAT- or CSP-backed; it mirrors how a person works the puzzle. A fixed
//! list of [`Strategy`] rules is applied in order, each tightening the partial coloring
//! without guessing, until a pass changes nothing. A stalled board triggers the fallback:
//! snapshot the state, enumerate every candidate island of the hungriest pivot, commit one
//! speculatively and recurse, rolling back on refutation. Cell sets are bit masks, so the
//! enumerator's dedup store and the per-pivot island intersections are single integer
//! operations.

pub use board::{Board, InvalidSpec, STANDARD_SIDE};
pub use cell::{Color, InvalidTransition};
pub use location::{Coord, Dimension, Location};
pub use solver::Solver;
pub use strategy::{
    AllValidIslandsStrategy, BlackConnectStrategy, Budget, ExpandStrategy, NoBlackBlockStrategy,
    Strategy, Unsatisfiable,
};

pub(crate) mod board;
mod tests;
pub(crate) mod cell;
pub(crate) mod cellset;
pub(crate) mod islands;
pub(crate) mod location;
pub(crate) mod snapshot;
pub(crate) mod solver;
pub(crate) mod strategy;
