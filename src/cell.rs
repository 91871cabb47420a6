use std::fmt::{Display, Formatter};
use std::num::NonZero;

use crate::location::Location;

/// The tri-state coloring of a cell while a solve is in progress.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Color {
    /// The cell belongs to an island.
    White,
    /// The cell belongs to the black region.
    Black,
    /// The cell has not been decided yet.
    #[default]
    Unknown,
}

/// An attempted cell mutation that would break a cell invariant.
///
/// These indicate a defect in calling code rather than a recoverable runtime condition;
/// legal solver steps never produce them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InvalidTransition {
    /// Pivot cells are white by definition and cannot be recolored.
    RecoloredPivot {
        /// Position of the pivot cell.
        at: Location,
    },
    /// A cell associated with a pivot must stay white until the association is cleared.
    DarkenedAssociated {
        /// Position of the offending cell.
        at: Location,
    },
    /// Only white cells may be associated with a pivot.
    AssociatedNonWhite {
        /// Position of the offending cell.
        at: Location,
    },
}

impl Display for InvalidTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecoloredPivot { at } => {
                write!(f, "attempted to recolor the pivot cell at {:?}", at)
            }
            Self::DarkenedAssociated { at } => {
                write!(f, "cell at {:?} is associated with a pivot and must stay white", at)
            }
            Self::AssociatedNonWhite { at } => {
                write!(f, "cell at {:?} is not white and cannot join an island", at)
            }
        }
    }
}

impl std::error::Error for InvalidTransition {}

/// A single cell, identified on its board by [`Location`].
///
/// Pivot cells are created from the nonzero entries of the input sequence and never change.
/// Simple cells carry the mutable solve state: a [`Color`] and, once the cell is known to be
/// part of an island, the location of that island's pivot.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Cell {
    Pivot { number: NonZero<u8> },
    Simple { color: Color, pivot: Option<Location> },
}

impl Default for Cell {
    fn default() -> Self {
        Self::Simple { color: Color::Unknown, pivot: None }
    }
}

impl Cell {
    pub(crate) fn color(&self) -> Color {
        match self {
            Self::Pivot { .. } => Color::White,
            Self::Simple { color, .. } => *color,
        }
    }

    pub(crate) fn number(&self) -> Option<NonZero<u8>> {
        match self {
            Self::Pivot { number } => Some(*number),
            Self::Simple { .. } => None,
        }
    }

    pub(crate) fn is_pivot(&self) -> bool {
        matches!(self, Self::Pivot { .. })
    }

    /// The pivot this cell belongs to. A pivot cell belongs to itself, which is why the cell's
    /// own location `at` must be supplied.
    pub(crate) fn pivot(&self, at: Location) -> Option<Location> {
        match self {
            Self::Pivot { .. } => Some(at),
            Self::Simple { pivot, .. } => *pivot,
        }
    }

    /// Recolor this cell. Pivots are permanently white; associated simple cells cannot be
    /// darkened or reset without clearing the association first.
    pub(crate) fn set_color(&mut self, at: Location, new: Color) -> Result<(), InvalidTransition> {
        match self {
            Self::Pivot { .. } => match new {
                Color::White => Ok(()),
                Color::Black | Color::Unknown => Err(InvalidTransition::RecoloredPivot { at }),
            },
            Self::Simple { color, pivot } => match new {
                Color::White => {
                    *color = Color::White;
                    Ok(())
                }
                Color::Black | Color::Unknown => {
                    if pivot.is_some() {
                        return Err(InvalidTransition::DarkenedAssociated { at });
                    }
                    *color = new;
                    Ok(())
                }
            },
        }
    }

    /// Associate this cell with the island headed by `new`, or clear the association.
    /// A pivot cell only accepts itself.
    pub(crate) fn set_pivot(
        &mut self,
        at: Location,
        new: Option<Location>,
    ) -> Result<(), InvalidTransition> {
        match self {
            Self::Pivot { .. } => match new {
                Some(target) if target == at => Ok(()),
                _ => Err(InvalidTransition::RecoloredPivot { at }),
            },
            Self::Simple { color, pivot } => {
                if new.is_some() && *color != Color::White {
                    return Err(InvalidTransition::AssociatedNonWhite { at });
                }
                *pivot = new;
                Ok(())
            }
        }
    }
}
