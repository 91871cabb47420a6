use crate::board::Board;
use crate::cell::{Color, InvalidTransition};
use crate::location::Location;

/// An immutable capture of a [`Board`]'s full mutable state, for rolling back speculative
/// island commitments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Snapshot {
    states: Vec<(Location, Color, Option<Location>)>,
}

impl Snapshot {
    /// Records the color and association of every cell.
    pub(crate) fn capture(board: &Board) -> Self {
        Self {
            states: board
                .locations()
                .map(|at| (at, board.color(at), board.association(at)))
                .collect(),
        }
    }

    /// Rewinds `board` to the captured state.
    ///
    /// Per-cell ordering keeps the "associated implies white" invariant intact mid-restore:
    /// a target state carrying an association is recolored white before the association is
    /// applied, while a target without one has its association cleared before any darkening.
    pub(crate) fn restore(&self, board: &mut Board) -> Result<(), InvalidTransition> {
        for (at, color, association) in &self.states {
            if association.is_some() {
                board.set_color(*at, *color)?;
                board.set_association(*at, *association)?;
            } else {
                board.set_association(*at, None)?;
                board.set_color(*at, *color)?;
            }
        }
        Ok(())
    }
}
