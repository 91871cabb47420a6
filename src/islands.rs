use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::board::Board;
use crate::cell::Color;
use crate::cellset::CellSet;
use crate::location::Location;
use crate::strategy::{Budget, Unsatisfiable};

/// The neighbors of `of` that the island headed by `pivot` may legally expand into: not
/// black, not claimed by a foreign island, and not bordering one either (an island touching
/// a differently-associated cell would break isolation).
fn valid_neighbors(board: &Board, of: Location, pivot: Location) -> CellSet {
    let mut result = CellSet::empty(board.width());
    'candidates: for neighbor in board.neighbors_of(of) {
        let cell = board.cell(neighbor);
        if cell.color() == Color::Black {
            continue;
        }
        if matches!(cell.pivot(neighbor), Some(other) if other != pivot) {
            continue;
        }
        for second in board.neighbors_of(neighbor) {
            if matches!(board.cell(second).pivot(second), Some(other) if other != pivot) {
                continue 'candidates;
            }
        }
        result.insert(neighbor);
    }
    result
}

/// Enumerates every maximal candidate island for `pivot`: connected supersets of `required`
/// with exactly the pivot's number of cells, grown one valid neighbor at a time starting
/// from the pivot alone.
///
/// Partial islands are deduplicated by their exact cell set, so each reachable set is
/// expanded once no matter how many growth orders lead to it; valid-neighbor lookups are
/// cached per cell for the duration of one call. Every expanded set costs one budget node.
///
/// An empty result means the pivot cannot be completed from the current board state; the
/// caller decides whether that refutes the branch.
pub(crate) fn enumerate_islands(
    board: &Board,
    pivot: Location,
    required: &CellSet,
    budget: &mut Budget,
) -> Result<Vec<CellSet>, Unsatisfiable> {
    let number = board
        .number(pivot)
        .map(usize::from)
        .expect("island enumeration starts at a pivot cell");
    if number == required.len() {
        // the known cells already form the whole island
        return Ok(vec![*required]);
    }

    let mut cache: HashMap<Location, CellSet> = HashMap::new();
    let mut seen: HashSet<CellSet> = HashSet::new();
    let mut complete: HashSet<CellSet> = HashSet::new();

    let mut stack = vec![CellSet::empty(board.width()).with(pivot)];
    while let Some(current) = stack.pop() {
        if current.len() == number {
            if current.is_superset_of(required) {
                complete.insert(current);
            }
            continue;
        }
        if !seen.insert(current) {
            continue;
        }
        budget.spend(1)?;

        let mut tried = CellSet::empty(board.width());
        for member in current.iter() {
            let expansions = *cache
                .entry(member)
                .or_insert_with(|| valid_neighbors(board, member, pivot));
            for neighbor in expansions.iter() {
                if tried.contains(neighbor) || current.contains(neighbor) {
                    continue;
                }
                tried.insert(neighbor);
                stack.push(current.with(neighbor));
            }
        }
    }

    // fixed order so downstream guessing is reproducible
    Ok(complete.into_iter().sorted().collect_vec())
}
