use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::board::Board;
use crate::cell::Color;
use crate::cellset::CellSet;
use crate::islands::enumerate_islands;
use crate::location::Location;

/// Evidence that the current partial coloring admits no completion, or that the search gave
/// up looking for one.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Unsatisfiable {
    /// No candidate island can complete the island of the pivot at this location.
    PivotStarved {
        /// The pivot that cannot reach its number.
        pivot: Location,
    },
    /// A black component has no unknown frontier left, so it can never merge with the
    /// others into the single black region.
    BlackCutOff,
    /// The node budget ran out; the branch is abandoned, not refuted.
    BudgetExhausted,
}

impl Display for Unsatisfiable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PivotStarved { pivot } => {
                write!(f, "no candidate island can complete the pivot at {:?}", pivot)
            }
            Self::BlackCutOff => write!(f, "a black component can no longer join the black region"),
            Self::BudgetExhausted => write!(f, "the search node budget was exhausted"),
        }
    }
}

impl std::error::Error for Unsatisfiable {}

/// Remaining node allowance shared by island enumeration and speculative search within one
/// solve attempt. Bounds worst-case latency on adversarial inputs; the default allowance is
/// far beyond what a well-formed 5×5 puzzle consumes.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    remaining: usize,
}

impl Budget {
    pub(crate) fn new(nodes: usize) -> Self {
        Self { remaining: nodes }
    }

    /// Consume `nodes` units, failing with [`Unsatisfiable::BudgetExhausted`] once dry.
    pub fn spend(&mut self, nodes: usize) -> Result<(), Unsatisfiable> {
        match self.remaining.checked_sub(nodes) {
            Some(left) => {
                self.remaining = left;
                Ok(())
            }
            None => Err(Unsatisfiable::BudgetExhausted),
        }
    }
}

/// One constraint-propagation rule.
///
/// A strategy tightens the partial coloring without guessing: it may color cells, associate
/// them with pivots, or do nothing, and must be safe to re-apply. Returning
/// [`Unsatisfiable`] refutes the whole current board state, which the solver uses to
/// abandon a speculative branch.
pub trait Strategy {
    /// Short name for trace output.
    fn name(&self) -> &'static str;

    /// Improve the partial solution on `board`, reporting whether anything changed.
    fn apply(&self, board: &mut Board, budget: &mut Budget) -> Result<bool, Unsatisfiable>;
}

/// For every pivot, generates all currently valid complete islands (connected, exactly the
/// pivot's number of cells, containing every cell already known to belong to it), then:
/// cells in every candidate of a pivot become white and associated; cells in no candidate
/// of any pivot become black; white cells reachable from exactly one pivot are associated
/// with it. A pivot with no candidates refutes the board.
pub struct AllValidIslandsStrategy;

impl Strategy for AllValidIslandsStrategy {
    fn name(&self) -> &'static str {
        "all-valid-islands"
    }

    fn apply(&self, board: &mut Board, budget: &mut Budget) -> Result<bool, Unsatisfiable> {
        board.connect_white_associations();
        let width = board.width();

        // reachability is judged for the cells that are not black as the pass starts
        let candidates = board
            .locations_where(|cell| cell.color() != Color::Black)
            .collect_vec();
        let groups = board.white_groups_by_pivot();

        let mut changed = false;
        let mut unions: Vec<(Location, CellSet)> = Vec::with_capacity(groups.len());
        for pivot in board.pivots().collect_vec() {
            let group = groups
                .get(&pivot)
                .copied()
                .unwrap_or_else(|| CellSet::empty(width).with(pivot));
            let islands = enumerate_islands(board, pivot, &group, budget)?;
            let Some(first) = islands.first() else {
                return Err(Unsatisfiable::PivotStarved { pivot });
            };

            let mut intersection = *first;
            let mut union = CellSet::empty(width);
            for island in &islands {
                intersection = intersection.intersection(island);
                union = union.union(island);
            }

            for at in intersection.iter() {
                changed |= board
                    .force_color(at, Color::White)
                    .expect("whitening a cell is always legal");
                changed |= board
                    .force_association(at, Some(pivot))
                    .expect("cells are whitened before they join the island");
            }
            unions.push((pivot, union));
        }

        for at in candidates {
            let mut reaching = unions
                .iter()
                .filter(|(_, union)| union.contains(at))
                .map(|(pivot, _)| *pivot);
            match reaching.next() {
                None => {
                    changed |= board
                        .force_color(at, Color::Black)
                        .expect("cells out of every island's reach are never associated");
                }
                Some(pivot) => {
                    if reaching.next().is_none() && board.color(at) == Color::White {
                        changed |= board
                            .force_association(at, Some(pivot))
                            .expect("white cells reachable by one pivot may join it");
                    }
                }
            }
        }

        Ok(changed)
    }
}

/// If a group is not complete and there is exactly one unknown cell it could expand into,
/// that cell must belong to the group. Applied to black components while the black count is
/// short of its target, then to white components that are not yet full islands; each forced
/// cell restarts the scan, since components may have merged.
pub struct ExpandStrategy;

impl Strategy for ExpandStrategy {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn apply(&self, board: &mut Board, _budget: &mut Budget) -> Result<bool, Unsatisfiable> {
        let mut changed = false;

        while board.count(Color::Black) < board.required_black_count() {
            let forced = board
                .connected_components(Color::Black)
                .into_iter()
                .find_map(|component| sole_unknown_neighbor(board, &component));
            match forced {
                Some(at) => {
                    board
                        .set_color(at, Color::Black)
                        .expect("frontier cells are unknown and can be darkened");
                    changed = true;
                }
                None => break,
            }
        }

        loop {
            board.connect_white_associations();
            let forced = board
                .connected_components(Color::White)
                .into_iter()
                .find_map(|component| {
                    let head = component.iter().next()?;
                    let complete = board
                        .association(head)
                        .and_then(|pivot| board.number(pivot))
                        .is_some_and(|number| usize::from(number) <= component.len());
                    if complete {
                        return None;
                    }
                    sole_unknown_neighbor(board, &component)
                });
            match forced {
                Some(at) => {
                    board
                        .set_color(at, Color::White)
                        .expect("frontier cells are unknown and can be whitened");
                    changed = true;
                }
                None => break,
            }
        }

        Ok(changed)
    }
}

fn sole_unknown_neighbor(board: &Board, component: &CellSet) -> Option<Location> {
    let frontier = board.unknown_neighbors(component);
    match frontier.len() {
        1 => frontier.iter().next(),
        _ => None,
    }
}

/// A 2×2 block with three black cells forces the remaining unknown cell white, heading off
/// a completed all-black block.
pub struct NoBlackBlockStrategy;

impl Strategy for NoBlackBlockStrategy {
    fn name(&self) -> &'static str {
        "no-black-block"
    }

    fn apply(&self, board: &mut Board, _budget: &mut Budget) -> Result<bool, Unsatisfiable> {
        let mut changed = false;
        for (x, y) in (0..board.width() - 1).cartesian_product(0..board.height() - 1) {
            let block = [
                Location(x, y),
                Location(x + 1, y),
                Location(x, y + 1),
                Location(x + 1, y + 1),
            ];
            let black = block
                .iter()
                .filter(|at| board.color(**at) == Color::Black)
                .count();
            if black != 3 {
                continue;
            }
            for at in block {
                if board.color(at) == Color::Unknown {
                    board
                        .set_color(at, Color::White)
                        .expect("unknown cells can always be whitened");
                    changed = true;
                }
            }
        }
        Ok(changed)
    }
}

/// Black-region connectivity checks.
///
/// Currently a pruning rule only: once the black cells split into several components, a
/// component whose unknown frontier is empty can never rejoin the others, so the board is
/// refuted. Forces no cells; the solver stays correct without it, it just explores dead
/// branches longer.
pub struct BlackConnectStrategy;

impl Strategy for BlackConnectStrategy {
    fn name(&self) -> &'static str {
        "black-connect"
    }

    fn apply(&self, board: &mut Board, _budget: &mut Budget) -> Result<bool, Unsatisfiable> {
        let components = board.connected_components(Color::Black);
        if components.len() > 1
            && components
                .iter()
                .any(|component| board.unknown_neighbors(component).is_empty())
        {
            return Err(Unsatisfiable::BlackCutOff);
        }
        Ok(false)
    }
}
