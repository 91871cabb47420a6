use itertools::Itertools;

use crate::board::Board;
use crate::cell::Color;
use crate::cellset::CellSet;
use crate::islands::enumerate_islands;
use crate::location::Location;
use crate::snapshot::Snapshot;
use crate::strategy::{
    AllValidIslandsStrategy, BlackConnectStrategy, Budget, ExpandStrategy, NoBlackBlockStrategy,
    Strategy,
};

/// Default node allowance per solve attempt. Orders of magnitude above what well-formed 5×5
/// boards consume, so only pathological inputs ever hit it.
const DEFAULT_NODE_BUDGET: usize = 50_000_000;

/// Drives a list of [`Strategy`] instances over a board until it is solved or refuted.
///
/// Each pass applies every strategy in order. When a full pass leaves the board unchanged
/// while cells are still undecided, propagation has stalled; the solver then snapshots the
/// board, picks the hungriest pivot, and commits each of its candidate islands in turn,
/// recursing to verify and rolling back on failure.
pub struct Solver {
    strategies: Vec<Box<dyn Strategy>>,
    node_budget: usize,
}

impl Default for Solver {
    /// The standard lineup, in its fixed application order.
    fn default() -> Self {
        Self::new(vec![
            Box::new(AllValidIslandsStrategy),
            Box::new(ExpandStrategy),
            Box::new(NoBlackBlockStrategy),
            Box::new(BlackConnectStrategy),
        ])
    }
}

impl Solver {
    /// Build a solver applying `strategies` in the given order each pass.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies, node_budget: DEFAULT_NODE_BUDGET }
    }

    /// Replace the default node budget; see [`Budget`].
    pub fn with_node_budget(mut self, nodes: usize) -> Self {
        self.node_budget = nodes;
        self
    }

    /// Attempt to solve `board` in place, returning whether a complete valid solution was
    /// reached. On `false` the board is left in its last attempted state, which callers
    /// must not interpret.
    pub fn try_to_solve(&self, board: &mut Board) -> bool {
        let mut budget = Budget::new(self.node_budget);
        self.solve_with(board, &mut budget)
    }

    fn solve_with(&self, board: &mut Board, budget: &mut Budget) -> bool {
        let mut previous_key = String::new();
        loop {
            for strategy in &self.strategies {
                log::debug!("applying strategy {}", strategy.name());
                match strategy.apply(board, budget) {
                    Ok(changed) => {
                        log::trace!(
                            "strategy {} {}",
                            strategy.name(),
                            if changed { "made progress" } else { "made no progress" }
                        );
                    }
                    Err(reason) => {
                        log::debug!("strategy {} refuted this branch: {}", strategy.name(), reason);
                        return false;
                    }
                }
            }

            let key = board.state_key();
            if board.is_solution() {
                return true;
            }

            let undecided = board.count(Color::Unknown) > 0;
            if undecided && key == previous_key {
                // propagation has stalled; guess an island and verify
                return self.infer_island(board, budget);
            }
            if !undecided {
                // complete but invalid coloring; nothing is left to decide
                return false;
            }
            previous_key = key;
        }
    }

    /// Backtracking fallback for a stalled board: pick the hungry pivot with the largest
    /// number, speculatively commit each of its candidate islands, and recurse. The first
    /// candidate that solves wins; every failure rewinds to the snapshot.
    fn infer_island(&self, board: &mut Board, budget: &mut Budget) -> bool {
        let snapshot = Snapshot::capture(board);
        let groups = board.white_groups_by_pivot();

        let mut target: Option<(Location, u8, CellSet)> = None;
        for pivot in board.pivots().collect_vec() {
            let Some(number) = board.number(pivot) else {
                continue;
            };
            let group = groups
                .get(&pivot)
                .copied()
                .unwrap_or_else(|| CellSet::empty(board.width()).with(pivot));
            if usize::from(number) <= group.len() {
                continue;
            }
            // strict comparison keeps the first (row-major) pivot on ties
            if target.as_ref().is_none_or(|(_, best, _)| number > *best) {
                target = Some((pivot, number, group));
            }
        }
        let Some((pivot, _, group)) = target else {
            log::debug!("stalled with no hungry pivot; giving up on this branch");
            return false;
        };

        let islands = match enumerate_islands(board, pivot, &group, budget) {
            Ok(islands) => islands,
            Err(reason) => {
                log::debug!("island enumeration for {:?} failed: {}", pivot, reason);
                return false;
            }
        };
        log::debug!("guessing among {} candidate islands for pivot {:?}", islands.len(), pivot);

        for island in islands {
            if budget.spend(1).is_err() {
                log::debug!("search node budget exhausted while backtracking");
                return false;
            }
            for at in island.iter() {
                board
                    .set_color(at, Color::White)
                    .expect("whitening a cell is always legal");
                board
                    .set_association(at, Some(pivot))
                    .expect("cells are whitened before they join the island");
            }
            if self.solve_with(board, budget) {
                return true;
            }
            snapshot
                .restore(board)
                .expect("snapshots restore in an invariant-safe order");
        }
        false
    }
}
