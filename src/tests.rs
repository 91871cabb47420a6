#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::board::Board;
    use crate::cell::{Color, InvalidTransition};
    use crate::cellset::CellSet;
    use crate::islands::enumerate_islands;
    use crate::location::Location;
    use crate::snapshot::Snapshot;
    use crate::solver::Solver;
    use crate::strategy::{
        BlackConnectStrategy, Budget, NoBlackBlockStrategy, Strategy, Unsatisfiable,
    };
    use crate::InvalidSpec;

    /// 25 numbers with the given `(x, y, number)` pivots and zeroes elsewhere.
    fn numbers(pivots: &[(usize, usize, u8)]) -> Vec<u8> {
        let mut out = vec![0u8; 25];
        for (x, y, number) in pivots {
            out[y * 5 + x] = *number;
        }
        out
    }

    fn board(pivots: &[(usize, usize, u8)]) -> Board {
        Board::from_numbers(&numbers(pivots)).unwrap()
    }

    fn is_connected(board: &Board, cells: &CellSet) -> bool {
        let Some(seed) = cells.iter().next() else {
            return true;
        };
        let mut visited = CellSet::empty(board.width());
        visited.insert(seed);
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            for neighbor in board.neighbors_of(current) {
                if cells.contains(neighbor) && !visited.contains(neighbor) {
                    visited.insert(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        visited == *cells
    }

    #[test]
    fn construction_rejects_missing_pivots() {
        assert!(matches!(Board::from_numbers(&[0; 25]), Err(InvalidSpec::NoPivots)));
    }

    #[test]
    fn construction_rejects_oversubscription() {
        let result = Board::from_numbers(&numbers(&[(0, 0, 26)]));
        assert!(matches!(
            result,
            Err(InvalidSpec::OversubscribedWhite { required: 26, cells: 25 })
        ));

        let result = Board::from_numbers(&numbers(&[(0, 0, 13), (4, 4, 13)]));
        assert!(matches!(
            result,
            Err(InvalidSpec::OversubscribedWhite { required: 26, cells: 25 })
        ));
    }

    #[test]
    fn construction_rejects_wrong_cell_count() {
        let result = Board::from_numbers(&[1; 24]);
        assert!(matches!(
            result,
            Err(InvalidSpec::WrongCellCount { expected: 25, found: 24 })
        ));
    }

    #[test]
    fn construction_accepts_a_full_white_board() {
        let board = board(&[(0, 0, 25)]);
        assert_eq!(board.required_white_count(), 25);
        assert_eq!(board.required_black_count(), 0);
        assert_eq!(board.number(Location(0, 0)), Some(25));
        assert_eq!(board.color(Location(0, 0)), Color::White);
        assert_eq!(board.color(Location(3, 3)), Color::Unknown);
    }

    #[test]
    fn pivot_cells_stay_white() {
        let mut board = board(&[(2, 1, 4)]);
        let at = Location(2, 1);

        assert_eq!(
            board.set_color(at, Color::Black),
            Err(InvalidTransition::RecoloredPivot { at })
        );
        assert_eq!(
            board.set_color(at, Color::Unknown),
            Err(InvalidTransition::RecoloredPivot { at })
        );
        assert_eq!(board.set_color(at, Color::White), Ok(()));
        assert_eq!(board.color(at), Color::White);
        assert_eq!(board.association(at), Some(at));
    }

    #[test]
    fn association_requires_white() {
        let mut board = board(&[(0, 0, 2)]);
        let pivot = Location(0, 0);
        let at = Location(1, 0);

        assert_eq!(
            board.set_association(at, Some(pivot)),
            Err(InvalidTransition::AssociatedNonWhite { at })
        );

        board.set_color(at, Color::White).unwrap();
        board.set_association(at, Some(pivot)).unwrap();
        assert_eq!(board.association(at), Some(pivot));

        assert_eq!(
            board.set_color(at, Color::Black),
            Err(InvalidTransition::DarkenedAssociated { at })
        );
        assert_eq!(
            board.set_color(at, Color::Unknown),
            Err(InvalidTransition::DarkenedAssociated { at })
        );

        board.set_association(at, None).unwrap();
        board.set_color(at, Color::Black).unwrap();
        assert_eq!(board.color(at), Color::Black);
    }

    #[test]
    fn adjacency_is_symmetric_with_correct_degrees() {
        let board = board(&[(0, 0, 1)]);
        for at in board.locations().collect_vec() {
            let neighbors = board.neighbors_of(at).collect_vec();

            let expected_degree = [at.0, at.1]
                .iter()
                .map(|&coordinate| if coordinate == 0 || coordinate == 4 { 1 } else { 2 })
                .sum::<usize>();
            assert_eq!(neighbors.len(), expected_degree, "degree of {:?}", at);

            for neighbor in neighbors {
                assert!(
                    board.neighbors_of(neighbor).contains(&at),
                    "{:?} and {:?} disagree about adjacency",
                    at,
                    neighbor
                );
            }
        }
    }

    #[test]
    fn snapshot_round_trip_is_bit_exact() {
        let mut board = board(&[(0, 0, 3), (4, 4, 2)]);
        board.set_color(Location(1, 0), Color::White).unwrap();
        board.set_association(Location(1, 0), Some(Location(0, 0))).unwrap();
        board.set_color(Location(2, 2), Color::Black).unwrap();

        let expected = board
            .locations()
            .map(|at| (board.color(at), board.association(at)))
            .collect_vec();
        let snapshot = Snapshot::capture(&board);

        board.set_color(Location(2, 0), Color::White).unwrap();
        board.set_association(Location(2, 0), Some(Location(0, 0))).unwrap();
        board.set_association(Location(1, 0), None).unwrap();
        board.set_color(Location(1, 0), Color::Unknown).unwrap();
        board.set_color(Location(3, 3), Color::Black).unwrap();

        snapshot.restore(&mut board).unwrap();
        let restored = board
            .locations()
            .map(|at| (board.color(at), board.association(at)))
            .collect_vec();
        assert_eq!(restored, expected);
    }

    #[test]
    fn enumerator_returns_sound_islands() {
        let mut board = board(&[(0, 0, 3), (2, 0, 2)]);
        let pivot = Location(0, 0);
        let required = board
            .white_groups_by_pivot()
            .remove(&pivot)
            .unwrap();

        let mut budget = Budget::new(10_000);
        let islands = enumerate_islands(&board, pivot, &required, &mut budget).unwrap();

        // (1, 0) borders the foreign pivot at (2, 0), so growth is forced through (0, 1)
        assert_eq!(islands.len(), 2);
        for island in &islands {
            assert_eq!(island.len(), 3);
            assert!(island.is_superset_of(&required));
            assert!(is_connected(&board, island));
            for member in island.iter() {
                for neighbor in board.neighbors_of(member) {
                    let foreign = board
                        .association(neighbor)
                        .is_some_and(|other| other != pivot);
                    assert!(!foreign, "{:?} touches a foreign island", member);
                }
            }
        }

        let mut straight = CellSet::empty(board.width());
        for at in [Location(0, 0), Location(0, 1), Location(0, 2)] {
            straight.insert(at);
        }
        let mut bent = CellSet::empty(board.width());
        for at in [Location(0, 0), Location(0, 1), Location(1, 1)] {
            bent.insert(at);
        }
        assert!(islands.contains(&straight));
        assert!(islands.contains(&bent));
    }

    #[test]
    fn enumerator_returns_the_required_set_when_complete() {
        let mut board = board(&[(0, 0, 1)]);
        let pivot = Location(0, 0);
        let required = board.white_groups_by_pivot().remove(&pivot).unwrap();

        let mut budget = Budget::new(10_000);
        let islands = enumerate_islands(&board, pivot, &required, &mut budget).unwrap();
        assert_eq!(islands, vec![required]);
    }

    #[test]
    fn no_black_block_completes_the_square() {
        let mut board = board(&[(4, 4, 21)]);
        for at in [Location(0, 0), Location(1, 0), Location(0, 1)] {
            board.set_color(at, Color::Black).unwrap();
        }

        let mut budget = Budget::new(10_000);
        let changed = NoBlackBlockStrategy.apply(&mut board, &mut budget).unwrap();
        assert!(changed);
        assert_eq!(board.color(Location(1, 1)), Color::White);
    }

    #[test]
    fn black_connect_flags_a_walled_in_component() {
        let mut board = board(&[(2, 2, 1)]);
        board.set_color(Location(1, 0), Color::White).unwrap();
        board.set_color(Location(0, 1), Color::White).unwrap();
        board.set_color(Location(0, 0), Color::Black).unwrap();
        board.set_color(Location(4, 4), Color::Black).unwrap();

        let mut budget = Budget::new(10_000);
        assert_eq!(
            BlackConnectStrategy.apply(&mut board, &mut budget),
            Err(Unsatisfiable::BlackCutOff)
        );
    }

    #[test]
    fn solution_check_accepts_the_real_coloring_and_rejects_a_block() {
        let pivots = [(0, 0, 1), (4, 0, 1), (0, 4, 1), (4, 4, 1), (2, 2, 5)];
        let plus = [Location(2, 1), Location(1, 2), Location(3, 2), Location(2, 3)];

        let mut valid = board(&pivots);
        for at in valid.locations().collect_vec() {
            if valid.number(at).is_some() {
                continue;
            }
            if plus.contains(&at) {
                valid.set_color(at, Color::White).unwrap();
            } else {
                valid.set_color(at, Color::Black).unwrap();
            }
        }
        assert!(valid.is_solution());

        // same counts, but the bent island walls off the top of the black region and leaves
        // an all-black 2x2 at the lower left
        let bent = [Location(2, 1), Location(1, 1), Location(3, 1), Location(2, 3)];
        let mut invalid = board(&pivots);
        for at in invalid.locations().collect_vec() {
            if invalid.number(at).is_some() {
                continue;
            }
            if bent.contains(&at) {
                invalid.set_color(at, Color::White).unwrap();
            } else {
                invalid.set_color(at, Color::Black).unwrap();
            }
        }
        assert!(!invalid.is_solution());
    }

    #[test]
    fn single_pivot_covering_the_board_solves_all_white() {
        let mut board = board(&[(0, 0, 25)]);
        assert!(Solver::default().try_to_solve(&mut board));

        assert_eq!(board.count(Color::Black), 0);
        for at in board.locations().collect_vec() {
            assert_eq!(board.color(at), Color::White);
            assert_eq!(board.association(at), Some(Location(0, 0)));
        }
    }

    #[test]
    fn pivots_summing_to_the_board_but_overlapping_fail() {
        // together the numbers demand 25 white cells, but every 24-cell island from the
        // corner would have to touch the center pivot's island
        let mut board = board(&[(0, 0, 24), (2, 2, 1)]);
        assert!(!Solver::default().try_to_solve(&mut board));
    }

    #[test]
    fn known_puzzle_solves_to_expected_pattern() {
        let mut board = board(&[(0, 0, 1), (4, 0, 1), (0, 4, 1), (4, 4, 1), (2, 2, 5)]);
        assert!(Solver::default().try_to_solve(&mut board));

        assert_eq!(format!("{}", board), "1###1
##.##
#.5.#
##.##
1###1
");

        let expected = ["WBBBW", "BBWBB", "BWWWB", "BBWBB", "WBBBW"];
        for (y, row) in expected.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                let expected_color = match cell {
                    'W' => Color::White,
                    _ => Color::Black,
                };
                assert_eq!(board.color(Location(x, y)), expected_color, "at {:?}", Location(x, y));
            }
        }

        let center = Location(2, 2);
        for at in [Location(2, 1), Location(1, 2), Location(3, 2), Location(2, 3)] {
            assert_eq!(board.association(at), Some(center));
        }
        for corner in [Location(0, 0), Location(4, 0), Location(0, 4), Location(4, 4)] {
            assert_eq!(board.association(corner), Some(corner));
        }
    }

    #[test]
    fn exhausted_budget_reports_failure() {
        let mut board = board(&[(0, 0, 1), (4, 0, 1), (0, 4, 1), (4, 4, 1), (2, 2, 5)]);
        let solver = Solver::default().with_node_budget(0);
        assert!(!solver.try_to_solve(&mut board));
    }
}
