use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::num::NonZero;

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;

use crate::cell::{Cell, Color, InvalidTransition};
use crate::cellset::CellSet;
use crate::location::{Coord, Dimension, Location, SquareStep};

/// Side length of the standard puzzle grid.
pub const STANDARD_SIDE: Coord = 5;

/// Reasons an input sequence cannot be turned into a [`Board`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InvalidSpec {
    /// The input sequence does not contain one number per cell. The upstream detection
    /// pipeline promises exactly one entry per cell; anything else is a detection error,
    /// not a solver failure.
    WrongCellCount {
        /// Number of entries the board needs.
        expected: usize,
        /// Number of entries received.
        found: usize,
    },
    /// Every entry was zero; a puzzle needs at least one pivot.
    NoPivots,
    /// The pivot numbers demand more white cells than the board has cells.
    OversubscribedWhite {
        /// Sum of all pivot numbers.
        required: usize,
        /// Total cells on the board.
        cells: usize,
    },
    /// The requested dimensions exceed the 64 cells a cell-set mask can encode.
    TooManyCells {
        /// Total cells requested.
        cells: usize,
    },
}

impl Display for InvalidSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongCellCount { expected, found } => {
                write!(f, "expected {} cell numbers, found {}", expected, found)
            }
            Self::NoPivots => write!(f, "the board contains no pivot cells"),
            Self::OversubscribedWhite { required, cells } => {
                write!(f, "pivot numbers require {} white cells but the board has only {}", required, cells)
            }
            Self::TooManyCells { cells } => {
                write!(f, "boards are limited to 64 cells, {} requested", cells)
            }
        }
    }
}

impl std::error::Error for InvalidSpec {}

/// A puzzle board: the cell grid plus its precomputed orthogonal adjacency relation.
///
/// Boards are built once per solve attempt from the classified input numbers via
/// [`from_numbers`](Board::from_numbers); afterwards only cell colors and island
/// associations change. The adjacency graph is symmetric and never mutated.
pub struct Board {
    dims: (Dimension, Dimension),
    cells: Array2<Cell>,
    topology: UnGraphMap<Location, ()>,
    required_white: usize,
}

impl Board {
    /// Build the standard 5×5 board from 25 classified cell numbers in row-major order;
    /// zero marks a simple cell, anything positive a pivot.
    pub fn from_numbers(numbers: &[u8]) -> Result<Self, InvalidSpec> {
        let side = NonZero::new(STANDARD_SIDE).unwrap();
        Self::with_dims((side, side), numbers)
    }

    /// Build a board of arbitrary dimensions (in `(x, y)` order, at most 64 cells) from one
    /// number per cell in row-major order.
    pub fn with_dims(dims: (Dimension, Dimension), numbers: &[u8]) -> Result<Self, InvalidSpec> {
        let (width, height) = (dims.0.get(), dims.1.get());
        let cell_count = width * height;
        if cell_count > u64::BITS as usize {
            return Err(InvalidSpec::TooManyCells { cells: cell_count });
        }
        if numbers.len() != cell_count {
            return Err(InvalidSpec::WrongCellCount { expected: cell_count, found: numbers.len() });
        }

        let required_white = numbers.iter().map(|number| *number as usize).sum();
        if required_white == 0 {
            return Err(InvalidSpec::NoPivots);
        }
        if required_white > cell_count {
            return Err(InvalidSpec::OversubscribedWhite { required: required_white, cells: cell_count });
        }

        let cells = Array2::from_shape_fn((height, width), |index| {
            match NonZero::new(numbers[Location::from(index).linear_index(width)]) {
                Some(number) => Cell::Pivot { number },
                None => Cell::default(),
            }
        });

        let mut topology = UnGraphMap::with_capacity(
            cell_count,
            (width - 1) * height + (height - 1) * width,
        );
        for location in (0..height).cartesian_product(0..width).map(|(y, x)| Location(x, y)) {
            topology.add_node(location);
            for step in SquareStep::VARIANTS {
                let neighbor = step.attempt_from(location);
                if neighbor.0 < width && neighbor.1 < height {
                    topology.add_edge(location, neighbor, ());
                }
            }
        }

        Ok(Self { dims, cells, topology, required_white })
    }

    /// Board width in cells.
    pub fn width(&self) -> Coord {
        self.dims.0.get()
    }

    /// Board height in cells.
    pub fn height(&self) -> Coord {
        self.dims.1.get()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    /// How many cells must end up white: the sum of all pivot numbers.
    pub fn required_white_count(&self) -> usize {
        self.required_white
    }

    /// How many cells must end up black.
    pub fn required_black_count(&self) -> usize {
        self.cell_count() - self.required_white
    }

    pub(crate) fn cell(&self, at: Location) -> &Cell {
        &self.cells[at.as_index()]
    }

    fn cell_mut(&mut self, at: Location) -> &mut Cell {
        &mut self.cells[at.as_index()]
    }

    /// The current color of the cell at `at`.
    pub fn color(&self, at: Location) -> Color {
        self.cell(at).color()
    }

    /// The pivot whose island the cell at `at` belongs to, if known. A pivot cell reports
    /// itself.
    pub fn association(&self, at: Location) -> Option<Location> {
        self.cell(at).pivot(at)
    }

    /// The island number if `at` is a pivot cell.
    pub fn number(&self, at: Location) -> Option<u8> {
        self.cell(at).number().map(NonZero::get)
    }

    /// All locations in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> {
        let (width, height) = (self.width(), self.height());
        (0..height).cartesian_product(0..width).map(|(y, x)| Location(x, y))
    }

    /// All pivot locations in row-major order.
    pub(crate) fn pivots(&self) -> impl Iterator<Item = Location> + '_ {
        self.locations_where(|cell| cell.is_pivot())
    }

    /// Lazily yields the locations whose cells satisfy `predicate`, in row-major order.
    pub(crate) fn locations_where<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = Location> + 'a
    where
        P: Fn(&Cell) -> bool + 'a,
    {
        self.locations().filter(move |at| predicate(self.cell(*at)))
    }

    /// The precomputed orthogonal neighbors of `at` (two to four cells).
    pub fn neighbors_of(&self, at: Location) -> impl Iterator<Item = Location> + '_ {
        self.topology.neighbors(at)
    }

    /// How many cells currently have the given color.
    pub fn count(&self, color: Color) -> usize {
        self.locations_where(move |cell| cell.color() == color).count()
    }

    /// Recolor the cell at `at`, upholding the cell invariants; see [`InvalidTransition`].
    pub fn set_color(&mut self, at: Location, color: Color) -> Result<(), InvalidTransition> {
        self.cell_mut(at).set_color(at, color)
    }

    /// Associate the cell at `at` with the island headed by `pivot`, or clear its
    /// association; see [`InvalidTransition`].
    pub fn set_association(
        &mut self,
        at: Location,
        pivot: Option<Location>,
    ) -> Result<(), InvalidTransition> {
        self.cell_mut(at).set_pivot(at, pivot)
    }

    /// Like [`set_color`](Board::set_color), but reports whether the cell actually changed.
    pub(crate) fn force_color(&mut self, at: Location, color: Color) -> Result<bool, InvalidTransition> {
        let before = *self.cell(at);
        self.set_color(at, color)?;
        Ok(*self.cell(at) != before)
    }

    /// Like [`set_association`](Board::set_association), but reports whether the cell
    /// actually changed.
    pub(crate) fn force_association(
        &mut self,
        at: Location,
        pivot: Option<Location>,
    ) -> Result<bool, InvalidTransition> {
        let before = *self.cell(at);
        self.set_association(at, pivot)?;
        Ok(*self.cell(at) != before)
    }

    /// Flood-fills each known island outward through white cells that have no association
    /// yet, claiming them for that island's pivot. Seeds are visited in row-major order, so
    /// a cell reachable from two pivots goes to whichever one's flood reaches it first,
    /// deterministically.
    pub(crate) fn connect_white_associations(&mut self) {
        for seed in self.locations().collect_vec() {
            let Some(pivot) = self.cell(seed).pivot(seed) else {
                continue;
            };
            let mut stack = vec![seed];
            while let Some(current) = stack.pop() {
                for neighbor in self.neighbors_of(current).collect_vec() {
                    if let Cell::Simple { color: Color::White, pivot: association } =
                        self.cell_mut(neighbor)
                    {
                        if association.is_none() {
                            *association = Some(pivot);
                            stack.push(neighbor);
                        }
                    }
                }
            }
        }
    }

    /// Re-runs the association flood fill, then groups every associated cell (pivots
    /// included) under its pivot.
    pub(crate) fn white_groups_by_pivot(&mut self) -> HashMap<Location, CellSet> {
        self.connect_white_associations();
        let width = self.width();
        let mut groups: HashMap<Location, CellSet> = HashMap::new();
        for at in self.locations() {
            if let Some(pivot) = self.cell(at).pivot(at) {
                groups.entry(pivot).or_insert_with(|| CellSet::empty(width)).insert(at);
            }
        }
        groups
    }

    /// Decomposes the cells of the given color into maximal connected components, ignoring
    /// associations. Components are ordered by their row-major first cell.
    pub(crate) fn connected_components(&self, color: Color) -> Vec<CellSet> {
        let mut remaining = CellSet::empty(self.width());
        for at in self.locations_where(|cell| cell.color() == color) {
            remaining.insert(at);
        }

        let mut components = Vec::new();
        loop {
            let Some(seed) = remaining.iter().next() else {
                break;
            };
            let mut component = CellSet::empty(self.width());
            let mut stack = vec![seed];
            component.insert(seed);
            remaining.remove(seed);
            while let Some(current) = stack.pop() {
                for neighbor in self.neighbors_of(current) {
                    if remaining.contains(neighbor) {
                        remaining.remove(neighbor);
                        component.insert(neighbor);
                        stack.push(neighbor);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// The unknown-colored cells orthogonally adjacent to any member of `cells`; the frontier
    /// a group could expand into.
    pub(crate) fn unknown_neighbors(&self, cells: &CellSet) -> CellSet {
        let mut frontier = CellSet::empty(self.width());
        for member in cells.iter() {
            for neighbor in self.neighbors_of(member) {
                if self.cell(neighbor).color() == Color::Unknown {
                    frontier.insert(neighbor);
                }
            }
        }
        frontier
    }

    /// Whether the current coloring is a complete, valid solution.
    ///
    /// Checks, in order and short-circuiting: the white/black counts match the required
    /// counts; every white cell is associated; every island has exactly its pivot's number
    /// of cells; no associated cell is fully surrounded by foreign islands; the black cells
    /// form at most one connected region; and no 2×2 block is entirely black.
    pub fn is_solution(&mut self) -> bool {
        if self.count(Color::White) != self.required_white_count()
            || self.count(Color::Black) != self.required_black_count()
        {
            return false;
        }

        self.connect_white_associations();
        if self
            .locations_where(|cell| cell.color() == Color::White)
            .any(|at| self.cell(at).pivot(at).is_none())
        {
            return false;
        }

        let groups = self.white_groups_by_pivot();
        for (pivot, group) in &groups {
            let number = self.cell(*pivot).number();
            if number.map(|n| n.get() as usize) != Some(group.len()) {
                return false;
            }
        }

        // Surrounded-by-foreigners check: an associated cell whose every neighbor belongs to
        // a different island cannot be part of a legally isolated island.
        for at in self.locations() {
            if let Some(pivot) = self.cell(at).pivot(at) {
                let surrounded = self
                    .neighbors_of(at)
                    .all(|neighbor| matches!(self.cell(neighbor).pivot(neighbor), Some(other) if other != pivot));
                if surrounded {
                    return false;
                }
            }
        }

        if self.connected_components(Color::Black).len() > 1 {
            return false;
        }

        for (x, y) in (0..self.width() - 1).cartesian_product(0..self.height() - 1) {
            let block = [
                Location(x, y),
                Location(x + 1, y),
                Location(x, y + 1),
                Location(x + 1, y + 1),
            ];
            if block.iter().all(|at| self.cell(*at).color() == Color::Black) {
                return false;
            }
        }

        true
    }

    /// A canonical encoding of the full mutable state: one entry per cell holding its color
    /// and, when associated, its pivot's linear index. Two boards with equal keys are in
    /// identical solve states; the solver compares successive keys to detect stagnation.
    pub(crate) fn state_key(&self) -> String {
        self.locations()
            .map(|at| {
                let cell = self.cell(at);
                let color = match cell.color() {
                    Color::White => 'w',
                    Color::Black => 'b',
                    Color::Unknown => 'u',
                };
                match cell.pivot(at) {
                    Some(pivot) => format!("{}{}", color, pivot.linear_index(self.width())),
                    None => color.to_string(),
                }
            })
            .join("|")
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let cell = self.cell(Location(x, y));
                let glyph = match (cell.number(), cell.color()) {
                    // pivot numbers render in base 36 so 5×5 sums up to 25 stay one glyph
                    (Some(number), _) => {
                        char::from_digit(number.get() as u32, 36).unwrap_or('*')
                    }
                    (None, Color::White) => '.',
                    (None, Color::Black) => '#',
                    (None, Color::Unknown) => '?',
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
