//! Grid coordinates, field contents and the fixed-size grid container.

use crate::town::TownError;

/// Width of every town grid in cells.
pub const WIDTH: usize = 15;

/// Height of every town grid in cells.
pub const HEIGHT: usize = 15;

/// A coordinate on the town grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate without bounds checking.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Build a coordinate from signed user input, rejecting anything
    /// outside the grid.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::OutOfBounds`] if either component is negative or
    /// not smaller than the grid dimension.
    pub fn checked(x: i64, y: i64) -> Result<Self, TownError> {
        let fits = |v: i64, limit: usize| usize::try_from(v).is_ok_and(|v| v < limit);
        match (u16::try_from(x), u16::try_from(y)) {
            (Ok(cx), Ok(cy)) if fits(x, WIDTH) && fits(y, HEIGHT) => Ok(Self::new(cx, cy)),
            _ => Err(TownError::OutOfBounds { x, y }),
        }
    }

    /// Check that the coordinate lies inside the grid.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        (self.x as usize) < WIDTH && (self.y as usize) < HEIGHT
    }

    /// Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// All in-bounds coordinates within Chebyshev distance `radius`,
    /// including `self`.
    pub fn neighborhood(self, radius: u16) -> impl Iterator<Item = Coord> {
        let x0 = self.x.saturating_sub(radius);
        let y0 = self.y.saturating_sub(radius);
        let x1 = self.x.saturating_add(radius);
        let y1 = self.y.saturating_add(radius);
        (x0..=x1)
            .flat_map(move |x| (y0..=y1).map(move |y| Coord::new(x, y)))
            .filter(|c| c.in_bounds())
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Tree varieties that can grow on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Broad-leaved oak.
    Oak,
    /// Pine.
    Pine,
    /// Birch.
    Birch,
}

/// Content of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Field {
    /// Bare ground, buildable.
    #[default]
    Empty,
    /// A tree of the given variety.
    Tree(TreeKind),
    /// The administration headquarters.
    Administration,
    /// A construction site; the target is tracked in the town's
    /// construction list.
    Construction,
    /// A finished quarry.
    Quarry,
}

impl Field {
    /// Stable on-disk code for this field.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Field::Empty => 0,
            Field::Tree(TreeKind::Oak) => 1,
            Field::Tree(TreeKind::Pine) => 2,
            Field::Tree(TreeKind::Birch) => 3,
            Field::Administration => 4,
            Field::Construction => 5,
            Field::Quarry => 6,
        }
    }

    /// Inverse of [`Field::code`].
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Field::Empty,
            1 => Field::Tree(TreeKind::Oak),
            2 => Field::Tree(TreeKind::Pine),
            3 => Field::Tree(TreeKind::Birch),
            4 => Field::Administration,
            5 => Field::Construction,
            6 => Field::Quarry,
            _ => return None,
        })
    }

    /// Check if this field holds a tree.
    #[must_use]
    pub const fn is_tree(self) -> bool {
        matches!(self, Field::Tree(_))
    }

    /// Check if a unit may stand on this field.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Field::Empty | Field::Construction | Field::Quarry)
    }

    /// Lower-case name used by console commands and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::Empty => "empty",
            Field::Tree(TreeKind::Oak) => "oak",
            Field::Tree(TreeKind::Pine) => "pine",
            Field::Tree(TreeKind::Birch) => "birch",
            Field::Administration => "administration",
            Field::Construction => "construction",
            Field::Quarry => "quarry",
        }
    }
}

/// A fixed 15x15 grid stored column-major (`cells[x][y]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cells: [[T; HEIGHT]; WIDTH],
}

impl<T: Copy> Grid<T> {
    /// Create a grid with every cell set to `value`.
    #[must_use]
    pub fn filled(value: T) -> Self {
        Self {
            cells: [[value; HEIGHT]; WIDTH],
        }
    }

    /// Value at the coordinate, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, at: Coord) -> Option<T> {
        self.cells
            .get(usize::from(at.x))
            .and_then(|column| column.get(usize::from(at.y)))
            .copied()
    }

    /// Overwrite the value at the coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, at: Coord, value: T) -> bool {
        match self
            .cells
            .get_mut(usize::from(at.x))
            .and_then(|column| column.get_mut(usize::from(at.y)))
        {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over all cells column-major: x outer, y inner.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, T)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(y, value)| (index_coord(x, y), *value))
        })
    }
}

/// Every coordinate of the grid in storage order.
pub fn coords() -> impl Iterator<Item = Coord> {
    (0..WIDTH).flat_map(|x| (0..HEIGHT).map(move |y| index_coord(x, y)))
}

// Callers only pass indices below WIDTH/HEIGHT.
#[allow(clippy::cast_possible_truncation)]
const fn index_coord(x: usize, y: usize) -> Coord {
    Coord::new(x as u16, y as u16)
}
