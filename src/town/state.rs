//! Town state management.

use thiserror::Error;

use crate::error::ErrorKind;
use crate::registry::{self, AdminId, Administrator, MercKindId};
use crate::town::grid::{Coord, Field, Grid};
use crate::town::roster::{Construction, Mercenary};

/// Round counter value of a freshly founded town (the hour the first day
/// starts at).
pub const TOWN_TIME_BEGIN: u32 = 8;

/// Money a freshly founded town starts with.
pub const TOWN_START_MONEY: i32 = 50;

/// Where the administration headquarters is placed.
pub const SPAWN: Coord = Coord::new(7, 7);

/// A half-open rectangle `[x0, x1) x [y0, y1)` of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// First column.
    pub x0: u16,
    /// First row.
    pub y0: u16,
    /// One past the last column.
    pub x1: u16,
    /// One past the last row.
    pub y1: u16,
}

impl Region {
    /// Create a region from its corners.
    #[must_use]
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Check if a coordinate lies inside the region.
    #[must_use]
    pub const fn contains(&self, at: Coord) -> bool {
        at.x >= self.x0 && at.x < self.x1 && at.y >= self.y0 && at.y < self.y1
    }

    /// All coordinates of the region, x outer.
    pub fn coords(self) -> impl Iterator<Item = Coord> {
        (self.x0..self.x1).flat_map(move |x| (self.y0..self.y1).map(move |y| Coord::new(x, y)))
    }
}

/// Rule violations reported by town operations.
///
/// Every variant is a validation failure: the operation was rejected and
/// the town is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TownError {
    /// Coordinate outside the 15x15 grid.
    #[error("coordinate ({x}, {y}) is outside the town")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
    },
    /// No administrator with this id exists.
    #[error("no administrator with id {0}")]
    UnknownAdmin(AdminId),
    /// No mercenary archetype with this id exists.
    #[error("no mercenary archetype with id {0}")]
    UnknownArchetype(MercKindId),
    /// No mercenary stands on the cell.
    #[error("no mercenary at {0}")]
    NoMercenary(Coord),
    /// The mercenary at the cell is not under town command.
    #[error("the mercenary at {0} does not take orders from the town")]
    NotControllable(Coord),
    /// Another mercenary already stands on the cell.
    #[error("{0} is already occupied")]
    Occupied(Coord),
    /// Units cannot enter the cell.
    #[error("{at} is blocked by {}", .field.name())]
    Blocked {
        /// Target cell.
        at: Coord,
        /// What blocks it.
        field: Field,
    },
    /// Move longer than the unit's speed.
    #[error("destination is {distance} tiles away, speed is {limit}")]
    TooFar {
        /// Requested distance.
        distance: u32,
        /// Allowed distance.
        limit: u32,
    },
    /// Weapon slot other than 0 or 1.
    #[error("no weapon in slot {0}")]
    UnknownWeaponSlot(i64),
    /// Target outside the weapon's range.
    #[error("target is {distance} tiles away, {weapon} reaches {range}")]
    OutOfRange {
        /// Weapon used.
        weapon: &'static str,
        /// Distance to the target.
        distance: u32,
        /// Weapon range.
        range: u32,
    },
    /// The cell is still under fog-of-war.
    #[error("{0} has not been explored")]
    Hidden(Coord),
    /// The field cannot be built.
    #[error("{} cannot be built", .0.name())]
    NotBuildable(Field),
    /// Building requires an empty cell.
    #[error("{at} is not empty ({})", .field.name())]
    NotEmpty {
        /// Target cell.
        at: Coord,
        /// Current content.
        field: Field,
    },
    /// Nothing to tear down.
    #[error("nothing to destruct at {0}")]
    NothingToDestruct(Coord),
    /// The headquarters cannot be torn down.
    #[error("the administration at {0} cannot be destructed")]
    Indestructible(Coord),
    /// Not enough money.
    #[error("costs {cost}, the town has {money}")]
    InsufficientFunds {
        /// Price of the action.
        cost: i32,
        /// Current balance.
        money: i32,
    },
    /// A bounded list is full.
    #[error("too many {what} (capacity {capacity})")]
    CapacityExceeded {
        /// Which list.
        what: &'static str,
        /// Its capacity.
        capacity: usize,
    },
}

impl TownError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// The root aggregate of a saved game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Town {
    /// Hired administrator.
    pub admin: AdminId,
    /// Game time in rounds, starting at [`TOWN_TIME_BEGIN`].
    pub round: u32,
    /// Treasury balance. Negative means the town is bankrupt.
    pub money: i32,
    pub(crate) fields: Grid<Field>,
    pub(crate) hidden: Grid<bool>,
    pub(crate) constructions: Vec<Construction>,
    pub(crate) mercenaries: Vec<Mercenary>,
}

impl Town {
    /// Create an empty, fully visible town for the given administrator.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::UnknownAdmin`] if the id is not in the roster.
    pub fn new(admin: AdminId) -> Result<Self, TownError> {
        if registry::admin(admin).is_none() {
            return Err(TownError::UnknownAdmin(admin));
        }
        Ok(Self {
            admin,
            round: TOWN_TIME_BEGIN,
            money: TOWN_START_MONEY,
            fields: Grid::filled(Field::Empty),
            hidden: Grid::filled(false),
            constructions: Vec::new(),
            mercenaries: Vec::new(),
        })
    }

    /// The hired administrator's record.
    #[must_use]
    pub fn administrator(&self) -> Option<&'static Administrator> {
        registry::admin(self.admin)
    }

    /// Content of a cell (`None` outside the grid).
    #[must_use]
    pub fn field(&self, at: Coord) -> Option<Field> {
        self.fields.get(at)
    }

    /// Overwrite the content of a cell.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set_field(&mut self, at: Coord, field: Field) -> bool {
        self.fields.set(at, field)
    }

    /// Whether the cell is under fog-of-war. Cells outside the grid count
    /// as hidden.
    #[must_use]
    pub fn is_hidden(&self, at: Coord) -> bool {
        self.hidden.get(at).unwrap_or(true)
    }

    /// Set or clear the fog-of-war flag of a cell.
    pub fn set_hidden(&mut self, at: Coord, hidden: bool) -> bool {
        self.hidden.set(at, hidden)
    }

    /// Clear fog-of-war within Chebyshev distance `radius` of `center`.
    ///
    /// Returns how many cells were newly revealed.
    pub fn reveal(&mut self, center: Coord, radius: u16) -> usize {
        let mut revealed = 0;
        for at in center.neighborhood(radius) {
            if self.is_hidden(at) {
                self.hidden.set(at, false);
                revealed += 1;
            }
        }
        revealed
    }

    /// The field grid.
    #[must_use]
    pub fn fields(&self) -> &Grid<Field> {
        &self.fields
    }

    /// The fog-of-war grid.
    #[must_use]
    pub fn hidden(&self) -> &Grid<bool> {
        &self.hidden
    }

    /// Constructions in progress, oldest first.
    #[must_use]
    pub fn constructions(&self) -> &[Construction] {
        &self.constructions
    }

    /// Mercenaries, in hiring order.
    #[must_use]
    pub fn mercenaries(&self) -> &[Mercenary] {
        &self.mercenaries
    }

    /// Count cells holding the given field.
    #[must_use]
    pub fn count(&self, field: Field) -> usize {
        self.fields.iter().filter(|&(_, f)| f == field).count()
    }

    /// Check if the treasury has run dry.
    #[must_use]
    pub const fn is_bankrupt(&self) -> bool {
        self.money < 0
    }

    pub(crate) fn require_in_bounds(at: Coord) -> Result<(), TownError> {
        if at.in_bounds() {
            Ok(())
        } else {
            Err(TownError::OutOfBounds {
                x: i64::from(at.x),
                y: i64::from(at.y),
            })
        }
    }

    pub(crate) fn require_visible(&self, at: Coord) -> Result<(), TownError> {
        Self::require_in_bounds(at)?;
        if self.is_hidden(at) {
            Err(TownError::Hidden(at))
        } else {
            Ok(())
        }
    }

    pub(crate) fn spend(&mut self, cost: i32) -> Result<(), TownError> {
        if self.money < cost {
            return Err(TownError::InsufficientFunds {
                cost,
                money: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }
}
