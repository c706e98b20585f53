//! Mercenaries and construction sites.

use crate::registry::{self, MercArchetype, MercKindId};
use crate::town::grid::{Coord, Field};
use crate::town::state::{Town, TownError};

/// Maximum number of simultaneous construction sites.
pub const MAX_CONSTRUCTIONS: usize = 16;

/// Maximum number of mercenaries in a town.
pub const MAX_MERCENARIES: usize = 32;

/// Side a mercenary fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    /// Takes orders from the player.
    Town,
    /// Hostile.
    Raider,
}

impl Faction {
    /// Stable on-disk code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Faction::Town => 0,
            Faction::Raider => 1,
        }
    }

    /// Inverse of [`Faction::code`].
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Faction::Town),
            1 => Some(Faction::Raider),
            _ => None,
        }
    }

    /// Parse a faction name or code as typed on the console.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "town" | "0" => Some(Faction::Town),
            "raider" | "1" => Some(Faction::Raider),
            _ => None,
        }
    }

    /// Lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Town => "town",
            Faction::Raider => "raider",
        }
    }
}

/// A building under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Construction {
    /// What the site turns into when finished.
    pub target: Field,
    /// Location of the site.
    pub at: Coord,
    /// Rounds of work done so far.
    pub progress: u32,
}

/// A mercenary on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mercenary {
    /// Archetype id.
    pub kind: MercKindId,
    /// Current position.
    pub at: Coord,
    /// Remaining hit points.
    pub hp: u32,
    /// Allegiance.
    pub faction: Faction,
}

impl Mercenary {
    /// Create a mercenary at full health.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::UnknownArchetype`] if `kind` is not registered.
    pub fn new(kind: MercKindId, at: Coord, faction: Faction) -> Result<Self, TownError> {
        let archetype = registry::archetype(kind).ok_or(TownError::UnknownArchetype(kind))?;
        Ok(Self {
            kind,
            at,
            hp: archetype.max_hp,
            faction,
        })
    }

    /// Static definition of this mercenary.
    #[must_use]
    pub fn archetype(&self) -> Option<&'static MercArchetype> {
        registry::archetype(self.kind)
    }
}

/// Result of a successful move order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Tiles travelled.
    pub distance: u32,
    /// Cells newly revealed around the destination.
    pub revealed: usize,
}

impl Town {
    /// Append a construction entry.
    ///
    /// # Errors
    ///
    /// Fails if the site is out of bounds or the list is full.
    pub fn add_construction(&mut self, construction: Construction) -> Result<(), TownError> {
        Self::require_in_bounds(construction.at)?;
        if self.constructions.len() >= MAX_CONSTRUCTIONS {
            return Err(TownError::CapacityExceeded {
                what: "constructions",
                capacity: MAX_CONSTRUCTIONS,
            });
        }
        self.constructions.push(construction);
        Ok(())
    }

    /// Index of the construction entry at a cell.
    #[must_use]
    pub fn construction_at(&self, at: Coord) -> Option<usize> {
        self.constructions.iter().position(|c| c.at == at)
    }

    /// Remove a construction entry, keeping the order of the rest.
    pub fn remove_construction(&mut self, index: usize) -> Option<Construction> {
        (index < self.constructions.len()).then(|| self.constructions.remove(index))
    }

    /// Append a mercenary.
    ///
    /// # Errors
    ///
    /// Fails if the position is out of bounds or taken, or the roster is
    /// full.
    pub fn add_mercenary(&mut self, mercenary: Mercenary) -> Result<(), TownError> {
        Self::require_in_bounds(mercenary.at)?;
        if self.mercenary_at(mercenary.at).is_some() {
            return Err(TownError::Occupied(mercenary.at));
        }
        if self.mercenaries.len() >= MAX_MERCENARIES {
            return Err(TownError::CapacityExceeded {
                what: "mercenaries",
                capacity: MAX_MERCENARIES,
            });
        }
        self.mercenaries.push(mercenary);
        Ok(())
    }

    /// Index of the mercenary standing on a cell.
    #[must_use]
    pub fn mercenary_at(&self, at: Coord) -> Option<usize> {
        self.mercenaries.iter().position(|m| m.at == at)
    }

    /// Remove a mercenary, keeping the order of the rest.
    pub fn remove_mercenary(&mut self, index: usize) -> Option<Mercenary> {
        (index < self.mercenaries.len()).then(|| self.mercenaries.remove(index))
    }

    /// Hire a mercenary of the given archetype onto an explored, empty cell
    /// and pay its fee.
    ///
    /// # Errors
    ///
    /// Fails on unknown archetype, hidden or non-empty cell, occupied cell,
    /// full roster or insufficient money. Nothing changes on failure.
    pub fn hire_mercenary(&mut self, kind: MercKindId, at: Coord) -> Result<(), TownError> {
        let mercenary = Mercenary::new(kind, at, Faction::Town)?;
        let cost = mercenary.archetype().map_or(0, |a| a.hire_cost);
        self.require_visible(at)?;
        let field = self.field(at).unwrap_or_default();
        if field != Field::Empty {
            return Err(TownError::NotEmpty { at, field });
        }
        if self.money < cost {
            return Err(TownError::InsufficientFunds {
                cost,
                money: self.money,
            });
        }
        self.add_mercenary(mercenary)?;
        self.money -= cost;
        Ok(())
    }

    /// Place a mercenary of any faction without cost or terrain checks.
    ///
    /// # Errors
    ///
    /// Fails on unknown archetype, occupied cell or full roster.
    pub fn spawn_mercenary(
        &mut self,
        kind: MercKindId,
        at: Coord,
        faction: Faction,
    ) -> Result<(), TownError> {
        self.add_mercenary(Mercenary::new(kind, at, faction)?)
    }

    /// Move a town mercenary and reveal the area around its destination.
    ///
    /// # Errors
    ///
    /// Fails if no controllable mercenary stands at `from`, the destination
    /// is occupied or blocked, or further than the unit's speed.
    pub fn move_mercenary(&mut self, from: Coord, to: Coord) -> Result<MoveOutcome, TownError> {
        Self::require_in_bounds(from)?;
        Self::require_in_bounds(to)?;
        let index = self.mercenary_at(from).ok_or(TownError::NoMercenary(from))?;
        let mercenary = self.mercenaries[index];
        if mercenary.faction != Faction::Town {
            return Err(TownError::NotControllable(from));
        }
        if from != to && self.mercenary_at(to).is_some() {
            return Err(TownError::Occupied(to));
        }
        let field = self.field(to).unwrap_or_default();
        if !field.is_walkable() {
            return Err(TownError::Blocked { at: to, field });
        }
        let distance = from.manhattan(to);
        let limit = mercenary.archetype().map_or(0, |a| a.speed);
        if distance > limit {
            return Err(TownError::TooFar { distance, limit });
        }

        self.mercenaries[index].at = to;
        let revealed = self.reveal(to, 1);
        Ok(MoveOutcome { distance, revealed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> Town {
        Town::new(0).unwrap()
    }

    #[test]
    fn test_construction_removal_keeps_order() {
        let mut town = town();
        for x in 0..3 {
            town.add_construction(Construction {
                target: Field::Quarry,
                at: Coord::new(x, 0),
                progress: 0,
            })
            .unwrap();
        }
        let removed = town.remove_construction(1).unwrap();
        assert_eq!(removed.at, Coord::new(1, 0));
        let left: Vec<_> = town.constructions().iter().map(|c| c.at.x).collect();
        assert_eq!(left, vec![0, 2]);
        assert!(town.remove_construction(5).is_none());
    }

    #[test]
    fn test_construction_capacity() {
        let mut town = town();
        for i in 0..MAX_CONSTRUCTIONS {
            let at = Coord::new(u16::try_from(i % 15).unwrap(), u16::try_from(i / 15).unwrap());
            town.add_construction(Construction {
                target: Field::Quarry,
                at,
                progress: 0,
            })
            .unwrap();
        }
        let result = town.add_construction(Construction {
            target: Field::Quarry,
            at: Coord::new(14, 14),
            progress: 0,
        });
        assert!(matches!(result, Err(TownError::CapacityExceeded { .. })));
        assert_eq!(town.constructions().len(), MAX_CONSTRUCTIONS);
    }

    #[test]
    fn test_mercenary_starts_at_full_hp() {
        let merc = Mercenary::new(1, Coord::new(2, 2), Faction::Town).unwrap();
        assert_eq!(merc.hp, registry::archetype(1).unwrap().max_hp);
        assert!(Mercenary::new(99, Coord::new(2, 2), Faction::Town).is_err());
    }

    #[test]
    fn test_move_reveals_surroundings() {
        let mut town = town();
        for at in crate::town::coords() {
            town.set_hidden(at, true);
        }
        town.spawn_mercenary(1, Coord::new(2, 2), Faction::Town).unwrap();
        let outcome = town.move_mercenary(Coord::new(2, 2), Coord::new(4, 3)).unwrap();
        assert_eq!(outcome.distance, 3);
        assert_eq!(outcome.revealed, 9);
        assert!(!town.is_hidden(Coord::new(5, 4)));
        assert_eq!(town.mercenary_at(Coord::new(4, 3)), Some(0));
    }

    #[test]
    fn test_move_rejections_leave_town_unchanged() {
        let mut town = town();
        town.spawn_mercenary(2, Coord::new(2, 2), Faction::Town).unwrap();
        town.spawn_mercenary(0, Coord::new(3, 2), Faction::Raider).unwrap();
        town.set_field(Coord::new(2, 3), Field::Tree(crate::town::TreeKind::Oak));
        let before = town.clone();

        assert_eq!(
            town.move_mercenary(Coord::new(2, 2), Coord::new(3, 2)),
            Err(TownError::Occupied(Coord::new(3, 2)))
        );
        assert!(matches!(
            town.move_mercenary(Coord::new(2, 2), Coord::new(2, 3)),
            Err(TownError::Blocked { .. })
        ));
        assert_eq!(
            town.move_mercenary(Coord::new(2, 2), Coord::new(2, 6)),
            Err(TownError::TooFar { distance: 4, limit: 2 })
        );
        assert_eq!(
            town.move_mercenary(Coord::new(3, 2), Coord::new(3, 3)),
            Err(TownError::NotControllable(Coord::new(3, 2)))
        );
        assert_eq!(
            town.move_mercenary(Coord::new(9, 9), Coord::new(9, 10)),
            Err(TownError::NoMercenary(Coord::new(9, 9)))
        );
        assert_eq!(town, before);
    }

    #[test]
    fn test_hire_charges_fee() {
        let mut town = town();
        town.hire_mercenary(0, Coord::new(1, 1)).unwrap();
        assert_eq!(town.money, 35);
        assert_eq!(town.mercenaries().len(), 1);

        town.money = 5;
        assert!(matches!(
            town.hire_mercenary(0, Coord::new(1, 2)),
            Err(TownError::InsufficientFunds { cost: 15, money: 5 })
        ));
        assert_eq!(town.mercenaries().len(), 1);
    }

    #[test]
    fn test_faction_parse() {
        assert_eq!(Faction::parse("Raider"), Some(Faction::Raider));
        assert_eq!(Faction::parse("0"), Some(Faction::Town));
        assert_eq!(Faction::parse("pirates"), None);
    }
}
