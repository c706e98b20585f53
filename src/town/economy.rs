//! Economy: building, demolition and the per-round balance.
//!
//! Every round the town collects income from finished buildings, pays its
//! administrator's salary and advances each construction site by one step.

use crate::town::grid::{Coord, Field};
use crate::town::roster::Construction;
use crate::town::state::{Town, TownError};

/// A field type that can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buildable {
    /// Resulting field.
    pub field: Field,
    /// Price paid when the site is opened.
    pub cost: i32,
    /// Rounds of work until completion.
    pub build_rounds: u32,
    /// Money produced per round once finished.
    pub income: i32,
}

/// All buildable fields.
pub static BUILDABLES: [Buildable; 1] = [Buildable {
    field: Field::Quarry,
    cost: 20,
    build_rounds: 3,
    income: 2,
}];

/// Look up the build rules for a field.
#[must_use]
pub fn buildable(field: Field) -> Option<&'static Buildable> {
    BUILDABLES.iter().find(|b| b.field == field)
}

/// What happened during one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// Round number after advancing.
    pub round: u32,
    /// Money collected from buildings.
    pub income: i32,
    /// Salary paid.
    pub upkeep: i32,
    /// Sites finished this round.
    pub completed: Vec<(Coord, Field)>,
    /// Balance at the end of the round.
    pub money: i32,
}

impl RoundReport {
    /// Check if the round ended with negative money.
    #[must_use]
    pub const fn bankrupt(&self) -> bool {
        self.money < 0
    }
}

impl Town {
    /// Open a construction site for `field` on an explored, empty cell and
    /// pay for it.
    ///
    /// # Errors
    ///
    /// Fails if the field is not buildable, the cell is hidden or not
    /// empty, the construction list is full, or money is short. Nothing
    /// changes on failure.
    pub fn construct(&mut self, field: Field, at: Coord) -> Result<(), TownError> {
        let rules = buildable(field).ok_or(TownError::NotBuildable(field))?;
        self.require_visible(at)?;
        let current = self.field(at).unwrap_or_default();
        if current != Field::Empty {
            return Err(TownError::NotEmpty { at, field: current });
        }
        if self.money < rules.cost {
            return Err(TownError::InsufficientFunds {
                cost: rules.cost,
                money: self.money,
            });
        }
        self.add_construction(Construction {
            target: field,
            at,
            progress: 0,
        })?;
        self.spend(rules.cost)?;
        self.set_field(at, Field::Construction);
        Ok(())
    }

    /// Tear down whatever stands on an explored cell, cancelling its
    /// construction entry if it is a site.
    ///
    /// Returns the field that was removed.
    ///
    /// # Errors
    ///
    /// Fails on hidden or empty cells and on the administration.
    pub fn destruct(&mut self, at: Coord) -> Result<Field, TownError> {
        self.require_visible(at)?;
        let current = self.field(at).unwrap_or_default();
        match current {
            Field::Empty => return Err(TownError::NothingToDestruct(at)),
            Field::Administration => return Err(TownError::Indestructible(at)),
            Field::Construction => {
                if let Some(index) = self.construction_at(at) {
                    self.remove_construction(index);
                }
            }
            Field::Tree(_) | Field::Quarry => {}
        }
        self.set_field(at, Field::Empty);
        Ok(current)
    }

    /// Advance the town by one round.
    pub fn pass_round(&mut self) -> RoundReport {
        self.round = self.round.saturating_add(1);

        let income: i32 = self
            .fields
            .iter()
            .filter_map(|(_, field)| buildable(field).map(|b| b.income))
            .sum();
        let upkeep = self.administrator().map_or(0, |a| a.salary);
        self.money = self.money.saturating_add(income).saturating_sub(upkeep);

        let mut completed = Vec::new();
        let mut index = 0;
        while index < self.constructions.len() {
            let site = &mut self.constructions[index];
            site.progress = site.progress.saturating_add(1);
            let done = buildable(site.target).is_none_or(|b| site.progress >= b.build_rounds);
            if done {
                let site = self.constructions.remove(index);
                self.set_field(site.at, site.target);
                completed.push((site.at, site.target));
            } else {
                index += 1;
            }
        }

        RoundReport {
            round: self.round,
            income,
            upkeep,
            completed,
            money: self.money,
        }
    }

    /// Advance up to `rounds` rounds, stopping early after the first round
    /// that ends bankrupt.
    pub fn pass_time(&mut self, rounds: u32) -> Vec<RoundReport> {
        let mut reports = Vec::new();
        for _ in 0..rounds {
            let report = self.pass_round();
            let bankrupt = report.bankrupt();
            reports.push(report);
            if bankrupt {
                break;
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::town::{TreeKind, TOWN_START_MONEY, TOWN_TIME_BEGIN};

    #[test]
    fn test_construct_pays_and_marks_site() {
        let mut town = Town::new(0).unwrap();
        town.construct(Field::Quarry, Coord::new(6, 6)).unwrap();
        assert_eq!(town.money, TOWN_START_MONEY - 20);
        assert_eq!(town.field(Coord::new(6, 6)), Some(Field::Construction));
        assert_eq!(town.constructions().len(), 1);
    }

    #[test]
    fn test_construct_rejections() {
        let mut town = Town::new(0).unwrap();
        town.set_hidden(Coord::new(0, 0), true);
        town.set_field(Coord::new(1, 0), Field::Tree(TreeKind::Pine));
        let before = town.clone();

        assert_eq!(
            town.construct(Field::Administration, Coord::new(2, 2)),
            Err(TownError::NotBuildable(Field::Administration))
        );
        assert_eq!(
            town.construct(Field::Quarry, Coord::new(0, 0)),
            Err(TownError::Hidden(Coord::new(0, 0)))
        );
        assert!(matches!(
            town.construct(Field::Quarry, Coord::new(1, 0)),
            Err(TownError::NotEmpty { .. })
        ));
        town.money = 3;
        assert!(matches!(
            town.construct(Field::Quarry, Coord::new(2, 2)),
            Err(TownError::InsufficientFunds { .. })
        ));
        town.money = before.money;
        assert_eq!(town, before);
    }

    #[test]
    fn test_destruct_cancels_site() {
        let mut town = Town::new(0).unwrap();
        town.construct(Field::Quarry, Coord::new(3, 3)).unwrap();
        assert_eq!(town.destruct(Coord::new(3, 3)), Ok(Field::Construction));
        assert!(town.constructions().is_empty());
        assert_eq!(town.field(Coord::new(3, 3)), Some(Field::Empty));
        assert_eq!(
            town.destruct(Coord::new(3, 3)),
            Err(TownError::NothingToDestruct(Coord::new(3, 3)))
        );
    }

    #[test]
    fn test_administration_is_indestructible() {
        let mut town = Town::new(0).unwrap();
        town.set_field(Coord::new(7, 7), Field::Administration);
        assert_eq!(
            town.destruct(Coord::new(7, 7)),
            Err(TownError::Indestructible(Coord::new(7, 7)))
        );
    }

    #[test]
    fn test_rounds_complete_construction_and_pay_salary() {
        let mut town = Town::new(0).unwrap();
        town.construct(Field::Quarry, Coord::new(6, 6)).unwrap();
        let reports = town.pass_time(3);
        assert_eq!(reports.len(), 3);
        assert_eq!(town.round, TOWN_TIME_BEGIN + 3);
        assert_eq!(reports[2].completed, vec![(Coord::new(6, 6), Field::Quarry)]);
        assert_eq!(town.field(Coord::new(6, 6)), Some(Field::Quarry));
        assert!(town.constructions().is_empty());
        // 30 after building, three salaries of 2.
        assert_eq!(town.money, 24);

        let report = town.pass_round();
        assert_eq!(report.income, 2);
        assert_eq!(report.upkeep, 2);
        assert_eq!(town.money, 24);
    }

    #[test]
    fn test_pass_time_stops_at_bankruptcy() {
        let mut town = Town::new(0).unwrap();
        town.money = 3;
        let reports = town.pass_time(10);
        assert_eq!(reports.len(), 2);
        assert!(reports[1].bankrupt());
        assert!(town.is_bankrupt());
    }
}
