//! Combat resolution.
//!
//! Attacks use the attacker's weapon table entry for the chosen slot.
//! Damage falls off with distance past the weapon's optimal range, and a
//! mercenary reduced to zero hit points is removed from the town.

use crate::registry;
use crate::town::grid::Coord;
use crate::town::roster::Faction;
use crate::town::state::{Town, TownError};

/// Result of an attack order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Weapon that was fired.
    pub weapon: &'static str,
    /// Damage dealt.
    pub damage: u32,
    /// Target hit points after the hit.
    pub remaining_hp: u32,
    /// Whether the target died and was removed.
    pub killed: bool,
}

/// Result of applying raw damage to a mercenary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HurtOutcome {
    /// Hit points after the damage.
    pub remaining_hp: u32,
    /// Whether the mercenary died and was removed.
    pub killed: bool,
}

impl Town {
    /// Fire the weapon in `slot` of the town mercenary at `from` at the
    /// mercenary standing on `to`.
    ///
    /// # Errors
    ///
    /// Fails if no controllable attacker is at `from`, no target is at
    /// `to`, the slot is not 0 or 1, or the target is out of range. The
    /// town is unchanged on failure.
    pub fn attack(&mut self, from: Coord, to: Coord, slot: i64) -> Result<AttackOutcome, TownError> {
        Self::require_in_bounds(from)?;
        Self::require_in_bounds(to)?;
        let attacker_index = self.mercenary_at(from).ok_or(TownError::NoMercenary(from))?;
        let attacker = self.mercenaries[attacker_index];
        if attacker.faction != Faction::Town {
            return Err(TownError::NotControllable(from));
        }
        if self.mercenary_at(to).is_none() || from == to {
            return Err(TownError::NoMercenary(to));
        }

        let weapon_id = usize::try_from(slot)
            .ok()
            .and_then(|slot| attacker.archetype().and_then(|a| a.weapons.get(slot).copied()))
            .ok_or(TownError::UnknownWeaponSlot(slot))?;
        let weapon = registry::weapon(weapon_id).ok_or(TownError::UnknownWeaponSlot(slot))?;

        let distance = from.manhattan(to);
        let damage = weapon.damage_at(distance).ok_or(TownError::OutOfRange {
            weapon: weapon.name,
            distance,
            range: weapon.range,
        })?;

        let hurt = self.hurt(to, damage)?;
        Ok(AttackOutcome {
            weapon: weapon.name,
            damage,
            remaining_hp: hurt.remaining_hp,
            killed: hurt.killed,
        })
    }

    /// Apply `amount` damage to the mercenary at `at`, removing it if its
    /// hit points reach zero.
    ///
    /// # Errors
    ///
    /// Fails if no mercenary stands on the cell.
    pub fn hurt(&mut self, at: Coord, amount: u32) -> Result<HurtOutcome, TownError> {
        Self::require_in_bounds(at)?;
        let index = self.mercenary_at(at).ok_or(TownError::NoMercenary(at))?;
        let target = &mut self.mercenaries[index];
        target.hp = target.hp.saturating_sub(amount);
        let remaining_hp = target.hp;
        let killed = remaining_hp == 0;
        if killed {
            self.remove_mercenary(index);
        }
        Ok(HurtOutcome {
            remaining_hp,
            killed,
        })
    }
}
