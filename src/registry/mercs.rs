//! Mercenary archetypes and the weapons they carry.

/// Identifier of a mercenary archetype.
pub type MercKindId = u8;

/// Identifier of a weapon.
pub type WeaponId = u8;

/// Battlefield role of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MercRole {
    /// Line infantry.
    Soldier,
    /// Fast, lightly armed.
    Scout,
    /// Slow, heavily armed.
    Heavy,
}

/// A weapon profile.
///
/// Damage falls off linearly past `optimal_range`; targets further than
/// `range` cannot be hit at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weapon {
    /// Display name.
    pub name: &'static str,
    /// Damage at or inside the optimal range.
    pub damage: u32,
    /// Maximum Manhattan distance to the target.
    pub range: u32,
    /// Distance up to which full damage applies.
    pub optimal_range: u32,
    /// Damage lost per tile beyond the optimal range.
    pub falloff: u32,
}

/// Static definition of a mercenary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MercArchetype {
    /// Display name.
    pub name: &'static str,
    /// Role.
    pub role: MercRole,
    /// Hit points of a fresh unit.
    pub max_hp: u32,
    /// Maximum Manhattan distance per move.
    pub speed: u32,
    /// Weapon slots 0 and 1.
    pub weapons: [WeaponId; 2],
    /// Money needed to hire one.
    pub hire_cost: i32,
}

static WEAPONS: [Weapon; 5] = [
    Weapon {
        name: "fists",
        damage: 2,
        range: 1,
        optimal_range: 1,
        falloff: 0,
    },
    Weapon {
        name: "knife",
        damage: 4,
        range: 1,
        optimal_range: 1,
        falloff: 0,
    },
    Weapon {
        name: "pistol",
        damage: 5,
        range: 4,
        optimal_range: 2,
        falloff: 1,
    },
    Weapon {
        name: "rifle",
        damage: 8,
        range: 7,
        optimal_range: 4,
        falloff: 1,
    },
    Weapon {
        name: "shotgun",
        damage: 12,
        range: 3,
        optimal_range: 1,
        falloff: 4,
    },
];

static ARCHETYPES: [MercArchetype; 3] = [
    MercArchetype {
        name: "rifleman",
        role: MercRole::Soldier,
        max_hp: 20,
        speed: 3,
        weapons: [3, 1],
        hire_cost: 15,
    },
    MercArchetype {
        name: "scout",
        role: MercRole::Scout,
        max_hp: 12,
        speed: 5,
        weapons: [2, 1],
        hire_cost: 10,
    },
    MercArchetype {
        name: "heavy",
        role: MercRole::Heavy,
        max_hp: 35,
        speed: 2,
        weapons: [4, 0],
        hire_cost: 25,
    },
];

/// All archetypes, ordered by id.
#[must_use]
pub fn archetypes() -> &'static [MercArchetype] {
    &ARCHETYPES
}

/// Look up an archetype by id.
#[must_use]
pub fn archetype(id: MercKindId) -> Option<&'static MercArchetype> {
    ARCHETYPES.get(usize::from(id))
}

/// Look up a weapon by id.
#[must_use]
pub fn weapon(id: WeaponId) -> Option<&'static Weapon> {
    WEAPONS.get(usize::from(id))
}

impl Weapon {
    /// Damage dealt to a target `distance` tiles away, or `None` if the
    /// target is out of range. A hit always deals at least 1 damage.
    #[must_use]
    pub fn damage_at(&self, distance: u32) -> Option<u32> {
        if distance > self.range {
            return None;
        }
        let lost = self
            .falloff
            .saturating_mul(distance.saturating_sub(self.optimal_range));
        Some(self.damage.saturating_sub(lost).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_archetype_weapon_exists() {
        for kind in archetypes() {
            for id in kind.weapons {
                assert!(weapon(id).is_some(), "{} has unknown weapon {id}", kind.name);
            }
        }
    }

    #[test]
    fn test_damage_falloff() {
        let rifle = weapon(3).unwrap();
        assert_eq!(rifle.damage_at(4), Some(8));
        assert_eq!(rifle.damage_at(6), Some(6));
        assert_eq!(rifle.damage_at(8), None);

        let shotgun = weapon(4).unwrap();
        assert_eq!(shotgun.damage_at(1), Some(12));
        assert_eq!(shotgun.damage_at(3), Some(4));
    }

    #[test]
    fn test_damage_never_below_one() {
        let weak = Weapon {
            name: "twig",
            damage: 1,
            range: 5,
            optimal_range: 0,
            falloff: 10,
        };
        assert_eq!(weak.damage_at(5), Some(1));
    }
}
