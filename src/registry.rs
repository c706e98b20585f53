//! Immutable reference data: administrators, mercenary archetypes and
//! weapons.
//!
//! Towns and save files only ever store the integer ids defined here.

mod admins;
mod mercs;

pub use admins::{admin, admins, Administrator, AdminId, Gender};
pub use mercs::{archetype, archetypes, weapon, MercKindId, MercRole, MercArchetype, Weapon, WeaponId};
