//! Deterministic town generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::registry::AdminId;
use crate::town::grid::{coords, Field, TreeKind};
use crate::town::state::{Region, Town, TownError, SPAWN};

/// Rolls above this percentage grow a tree.
const TREE_THRESHOLD: u32 = 40;

/// Area visible when a town is founded.
pub const EXPOSED: Region = Region::new(4, 4, 11, 11);

/// Area cleared of trees around the headquarters.
pub const SAFE_ZONE: Region = Region::new(5, 5, 10, 10);

/// Generate a new town for `admin` from `seed`.
///
/// The same seed always yields the same terrain. Steps, in order:
/// roll terrain and hide every cell, reveal [`EXPOSED`], clear trees from
/// [`SAFE_ZONE`], place the administration at [`SPAWN`].
///
/// # Errors
///
/// Returns [`TownError::UnknownAdmin`] if `admin` is not in the roster.
pub fn generate(admin: AdminId, seed: u64) -> Result<Town, TownError> {
    let mut town = Town::new(admin)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for at in coords() {
        let roll: u32 = rng.gen_range(0..100);
        let field = if roll > TREE_THRESHOLD {
            Field::Tree(match roll % 3 {
                0 => TreeKind::Oak,
                1 => TreeKind::Pine,
                _ => TreeKind::Birch,
            })
        } else {
            Field::Empty
        };
        town.set_field(at, field);
        town.set_hidden(at, true);
    }

    for at in EXPOSED.coords() {
        town.set_hidden(at, false);
    }

    for at in SAFE_ZONE.coords() {
        if town.field(at).is_some_and(Field::is_tree) {
            town.set_field(at, Field::Empty);
        }
    }

    town.set_field(SPAWN, Field::Administration);
    let trees = town.fields().iter().filter(|(_, f)| f.is_tree()).count();
    tracing::debug!(seed, admin, trees, "generated town");
    Ok(town)
}
