//! Town simulation.
//!
//! Implements the world model on top of the static registries:
//! - A fixed 15x15 grid of fields with fog-of-war
//! - Procedural generation from an explicit seed
//! - Mercenaries and construction sites
//! - Combat and the per-round economy

mod combat;
mod economy;
mod generate;
mod grid;
mod render;
mod roster;
mod state;

pub use combat::{AttackOutcome, HurtOutcome};
pub use economy::{buildable, Buildable, RoundReport, BUILDABLES};
pub use generate::{generate, EXPOSED, SAFE_ZONE};
pub use grid::{coords, Coord, Field, Grid, TreeKind, HEIGHT, WIDTH};
pub(crate) use render::glyph_rows;
pub use render::render_ascii;
pub use roster::{
    Construction, Faction, Mercenary, MoveOutcome, MAX_CONSTRUCTIONS, MAX_MERCENARIES,
};
pub use state::{Region, Town, TownError, SPAWN, TOWN_START_MONEY, TOWN_TIME_BEGIN};
