//! Integration tests for town generation.
//!
//! Run with: cargo test generation

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use townhall::registry::admins;
use townhall::Town;
use townhall::town::{
    coords, generate, Coord, Field, EXPOSED, HEIGHT, SAFE_ZONE, SPAWN, TOWN_START_MONEY,
    TOWN_TIME_BEGIN, WIDTH,
};

#[test]
fn test_generated_town_layout_over_many_seeds() {
    for seed in 0..50 {
        let town = generate(0, seed).unwrap();
        assert_eq!(town.count(Field::Administration), 1, "seed {seed}");
        assert_eq!(town.field(SPAWN), Some(Field::Administration));
        assert_eq!(coords().count(), WIDTH * HEIGHT);

        for at in coords() {
            let field = town.field(at).unwrap();
            if SAFE_ZONE.contains(at) {
                assert!(!field.is_tree(), "seed {seed}: tree at {at}");
            }
            assert_eq!(town.is_hidden(at), !EXPOSED.contains(at), "seed {seed}: {at}");
        }
    }
}

#[test]
fn test_fresh_town_counters() {
    for record in admins() {
        let town = generate(record.id, 99).unwrap();
        assert_eq!(town.admin, record.id);
        assert_eq!(town.round, TOWN_TIME_BEGIN);
        assert_eq!(town.money, TOWN_START_MONEY);
        assert!(town.constructions().is_empty());
        assert!(town.mercenaries().is_empty());
    }
}

#[test]
fn test_terrain_has_trees_outside_the_safe_zone() {
    let trees: usize = (0..10)
        .map(|seed| count_trees(&generate(1, seed).unwrap()))
        .sum();
    assert!(trees > 0);
}

#[test]
fn test_seed_determinism_covers_hidden_cells() {
    let a = generate(3, 2024).unwrap();
    let b = generate(3, 2024).unwrap();
    let corner = Coord::new(0, 0);
    assert!(a.is_hidden(corner));
    assert_eq!(a.field(corner), b.field(corner));
    assert_eq!(a, b);
}

fn count_trees(town: &Town) -> usize {
    town.fields().iter().filter(|(_, f)| f.is_tree()).count()
}
