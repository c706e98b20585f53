//! Integration tests for saving and loading towns.
//!
//! Run with: cargo test persistence

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::fs;

use townhall::codec::{self, CodecError};
use townhall::store::{DataDir, PersistError, StoreError};
use townhall::town::{generate, Coord, Faction, Field, SPAWN, TOWN_START_MONEY, TOWN_TIME_BEGIN};
use townhall::{ErrorKind, TownError};

/// Offset of the grid width in the save layout.
const WIDTH_OFFSET: usize = 24;

fn busy_town() -> townhall::Town {
    let mut town = generate(1, 77).unwrap();
    town.construct(Field::Quarry, Coord::new(6, 6)).unwrap();
    town.hire_mercenary(0, Coord::new(5, 9)).unwrap();
    town.spawn_mercenary(2, Coord::new(9, 5), Faction::Raider).unwrap();
    town.pass_time(2);
    town
}

#[test]
fn test_roundtrip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    let town = busy_town();
    store.save("Roundtrip", &town).unwrap();
    assert_eq!(store.load("Roundtrip").unwrap(), town);
}

#[test]
fn test_second_save_keeps_first_as_byte_identical_backup() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();

    let mut town = generate(0, 5).unwrap();
    store.save("Twice", &town).unwrap();
    let first = fs::read(store.town_path("Twice")).unwrap();

    town.pass_time(1);
    let report = store.save("Twice", &town).unwrap();
    assert!(report.backed_up);
    assert!(report.backup_warning.is_none());

    assert_eq!(fs::read(store.backup_path("Twice")).unwrap(), first);
    assert_eq!(store.load("Twice").unwrap(), town);
}

#[test]
fn test_grid_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    let town = generate(0, 1).unwrap();
    store.save("Skewed", &town).unwrap();

    let path = store.town_path("Skewed");
    let mut bytes = fs::read(&path).unwrap();
    bytes[WIDTH_OFFSET..WIDTH_OFFSET + 4].copy_from_slice(&16u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = store.load("Skewed").unwrap_err();
    assert!(matches!(
        err,
        PersistError::Codec(CodecError::GridMismatch { width: 16, .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_truncated_file_is_rejected() {
    let bytes = codec::to_bytes(&busy_town());
    for len in [0, 10, WIDTH_OFFSET + 2, bytes.len() / 2, bytes.len() - 1] {
        assert!(codec::from_bytes(&bytes[..len]).is_err(), "length {len}");
    }
}

#[test]
fn test_hire_alpha_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let data = DataDir::new(dir.path());
    data.ensure().unwrap();
    let store = data.towns();

    let report = store.found(0, "Alpha", 123, false).unwrap();
    assert!(!report.backed_up);
    assert_eq!(report.path, store.town_path("Alpha"));
    assert!(store.town_path("Alpha").is_file());
    assert_eq!(store.list().unwrap(), vec!["Alpha"]);

    let town = store.load("Alpha").unwrap();
    assert_eq!(town.admin, 0);
    assert_eq!(town.count(Field::Administration), 1);
    assert_eq!(town.field(SPAWN), Some(Field::Administration));
    assert_eq!(town.round, TOWN_TIME_BEGIN);
    assert_eq!(town.money, TOWN_START_MONEY);
}

#[test]
fn test_found_rejects_unknown_admin() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    let err = store.found(9, "Nowhere", 1, false).unwrap_err();
    assert!(matches!(err, PersistError::Town(TownError::UnknownAdmin(9))));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!store.exists("Nowhere"));
    assert!(!store.dir().exists());
}

#[test]
fn test_found_refuses_existing_town_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    store.found(0, "Alpha", 1, false).unwrap();
    let first = fs::read(store.town_path("Alpha")).unwrap();

    let err = store.found(1, "Alpha", 2, false).unwrap_err();
    assert!(matches!(err, PersistError::Store(StoreError::AlreadyExists(ref name)) if name == "Alpha"));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fs::read(store.town_path("Alpha")).unwrap(), first);
    assert!(!store.backup_path("Alpha").exists());

    let report = store.found(1, "Alpha", 2, true).unwrap();
    assert!(report.backed_up);
    assert_eq!(fs::read(store.backup_path("Alpha")).unwrap(), first);
    assert_eq!(store.load("Alpha").unwrap().admin, 1);
}

#[test]
fn test_failed_write_keeps_previous_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    let mut town = generate(0, 3).unwrap();
    store.save("Sturdy", &town).unwrap();
    let first = fs::read(store.town_path("Sturdy")).unwrap();

    // A directory in the scratch file's place makes the write fail.
    fs::create_dir(store.temp_path("Sturdy")).unwrap();
    town.pass_time(1);
    let err = store.save("Sturdy", &town).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    assert!(store.exists("Sturdy"));
    assert_eq!(fs::read(store.town_path("Sturdy")).unwrap(), first);
    assert!(!store.backup_path("Sturdy").exists());
    assert_eq!(store.list().unwrap(), vec!["Sturdy"]);
}

#[test]
fn test_invalid_names_never_touch_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataDir::new(dir.path()).towns();
    let town = generate(0, 1).unwrap();
    let err = store.save("../escape", &town).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!store.dir().exists());
}
