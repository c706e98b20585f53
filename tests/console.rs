//! Integration tests for the command console.
//!
//! Run with: cargo test --test console

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use tempfile::TempDir;
use townhall::console::{CommandError, Flow, Interpreter};
use townhall::store::DataDir;
use townhall::town::{generate, Coord, TownError};
use townhall::{Config, ErrorKind};

fn connect(dir: &TempDir, debug: bool) -> Interpreter {
    let data = DataDir::new(dir.path());
    Interpreter::new(
        generate(0, 42).unwrap(),
        "Alpha",
        data.towns(),
        Config::default(),
        data.config_path(),
    )
    .with_debug(debug)
}

#[test]
fn test_config_set_unknown_key_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    let config_path = DataDir::new(dir.path()).config_path();

    let err = console.try_execute("config-set shoe_size 44").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(console.config(), &Config::default());
    assert!(!config_path.exists());

    let err = console.try_execute("cs framerate fast").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!config_path.exists());
}

#[test]
fn test_merc_move_out_of_bounds_is_rejected_without_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    console.try_execute("hire-merc 0 6 6").unwrap();
    let before = console.town().snapshot();

    for line in ["mm 6 6 15 6", "mm 6 6 6 -1", "mm -3 6 6 6", "mm 6 6 99999 0"] {
        let err = console.try_execute(line).unwrap_err();
        assert!(
            matches!(err, CommandError::Town(TownError::OutOfBounds { .. })),
            "{line}: {err}"
        );
    }
    assert_eq!(console.town().snapshot(), before);
}

#[test]
fn test_unknown_command_reply() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    let before = console.town().snapshot();
    let reply = console.execute("teleport 1 1");
    assert_eq!(
        reply.text,
        "error: unrecognized command 'teleport'; type 'help' for a list of commands"
    );
    assert_eq!(reply.flow, Flow::Continue);
    assert_eq!(console.town().snapshot(), before);
}

#[test]
fn test_help_lists_every_public_command() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    let text = console.execute("h").text;
    for name in [
        "help", "save", "save-as", "exit", "config-set", "pass-time", "merc-move",
        "merc-attack", "construct", "destruct", "status", "map", "hire-merc",
    ] {
        assert!(text.contains(name), "missing {name}");
    }
    assert!(!text.contains("hurt"));
}

#[test]
fn test_too_many_arguments_is_unrecognized_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    let err = console.try_execute("ma 1 2 3 4 5 6 7").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedInput);
}

#[test]
fn test_fight_until_death_removes_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, true);
    console.try_execute("sm 0 6 6 town").unwrap();
    console.try_execute("sm 1 6 7 raider").unwrap();
    let target = Coord::new(6, 7);

    let mut replies = Vec::new();
    for _ in 0..10 {
        let reply = console.try_execute("ma 6 6 6 7 0").unwrap();
        let dead = reply.text.contains("dead");
        replies.push(reply.text);
        if dead {
            break;
        }
    }
    assert!(replies.last().unwrap().contains("dead"), "{replies:?}");
    assert!(console.town().read().mercenary_at(target).is_none());
    assert!(console.try_execute("ma 6 6 6 7 0").is_err());
}

#[test]
fn test_map_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    let map = console.try_execute("m").unwrap().text;
    assert!(map.contains('A'));
    let status = console.try_execute("st").unwrap().text;
    assert!(status.contains("Alpha"));
    assert!(status.contains("Edmund Gray"));
    assert!(status
        .lines()
        .any(|line| line.starts_with("money:") && line.ends_with(" 50")));
}

#[test]
fn test_save_writes_the_town() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = connect(&dir, false);
    console.try_execute("pt 3").unwrap();
    console.try_execute("s").unwrap();
    let loaded = DataDir::new(dir.path()).towns().load("Alpha").unwrap();
    assert_eq!(loaded, console.town().snapshot());
    assert!(!console.is_dirty());
}
