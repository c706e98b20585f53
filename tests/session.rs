//! Integration tests for the two-thread session.
//!
//! Run with: cargo test --test session

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use tempfile::TempDir;
use townhall::session::{
    run_session, scripted, HeadlessView, SessionError, SessionState, StopReason, TerminalView,
};
use townhall::store::DataDir;
use townhall::town::{generate, TOWN_TIME_BEGIN};
use townhall::{Config, ErrorKind, Interpreter};

fn interpreter(dir: &TempDir) -> Interpreter {
    let data = DataDir::new(dir.path());
    let mut config = Config::default();
    config.set("framerate", "200").unwrap();
    Interpreter::new(
        generate(2, 8).unwrap(),
        "Harbor",
        data.towns(),
        config,
        data.config_path(),
    )
}

#[test]
fn test_exit_command_ends_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    let lines = scripted(["status", "", "exit", "status"]);
    let mut out = Vec::new();

    let summary = run_session(&mut console, HeadlessView::new(), &lines, &mut out).unwrap();
    assert_eq!(summary.reason, StopReason::Exit);
    assert_eq!(summary.state, SessionState::Stopped);
    assert_eq!(summary.commands_executed, 2);
    assert!(summary.final_save.is_none());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Harbor"));
    assert!(text.contains("leaving Harbor"));
}

#[test]
fn test_end_of_input_saves_dirty_town() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    let lines = scripted(["pass-time 2"]);
    let mut out = Vec::new();

    let summary = run_session(&mut console, HeadlessView::new(), &lines, &mut out).unwrap();
    assert_eq!(summary.reason, StopReason::EndOfInput);
    assert_eq!(summary.state, SessionState::Stopped);
    assert!(matches!(summary.final_save, Some(Ok(_))));

    let saved = DataDir::new(dir.path()).towns().load("Harbor").unwrap();
    assert_eq!(saved.round, 10);
    assert_eq!(saved, console.town().snapshot());
}

#[test]
fn test_bankruptcy_ends_session_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    console.town().write().money = 0;
    let lines = scripted(["pt 10", "status"]);
    let mut out = Vec::new();

    let summary = run_session(&mut console, HeadlessView::new(), &lines, &mut out).unwrap();
    assert_eq!(summary.reason, StopReason::Bankrupt);
    assert_eq!(summary.state, SessionState::Stopped);
    assert_eq!(summary.commands_executed, 1);
    let saved = DataDir::new(dir.path()).towns().load("Harbor").unwrap();
    assert!(saved.money < 0);
}

#[test]
fn test_closing_the_view_stops_the_console() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    let (_keep_open, lines) = unbounded::<String>();
    let view = HeadlessView::new();
    let handle = view.handle();

    let closer = {
        let handle = handle.clone();
        thread::spawn(move || {
            while handle.frames() < 3 {
                thread::sleep(Duration::from_millis(5));
            }
            handle.close();
        })
    };

    let mut out = Vec::new();
    let summary = run_session(&mut console, view, &lines, &mut out).unwrap();
    closer.join().unwrap();
    assert_eq!(summary.reason, StopReason::ViewClosed);
    assert_eq!(summary.state, SessionState::Stopped);
    assert!(summary.frames_drawn >= 3);
    assert_eq!(summary.frames_drawn, handle.frames());
}

#[test]
fn test_view_setup_failure_runs_no_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    let lines = scripted(["pass-time 5", "save"]);
    let view = TerminalView::new(dir.path().join("missing").join("tty"), "Harbor");
    let mut out = Vec::new();

    let err = run_session(&mut console, view, &lines, &mut out).unwrap_err();
    assert!(matches!(err, SessionError::ViewSetup(_)));
    assert_eq!(err.kind(), ErrorKind::Environment);
    assert!(out.is_empty());
    assert!(!console.is_dirty());
    assert!(!DataDir::new(dir.path()).towns().exists("Harbor"));
}

#[test]
fn test_view_draws_console_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = interpreter(&dir);
    let (sender, lines) = unbounded::<String>();
    let view = HeadlessView::new();
    let handle = view.handle();

    let driver = {
        let handle = handle.clone();
        thread::spawn(move || {
            while handle.last_round() != Some(TOWN_TIME_BEGIN) {
                thread::sleep(Duration::from_millis(5));
            }
            sender.send("pt 1".into()).unwrap();
            let mut waited = 0;
            while handle.last_round() != Some(TOWN_TIME_BEGIN + 1) && waited < 2000 {
                thread::sleep(Duration::from_millis(5));
                waited += 1;
            }
            let seen = handle.last_round();
            sender.send("q".into()).unwrap();
            seen
        })
    };

    let mut out = Vec::new();
    let summary = run_session(&mut console, view, &lines, &mut out).unwrap();
    let seen = driver.join().unwrap();
    assert_eq!(seen, Some(TOWN_TIME_BEGIN + 1));
    assert_eq!(summary.reason, StopReason::Exit);
    assert_eq!(summary.state, SessionState::Stopped);
    assert!(matches!(summary.final_save, Some(Ok(_))));
}
