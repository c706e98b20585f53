//! A connected session: the command console and the view loop.
//!
//! The calling thread runs the console; a second thread drives a [`View`].
//! Both share the town through [`SharedTown`]. The console takes the write
//! lock once per command, the view clones a snapshot under the read lock
//! once per frame.
//!
//! State machine: `Init -> Running -> Stopping -> Stopped`. The coordinator
//! owns every transition except one: if view setup fails, the view thread
//! moves the session straight from `Init` to `Stopped` and the console
//! never starts.

mod input;
mod signal;
mod view;

pub use input::{scripted, spawn_line_reader, spawn_stdin_reader};
pub use signal::{SessionState, SharedState, ShutdownFlag, ViewStatus};
pub use view::{HeadlessHandle, HeadlessView, TerminalView, View, ViewError, ViewEvent};

use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::console::{Flow, Interpreter};
use crate::error::ErrorKind;
use crate::town::Town;

/// Console prompt.
pub const PROMPT: &str = "> ";

/// A town shared between the console and the view thread.
#[derive(Debug, Clone)]
pub struct SharedTown(Arc<RwLock<Town>>);

impl SharedTown {
    /// Wrap a town.
    #[must_use]
    pub fn new(town: Town) -> Self {
        Self(Arc::new(RwLock::new(town)))
    }

    /// Shared access. A panic in another holder does not poison the town
    /// for later readers.
    pub fn read(&self) -> RwLockReadGuard<'_, Town> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Town> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Town {
        self.read().clone()
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The `exit` command.
    Exit,
    /// Money went negative.
    Bankrupt,
    /// Console input ended.
    EndOfInput,
    /// The view was closed.
    ViewClosed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StopReason::Exit => "exit",
            StopReason::Bankrupt => "bankruptcy",
            StopReason::EndOfInput => "end of input",
            StopReason::ViewClosed => "view closed",
        })
    }
}

/// Outcome of a session that ran.
#[derive(Debug)]
pub struct SessionSummary {
    /// What ended it.
    pub reason: StopReason,
    /// State after teardown; [`SessionState::Stopped`] once the view
    /// thread has been joined.
    pub state: SessionState,
    /// Non-blank lines handled by the console.
    pub commands_executed: u64,
    /// Frames presented by the view.
    pub frames_drawn: u64,
    /// Final save of a dirty town: `None` if the town was clean.
    pub final_save: Option<Result<std::path::PathBuf, String>>,
}

/// Failures that prevent or abort a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The view could not be set up.
    #[error("view setup failed: {0}")]
    ViewSetup(String),
    /// The view thread could not be started.
    #[error("cannot start the view thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The view thread panicked.
    #[error("the view thread panicked")]
    ViewPanicked,
    /// Writing console output failed.
    #[error("console output failed: {0}")]
    Output(#[source] std::io::Error),
}

impl SessionError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            SessionError::ViewSetup(_) | SessionError::Spawn(_) | SessionError::ViewPanicked => {
                ErrorKind::Environment
            }
            SessionError::Output(_) => ErrorKind::Io,
        }
    }
}

enum ConsoleEvent {
    Line(String),
    InputClosed,
    View(ViewStatus),
    ViewGone,
}

/// Run the view loop until shutdown is requested or the view closes.
///
/// Returns the number of frames drawn.
fn view_loop<V: View>(
    mut view: V,
    town: &SharedTown,
    config: &Config,
    state: &SharedState,
    shutdown: &ShutdownFlag,
    status: &Sender<ViewStatus>,
) -> u64 {
    if let Err(e) = view.setup(config) {
        state.advance(SessionState::Stopped);
        let _ = status.send(ViewStatus::Failed(e.to_string()));
        return 0;
    }
    let _ = status.send(ViewStatus::Ready);

    let interval = config.frame_interval();
    let mut frames = 0u64;
    while !shutdown.is_requested() {
        let started = Instant::now();
        let snapshot = town.snapshot();
        let closed = match view.draw(&snapshot) {
            Ok(()) => {
                frames += 1;
                matches!(view.poll(), Ok(Some(ViewEvent::Close)) | Err(_))
            }
            Err(e) => {
                warn!(error = %e, "view output failed");
                true
            }
        };
        if closed {
            info!("view closed");
            let _ = status.send(ViewStatus::Closed);
            break;
        }
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest.min(Duration::from_millis(250)));
        }
    }

    view.teardown();
    frames
}

fn next_event(lines: &Receiver<String>, status: &Receiver<ViewStatus>) -> ConsoleEvent {
    select! {
        recv(lines) -> line => line.map_or(ConsoleEvent::InputClosed, ConsoleEvent::Line),
        recv(status) -> message => message.map_or(ConsoleEvent::ViewGone, ConsoleEvent::View),
    }
}

/// Run a session to completion.
///
/// Starts the view thread, waits for its setup, then feeds `lines` to the
/// interpreter and writes replies to `out` until a stop condition. A dirty
/// town is saved after the view thread has exited.
///
/// # Errors
///
/// Returns [`SessionError::ViewSetup`] if the view cannot be shown (no
/// command is executed), or another [`SessionError`] if the view thread
/// fails or console output cannot be written.
pub fn run_session<V, W>(
    interpreter: &mut Interpreter,
    view: V,
    lines: &Receiver<String>,
    out: &mut W,
) -> Result<SessionSummary, SessionError>
where
    V: View + 'static,
    W: Write,
{
    let state = SharedState::new();
    let shutdown = ShutdownFlag::new();
    let (status_tx, status_rx) = bounded::<ViewStatus>(4);

    let handle = {
        let town = interpreter.town();
        let config = interpreter.config().clone();
        let state = state.clone();
        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name("townhall-view".into())
            .spawn(move || view_loop(view, &town, &config, &state, &shutdown, &status_tx))
            .map_err(SessionError::Spawn)?
    };

    match status_rx.recv() {
        Ok(ViewStatus::Ready) => {}
        Ok(ViewStatus::Failed(message)) => {
            let _ = handle.join();
            return Err(SessionError::ViewSetup(message));
        }
        Ok(ViewStatus::Closed) | Err(_) => {
            return Err(match handle.join() {
                Ok(_) => SessionError::ViewSetup("view exited during setup".into()),
                Err(_) => SessionError::ViewPanicked,
            });
        }
    }
    if state.advance(SessionState::Running) != SessionState::Init {
        shutdown.request();
        let _ = handle.join();
        return Err(SessionError::ViewSetup("view stopped during setup".into()));
    }
    info!(town = interpreter.town_name(), "session running");

    let mut commands_executed = 0u64;
    let reason = loop {
        write!(out, "{PROMPT}")
            .and_then(|()| out.flush())
            .map_err(SessionError::Output)?;

        match next_event(lines, &status_rx) {
            ConsoleEvent::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                commands_executed += 1;
                let reply = interpreter.execute(&line);
                if !reply.text.is_empty() {
                    writeln!(out, "{}", reply.text.trim_end()).map_err(SessionError::Output)?;
                }
                match reply.flow {
                    Flow::Continue => {}
                    Flow::Exit => break StopReason::Exit,
                    Flow::Bankrupt => break StopReason::Bankrupt,
                }
            }
            ConsoleEvent::InputClosed => {
                writeln!(out).map_err(SessionError::Output)?;
                break StopReason::EndOfInput;
            }
            ConsoleEvent::View(ViewStatus::Closed) | ConsoleEvent::ViewGone => {
                writeln!(out, "view closed").map_err(SessionError::Output)?;
                break StopReason::ViewClosed;
            }
            ConsoleEvent::View(other) => debug!(status = ?other, "ignoring view status"),
        }
    };

    state.advance(SessionState::Stopping);
    shutdown.request();
    info!(%reason, "session stopping");
    let frames_drawn = handle.join().map_err(|_| SessionError::ViewPanicked)?;
    state.advance(SessionState::Stopped);
    debug!(state = ?state.get(), frames_drawn, "view thread joined");

    let final_save = interpreter.save_if_dirty().map(|result| match result {
        Ok(report) => {
            let _ = writeln!(out, "saved town to {}", report.path.display());
            if let Some(warning) = &report.backup_warning {
                let _ = writeln!(out, "warning: {warning}");
            }
            Ok(report.path)
        }
        Err(e) => {
            let _ = writeln!(out, "error: final save failed: {e}");
            Err(e.to_string())
        }
    });

    info!(commands_executed, frames_drawn, "session stopped");
    Ok(SessionSummary {
        reason,
        state: state.get(),
        commands_executed,
        frames_drawn,
        final_save,
    })
}
