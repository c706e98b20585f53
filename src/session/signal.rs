//! Mailboxes between the console thread and the view thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// View setup has not answered yet.
    Init = 0,
    /// Both loops are running.
    Running = 1,
    /// Shutdown requested, the view loop is finishing.
    Stopping = 2,
    /// The view thread has exited.
    Stopped = 3,
}

impl SessionState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Init,
            1 => SessionState::Running,
            2 => SessionState::Stopping,
            _ => SessionState::Stopped,
        }
    }
}

/// Session state shared by both threads.
#[derive(Debug, Clone)]
pub struct SharedState(Arc<AtomicU8>);

impl SharedState {
    /// Start in [`SessionState::Init`].
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(SessionState::Init as u8)))
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move forward to `state` and return the state it replaced.
    ///
    /// States only ever advance: moving to an earlier state leaves the
    /// current one in place.
    pub fn advance(&self, state: SessionState) -> SessionState {
        SessionState::from_u8(self.0.fetch_max(state as u8, Ordering::AcqRel))
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// One-way stop request from the console to the view loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// Unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the view loop to stop.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check if a stop was requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Messages from the view thread to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// Setup finished, frames are being drawn.
    Ready,
    /// Setup failed with this message.
    Failed(String),
    /// The view was closed by the user or lost its device.
    Closed,
}
