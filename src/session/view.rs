//! The presentation side of a session.

mod terminal;

pub use terminal::TerminalView;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use thiserror::Error;

use crate::config::Config;
use crate::error::ErrorKind;
use crate::town::Town;

/// Failures of a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The output device could not be opened or prepared.
    #[error("cannot open view on {}: {source}", .device.display())]
    Setup {
        /// Device path.
        device: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Drawing or polling failed after setup.
    #[error("view output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ViewError::Setup { .. } => ErrorKind::Environment,
            ViewError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Events a view reports back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// The user closed the view.
    Close,
}

/// A presentation driven by the session's view thread.
///
/// `setup` runs once on the view thread before any frame. `draw` receives a
/// snapshot of the town, never the live state. `teardown` runs once when
/// the loop ends, including after a failed draw.
pub trait View: Send {
    /// Prepare the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be shown; the session then
    /// never starts its command loop.
    fn setup(&mut self, config: &Config) -> Result<(), ViewError>;

    /// Present one frame.
    ///
    /// # Errors
    ///
    /// A failure is treated as the view being closed.
    fn draw(&mut self, town: &Town) -> Result<(), ViewError>;

    /// Check for user events without blocking.
    ///
    /// # Errors
    ///
    /// A failure is treated as the view being closed.
    fn poll(&mut self) -> Result<Option<ViewEvent>, ViewError>;

    /// Release the output.
    fn teardown(&mut self);
}

/// Remote control for a [`HeadlessView`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessHandle {
    frames: Arc<AtomicU64>,
    last_round: Arc<AtomicU32>,
    closed: Arc<AtomicBool>,
}

impl HeadlessHandle {
    /// Make the view report [`ViewEvent::Close`] on its next poll.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Round shown in the most recent frame, `None` before the first one.
    #[must_use]
    pub fn last_round(&self) -> Option<u32> {
        match self.frames() {
            0 => None,
            _ => Some(self.last_round.load(Ordering::Acquire)),
        }
    }
}

/// A view that draws nothing.
#[derive(Debug, Default)]
pub struct HeadlessView {
    handle: HeadlessHandle,
}

impl HeadlessView {
    /// New view with a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle sharing this view's counters.
    #[must_use]
    pub fn handle(&self) -> HeadlessHandle {
        self.handle.clone()
    }
}

impl View for HeadlessView {
    fn setup(&mut self, _config: &Config) -> Result<(), ViewError> {
        Ok(())
    }

    fn draw(&mut self, town: &Town) -> Result<(), ViewError> {
        self.handle.last_round.store(town.round, Ordering::Release);
        self.handle.frames.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<ViewEvent>, ViewError> {
        if self.handle.closed.load(Ordering::Acquire) {
            Ok(Some(ViewEvent::Close))
        } else {
            Ok(None)
        }
    }

    fn teardown(&mut self) {}
}
