// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Townhall: a small turn-based town management game.
//!
//! A player hires an administrator, who founds a procedurally generated
//! 15x15 town. Connecting to a town starts a session: a command console on
//! the calling thread and a map view driven from a second thread.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Session (console + view thread)   │
//! ├──────────────────┬──────────────────┤
//! │ Console commands │  Config file     │
//! ├──────────────────┴──────────────────┤
//! │   Town model: grid, roster, economy │
//! ├─────────────────────────────────────┤
//! │   Codec + store (.twn / .bkp)       │
//! └─────────────────────────────────────┘
//! ```

pub mod codec;
pub mod config;
pub mod console;
pub mod error;
pub mod registry;
pub mod session;
pub mod store;
pub mod town;

pub use codec::CodecError;
pub use config::Config;
pub use console::{CommandError, Interpreter, Reply};
pub use error::ErrorKind;
pub use session::{run_session, SessionError, SessionSummary, SharedTown, View};
pub use store::{DataDir, PersistError, StoreError, TownStore};

// Re-export key town types at crate root for convenience
pub use town::{generate, Coord, Field, Town, TownError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_has_a_kind() {
        let town = TownError::UnknownAdmin(7);
        assert_eq!(CommandError::from(town).kind(), ErrorKind::Validation);
        let missing = StoreError::NoHomeDirectory;
        assert_eq!(PersistError::from(missing).kind(), ErrorKind::Environment);
    }
}
