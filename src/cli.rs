//! CLI command implementations for Townhall.

pub(crate) mod admins;
pub(crate) mod connect;
pub(crate) mod towns;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use townhall::{
    CodecError, CommandError, DataDir, ErrorKind, PersistError, SessionError, StoreError,
    TownError,
};
use townhall::config::ConfigError;
use tracing_subscriber::EnvFilter;

/// Output format for the listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    kind: ErrorKind,
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub(crate) const fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

macro_rules! classified {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for CliError {
                fn from(e: $error) -> Self {
                    Self::new(e.kind(), e.to_string())
                }
            }
        )*
    };
}

classified!(
    TownError,
    CodecError,
    StoreError,
    PersistError,
    ConfigError,
    CommandError,
    SessionError,
);

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise warnings only, or info with `--verbose`.
pub(crate) fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the data directory and make sure it exists.
pub(crate) fn data_dir(home: Option<PathBuf>) -> Result<DataDir, CliError> {
    let data = DataDir::locate(home)?;
    data.ensure()?;
    Ok(data)
}
