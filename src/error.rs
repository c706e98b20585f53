//! Error taxonomy shared by every layer of the crate.
//!
//! Each module owns its own error enum; all of them can be classified into
//! one of the [`ErrorKind`] buckets so callers branch on the kind of failure
//! instead of matching message text.

use std::fmt;

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The environment is unusable: no home directory, a directory that
    /// cannot be created, a view device that cannot be opened.
    Environment,
    /// The request was understood but rejected: unknown administrator,
    /// out-of-bounds coordinate, grid mismatch in a save file.
    Validation,
    /// Reading or writing a file failed.
    Io,
    /// The input could not be recognized as a command at all.
    UnrecognizedInput,
}

impl ErrorKind {
    /// Process exit code used by the command-line front end.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Validation | ErrorKind::UnrecognizedInput => 2,
            ErrorKind::Environment => 3,
            ErrorKind::Io => 4,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Environment => "environment",
            ErrorKind::Validation => "validation",
            ErrorKind::Io => "i/o",
            ErrorKind::UnrecognizedInput => "unrecognized input",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_bucket() {
        assert_eq!(ErrorKind::Validation.exit_code(), 2);
        assert_eq!(ErrorKind::UnrecognizedInput.exit_code(), 2);
        assert_eq!(ErrorKind::Environment.exit_code(), 3);
        assert_eq!(ErrorKind::Io.exit_code(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::Io.to_string(), "i/o");
    }
}
