//! Splitting console lines into a verb and its arguments.

use thiserror::Error;

/// Most arguments a command accepts after its verb.
pub const MAX_ARGS: usize = 6;

/// Longest accepted token in bytes.
pub const MAX_ARG_LEN: usize = 32;

/// A line that exceeds the tokenizer's bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// More than [`MAX_ARGS`] arguments.
    #[error("too many arguments ({count}, at most {max})", max = MAX_ARGS)]
    TooManyArguments {
        /// Arguments found.
        count: usize,
    },
    /// A token longer than [`MAX_ARG_LEN`] bytes.
    #[error("argument '{prefix}...' is longer than {max} bytes", max = MAX_ARG_LEN)]
    ArgumentTooLong {
        /// Start of the offending token.
        prefix: String,
    },
}

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    /// First word, lower-cased by the caller when matching.
    pub verb: &'a str,
    /// Remaining words.
    pub args: Vec<&'a str>,
}

/// Split a line on whitespace.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Fails when the line has more than [`MAX_ARGS`] arguments or a token
/// longer than [`MAX_ARG_LEN`] bytes.
pub fn tokenize(line: &str) -> Result<Option<Tokens<'_>>, TokenizeError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    if args.len() > MAX_ARGS {
        return Err(TokenizeError::TooManyArguments { count: args.len() });
    }
    if let Some(long) = std::iter::once(verb)
        .chain(args.iter().copied())
        .find(|w| w.len() > MAX_ARG_LEN)
    {
        let prefix: String = long.chars().take(12).collect();
        return Err(TokenizeError::ArgumentTooLong { prefix });
    }

    Ok(Some(Tokens { verb, args }))
}
