//! Error types for the pager.
//!
//! This module defines the error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`PagerError`] - Session-level error returned by the viewport controller
//!   - [`StreamError`] - Source stream failures (open, seek, read). Fatal to the session.
//!   - [`PatternError`] - A search pattern failed to compile. Reported, search disabled.
//!
//! # Error Recovery Strategy
//!
//! Stream failures unwind to the caller, which terminates the session. Everything else
//! degrades locally: configured patterns that fail to compile are skipped (see
//! [`crate::classify::RuleSet::compile`]), chunk lists that hit their cap stop growing,
//! and undecodable bytes render as octal escapes. None of those surface as errors.
//!
//! There are no retries. The stream is usually a private copy of already-materialized
//! content, so a failure is assumed to persist for the rest of the session.

use std::path::PathBuf;
use thiserror::Error;

/// Session-level error.
///
/// # Examples
///
/// ```
/// use pgview::model::error::{PagerError, PatternError};
///
/// let err: PagerError = PatternError::new("(", "unclosed group").into();
/// assert!(err.to_string().contains("unclosed group"));
/// assert!(!err.is_fatal());
/// ```
#[derive(Debug, Error)]
pub enum PagerError {
    /// The source stream failed.
    ///
    /// **Recovery**: terminate the session and report the failure to the caller.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// A pattern failed to compile.
    ///
    /// **Recovery**: report to the user. The pattern is not applied.
    #[error("{0}")]
    Pattern(#[from] PatternError),
}

impl PagerError {
    /// Whether the error ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PagerError::Stream(_))
    }
}

/// Failures of the source stream.
///
/// Each variant carries the path or offset involved so the message shown to the user
/// identifies what went wrong without extra context.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The input file does not exist.
    ///
    /// **When this occurs**: at startup when the user passes a path that is missing.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// No file was given and stdin is a terminal.
    ///
    /// **Recovery**: show usage for both invocation modes:
    /// - `pgview /path/to/file` (file mode)
    /// - `cat file | pgview` (stdin mode)
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Opening the input failed for a reason other than a missing file.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Seeking to a line offset failed.
    #[error("Failed to seek to offset {offset}: {source}")]
    Seek {
        /// The requested offset.
        offset: u64,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a line failed.
    #[error("Failed to read line at offset {offset}: {source}")]
    Read {
        /// Offset of the line being read.
        offset: u64,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Copying piped stdin into memory failed.
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),
}

/// A pattern that failed to compile.
///
/// Produced for configured style rules (which are then skipped) and for
/// interactive search patterns (which disable the search).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid pattern {pattern:?}: {reason}")]
pub struct PatternError {
    /// The pattern as written by the user.
    pub pattern: String,
    /// Compiler diagnostic.
    pub reason: String,
}

impl PatternError {
    /// Build from a pattern and any displayable reason.
    pub fn new(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}
