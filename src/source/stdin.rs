//! Piped stdin copied into memory.
//!
//! Stdin cannot be seeked, so the whole stream is read once at startup and
//! paged from memory.

use super::StreamSource;
use crate::model::StreamError;
use std::io::{Cursor, IsTerminal, Read};
use tracing::debug;

/// Stdin contents held in memory.
pub type StdinSource = StreamSource<Cursor<Vec<u8>>>;

/// Read all of piped stdin.
///
/// # Errors
///
/// Returns `StreamError::NoInput` if stdin is a terminal, which would
/// otherwise block waiting for the user to type.
pub fn read_stdin() -> Result<StdinSource, StreamError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(StreamError::NoInput);
    }
    read_all(stdin.lock())
}

/// Copy `reader` to memory.
///
/// # Errors
///
/// Returns `StreamError::Stdin` when reading fails.
pub fn read_all<R: Read>(mut reader: R) -> Result<StdinSource, StreamError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(StreamError::Stdin)?;
    debug!(len = bytes.len(), "read stdin");
    Ok(StreamSource::from_bytes(bytes, "(stdin)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PagerSource;

    #[test]
    fn read_all_copies_reader() {
        let mut source = read_all(&b"line 1\nline 2\n"[..]).unwrap();
        assert_eq!(source.len(), 14);
        assert_eq!(source.name(), "(stdin)");
        assert_eq!(source.read_line_at(7).unwrap(), Some(b"line 2\n".to_vec()));
    }

    #[test]
    fn read_all_handles_empty_input() {
        let source = read_all(&b""[..]).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn read_all_reports_reader_failure() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("broken pipe"))
            }
        }
        let err = read_all(Failing).unwrap_err();
        assert!(matches!(err, StreamError::Stdin(_)));
        assert!(err.to_string().contains("broken pipe"));
    }
}
