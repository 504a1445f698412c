//! Seekable text sources.
//!
//! The pager reads its text one line at a time through a single seekable
//! handle:
//! - File input is read in place.
//! - Piped stdin is copied into memory once so it can be seeked.
//! - [`InputSource`] unifies both behind [`PagerSource`].

use crate::model::StreamError;
use std::io::{BufRead, Cursor, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::trace;

pub mod file;
pub mod stdin;

pub use file::{open_file, FileSource};
pub use stdin::{read_stdin, StdinSource};

/// A forward-readable, seekable line stream.
pub trait PagerSource {
    /// Move the read position to `offset`.
    fn seek(&mut self, offset: u64) -> Result<(), StreamError>;

    /// Read the next line, terminator included. `None` at end of stream.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, StreamError>;

    /// Current read position.
    fn position(&self) -> u64;

    /// Total stream length in bytes.
    fn len(&self) -> u64;

    /// True for an empty stream.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name shown in the status bar.
    fn name(&self) -> &str;

    /// Read the line starting at `offset`, seeking only when the stream is
    /// not already positioned there.
    fn read_line_at(&mut self, offset: u64) -> Result<Option<Vec<u8>>, StreamError> {
        if offset != self.position() {
            trace!(from = self.position(), to = offset, "seek");
            self.seek(offset)?;
        }
        self.read_line()
    }
}

/// [`PagerSource`] over any buffered seekable reader.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    position: u64,
    len: u64,
    name: String,
}

impl<R: BufRead + Seek> StreamSource<R> {
    /// Wrap `reader`, measuring its length and rewinding to the start.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Seek` if the reader cannot be measured.
    pub fn new(mut reader: R, name: impl Into<String>) -> Result<Self, StreamError> {
        let len = reader
            .seek(SeekFrom::End(0))
            .map_err(|source| StreamError::Seek { offset: 0, source })?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|source| StreamError::Seek { offset: 0, source })?;
        Ok(Self {
            reader,
            position: 0,
            len,
            name: name.into(),
        })
    }
}

impl StreamSource<Cursor<Vec<u8>>> {
    /// In-memory source over `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, name: impl Into<String>) -> Self {
        let bytes = bytes.into();
        Self {
            len: bytes.len() as u64,
            reader: Cursor::new(bytes),
            position: 0,
            name: name.into(),
        }
    }
}

impl<R: BufRead + Seek> PagerSource for StreamSource<R> {
    fn seek(&mut self, offset: u64) -> Result<(), StreamError> {
        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| StreamError::Seek { offset, source })?;
        self.position = offset;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let mut line = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut line)
            .map_err(|source| StreamError::Read {
                offset: self.position,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.position += read as u64;
        Ok(Some(line))
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Input chosen at startup.
///
/// Sum type enforces exactly one variant.
#[derive(Debug)]
pub enum InputSource {
    /// A file read in place.
    File(FileSource),
    /// Piped stdin copied into memory.
    Stdin(StdinSource),
}

impl PagerSource for InputSource {
    fn seek(&mut self, offset: u64) -> Result<(), StreamError> {
        match self {
            InputSource::File(f) => f.seek(offset),
            InputSource::Stdin(s) => s.seek(offset),
        }
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        match self {
            InputSource::File(f) => f.read_line(),
            InputSource::Stdin(s) => s.read_line(),
        }
    }

    fn position(&self) -> u64 {
        match self {
            InputSource::File(f) => f.position(),
            InputSource::Stdin(s) => s.position(),
        }
    }

    fn len(&self) -> u64 {
        match self {
            InputSource::File(f) => f.len(),
            InputSource::Stdin(s) => s.len(),
        }
    }

    fn name(&self) -> &str {
        match self {
            InputSource::File(f) => f.name(),
            InputSource::Stdin(s) => s.name(),
        }
    }
}

/// Detect and open the input source.
///
/// # Logic:
/// 1. If a file path is provided: open it
/// 2. Else if stdin is piped: copy it into memory
/// 3. Else: `StreamError::NoInput`
///
/// # Errors
///
/// Returns `StreamError::FileNotFound` if the file does not exist,
/// `StreamError::NoInput` if stdin is a terminal, and the open or read
/// error otherwise.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, StreamError> {
    match file {
        Some(path) => Ok(InputSource::File(open_file(&path)?)),
        None => Ok(InputSource::Stdin(read_stdin()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::IsTerminal;

    fn lines<S: PagerSource>(source: &mut S) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(line) = source.read_line().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn read_line_keeps_terminators() {
        let mut source = StreamSource::from_bytes("one\ntwo\r\nthree", "mem");
        assert_eq!(
            lines(&mut source),
            vec![b"one\n".to_vec(), b"two\r\n".to_vec(), b"three".to_vec()]
        );
        assert_eq!(source.position(), source.len());
    }

    #[test]
    fn read_line_at_seeks_only_when_needed() {
        let mut source = StreamSource::from_bytes("aa\nbb\ncc\n", "mem");
        assert_eq!(source.read_line_at(0).unwrap(), Some(b"aa\n".to_vec()));
        assert_eq!(source.position(), 3);
        assert_eq!(source.read_line_at(3).unwrap(), Some(b"bb\n".to_vec()));
        assert_eq!(source.read_line_at(0).unwrap(), Some(b"aa\n".to_vec()));
        assert_eq!(source.read_line_at(9).unwrap(), None);
    }

    #[test]
    fn stream_source_measures_reader() {
        let source = StreamSource::new(Cursor::new(b"abc\n".to_vec()), "cursor").unwrap();
        assert_eq!(source.len(), 4);
        assert_eq!(source.position(), 0);
        assert_eq!(source.name(), "cursor");
        assert!(!source.is_empty());
    }

    #[test]
    fn empty_source_reads_nothing() {
        let mut source = StreamSource::from_bytes(Vec::new(), "empty");
        assert!(source.is_empty());
        assert_eq!(source.read_line().unwrap(), None);
    }

    #[test]
    fn detect_returns_file_not_found_for_missing_file() {
        let missing = std::env::temp_dir().join("pgview_nonexistent_detect_12345.txt");
        let result = detect_input_source(Some(missing.clone()));
        match result {
            Err(StreamError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn detect_reads_existing_file() {
        let path = std::env::temp_dir().join("pgview_detect_existing.txt");
        std::fs::write(&path, "hello\nworld\n").unwrap();
        let mut source = detect_input_source(Some(path.clone())).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(matches!(source, InputSource::File(_)));
        assert_eq!(source.len(), 12);
        assert_eq!(source.read_line_at(6).unwrap(), Some(b"world\n".to_vec()));
    }

    #[test]
    fn detect_returns_no_input_when_stdin_is_tty() {
        if std::io::stdin().is_terminal() {
            let result = detect_input_source(None);
            assert!(
                matches!(result, Err(StreamError::NoInput)),
                "expected NoInput, got {result:?}"
            );
        }
    }
}
