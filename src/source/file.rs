//! File input read in place.

use super::StreamSource;
use crate::model::StreamError;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::debug;

/// A file opened for paging.
pub type FileSource = StreamSource<BufReader<File>>;

/// Open `path` for paging.
///
/// # Errors
///
/// Returns `StreamError::FileNotFound` if the file does not exist and
/// `StreamError::Open` for any other open failure.
pub fn open_file(path: &Path) -> Result<FileSource, StreamError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => StreamError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => StreamError::Open {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let source = StreamSource::new(BufReader::new(file), path.display().to_string())?;
    debug!(path = %path.display(), len = source.len, "opened file");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PagerSource;

    #[test]
    fn open_file_reads_lines() {
        let path = std::env::temp_dir().join("pgview_open_file_reads_lines.txt");
        std::fs::write(&path, "first\nsecond\n").unwrap();
        let mut source = open_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(source.len(), 13);
        assert!(source.name().ends_with("pgview_open_file_reads_lines.txt"));
        assert_eq!(source.read_line().unwrap(), Some(b"first\n".to_vec()));
        assert_eq!(source.read_line().unwrap(), Some(b"second\n".to_vec()));
        assert_eq!(source.read_line().unwrap(), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("pgview_missing_file_98765.txt");
        assert!(matches!(
            open_file(&path),
            Err(StreamError::FileNotFound { .. })
        ));
    }

    #[test]
    fn directory_is_an_open_or_read_error() {
        let dir = std::env::temp_dir();
        let result = open_file(&dir).and_then(|mut s| s.read_line().map(|_| s));
        assert!(result.is_err(), "paging a directory must fail");
    }
}
