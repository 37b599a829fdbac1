use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every condition that ends a cmtcount run.
///
/// Malformed sources are not errors: an unterminated string or block comment
/// simply stays open until the end of the file.
#[derive(Debug, Error)]
pub enum CmtError {
    #[error("unknown language '{key}' (available: {available})")]
    UnknownLanguage { key: String, available: String },

    #[error("directory does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("no {language} source files found in directory: {}", path.display())]
    NoMatchingFiles { language: &'static str, path: PathBuf },

    #[error("invalid filespec pattern '{pattern}': {source}")]
    InvalidFilespec {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("error walking through directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error processing file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, CmtError>;

impl CmtError {
    pub(crate) fn walk(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CmtError::Walk {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CmtError::Read {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_read_error_keeps_io_source() {
        let err = CmtError::read(
            "src/a.c",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "error processing file src/a.c: denied");
        let source = err.source().expect("io error should be the source");
        assert_eq!(source.to_string(), "denied");
    }

    #[test]
    fn test_messages_name_the_path() {
        let missing = CmtError::PathNotFound(PathBuf::from("nowhere"));
        assert_eq!(missing.to_string(), "directory does not exist: nowhere");

        let empty = CmtError::NoMatchingFiles {
            language: "C/C++",
            path: PathBuf::from("docs"),
        };
        assert_eq!(
            empty.to_string(),
            "no C/C++ source files found in directory: docs"
        );
    }
}
