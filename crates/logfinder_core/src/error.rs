// error.rs: error types for tokenization and the comparison driver
use std::io;
use std::path::PathBuf;

use thiserror::Error;

const EXCERPT_MAX: usize = 256;

/// A line that does not start with a syslog timestamp followed by a
/// non-empty body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid syslog/date format: {excerpt:?}")]
pub struct InvalidFormat {
    pub excerpt: String,
}

impl InvalidFormat {
    pub fn new(line: &str) -> Self {
        let mut end = std::cmp::min(EXCERPT_MAX, line.len());
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        Self { excerpt: line[..end].to_string() }
    }
}

#[derive(Debug, Error)]
pub enum LogfinderError {
    #[error("{origin}:{line_no}: {source}")]
    Format {
        origin: String,
        line_no: usize,
        #[source]
        source: InvalidFormat,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl LogfinderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
