use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// An id that cannot be turned into a request, e.g. an arXiv id that
    /// matches neither the new-style nor the old-style scheme.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The provider answered, but there is no usable entry for the id.
    #[error("no usable entry for {0}")]
    NotFound(String),

    #[error("{0}")]
    FatalConnection(String),

    /// Fetched content did not have the shape we expected (e.g. an entry without a key).
    #[error("could not parse response for {id}: {reason}")]
    ParseMismatch { id: String, reason: String },

    #[error("{path} is not valid UTF-8")]
    Decode { path: PathBuf },

    #[error("config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
