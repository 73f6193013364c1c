use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the profile store, its codec and the STS exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// A line the grammar has to understand could not be interpreted.
    #[error("failed to parse line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A document that would not decode back to itself.
    #[error("cannot encode section [{section}]: {reason}")]
    Encode { section: String, reason: String },

    /// A decoded document could not be turned into profiles.
    #[error("failed to map {what}: {reason}")]
    Mapping { what: &'static str, reason: String },

    #[error("profile not found. [{0}]")]
    NotFound(String),

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sts {operation} failed: {source}")]
    ExternalService {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn external<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::ExternalService {
            operation,
            source: source.into(),
        }
    }

    /// The underlying I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
