use std::io;

use thiserror::Error;

/// Errors raised by the synthetic stream wrappers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("I/O operation on closed stream")]
    Closed,
    #[error("{0} is not supported on a synthetic stream")]
    Unsupported(&'static str),
    #[error("source read failed: {0}")]
    Io(#[from] io::Error),
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(inner) => inner,
            StreamError::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, err),
            StreamError::Closed => io::Error::other(err),
        }
    }
}
