use thiserror::Error;

/// Errors returned by every fallible operation in this crate.
///
/// Arguments are validated before anything is mutated, so an `Err` always
/// leaves the receiver exactly as it was.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument is out of range or has the wrong bit depth.
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// An index fell outside the valid range `0..len` (or `0..=len` for
    /// insertion).
    #[error("index {index} out of bounds for length {len}")]
    Index { index: usize, len: usize },
    /// Backing storage could not be obtained or grown.
    #[error("storage allocation failed")]
    Allocation,
    /// Serialized data is malformed or carries the wrong version.
    #[error("invalid serialized data: {0}")]
    Format(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::Allocation
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for building an [`Error::Precondition`].
pub(crate) fn precondition(msg: impl Into<String>) -> Error {
    Error::Precondition(msg.into())
}
