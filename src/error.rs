//! Error types.
//!
//! Internally everything is `anyhow` (`Res<T>`). Public command functions return `Result<T>`,
//! whose `Error` also records which part of the system failed so callers can decide how to
//! present it.

use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The result type returned by public functions.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error` by where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Loading or writing configuration failed.
    Config,
    /// User input was rejected before anything was sent.
    Validation,
    /// The backend rejected or failed a request.
    Request,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// An error with an `ErrorType` attached.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Alternate formatting prints the whole context chain.
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<anyhow::Error> for Error {
    fn from(inner: anyhow::Error) -> Self {
        Self::new(ErrorType::Internal, inner)
    }
}

/// Converts an internal result into a public one with the given `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
