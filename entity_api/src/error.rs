//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

/// Errors while executing operations against an estimate store.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex EntityApiErrorKind::RecordNotFound
///  * Errors related to reaching the store itself. Ex EntityApiErrorKind::SystemError
#[derive(Debug)]
pub struct Error {
    // Underlying error emitted by the store implementation
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum EntityApiErrorKind {
    // Record not found
    RecordNotFound,
    // Errors related to reaching the store itself. Ex a timed out connection
    SystemError,
    // Stored or seeded data failed to parse
    ValidationError,
}

impl Error {
    pub fn record_not_found(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }

    pub fn system(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: EntityApiErrorKind::SystemError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Entity API Error ({:?}): {}", self.error_kind, source),
            None => write!(f, "Entity API Error ({:?})", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: EntityApiErrorKind::SystemError,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: EntityApiErrorKind::ValidationError,
        }
    }
}
