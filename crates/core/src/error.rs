//! Error types for Tabula.

use crate::location::Location;
use crate::record::RecordId;
use alloc::string::String;
use core::fmt;

/// Result type alias for Tabula operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A failure reported by a record source while executing a fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Creates a fetch error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fetch failed: {}", self.message)
    }
}

/// Error types for Tabula operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The record source failed to execute a fetch.
    Fetch(FetchError),
    /// A read API was called with a location that does not exist.
    OutOfRange {
        /// Requested visible section index.
        section: usize,
        /// Requested row, if the read addressed a row.
        row: Option<usize>,
        /// Number of visible sections at the time of the read.
        sections: usize,
    },
    /// A non-removed record was accepted by no section.
    InvariantViolation {
        id: RecordId,
        message: String,
    },
    /// Invalid section or request configuration.
    Configuration {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fetch(err) => write!(f, "{}", err),
            Error::OutOfRange {
                section,
                row: Some(row),
                sections,
            } => write!(
                f,
                "Location [{}, {}] out of range ({} visible sections)",
                section, row, sections
            ),
            Error::OutOfRange {
                section,
                row: None,
                sections,
            } => write!(
                f,
                "Section {} out of range ({} visible sections)",
                section, sections
            ),
            Error::InvariantViolation { id, message } => {
                write!(f, "Partition invariant violated by record {}: {}", id, message)
            }
            Error::Configuration { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl Error {
    /// Creates an out of range error for a section index.
    pub fn section_out_of_range(section: usize, sections: usize) -> Self {
        Error::OutOfRange {
            section,
            row: None,
            sections,
        }
    }

    /// Creates an out of range error for a full location.
    pub fn location_out_of_range(location: Location, sections: usize) -> Self {
        Error::OutOfRange {
            section: location.section,
            row: Some(location.row),
            sections,
        }
    }

    /// Creates an invariant violation error for a record.
    pub fn invariant_violation(id: RecordId, message: impl Into<String>) -> Self {
        Error::InvariantViolation {
            id,
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this error is a fetch failure.
    #[inline]
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}
