//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Latitude or longitude outside its valid range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Argument rejected before any computation was attempted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A record in the input stream could not be turned into a registry entry
    #[error("Ingestion failed at line {line}: {reason}")]
    Ingestion {
        /// 1-based line number of the offending record
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// Reading or writing a record stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error code for integration with other tooling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Invalid argument
    InvalidArgument = 10002,
    /// Malformed input record
    Ingestion = 10003,
    /// I/O failure
    Io = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::InvalidArgument(_) => GeoErrorCode::InvalidArgument,
            GeoError::Ingestion { .. } => GeoErrorCode::Ingestion,
            GeoError::Io(_) => GeoErrorCode::Io,
        }
    }

    /// Returns true if this error was raised while loading a record stream.
    pub fn is_ingestion_failure(&self) -> bool {
        matches!(self, GeoError::Ingestion { .. } | GeoError::Io(_))
    }
}
