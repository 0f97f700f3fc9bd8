//! Error types for mcwire
//!
//! Provides a unified error type for all recoverable failures.
//!
//! Capacity violations (too many descriptors, scratch overflow, filling an
//! ownership slot twice) are programming errors and panic instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// Unified error type for mcwire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    /// A field does not fit its fixed wire width.
    #[error("{field} of {value} exceeds the wire limit of {max}")]
    FieldTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // File Provider Errors
    // -------------------------------------------------------------------------
    #[error("Can not read file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch error: {0}")]
    Watch(String),
}

impl WireError {
    /// Shorthand for a field that overflows its wire width.
    pub(crate) fn too_large(field: &'static str, value: u64, max: u64) -> Self {
        WireError::FieldTooLarge { field, value, max }
    }
}
