//! Error types for the contrast library
//!
//! This module defines the error types used throughout the library.
//! Configuration loading has its own error type next to the config structs.

use std::path::PathBuf;
use thiserror::Error;

/// Error produced when a color string cannot be normalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Input did not match any supported color form (hex, rgb(), hsl(), named)
    #[error("unrecognized color '{0}'")]
    InvalidColor(String),
}

/// Errors raised by cache backends and the cache factory
#[derive(Error, Debug)]
pub enum CacheError {
    /// Requested backend name is not one of the supported drivers
    #[error("unsupported cache backend '{0}' (expected 'memory', 'file', or 'null')")]
    UnsupportedDriver(String),

    /// Filesystem operation failed in the file backend
    #[error("cache I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache entry could not be encoded for storage
    #[error("failed to serialize cache entry: {0}")]
    Serialize(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
