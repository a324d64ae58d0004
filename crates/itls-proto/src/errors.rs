//! Error types for SA image decoding.
//!
//! Building an image cannot fail at this layer; only reinterpreting raw
//! context memory can.

use thiserror::Error;

/// Errors raised while viewing raw bytes as an SA image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Buffer is shorter than the fixed image size
    #[error("SA image too short: expected at least {expected} bytes, got {actual}")]
    ImageTooShort {
        /// Required image size in bytes
        expected: usize,
        /// Size of the buffer that was supplied
        actual: usize,
    },

    /// The selector word names no known record version, so the protocol
    /// region cannot be interpreted
    #[error("unknown record version selector: {0}")]
    UnknownVersion(u8),
}

/// Convenient Result type alias for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
