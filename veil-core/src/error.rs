//! Error types for the Veil core crate.

use std::fmt;

/// Top-level error type for veil-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
    /// Invalid currency code string.
    Code(CodeError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            CoreError::Code(e) => write!(f, "currency code error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

impl From<CodeError> for CoreError {
    fn from(e: CodeError) -> Self {
        CoreError::Code(e)
    }
}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}

/// Errors related to currency code parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeError {
    /// Currency code string exceeds 8 bytes.
    TooLong,
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeError::TooLong => write!(f, "currency code exceeds 8 bytes"),
        }
    }
}

impl std::error::Error for CodeError {}
