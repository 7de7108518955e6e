//! Error types for the communique-core library.
//!
//! Every encode/decode failure is reported as an [`Error`] value. A failed
//! call never leaves a message that should be treated as valid: callers
//! discard the output buffer or the partially populated struct.

use crate::schema::FieldKind;
use crate::wire::WireType;
use thiserror::Error;

/// Result type alias for communique operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all codec operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The source ran out of bytes before a value or record finished
    #[error("input truncated at offset {offset}")]
    Truncated {
        /// Byte offset where more input was expected
        offset: usize,
    },

    /// The destination buffer has no room left
    #[error("output buffer full (capacity {capacity} bytes)")]
    BufferFull {
        /// Capacity of the buffer that overflowed
        capacity: usize,
    },

    /// A varint, or a decoded value, does not fit the supported integer width
    #[error("integer overflow at offset {offset}")]
    Overflow {
        /// Byte offset where the oversized value starts
        offset: usize,
    },

    /// The wire type on the wire disagrees with the schema
    #[error("field {tag}: expected wire type {expected}, found {found}")]
    TypeMismatch {
        /// Field tag
        tag: u32,
        /// Wire type declared by the schema
        expected: WireType,
        /// Wire type found in the input
        found: WireType,
    },

    /// A streamed field's producer cannot report its total length up front
    #[error("field {tag}: streamed length unknown before encoding")]
    LengthUnknown {
        /// Field tag
        tag: u32,
    },

    /// A producer emitted a different number of bytes than it announced
    #[error("field {tag}: producer announced {declared} bytes but produced {produced}")]
    LengthMismatch {
        /// Field tag
        tag: u32,
        /// Length reported by `total_len`
        declared: usize,
        /// Bytes actually produced
        produced: usize,
    },

    /// A producer claimed to have written more bytes than its buffer holds
    #[error("producer reported {reported} bytes for a {capacity} byte buffer")]
    ChunkOverrun {
        /// Bytes the producer reported
        reported: usize,
        /// Size of the buffer it was given
        capacity: usize,
    },

    /// Field number outside `1..=MAX_FIELD_NUMBER`
    #[error("invalid field number {tag}")]
    InvalidTag {
        /// The offending field number
        tag: u64,
    },

    /// Unsupported wire type bits in a record key
    #[error("unsupported wire type {value}")]
    InvalidWireType {
        /// Raw wire type bits
        value: u8,
    },

    /// A message handed the codec a value of the wrong kind for a field
    #[error("field {tag}: expected a {expected:?} value, got {found:?}")]
    UnexpectedValue {
        /// Field tag
        tag: u32,
        /// Kind declared by the schema
        expected: FieldKind,
        /// Kind of the value supplied
        found: FieldKind,
    },

    /// A string field does not hold valid UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A schema violates the descriptor table invariants
    #[error("invalid schema '{schema}': {details}")]
    InvalidSchema {
        /// Schema name
        schema: &'static str,
        /// What is wrong with it
        details: String,
    },

    /// Failed to build a protobuf descriptor pool from exported schemas
    #[error("failed to build file descriptor: {0}")]
    DescriptorBuild(String),
}

impl Error {
    /// Creates a new truncation error
    pub fn truncated(offset: usize) -> Self {
        Self::Truncated { offset }
    }

    /// Creates a new buffer full error
    pub fn buffer_full(capacity: usize) -> Self {
        Self::BufferFull { capacity }
    }

    /// Creates a new overflow error
    pub fn overflow(offset: usize) -> Self {
        Self::Overflow { offset }
    }

    /// Creates a new schema validation error
    pub fn invalid_schema(schema: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema,
            details: details.into(),
        }
    }

    /// Creates a new descriptor build error
    pub fn descriptor_build(msg: impl Into<String>) -> Self {
        Self::DescriptorBuild(msg.into())
    }

    /// Returns true if feeding more input and decoding again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TypeMismatch {
            tag: 3,
            expected: WireType::Varint,
            found: WireType::Len,
        };
        let msg = err.to_string();
        assert!(msg.contains("field 3"));
        assert!(msg.contains("varint"));
        assert!(msg.contains("length-delimited"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::truncated(4).is_retryable());
        assert!(!Error::buffer_full(16).is_retryable());
        assert!(!Error::overflow(0).is_retryable());
        assert!(!Error::LengthUnknown { tag: 1 }.is_retryable());
    }
}
