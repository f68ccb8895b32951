//! Error types for the fullstate-core library.
//!
//! Every decode failure is terminal for the snapshot being decoded. Variants
//! carry the part key and the byte offset inside that part's body so the
//! corrupt region can be located with a hex dump.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fullstate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all fullstate operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The outer full-state message could not be parsed
    #[error("malformed full-state envelope: {source}")]
    MalformedEnvelope {
        /// Underlying protobuf decode error
        #[source]
        source: prost::DecodeError,
    },

    /// A part body ends inside a length prefix, or the prefix is not a valid varint
    #[error("truncated length prefix in part '{key}' at offset {offset}")]
    TruncatedLength {
        /// Key of the part being decoded
        key: String,
        /// Byte offset of the frame inside the part body
        offset: usize,
    },

    /// A length prefix claims more bytes than remain in the part body
    #[error(
        "truncated payload in part '{key}' at offset {offset}: need {expected} bytes, have {available}"
    )]
    TruncatedPayload {
        /// Key of the part being decoded
        key: String,
        /// Byte offset of the frame inside the part body
        offset: usize,
        /// Payload length announced by the prefix
        expected: u64,
        /// Bytes actually left after the prefix
        available: usize,
    },

    /// A framed payload is not a valid record of the part's schema
    #[error("invalid {schema} record in part '{key}' at offset {offset}: {source}")]
    InvalidRecordEncoding {
        /// Key of the part being decoded
        key: String,
        /// Schema the payload was decoded against
        schema: &'static str,
        /// Byte offset of the payload inside the part body
        offset: usize,
        /// What is wrong with the payload
        #[source]
        source: RecordError,
    },
}

/// Why a single framed payload could not be decoded.
///
/// Payload decoders only see the payload bytes; the part key and offset
/// are attached when this becomes an [`Error::InvalidRecordEncoding`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RecordError {
    /// The payload is not a valid protobuf message of the schema
    #[error(transparent)]
    Decode(#[from] prost::DecodeError),

    /// A timestamp outside 0001-01-01T00:00:00Z..=9999-12-31T23:59:59.999999999Z
    #[error("{field}: timestamp {seconds}s {nanos}ns is out of range")]
    TimestampOutOfRange {
        /// Field holding the timestamp
        field: &'static str,
        /// Seconds since the Unix epoch
        seconds: i64,
        /// Nanosecond part
        nanos: i32,
    },

    /// A matcher type outside the known enumeration values
    #[error("matcher '{name}': unknown type {value}")]
    UnknownMatcherType {
        /// Label name of the matcher
        name: String,
        /// Raw enumeration value
        value: i32,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new malformed envelope error
    pub fn malformed_envelope(source: prost::DecodeError) -> Self {
        Self::MalformedEnvelope { source }
    }

    /// Creates a new invalid record error
    pub fn invalid_record(
        key: impl Into<String>,
        schema: &'static str,
        offset: usize,
        source: RecordError,
    ) -> Self {
        Self::InvalidRecordEncoding {
            key: key.into(),
            schema,
            offset,
            source,
        }
    }

    /// Returns the key of the part the error occurred in, if any
    pub fn part_key(&self) -> Option<&str> {
        match self {
            Self::TruncatedLength { key, .. }
            | Self::TruncatedPayload { key, .. }
            | Self::InvalidRecordEncoding { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns true if the snapshot bytes themselves are corrupt
    /// (as opposed to an I/O failure around them)
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope { .. }
                | Self::TruncatedLength { .. }
                | Self::TruncatedPayload { .. }
                | Self::InvalidRecordEncoding { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn unknown_matcher() -> RecordError {
        RecordError::UnknownMatcherType {
            name: "job".to_string(),
            value: 7,
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::TruncatedPayload {
            key: "nfl:01".to_string(),
            offset: 12,
            expected: 40,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("nfl:01"));
        assert!(msg.contains("offset 12"));
        assert!(msg.contains("need 40 bytes, have 3"));
    }

    #[test]
    fn test_part_key() {
        let err = Error::invalid_record("sil:x", "silence", 4, unknown_matcher());
        assert_eq!(err.part_key(), Some("sil:x"));
        assert!(Error::file_read("/nope", std::io::ErrorKind::NotFound.into())
            .part_key()
            .is_none());
    }

    #[test]
    fn test_is_corrupt_data() {
        assert!(Error::invalid_record("nfl", "notification log", 0, unknown_matcher())
            .is_corrupt_data());
        assert!(!Error::file_write("/out", std::io::ErrorKind::PermissionDenied.into())
            .is_corrupt_data());
    }

    #[test]
    fn test_invalid_record_keeps_source_chain() {
        let decode_err = prost::DecodeError::new("buffer underflow");
        let err = Error::invalid_record("nfl:1", "notification log", 9, decode_err.into());

        assert!(err.to_string().contains("buffer underflow"));
        let source = err.source().expect("record error is the source");
        let record_err = source
            .downcast_ref::<RecordError>()
            .expect("source is a RecordError");
        assert!(matches!(record_err, RecordError::Decode(_)));
    }
}
