//! Part classification and typed payload decoders.
//!
//! A part's key prefix selects the schema its frames are decoded with.
//! Each schema is a [`PayloadDecoder`]: it turns one framed payload into a
//! typed record that renders as a single JSON line.
//!
//! ## Extensibility
//!
//! Supporting another kind of part means adding a decoder and a
//! [`SchemaKind`] variant with its prefix rule; existing decoders are left
//! alone.

pub mod nflog;
pub mod silence;

use crate::error::{Error, RecordError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use nflog::{Notification, NotificationLogDecoder, NotificationLogEntry, Receiver};
pub use silence::{Comment, Matcher, MatcherType, Silence, SilenceDecoder, SilenceEntry};

/// Raw protobuf messages as they appear on the wire
pub mod wire {
    pub use super::nflog::wire::*;
    pub use super::silence::wire::*;
}

/// Default key prefix of notification log parts
pub const NOTIFICATION_LOG_PREFIX: &str = "nfl";

/// Default key prefix of silence parts
pub const SILENCE_PREFIX: &str = "sil";

/// Schema selected for a part body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Notification log entries (`MeshEntry`)
    NotificationLog,
    /// Silences (`MeshSilence`)
    Silence,
    /// No known schema matches the key
    Unknown,
}

impl SchemaKind {
    /// Header line shown above the records of this kind
    pub fn header(&self) -> Option<&'static str> {
        match self {
            Self::NotificationLog => Some("Alerts:"),
            Self::Silence => Some("Silences:"),
            Self::Unknown => None,
        }
    }

    /// Short schema name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotificationLog => "notification log",
            Self::Silence => "silence",
            Self::Unknown => "unknown",
        }
    }
}

/// Key prefixes the classifier matches against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    notification_prefix: String,
    silence_prefix: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_LOG_PREFIX, SILENCE_PREFIX)
    }
}

impl Classifier {
    /// Creates a classifier with custom prefixes
    pub fn new(notification_prefix: impl Into<String>, silence_prefix: impl Into<String>) -> Self {
        Self {
            notification_prefix: notification_prefix.into(),
            silence_prefix: silence_prefix.into(),
        }
    }

    /// Select the schema for a part key.
    ///
    /// Matching is an exact, case-sensitive byte prefix test. The
    /// notification log prefix is checked before the silence prefix.
    pub fn classify(&self, key: &str) -> SchemaKind {
        if key.starts_with(self.notification_prefix.as_str()) {
            SchemaKind::NotificationLog
        } else if key.starts_with(self.silence_prefix.as_str()) {
            SchemaKind::Silence
        } else {
            SchemaKind::Unknown
        }
    }
}

/// Decodes one framed payload into a typed record
pub trait PayloadDecoder {
    /// The decoded record type
    type Record: Serialize;

    /// Schema this decoder handles
    const KIND: SchemaKind;

    /// Decode a single payload.
    ///
    /// The caller adds the part key and offset to the error.
    fn decode_payload(payload: &[u8]) -> std::result::Result<Self::Record, RecordError>;
}

/// Decode every frame of a part body with the given decoder.
///
/// Frames are decoded in order and the first failure aborts the part.
pub fn decode_records<D: PayloadDecoder>(key: &str, data: &[u8]) -> Result<Vec<D::Record>> {
    crate::wire::DelimitedReader::new(data)
        .map(|frame| {
            let frame = frame.map_err(|e| e.into_error(key))?;
            D::decode_payload(frame.payload).map_err(|source| {
                Error::invalid_record(key, D::KIND.as_str(), frame.payload_offset(), source)
            })
        })
        .collect()
}

/// Seconds of 0001-01-01T00:00:00Z, the earliest valid timestamp
const MIN_TIMESTAMP_SECONDS: i64 = -62_135_596_800;

/// Seconds of 10000-01-01T00:00:00Z, one past the latest valid timestamp
const MAX_TIMESTAMP_SECONDS: i64 = 253_402_300_800;

/// Convert a protobuf timestamp into a UTC instant.
///
/// Valid timestamps lie in years 0001 through 9999 with nanos in
/// `0..1_000_000_000`; anything else is rejected.
pub(crate) fn convert_timestamp(
    field: &'static str,
    ts: Option<&prost_types::Timestamp>,
) -> std::result::Result<Option<DateTime<Utc>>, RecordError> {
    let Some(ts) = ts else {
        return Ok(None);
    };

    let out_of_range = || RecordError::TimestampOutOfRange {
        field,
        seconds: ts.seconds,
        nanos: ts.nanos,
    };

    if !(MIN_TIMESTAMP_SECONDS..MAX_TIMESTAMP_SECONDS).contains(&ts.seconds) {
        return Err(out_of_range());
    }
    let nanos = u32::try_from(ts.nanos)
        .ok()
        .filter(|n| *n < 1_000_000_000)
        .ok_or_else(out_of_range)?;

    DateTime::from_timestamp(ts.seconds, nanos)
        .map(Some)
        .ok_or_else(out_of_range)
}

/// Serde helpers for the JSON rendering of wire types
pub(crate) mod serde_helpers {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::{DateTime, Timelike, Utc};
    use serde::Serializer;

    /// Rendering of an absent timestamp, the zero instant of the Go time type
    pub(crate) const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

    /// Render bytes as standard base64
    pub(crate) fn base64<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    /// Render an optional instant as RFC 3339 in UTC.
    ///
    /// The fraction is printed with trailing zeros trimmed and left out
    /// entirely on whole seconds. `None` renders as [`ZERO_TIME`].
    pub(crate) fn rfc3339<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&format_rfc3339(ts)),
            None => serializer.serialize_str(ZERO_TIME),
        }
    }

    pub(crate) fn format_rfc3339(ts: &DateTime<Utc>) -> String {
        let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
        let nanos = ts.nanosecond();
        if nanos != 0 {
            let fraction = format!("{:09}", nanos);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push('Z');
        out
    }

    /// Skip predicate for `bool` fields that are omitted when false
    pub(crate) fn is_false(value: &bool) -> bool {
        !*value
    }

    /// Skip predicate for integer fields that are omitted when zero
    pub(crate) fn is_zero(value: &u32) -> bool {
        *value == 0
    }
}
