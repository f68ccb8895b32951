//! Silences.
//!
//! Parts keyed with the silence prefix hold one `MeshSilence` per frame.
//! As with notification log entries, empty values are left out of the JSON
//! rendering except for timestamps.

use super::serde_helpers;
use super::{convert_timestamp, PayloadDecoder, SchemaKind};
use crate::error::RecordError;
use chrono::{DateTime, Utc};
use prost::Message;
use serde::{Serialize, Serializer};

/// How a matcher compares a label value against its pattern.
///
/// Serializes as its numeric wire value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MatcherType {
    /// Label value equals the pattern
    Equal = 0,
    /// Label value matches the pattern as a regular expression
    Regexp = 1,
    /// Label value differs from the pattern
    NotEqual = 2,
    /// Label value does not match the regular expression
    NotRegexp = 3,
}

impl MatcherType {
    fn is_equal(&self) -> bool {
        *self == Self::Equal
    }
}

impl Serialize for MatcherType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*self as i32)
    }
}

/// Wire messages of the silence store
pub mod wire {
    use prost_types::Timestamp;

    /// A label matcher
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Matcher {
        /// Comparison type
        #[prost(enumeration = "super::MatcherType", tag = "1")]
        pub r#type: i32,
        /// Label name
        #[prost(string, tag = "2")]
        pub name: String,
        /// Value or regular expression
        #[prost(string, tag = "3")]
        pub pattern: String,
    }

    /// A comment attached to a silence
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Comment {
        /// Comment author
        #[prost(string, tag = "1")]
        pub author: String,
        /// Comment text
        #[prost(string, tag = "2")]
        pub comment: String,
        /// When the comment was made
        #[prost(message, optional, tag = "3")]
        pub timestamp: Option<Timestamp>,
    }

    /// A time-bounded mute rule
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Silence {
        /// Silence identifier
        #[prost(string, tag = "1")]
        pub id: String,
        /// Matchers selecting the muted alerts
        #[prost(message, repeated, tag = "2")]
        pub matchers: Vec<Matcher>,
        /// Start of the active window
        #[prost(message, optional, tag = "3")]
        pub starts_at: Option<Timestamp>,
        /// End of the active window
        #[prost(message, optional, tag = "4")]
        pub ends_at: Option<Timestamp>,
        /// Last modification
        #[prost(message, optional, tag = "5")]
        pub updated_at: Option<Timestamp>,
        /// Deprecated comment list
        #[prost(message, repeated, tag = "7")]
        pub comments: Vec<Comment>,
        /// Author
        #[prost(string, tag = "8")]
        pub created_by: String,
        /// Comment text
        #[prost(string, tag = "9")]
        pub comment: String,
    }

    /// A silence together with its gossip expiry
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MeshSilence {
        /// The silence
        #[prost(message, optional, tag = "1")]
        pub silence: Option<Silence>,
        /// Gossip expiry
        #[prost(message, optional, tag = "2")]
        pub expires_at: Option<Timestamp>,
    }
}

/// A label matcher of a silence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matcher {
    /// Comparison type
    #[serde(rename = "type", skip_serializing_if = "MatcherType::is_equal")]
    pub kind: MatcherType,
    /// Label name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Value or regular expression
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
}

/// A comment attached to a silence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment author
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Comment text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// When the comment was made
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A time-bounded mute rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Silence {
    /// Silence identifier
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Matchers selecting the muted alerts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<Matcher>,
    /// Start of the active window
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the active window
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Last modification
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Legacy comment list
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    /// Author
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    /// Comment text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// One decoded silence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SilenceEntry {
    /// The silence, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silence: Option<Silence>,
    /// When peers drop this record
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<wire::Matcher> for Matcher {
    type Error = RecordError;

    fn try_from(m: wire::Matcher) -> Result<Self, Self::Error> {
        let kind =
            MatcherType::try_from(m.r#type).map_err(|_| RecordError::UnknownMatcherType {
                name: m.name.clone(),
                value: m.r#type,
            })?;
        Ok(Self {
            kind,
            name: m.name,
            pattern: m.pattern,
        })
    }
}

impl TryFrom<wire::Comment> for Comment {
    type Error = RecordError;

    fn try_from(c: wire::Comment) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: convert_timestamp("comment.timestamp", c.timestamp.as_ref())?,
            author: c.author,
            comment: c.comment,
        })
    }
}

impl TryFrom<wire::Silence> for Silence {
    type Error = RecordError;

    fn try_from(s: wire::Silence) -> Result<Self, Self::Error> {
        Ok(Self {
            starts_at: convert_timestamp("starts_at", s.starts_at.as_ref())?,
            ends_at: convert_timestamp("ends_at", s.ends_at.as_ref())?,
            updated_at: convert_timestamp("updated_at", s.updated_at.as_ref())?,
            matchers: s
                .matchers
                .into_iter()
                .map(Matcher::try_from)
                .collect::<Result<_, _>>()?,
            comments: s
                .comments
                .into_iter()
                .map(Comment::try_from)
                .collect::<Result<_, _>>()?,
            id: s.id,
            created_by: s.created_by,
            comment: s.comment,
        })
    }
}

impl TryFrom<wire::MeshSilence> for SilenceEntry {
    type Error = RecordError;

    fn try_from(mesh: wire::MeshSilence) -> Result<Self, Self::Error> {
        Ok(Self {
            silence: mesh.silence.map(Silence::try_from).transpose()?,
            expires_at: convert_timestamp("expires_at", mesh.expires_at.as_ref())?,
        })
    }
}

/// Decoder for silence parts
#[derive(Debug, Clone, Copy, Default)]
pub struct SilenceDecoder;

impl PayloadDecoder for SilenceDecoder {
    type Record = SilenceEntry;

    const KIND: SchemaKind = SchemaKind::Silence;

    fn decode_payload(payload: &[u8]) -> Result<Self::Record, RecordError> {
        let mesh = wire::MeshSilence::decode(payload)?;
        SilenceEntry::try_from(mesh)
    }
}

#[cfg(test)]
pub(crate) fn sample_silence(id: &str) -> wire::MeshSilence {
    use prost_types::Timestamp;

    wire::MeshSilence {
        silence: Some(wire::Silence {
            id: id.to_string(),
            matchers: vec![wire::Matcher {
                r#type: MatcherType::Regexp as i32,
                name: "job".to_string(),
                pattern: "node.*".to_string(),
            }],
            starts_at: Some(Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
            ends_at: Some(Timestamp {
                seconds: 1_700_003_600,
                nanos: 0,
            }),
            created_by: "ops".to_string(),
            comment: "maintenance".to_string(),
            ..Default::default()
        }),
        expires_at: None,
    }
}
