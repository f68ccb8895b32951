//! Notification log entries.
//!
//! The notification log records, per alert group and receiver, which alerts
//! were last notified as firing or resolved. Parts keyed with the
//! notification log prefix hold one `MeshEntry` per frame.
//!
//! The JSON rendering leaves out empty scalars, lists and sub-messages.
//! Timestamps are always written.

use super::serde_helpers;
use super::{convert_timestamp, PayloadDecoder, SchemaKind};
use crate::error::RecordError;
use chrono::{DateTime, Utc};
use prost::Message;
use serde::Serialize;

/// Wire messages of the notification log
pub mod wire {
    use prost_types::Timestamp;

    /// Integration a notification was sent through
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Receiver {
        /// Name of the receiver configuration
        #[prost(string, tag = "1")]
        pub group_name: String,
        /// Integration type, e.g. `email` or `webhook`
        #[prost(string, tag = "2")]
        pub integration: String,
        /// Index of the integration within the receiver
        #[prost(uint32, tag = "3")]
        pub idx: u32,
    }

    /// A single notification log entry
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Entry {
        /// Key of the alert group
        #[prost(bytes = "vec", tag = "1")]
        pub group_key: Vec<u8>,
        /// Receiver the notification went to
        #[prost(message, optional, tag = "2")]
        pub receiver: Option<Receiver>,
        /// Deprecated group hash
        #[prost(bytes = "vec", tag = "3")]
        pub group_hash: Vec<u8>,
        /// Deprecated resolved flag
        #[prost(bool, tag = "4")]
        pub resolved: bool,
        /// Time of the notification
        #[prost(message, optional, tag = "5")]
        pub timestamp: Option<Timestamp>,
        /// Hashes of firing alerts
        #[prost(uint64, repeated, tag = "6")]
        pub firing_alerts: Vec<u64>,
        /// Hashes of resolved alerts
        #[prost(uint64, repeated, tag = "7")]
        pub resolved_alerts: Vec<u64>,
    }

    /// An entry together with its gossip expiry
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MeshEntry {
        /// The logged entry
        #[prost(message, optional, tag = "1")]
        pub entry: Option<Entry>,
        /// Gossip expiry
        #[prost(message, optional, tag = "2")]
        pub expires_at: Option<Timestamp>,
    }
}

/// Integration a notification was sent through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    /// Name of the receiver configuration
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group_name: String,
    /// Integration type
    #[serde(skip_serializing_if = "String::is_empty")]
    pub integration: String,
    /// Index of the integration within the receiver
    #[serde(skip_serializing_if = "serde_helpers::is_zero")]
    pub idx: u32,
}

/// Notification state of one alert group at one receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Key of the alert group
    #[serde(
        serialize_with = "serde_helpers::base64",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub group_key: Vec<u8>,
    /// Receiver the notification went to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    /// Legacy hash of the group, kept for old snapshots
    #[serde(
        serialize_with = "serde_helpers::base64",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub group_hash: Vec<u8>,
    /// Legacy resolved flag, kept for old snapshots
    #[serde(skip_serializing_if = "serde_helpers::is_false")]
    pub resolved: bool,
    /// When the notification was sent
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Hashes of alerts notified as firing
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub firing_alerts: Vec<u64>,
    /// Hashes of alerts notified as resolved
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resolved_alerts: Vec<u64>,
}

/// One decoded notification log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationLogEntry {
    /// The logged notification, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Notification>,
    /// When peers drop this record
    #[serde(serialize_with = "serde_helpers::rfc3339")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<wire::MeshEntry> for NotificationLogEntry {
    type Error = RecordError;

    fn try_from(mesh: wire::MeshEntry) -> Result<Self, Self::Error> {
        let entry = match mesh.entry {
            Some(entry) => Some(Notification {
                timestamp: convert_timestamp("entry.timestamp", entry.timestamp.as_ref())?,
                group_key: entry.group_key,
                receiver: entry.receiver.map(|r| Receiver {
                    group_name: r.group_name,
                    integration: r.integration,
                    idx: r.idx,
                }),
                group_hash: entry.group_hash,
                resolved: entry.resolved,
                firing_alerts: entry.firing_alerts,
                resolved_alerts: entry.resolved_alerts,
            }),
            None => None,
        };

        Ok(Self {
            entry,
            expires_at: convert_timestamp("expires_at", mesh.expires_at.as_ref())?,
        })
    }
}

/// Decoder for notification log parts
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationLogDecoder;

impl PayloadDecoder for NotificationLogDecoder {
    type Record = NotificationLogEntry;

    const KIND: SchemaKind = SchemaKind::NotificationLog;

    fn decode_payload(payload: &[u8]) -> Result<Self::Record, RecordError> {
        let mesh = wire::MeshEntry::decode(payload)?;
        NotificationLogEntry::try_from(mesh)
    }
}

#[cfg(test)]
pub(crate) fn sample_entry(group: &str, firing: &[u64]) -> wire::MeshEntry {
    use prost_types::Timestamp;

    wire::MeshEntry {
        entry: Some(wire::Entry {
            group_key: group.as_bytes().to_vec(),
            receiver: Some(wire::Receiver {
                group_name: "team-x".to_string(),
                integration: "webhook".to_string(),
                idx: 0,
            }),
            timestamp: Some(Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
            firing_alerts: firing.to_vec(),
            ..Default::default()
        }),
        expires_at: Some(Timestamp {
            seconds: 1_700_432_000,
            nanos: 250_000_000,
        }),
    }
}
