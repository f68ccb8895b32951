//! The outer full-state envelope.
//!
//! The snapshot file is a single `FullStateDesc` message wrapping the
//! cluster `FullState`, which in turn holds the ordered list of parts.
//! Each part body stays an opaque byte blob at this level.

use crate::error::{Error, Result};
use bytes::Bytes;
use prost::Message;
use tracing::debug;

/// A named opaque binary chunk of the snapshot
#[derive(Clone, PartialEq, Message)]
pub struct Part {
    /// Identifier whose prefix selects the body schema
    #[prost(string, tag = "1")]
    pub key: String,
    /// Raw body bytes
    #[prost(bytes = "bytes", tag = "2")]
    pub data: Bytes,
}

/// Cluster state as gossiped between peers
#[derive(Clone, PartialEq, Message)]
pub struct FullState {
    /// Parts in source order
    #[prost(message, repeated, tag = "1")]
    pub parts: Vec<Part>,
}

/// The persisted snapshot as written to storage
#[derive(Clone, PartialEq, Message)]
pub struct FullStateDesc {
    /// The wrapped state; absent means no parts
    #[prost(message, optional, tag = "1")]
    pub state: Option<FullState>,
}

/// The decoded snapshot: an ordered list of parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    parts: Vec<Part>,
}

impl Envelope {
    /// Parse the full input buffer into an envelope.
    ///
    /// The whole buffer must form one well-formed message; no partial
    /// result is returned on failure.
    pub fn decode(data: &[u8]) -> Result<Self> {
        // Part bodies become views into this one copy of the input
        let desc = FullStateDesc::decode(Bytes::copy_from_slice(data))
            .map_err(Error::malformed_envelope)?;
        let parts = desc.state.map(|state| state.parts).unwrap_or_default();

        debug!("Decoded envelope: {} bytes, {} parts", data.len(), parts.len());

        Ok(Self { parts })
    }

    /// Parts in source order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the snapshot holds no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl IntoIterator for Envelope {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

#[cfg(test)]
pub(crate) fn encode_snapshot(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    FullStateDesc {
        state: Some(FullState {
            parts: parts
                .iter()
                .map(|(key, data)| Part {
                    key: key.to_string(),
                    data: Bytes::from(data.clone()),
                })
                .collect(),
        }),
    }
    .encode_to_vec()
}
