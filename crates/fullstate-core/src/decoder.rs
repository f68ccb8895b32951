//! Snapshot decoding.
//!
//! [`Decoder::decode`] runs the whole pipeline over an in-memory buffer:
//!
//! 1. Parse the envelope into its ordered parts
//! 2. Classify each part by key prefix
//! 3. Read the part body frame by frame and decode each payload with the
//!    schema's [`PayloadDecoder`](crate::schema::PayloadDecoder)
//! 4. Collect one [`Section`] per part into the [`Report`]
//!
//! Any error aborts the whole decode; no partial report is returned.

use crate::envelope::{Envelope, Part};
use crate::error::{Error, Result};
use crate::report::{DecodedRecord, Report, Section};
use crate::schema::{
    decode_records, Classifier, NotificationLogDecoder, PayloadDecoder, SchemaKind,
    SilenceDecoder, NOTIFICATION_LOG_PREFIX, SILENCE_PREFIX,
};
use tracing::debug;

/// Configuration for the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Key prefix of notification log parts
    pub notification_prefix: String,
    /// Key prefix of silence parts
    pub silence_prefix: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            notification_prefix: NOTIFICATION_LOG_PREFIX.to_string(),
            silence_prefix: SILENCE_PREFIX.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Creates a new decoder config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the notification log key prefix
    pub fn notification_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.notification_prefix = prefix.into();
        self
    }

    /// Sets the silence key prefix
    pub fn silence_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.silence_prefix = prefix.into();
        self
    }
}

/// Decodes full-state snapshots into reports
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    classifier: Classifier,
}

impl Decoder {
    /// Creates a new decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            classifier: Classifier::new(config.notification_prefix, config.silence_prefix),
        }
    }

    /// Decode a complete snapshot buffer
    pub fn decode(&self, data: &[u8]) -> Result<Report> {
        Envelope::decode(data)?
            .into_iter()
            .map(|part| self.decode_part(&part))
            .collect()
    }

    /// Decode a single part into its report section
    pub fn decode_part(&self, part: &Part) -> Result<Section> {
        let kind = self.classifier.classify(&part.key);
        let records = match kind {
            SchemaKind::NotificationLog => typed_records::<NotificationLogDecoder>(part)?,
            SchemaKind::Silence => typed_records::<SilenceDecoder>(part)?,
            SchemaKind::Unknown => {
                debug!("Part '{}': unknown part type", part.key);
                return Ok(Section::unknown(part.key.as_str()));
            }
        };

        debug!(
            "Part '{}': {} {} record(s) from {} bytes",
            part.key,
            records.len(),
            kind.as_str(),
            part.data.len()
        );

        Ok(Section::new(part.key.as_str(), kind, records))
    }
}

fn typed_records<D>(part: &Part) -> Result<Vec<DecodedRecord>>
where
    D: PayloadDecoder,
    D::Record: Into<DecodedRecord>,
{
    let records = decode_records::<D>(&part.key, &part.data)?;
    Ok(records.into_iter().map(Into::into).collect())
}

/// Decode a snapshot file with the default configuration
///
/// This is a convenience function that reads the file and decodes it.
pub fn decode_file(path: impl AsRef<std::path::Path>) -> Result<Report> {
    decode_file_with_config(path, DecoderConfig::default())
}

/// Decode a snapshot file with custom configuration
pub fn decode_file_with_config(
    path: impl AsRef<std::path::Path>,
    config: DecoderConfig,
) -> Result<Report> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Decoder::with_config(config).decode(&data)
}
