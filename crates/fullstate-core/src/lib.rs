//! # fullstate-core
//!
//! A library for decoding persisted Alertmanager cluster full-state snapshots.
//!
//! A snapshot is a single protobuf message holding a list of named parts.
//! Each part body is a sequence of length-delimited records whose schema is
//! chosen by the part's key prefix:
//!
//! - `nfl...`: notification log entries
//! - `sil...`: silences
//!
//! Anything else is reported as an unknown part without touching its body.
//!
//! ## Architecture
//!
//! - [`envelope`]: Outer message parsing into ordered parts
//! - [`wire`]: Varint length-delimited framing of part bodies
//! - [`schema`]: Part classification and typed payload decoders
//! - [`report`]: Report assembly and text rendering
//! - [`decoder`]: The pipeline tying the above together
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use fullstate_core::Decoder;
//! use std::fs;
//!
//! let data = fs::read("./data/fullstate")?;
//! let report = Decoder::new().decode(&data)?;
//! print!("{}", report.render());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`PayloadDecoder`]: Decode another record schema
//! - [`ReportWriter`]: Customize how the report is emitted
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decoder;
pub mod envelope;
pub mod error;
pub mod report;
pub mod schema;
pub mod wire;

// Re-export primary types for convenience
pub use decoder::{decode_file, decode_file_with_config, Decoder, DecoderConfig};
pub use envelope::{Envelope, Part};
pub use error::{Error, RecordError, Result};
pub use report::{
    DecodedRecord, NullWriter, Report, ReportWriter, Section, StatsWriter, TextWriter,
};
pub use schema::{
    Classifier, Notification, NotificationLogDecoder, NotificationLogEntry, PayloadDecoder,
    SchemaKind, Silence, SilenceDecoder, SilenceEntry,
};
pub use wire::{DelimitedReader, Frame, FrameError};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
