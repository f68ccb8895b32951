//! Extensible report writing traits.
//!
//! This module provides the [`ReportWriter`] trait for customizing how a
//! decoded [`Report`](super::Report) is emitted.

use super::{DecodedRecord, Section};
use crate::schema::SchemaKind;
use std::fmt::{Result, Write};

/// Divider line written before every section
pub const DIVIDER: &str = "----";

/// Trait for writing report elements to output.
///
/// [`Report::write_to`](super::Report::write_to) calls `begin_section`
/// once per part, then `write_record` for each of its records in stream
/// order, then `end_section`.
pub trait ReportWriter {
    /// Start a section
    fn begin_section(&mut self, section: &Section) -> Result {
        let _ = section;
        Ok(())
    }

    /// Write one record of the current section
    fn write_record(&mut self, record: &DecodedRecord) -> Result {
        let _ = record;
        Ok(())
    }

    /// Finish a section
    fn end_section(&mut self, section: &Section) -> Result {
        let _ = section;
        Ok(())
    }
}

/// Writes the plain text report: a divider per section, then either the
/// kind header and one JSON line per record, or the unknown-part notice.
pub struct TextWriter<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> TextWriter<'a, W> {
    /// Creates a text writer over any `fmt::Write` sink
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for TextWriter<'_, W> {
    fn begin_section(&mut self, section: &Section) -> Result {
        writeln!(self.writer, "{}", DIVIDER)?;
        match section.kind().header() {
            Some(header) => writeln!(self.writer, "{}", header),
            None => writeln!(self.writer, "Unknown part type: {}", section.key()),
        }
    }

    fn write_record(&mut self, record: &DecodedRecord) -> Result {
        let json = record.to_json().map_err(|_| std::fmt::Error)?;
        writeln!(self.writer, "{}", json)
    }
}

/// A writer that discards all output
pub struct NullWriter;

impl ReportWriter for NullWriter {}

/// A writer that collects statistics about the report
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsWriter {
    /// Number of sections
    pub section_count: usize,
    /// Number of notification log records
    pub alert_count: usize,
    /// Number of silence records
    pub silence_count: usize,
    /// Number of parts with an unrecognized key
    pub unknown_count: usize,
}

impl ReportWriter for StatsWriter {
    fn begin_section(&mut self, section: &Section) -> Result {
        self.section_count += 1;
        if section.kind() == SchemaKind::Unknown {
            self.unknown_count += 1;
        }
        Ok(())
    }

    fn write_record(&mut self, record: &DecodedRecord) -> Result {
        match record {
            DecodedRecord::NotificationLog(_) => self.alert_count += 1,
            DecodedRecord::Silence(_) => self.silence_count += 1,
        }
        Ok(())
    }
}
