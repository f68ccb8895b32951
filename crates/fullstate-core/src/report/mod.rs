//! Report assembly.
//!
//! A [`Report`] holds one [`Section`] per part, in envelope order. Known
//! sections carry their typed records; rendering to text happens through a
//! [`ReportWriter`].

mod json;
mod writer;

use crate::error::{Error, Result};
use crate::schema::{NotificationLogEntry, SchemaKind, SilenceEntry};
use serde::Serialize;
use std::path::Path;

pub use writer::{NullWriter, ReportWriter, StatsWriter, TextWriter, DIVIDER};

/// A typed record decoded from one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedRecord {
    /// A notification log entry
    NotificationLog(NotificationLogEntry),
    /// A silence
    Silence(SilenceEntry),
}

impl DecodedRecord {
    /// Render the record as one line of compact JSON.
    ///
    /// Empty fields are left out and `<`, `>`, `&` are written as `\u`
    /// escapes, the same way Go's `encoding/json` prints these records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        json::to_line(self)
    }
}

impl From<NotificationLogEntry> for DecodedRecord {
    fn from(entry: NotificationLogEntry) -> Self {
        Self::NotificationLog(entry)
    }
}

impl From<SilenceEntry> for DecodedRecord {
    fn from(entry: SilenceEntry) -> Self {
        Self::Silence(entry)
    }
}

/// The decoded contents of one part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    key: String,
    kind: SchemaKind,
    records: Vec<DecodedRecord>,
}

impl Section {
    /// Creates a section for a part with a known schema
    pub fn new(key: impl Into<String>, kind: SchemaKind, records: Vec<DecodedRecord>) -> Self {
        Self {
            key: key.into(),
            kind,
            records,
        }
    }

    /// Creates a section for a part whose key matched no schema
    pub fn unknown(key: impl Into<String>) -> Self {
        Self::new(key, SchemaKind::Unknown, Vec::new())
    }

    /// Key of the part
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Schema the part was decoded with
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Records in stream order
    pub fn records(&self) -> &[DecodedRecord] {
        &self.records
    }
}

/// The decoded snapshot, ready to be written out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section
    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Sections in part order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns true if the snapshot had no parts
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Drive a writer over every section and record
    pub fn write_to(&self, writer: &mut impl ReportWriter) -> std::fmt::Result {
        for section in &self.sections {
            writer.begin_section(section)?;
            for record in &section.records {
                writer.write_record(record)?;
            }
            writer.end_section(section)?;
        }
        Ok(())
    }

    /// Render the report as text
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write_to(&mut TextWriter::new(&mut output))
            .expect("records always serialize to JSON and writing to a String is infallible");
        output
    }

    /// Render the report and write it to `path`, replacing any existing file
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|e| Error::file_write(path, e))
    }

    /// Count sections and records by kind
    pub fn stats(&self) -> StatsWriter {
        let mut stats = StatsWriter::default();
        // StatsWriter never returns an error
        let _ = self.write_to(&mut stats);
        stats
    }
}

impl FromIterator<Section> for Report {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_report_renders_nothing() {
        assert_eq!(Report::new().render(), "");
    }

    #[test]
    fn test_empty_known_section_has_header_only() {
        let report: Report = vec![Section::new("nfl:x", SchemaKind::NotificationLog, vec![])]
            .into_iter()
            .collect();
        assert_eq!(report.render(), "----\nAlerts:\n");
    }

    #[test]
    fn test_sections_render_in_order() {
        let mut report = Report::new();
        report.push(Section::new(
            "sil:x",
            SchemaKind::Silence,
            vec![SilenceEntry {
                silence: None,
                expires_at: None,
            }
            .into()],
        ));
        report.push(Section::unknown("other"));

        assert_eq!(
            report.render(),
            concat!(
                "----\n",
                "Silences:\n",
                "{\"expires_at\":\"0001-01-01T00:00:00Z\"}\n",
                "----\n",
                "Unknown part type: other\n",
            )
        );
    }

    #[test]
    fn test_stats() {
        let report: Report = vec![
            Section::unknown("a"),
            Section::new(
                "nfl:1",
                SchemaKind::NotificationLog,
                vec![NotificationLogEntry {
                    entry: None,
                    expires_at: None,
                }
                .into()],
            ),
        ]
        .into_iter()
        .collect();

        let stats = report.stats();
        assert_eq!(stats.section_count, 2);
        assert_eq!(stats.alert_count, 1);
        assert_eq!(stats.unknown_count, 1);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        let report: Report = vec![Section::unknown("x")].into_iter().collect();

        report.write_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), report.render());

        let err = report.write_file(dir.path().join("missing/report.txt")).unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
    }
}
