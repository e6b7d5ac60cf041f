//! Data-quality annotations attached to records.

use serde::{Deserialize, Serialize};

/// Kind of data-quality issue noticed while normalizing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Leftover template comment after the real value was removed.
    ResidueStripped,
    /// Value typed inside the comment markers of the template.
    RecoveredFromComment,
    /// Chip manufacturer/model not in the reference list.
    UnverifiedChip,
    /// Fragment that no parser understood; kept as free text.
    UnparsedFragment,
    /// Number that looks like a baud rate but is not a standard one.
    UnknownBaudRate,
    /// Date in an unrecognized format.
    UnparsedDate,
    /// Two values for the same field disagree.
    ConflictingValues,
}

impl NoteKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::ResidueStripped => "residue_stripped",
            NoteKind::RecoveredFromComment => "recovered_from_comment",
            NoteKind::UnverifiedChip => "unverified_chip",
            NoteKind::UnparsedFragment => "unparsed_fragment",
            NoteKind::UnknownBaudRate => "unknown_baud_rate",
            NoteKind::UnparsedDate => "unparsed_date",
            NoteKind::ConflictingValues => "conflicting_values",
        }
    }

    /// Severity a note of this kind carries.
    pub fn severity(&self) -> Severity {
        match self {
            NoteKind::ResidueStripped | NoteKind::RecoveredFromComment | NoteKind::UnverifiedChip => {
                Severity::Info
            }
            _ => Severity::Warning,
        }
    }
}

impl std::str::FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = [
            NoteKind::ResidueStripped,
            NoteKind::RecoveredFromComment,
            NoteKind::UnverifiedChip,
            NoteKind::UnparsedFragment,
            NoteKind::UnknownBaudRate,
            NoteKind::UnparsedDate,
            NoteKind::ConflictingValues,
        ];
        let wanted = s.to_lowercase().replace('-', "_");
        kinds
            .into_iter()
            .find(|k| k.label() == wanted)
            .ok_or_else(|| format!("Unknown note kind: {}", s))
    }
}

/// Severity level of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Value kept with reduced confidence.
    Warning,
}

/// A data-quality note on one field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityNote {
    pub kind: NoteKind,
    pub severity: Severity,
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl QualityNote {
    pub fn new(kind: NoteKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            field: field.into(),
            message: message.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// Collects notes for one page, logging each as it is recorded.
#[derive(Debug, Default)]
pub struct NoteSink {
    notes: Vec<QualityNote>,
}

impl NoteSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, note: QualityNote) {
        match note.severity {
            Severity::Warning => tracing::warn!(
                field = %note.field,
                kind = note.kind.label(),
                raw = note.raw.as_deref().unwrap_or(""),
                "{}",
                note.message
            ),
            Severity::Info => tracing::debug!(
                field = %note.field,
                kind = note.kind.label(),
                "{}",
                note.message
            ),
        }
        self.notes.push(note);
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn into_notes(self) -> Vec<QualityNote> {
        self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_severity() {
        assert_eq!(NoteKind::ResidueStripped.severity(), Severity::Info);
        assert_eq!(NoteKind::UnparsedFragment.severity(), Severity::Warning);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("unverified-chip".parse::<NoteKind>().unwrap(), NoteKind::UnverifiedChip);
        assert!("bogus".parse::<NoteKind>().is_err());
    }

    #[test]
    fn test_sink_collects() {
        let mut sink = NoteSink::new();
        sink.push(QualityNote::new(NoteKind::UnparsedDate, "releasedate", "bad date").with_raw("soon"));
        let notes = sink.into_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].raw.as_deref(), Some("soon"));
        assert_eq!(notes[0].severity, Severity::Warning);
    }
}
