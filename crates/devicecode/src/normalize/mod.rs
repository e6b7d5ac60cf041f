//! Field normalization.
//!
//! Turns raw wiki field values into structured values. Normalization never
//! fails: anything that cannot be interpreted is kept as free text and a
//! [`QualityNote`] is recorded.

mod chip;
mod comment;
mod logs;
mod note;
mod port;
mod values;

pub use chip::{is_additional_chip, parse_slot, split_descriptor, ChipDescriptor, ChipLayout};
pub use comment::{clean_value, strip_comments, CleanValue, Stripped, ValueSource};
pub use logs::{LogFact, LogMatcher, LogMiner};
pub use note::{NoteKind, NoteSink, QualityNote, Severity};
pub use port::{parse_baud, parse_port, Baud, ParsedPort, BAUD_RATES};
pub use values::{
    classify_password, fcc_grantee_code, parse_date, parse_fcc_ids, parse_ip, parse_yes_no,
    split_list,
};

use chrono::NaiveDate;

use crate::device::{ChipInfo, ChipSlot, PortInfo};
use crate::reference::ReferenceData;

/// Per-page normalizer: reference tables plus the page's note sink.
pub struct Normalizer<'a> {
    reference: &'a ReferenceData,
    notes: NoteSink,
}

impl<'a> Normalizer<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self {
            reference,
            notes: NoteSink::new(),
        }
    }

    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    /// Record a note directly.
    pub fn note(&mut self, note: QualityNote) {
        self.notes.push(note);
    }

    /// Clean a raw value: comment handling plus default filtering.
    pub fn clean(&mut self, identifier: &str, raw: &str) -> Option<String> {
        let value = clean_value(&self.reference.defaults, identifier, raw)?;
        match value.source {
            ValueSource::Plain => {}
            ValueSource::ResidueStripped => self.notes.push(
                QualityNote::new(NoteKind::ResidueStripped, identifier, "template comment residue removed")
                    .with_raw(raw),
            ),
            ValueSource::RecoveredFromComment => self.notes.push(
                QualityNote::new(
                    NoteKind::RecoveredFromComment,
                    identifier,
                    "value recovered from inside comment markers",
                )
                .with_raw(raw),
            ),
        }
        Some(value.text)
    }

    /// Parse a chip field into a verified-or-not chip entry.
    pub fn chip(
        &mut self,
        identifier: &str,
        raw: &str,
        slot: ChipSlot,
        layout: ChipLayout,
    ) -> Option<ChipInfo> {
        let value = self.clean(identifier, raw)?;
        let descriptor = split_descriptor(&value, layout);
        let manufacturer = self.reference.rewrite_brand(&descriptor.manufacturer).to_string();

        let mut chip = ChipInfo::new(slot, manufacturer, descriptor.model).with_extra(descriptor.extra);
        if let Some(description) = descriptor.description {
            chip = chip.with_description(description);
        }
        if chip.is_empty() && chip.description.is_none() {
            return None;
        }

        self.verify(&mut chip);
        if !chip.verified && !chip.manufacturer.is_empty() {
            self.notes.push(
                QualityNote::new(
                    NoteKind::UnverifiedChip,
                    identifier,
                    format!("chip '{} {}' not in reference list", chip.manufacturer, chip.model),
                )
                .with_raw(raw),
            );
        }
        Some(chip)
    }

    /// Annotate a chip with its reference entry. Idempotent.
    pub fn verify(&self, chip: &mut ChipInfo) {
        match self.reference.chips.lookup(&chip.manufacturer, &chip.model) {
            Some(entry) => {
                chip.verified = true;
                if chip.chip_type.is_none() {
                    chip.chip_type = entry.chip_type.clone();
                }
            }
            None => chip.verified = false,
        }
    }

    /// Parse a serial/JTAG descriptor.
    pub fn port(&mut self, identifier: &str, raw: &str) -> Option<PortInfo> {
        let value = self.clean(identifier, raw)?;
        let parsed = parse_port(&value);
        for rate in &parsed.unknown_bauds {
            self.notes.push(
                QualityNote::new(
                    NoteKind::UnknownBaudRate,
                    identifier,
                    format!("{} is not a standard baud rate", rate),
                )
                .with_raw(raw),
            );
        }
        for fragment in &parsed.port.extra {
            self.notes.push(
                QualityNote::new(NoteKind::UnparsedFragment, identifier, "fragment kept as free text")
                    .with_raw(fragment.clone()),
            );
        }
        Some(parsed.port)
    }

    /// Parse a date field, noting unparseable values.
    pub fn date(&mut self, identifier: &str, raw: &str) -> Option<NaiveDate> {
        let value = self.clean(identifier, raw)?;
        let date = parse_date(&value);
        if date.is_none() {
            self.notes.push(
                QualityNote::new(NoteKind::UnparsedDate, identifier, "unrecognized date format")
                    .with_raw(value),
            );
        }
        date
    }

    pub fn notes_len(&self) -> usize {
        self.notes.len()
    }

    /// Finish the page and hand over its notes.
    pub fn into_notes(self) -> Vec<QualityNote> {
        self.notes.into_notes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ChipCategory, Tristate};

    fn slot() -> ChipSlot {
        ChipSlot::new(ChipCategory::Cpu, 1, 1)
    }

    #[test]
    fn test_chip_verified_after_brand_rewrite() {
        let reference = ReferenceData::builtin();
        let mut normalizer = Normalizer::new(&reference);
        let chip = normalizer
            .chip("cpu1chip1", "Mediatek;MT7621A;880 MHz", slot(), ChipLayout::Standard)
            .unwrap();
        assert_eq!(chip.manufacturer, "MediaTek");
        assert!(chip.verified);
        assert_eq!(chip.chip_type.as_deref(), Some("SoC"));
        assert_eq!(chip.extra, vec!["880 MHz"]);
        assert!(normalizer.into_notes().is_empty());
    }

    #[test]
    fn test_unverified_chip_is_kept_and_noted() {
        let reference = ReferenceData::builtin();
        let mut normalizer = Normalizer::new(&reference);
        let chip = normalizer
            .chip("cpu1chip1", "Acme;X1000", slot(), ChipLayout::Standard)
            .unwrap();
        assert!(!chip.verified);
        assert_eq!(chip.model, "X1000");
        let notes = normalizer.into_notes();
        assert_eq!(notes[0].kind, NoteKind::UnverifiedChip);
    }

    #[test]
    fn test_verification_idempotent() {
        let reference = ReferenceData::builtin();
        let normalizer = Normalizer::new(&reference);
        let mut chip = ChipInfo::new(slot(), "Broadcom", "BCM4706");
        normalizer.verify(&mut chip);
        let once = chip.clone();
        normalizer.verify(&mut chip);
        assert_eq!(chip, once);
    }

    #[test]
    fn test_default_chip_is_absent() {
        let reference = ReferenceData::builtin();
        let mut normalizer = Normalizer::new(&reference);
        assert!(normalizer
            .chip("cpu1chip1", "<!-- manuf;model;extra -->", slot(), ChipLayout::Standard)
            .is_none());
        assert_eq!(normalizer.notes_len(), 0);
    }

    #[test]
    fn test_port_notes_fragments() {
        let reference = ReferenceData::builtin();
        let mut normalizer = Normalizer::new(&reference);
        let port = normalizer.port("serial", "yes, J1, under heatsink").unwrap();
        assert_eq!(port.present, Tristate::Yes);
        let notes = normalizer.into_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoteKind::UnparsedFragment);
    }

    #[test]
    fn test_residue_noted() {
        let reference = ReferenceData::builtin();
        let mut normalizer = Normalizer::new(&reference);
        let value = normalizer.clean("cpu1spd", "1.2 GHz<!-- 1.2 GHz -->").unwrap();
        assert_eq!(value, "1.2 GHz");
        assert_eq!(normalizer.into_notes()[0].kind, NoteKind::ResidueStripped);
    }
}
