//! Curated chip manufacturer/model reference list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Known chips: (manufacturer, model, type).
const BUILTIN_CHIPS: &[(&str, &str, &str)] = &[
    ("Atheros", "AR7241", "SoC"),
    ("Atheros", "AR7242", "SoC"),
    ("Atheros", "AR9132", "SoC"),
    ("Atheros", "AR9341", "SoC"),
    ("Atheros", "AR9344", "SoC"),
    ("Atheros", "AR9380", "radio"),
    ("Qualcomm Atheros", "QCA9558", "SoC"),
    ("Qualcomm Atheros", "QCA9563", "SoC"),
    ("Qualcomm Atheros", "QCA9880", "radio"),
    ("Qualcomm Atheros", "IPQ4019", "SoC"),
    ("Broadcom", "BCM4706", "SoC"),
    ("Broadcom", "BCM4708", "SoC"),
    ("Broadcom", "BCM4718", "SoC"),
    ("Broadcom", "BCM5354", "SoC"),
    ("Broadcom", "BCM5357", "SoC"),
    ("Broadcom", "BCM4331", "radio"),
    ("Broadcom", "BCM53125", "switch"),
    ("MediaTek", "MT7620A", "SoC"),
    ("MediaTek", "MT7621A", "SoC"),
    ("MediaTek", "MT7628AN", "SoC"),
    ("MediaTek", "MT7612E", "radio"),
    ("Ralink", "RT3052F", "SoC"),
    ("Ralink", "RT3883F", "SoC"),
    ("Ralink", "RT5350F", "SoC"),
    ("Realtek", "RTL8196C", "SoC"),
    ("Realtek", "RTL8197F", "SoC"),
    ("Realtek", "RTL8367RB", "switch"),
    ("Realtek", "RTL8812AR", "radio"),
    ("Lantiq", "PSB 80910", "SoC"),
    ("Marvell", "88F6281", "SoC"),
    ("Winbond", "W25Q128FV", "flash"),
    ("Winbond", "W25Q64FV", "flash"),
    ("Macronix", "MX25L12835F", "flash"),
    ("Macronix", "MX25L6406E", "flash"),
    ("Spansion", "S25FL128P", "flash"),
    ("Samsung", "K4H561638F", "RAM"),
    ("Nanya", "NT5DS16M16CS", "RAM"),
    ("Zentel", "A3R12E40CBF", "RAM"),
    ("Winbond", "W9751G6KB", "RAM"),
];

/// One reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipEntry {
    pub manufacturer: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_type: Option<String>,
}

/// Reference table used to mark chips as verified.
///
/// Lookup is case-insensitive on both manufacturer and model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ChipEntry>", into = "Vec<ChipEntry>")]
pub struct ChipReference {
    entries: HashMap<(String, String), ChipEntry>,
}

impl ChipReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in chip list.
    pub fn builtin() -> Self {
        BUILTIN_CHIPS
            .iter()
            .map(|(manufacturer, model, chip_type)| ChipEntry {
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
                chip_type: Some(chip_type.to_string()),
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub fn insert(&mut self, entry: ChipEntry) {
        let key = (entry.manufacturer.to_lowercase(), entry.model.to_lowercase());
        self.entries.insert(key, entry);
    }

    pub fn extend(&mut self, other: ChipReference) {
        self.entries.extend(other.entries);
    }

    /// Find the reference entry for a manufacturer/model pair.
    pub fn lookup(&self, manufacturer: &str, model: &str) -> Option<&ChipEntry> {
        if manufacturer.is_empty() || model.is_empty() {
            return None;
        }
        self.entries
            .get(&(manufacturer.to_lowercase(), model.to_lowercase()))
    }

    /// Whether the pair is in the reference list.
    pub fn verify(&self, manufacturer: &str, model: &str) -> bool {
        self.lookup(manufacturer, model).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ChipEntry>> for ChipReference {
    fn from(entries: Vec<ChipEntry>) -> Self {
        let mut reference = ChipReference::new();
        for entry in entries {
            reference.insert(entry);
        }
        reference
    }
}

impl From<ChipReference> for Vec<ChipEntry> {
    fn from(reference: ChipReference) -> Self {
        let mut entries: Vec<ChipEntry> = reference.entries.into_values().collect();
        entries.sort_by(|a, b| (&a.manufacturer, &a.model).cmp(&(&b.manufacturer, &b.model)));
        entries
    }
}
