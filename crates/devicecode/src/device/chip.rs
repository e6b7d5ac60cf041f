//! Chip entries and their structural addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Functional category of a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipCategory {
    Cpu,
    Flash,
    Ram,
    Ethernet,
    Switch,
    Radio,
    Additional,
}

impl ChipCategory {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ChipCategory::Cpu => "CPU",
            ChipCategory::Flash => "Flash",
            ChipCategory::Ram => "RAM",
            ChipCategory::Ethernet => "Ethernet",
            ChipCategory::Switch => "Switch",
            ChipCategory::Radio => "Radio",
            ChipCategory::Additional => "Additional",
        }
    }
}

/// Position of a chip within the device: `rad2chip2` is the second chip of
/// the second radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChipSlot {
    pub category: ChipCategory,
    pub instance: u8,
    pub sub_index: u8,
}

impl ChipSlot {
    pub fn new(category: ChipCategory, instance: u8, sub_index: u8) -> Self {
        Self {
            category,
            instance,
            sub_index,
        }
    }
}

impl fmt::Display for ChipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.category.label(),
            self.instance,
            self.sub_index
        )
    }
}

/// A single chip as described on a wiki page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInfo {
    pub slot: ChipSlot,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    /// Free-text descriptor fields after the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
    /// Leading description (additional chips only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Chip type from the reference table, e.g. "SoC".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_type: Option<String>,
    /// Manufacturer and model match the curated reference table.
    #[serde(default)]
    pub verified: bool,
}

impl ChipInfo {
    /// Create an unverified chip entry.
    pub fn new(slot: ChipSlot, manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            slot,
            manufacturer: manufacturer.into(),
            model: model.into(),
            extra: Vec::new(),
            description: None,
            chip_type: None,
            verified: false,
        }
    }

    /// Set the extra descriptor fields.
    pub fn with_extra(mut self, extra: Vec<String>) -> Self {
        self.extra = extra;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if neither manufacturer nor model is known.
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_empty() && self.model.is_empty()
    }
}
