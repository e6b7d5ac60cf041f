//! Chip descriptor parsing and slot addressing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::device::{ChipCategory, ChipSlot};

static NUMBERED_CHIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(cpu|fla|ram|sw|eth|rad)(\d+)chip(\d*)$").unwrap()
});

static WIKIDEVI_CPU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cpu(\d+)_brand$").unwrap());

static WIKIDEVI_RADIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^wi(\d+)_chip(\d+)$").unwrap());

/// Identifiers holding "additional chip" descriptors.
pub const ADDITIONAL_CHIP_IDENTIFIERS: &[&str] = &["addchip", "addl_chips"];

/// How a chip descriptor is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipLayout {
    /// `manufacturer;model;extra...`
    Standard,
    /// `description;manufacturer;model;extra...`
    Additional,
}

/// A chip descriptor split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipDescriptor {
    pub description: Option<String>,
    pub manufacturer: String,
    pub model: String,
    pub extra: Vec<String>,
}

/// Parse the chip address encoded in a field identifier.
///
/// `rad2chip2` is radio 2, chip 2; `fla1chip` is flash 1, chip 1. Additional
/// chips carry no address in their identifier and return `None` here.
pub fn parse_slot(identifier: &str) -> Option<ChipSlot> {
    let identifier = identifier.to_lowercase();

    if let Some(caps) = NUMBERED_CHIP.captures(&identifier) {
        let category = match &caps[1] {
            "cpu" => ChipCategory::Cpu,
            "fla" => ChipCategory::Flash,
            "ram" => ChipCategory::Ram,
            "sw" => ChipCategory::Switch,
            "eth" => ChipCategory::Ethernet,
            _ => ChipCategory::Radio,
        };
        let instance = caps[2].parse().ok()?;
        let sub_index = match &caps[3] {
            "" => 1,
            n => n.parse().ok()?,
        };
        return Some(ChipSlot::new(category, instance, sub_index));
    }

    if let Some(caps) = WIKIDEVI_CPU.captures(&identifier) {
        return Some(ChipSlot::new(ChipCategory::Cpu, caps[1].parse().ok()?, 1));
    }

    if let Some(caps) = WIKIDEVI_RADIO.captures(&identifier) {
        return Some(ChipSlot::new(
            ChipCategory::Radio,
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
        ));
    }

    None
}

/// Whether the identifier names an additional-chip field.
pub fn is_additional_chip(identifier: &str) -> bool {
    let identifier = identifier.to_lowercase();
    ADDITIONAL_CHIP_IDENTIFIERS.contains(&identifier.as_str())
}

/// Split a `;`-delimited descriptor. Missing trailing parts stay empty.
pub fn split_descriptor(value: &str, layout: ChipLayout) -> ChipDescriptor {
    let value = match layout {
        ChipLayout::Additional => value.trim().trim_start_matches(",,,").trim(),
        ChipLayout::Standard => value.trim(),
    };
    let mut parts = value.split(';').map(str::trim);

    let description = match layout {
        ChipLayout::Additional => parts.next().filter(|d| !d.is_empty()).map(String::from),
        ChipLayout::Standard => None,
    };
    let manufacturer = parts.next().unwrap_or("").to_string();
    let model = parts.next().unwrap_or("").to_string();
    let extra = parts.filter(|p| !p.is_empty()).map(String::from).collect();

    ChipDescriptor {
        description,
        manufacturer,
        model,
        extra,
    }
}
