//! Known template defaults ("non-answers") per field identifier.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Chip identifiers used by the TechInfoDepot and WikiDevi infoboxes.
const CHIP_IDENTIFIERS: &[&str] = &[
    "cpu1chip1", "cpu1chip2", "cpu2chip1", "cpu1_brand", "cpu2_brand",
    "fla1chip", "fla2chip", "ram1chip", "ram2chip", "sw1chip", "sw2chip",
    "eth1chip", "eth2chip", "eth3chip", "eth4chip", "eth5chip", "eth6chip",
    "rad1chip1", "rad1chip2", "rad1chip3", "rad2chip1", "rad2chip2", "rad2chip3",
    "rad3chip1", "rad3chip2", "rad3chip3", "rad4chip1", "rad4chip2", "rad4chip3",
    "wi1_chip1", "wi1_chip2", "wi2_chip1", "wi2_chip2", "wi3_chip1",
    "addchip", "addl_chips",
];

/// Placeholder texts the chip templates have shipped with over the years.
const CHIP_DEFAULTS: &[&str] = &[
    "<!-- manuf;model;extra -->",
    "<!-- Manuf;Model;Extra -->",
    "<!-- manufacturer;model;notes -->",
    "<!-- description;manuf;model;extra -->",
    "manuf;model;extra",
    ",,,",
];

/// Field-specific placeholders.
const FIELD_DEFAULTS: &[(&str, &[&str])] = &[
    ("brand", &["<!-- brand -->", "<!-- Brand -->"]),
    ("model", &["<!-- model -->", "<!-- model number -->"]),
    ("cpu1spd", &["<!-- e.g. 400 MHz -->", "<!-- MHz -->", "<!-- speed -->"]),
    ("cpu2spd", &["<!-- e.g. 400 MHz -->", "<!-- MHz -->"]),
    ("fla1amt", &["<!-- MiB -->", "<!-- e.g. 16 MiB -->", "<!-- amount -->"]),
    ("fla2amt", &["<!-- MiB -->", "<!-- e.g. 16 MiB -->"]),
    ("ram1amt", &["<!-- MiB -->", "<!-- e.g. 64 MiB -->", "<!-- amount -->"]),
    ("ram2amt", &["<!-- MiB -->", "<!-- e.g. 64 MiB -->"]),
    ("type", &["<!-- device type -->", "<!-- type -->"]),
    ("os", &["<!-- OS -->", "<!-- operating system -->"]),
    ("serial", &["<!-- yes/no, connector, pins -->", "<!-- yes/no -->", "<!-- serial -->"]),
    ("jtag", &["<!-- yes/no, connector, pins -->", "<!-- yes/no -->", "<!-- JTAG -->"]),
    ("boardid", &["<!-- PCB ID -->", "<!-- board id -->"]),
    ("pcb_id", &["<!-- PCB ID -->"]),
    ("fcc_id", &["<!-- FCC ID -->", "<!-- FCC ID, FCC ID -->"]),
    ("fccapprovaldate", &["<!-- mm/dd/yyyy -->", "<!-- date -->"]),
    ("fcc_date", &["<!-- mm/dd/yyyy -->"]),
    ("releasedate", &["<!-- mm/dd/yyyy -->", "<!-- yyyy-mm-dd -->", "<!-- date -->"]),
    ("release_date", &["<!-- mm/dd/yyyy -->"]),
    ("defaultip", &["<!-- IP -->", "<!-- 192.168.x.x -->"]),
    ("default_ip", &["<!-- IP -->"]),
    ("defaultlogin", &["<!-- login -->", "<!-- user name -->"]),
    ("default_login", &["<!-- login -->"]),
    ("defaultpass", &["<!-- password -->", "<!-- default password -->"]),
    ("default_pass", &["<!-- password -->"]),
    ("manuf", &["<!-- ODM -->", "<!-- manufacturer -->"]),
    ("manuf_mdl", &["<!-- ODM model -->"]),
    ("wikidevi", &["<!-- WikiDevi page name -->", "<!-- WikiDevi -->"]),
    ("bootloader", &["<!-- bootloader -->", "<!-- e.g. U-Boot -->"]),
    ("sdk", &["<!-- SDK -->"]),
    ("wi1_module", &["<!-- module -->"]),
];

/// Lookup table of unedited template defaults.
///
/// Matching is always exact and full-string: a value that merely contains a
/// default is data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultValueTable {
    entries: HashMap<String, HashSet<String>>,
}

impl DefaultValueTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in table.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for identifier in CHIP_IDENTIFIERS {
            for default in CHIP_DEFAULTS {
                table.insert(identifier, default);
            }
        }
        for (identifier, defaults) in FIELD_DEFAULTS {
            for default in *defaults {
                table.insert(identifier, default);
            }
        }
        table
    }

    /// Register a default for an identifier.
    pub fn insert(&mut self, identifier: &str, default: &str) {
        self.entries
            .entry(identifier.to_lowercase())
            .or_default()
            .insert(default.to_string());
    }

    /// Merge another table into this one.
    pub fn extend(&mut self, other: DefaultValueTable) {
        for (identifier, defaults) in other.entries {
            self.entries
                .entry(identifier.to_lowercase())
                .or_default()
                .extend(defaults);
        }
    }

    /// Whether `value` is a known non-answer for `identifier`.
    pub fn is_default(&self, identifier: &str, value: &str) -> bool {
        self.entries
            .get(&identifier.to_lowercase())
            .is_some_and(|defaults| defaults.contains(value))
    }

    /// Whether text left over after comment stripping is a known default
    /// with its markers removed. Whitespace runs are compared as one space.
    pub fn is_stripped_default(&self, identifier: &str, text: &str) -> bool {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return false;
        }
        self.entries
            .get(&identifier.to_lowercase())
            .is_some_and(|defaults| {
                defaults
                    .iter()
                    .any(|default| collapse_whitespace(unmarked(default)) == text)
            })
    }

    /// Number of identifiers with at least one default.
    pub fn identifier_count(&self) -> usize {
        self.entries.len()
    }
}

/// A default without its surrounding comment markers.
fn unmarked(default: &str) -> &str {
    let default = default.trim();
    let default = default.strip_prefix("<!--").unwrap_or(default);
    default.strip_suffix("-->").unwrap_or(default)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        let table = DefaultValueTable::builtin();
        assert!(table.is_default("cpu1chip1", "<!-- manuf;model;extra -->"));
        assert!(!table.is_default("cpu1chip1", "Atheros;AR9344<!-- manuf;model;extra -->"));
        assert!(!table.is_default("cpu1chip1", "manuf;model;extra;"));
    }

    #[test]
    fn test_multiple_historic_defaults() {
        let table = DefaultValueTable::builtin();
        assert!(table.is_default("serial", "<!-- yes/no -->"));
        assert!(table.is_default("serial", "<!-- yes/no, connector, pins -->"));
    }

    #[test]
    fn test_identifier_is_case_insensitive() {
        let mut table = DefaultValueTable::new();
        table.insert("FCC_ID", "<!-- FCC ID -->");
        assert!(table.is_default("fcc_id", "<!-- FCC ID -->"));
        assert!(!table.is_default("fcc_id", "<!-- fcc id -->"));
    }

    #[test]
    fn test_stripped_default_per_field_family() {
        let table = DefaultValueTable::builtin();
        let cases = [
            ("cpu1chip1", "Manuf;Model;Extra"),
            ("cpu1spd", "e.g. 400 MHz"),
            ("fla1amt", "MiB"),
            ("ram1amt", "e.g.  64 MiB"),
            ("serial", "yes/no, connector, pins"),
            ("fcc_id", "FCC ID"),
            ("releasedate", "mm/dd/yyyy"),
            ("defaultpass", "password"),
            ("manuf", "ODM"),
            ("wikidevi", "WikiDevi page name"),
        ];
        for (identifier, text) in cases {
            assert!(table.is_stripped_default(identifier, text), "{}: {}", identifier, text);
        }
        assert!(!table.is_stripped_default("cpu1spd", "400 MHz"));
        assert!(!table.is_stripped_default("fla1amt", "16 MiB"));
        assert!(!table.is_stripped_default("model", "MiB"));
        assert!(!table.is_stripped_default("fla1amt", "  "));
    }

    #[test]
    fn test_unknown_identifier() {
        let table = DefaultValueTable::builtin();
        assert!(!table.is_default("no_such_field", "<!-- manuf;model;extra -->"));
    }

    #[test]
    fn test_extend_and_deserialize() {
        let extra: DefaultValueTable =
            serde_json::from_str(r#"{"cpu1spd": ["<!-- GHz -->"]}"#).unwrap();
        let mut table = DefaultValueTable::builtin();
        let before = table.identifier_count();
        table.extend(extra);
        assert_eq!(table.identifier_count(), before);
        assert!(table.is_default("cpu1spd", "<!-- GHz -->"));
        assert!(table.is_default("cpu1spd", "<!-- MHz -->"));
    }
}
