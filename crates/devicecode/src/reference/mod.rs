//! Process-wide read-only reference tables.
//!
//! Loaded once at startup and passed by reference into the builder and
//! normalizer. Nothing here is mutated after loading.

mod chips;
mod defaults;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeviceCodeError, Result};

pub use chips::{ChipEntry, ChipReference};
pub use defaults::DefaultValueTable;

/// Canonical spellings for chip manufacturers.
const BRAND_REWRITES: &[(&str, &str)] = &[
    ("Mediatek", "MediaTek"),
    ("MEDIATEK", "MediaTek"),
    ("Realtek Semiconductor", "Realtek"),
    ("RealTek", "Realtek"),
    ("Atheros Communications", "Atheros"),
    ("Qualcomm-Atheros", "Qualcomm Atheros"),
    ("QCA", "Qualcomm Atheros"),
    ("Broadcom Corporation", "Broadcom"),
    ("Ralink Technology", "Ralink"),
    ("MXIC", "Macronix"),
    ("Winbond Electronics", "Winbond"),
    ("Samsung Electronics", "Samsung"),
];

/// Password field values that describe the password instead of stating it.
const PASSWORD_COMMENTS: &[&str] = &[
    "randomly generated",
    "set at first login",
    "set during setup",
    "qr code",
    "on the back of the router",
    "on label",
    "printed on label",
    "see label",
    "unique per device",
    "serial number",
];

/// FCC grantee codes for common network equipment vendors.
const FCC_GRANTEES: &[(&str, &str)] = &[
    ("MSQ", "ASUSTeK Computer Inc."),
    ("PY3", "NETGEAR Inc."),
    ("Q87", "Cisco-Linksys LLC"),
    ("TE7", "TP-Link Technologies Co., Ltd."),
    ("KA2", "D-Link Corporation"),
    ("U2M", "Buffalo Inc."),
    ("NDD", "Edimax Technology Co., Ltd."),
    ("HED", "Accton Technology Corporation"),
];

/// All reference tables used while building records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub defaults: DefaultValueTable,
    #[serde(default)]
    pub chips: ChipReference,
    #[serde(default)]
    pub brand_rewrites: HashMap<String, String>,
    /// Lowercase password comments.
    #[serde(default)]
    pub password_comments: Vec<String>,
    #[serde(default)]
    pub fcc_grantees: HashMap<String, String>,
}

impl ReferenceData {
    /// The compiled-in tables.
    pub fn builtin() -> Self {
        Self {
            defaults: DefaultValueTable::builtin(),
            chips: ChipReference::builtin(),
            brand_rewrites: BRAND_REWRITES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            password_comments: PASSWORD_COMMENTS.iter().map(|s| s.to_string()).collect(),
            fcc_grantees: FCC_GRANTEES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }

    /// Load tables from a JSON file. Sections missing from the file are empty.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DeviceCodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DeviceCodeError::Reference(format!(
                "Failed to parse reference tables '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Built-in tables extended with the contents of a JSON file.
    pub fn builtin_with_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut data = Self::builtin();
        data.extend(Self::from_json_file(path)?);
        Ok(data)
    }

    /// Merge another set of tables into this one; entries in `other` win.
    pub fn extend(&mut self, other: ReferenceData) {
        self.defaults.extend(other.defaults);
        self.chips.extend(other.chips);
        self.brand_rewrites.extend(other.brand_rewrites);
        for comment in other.password_comments {
            let comment = comment.to_lowercase();
            if !self.password_comments.contains(&comment) {
                self.password_comments.push(comment);
            }
        }
        self.fcc_grantees.extend(other.fcc_grantees);
    }

    /// Canonical spelling of a manufacturer name.
    pub fn rewrite_brand<'a>(&'a self, name: &'a str) -> &'a str {
        self.brand_rewrites
            .get(name)
            .map(|s| s.as_str())
            .unwrap_or(name)
    }

    /// Whether a password value is really a comment about the password.
    pub fn is_password_comment(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.password_comments.iter().any(|c| *c == value)
    }

    pub fn grantee_name(&self, code: &str) -> Option<&str> {
        self.fcc_grantees.get(code).map(|s| s.as_str())
    }
}
