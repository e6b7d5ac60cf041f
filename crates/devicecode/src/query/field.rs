//! Filter names and their values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::{Origin, Tristate};

/// Lowest and highest year a `year` filter accepts.
pub const YEAR_RANGE: (i32, i32) = (1990, 2040);

/// A filter name in the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Baud,
    Bootloader,
    Brand,
    Chip,
    ChipType,
    ChipVendor,
    Connector,
    Cpe,
    Cve,
    CveId,
    Fcc,
    FccId,
    Flag,
    IgnoreBrand,
    IgnoreOdm,
    IgnoreOrigin,
    Ip,
    Jtag,
    Odm,
    Origin,
    Os,
    Package,
    Partition,
    Password,
    PcbId,
    Rootfs,
    Sdk,
    Serial,
    Type,
    Year,
}

impl FilterField {
    pub const ALL: [FilterField; 30] = [
        FilterField::Baud,
        FilterField::Bootloader,
        FilterField::Brand,
        FilterField::Chip,
        FilterField::ChipType,
        FilterField::ChipVendor,
        FilterField::Connector,
        FilterField::Cpe,
        FilterField::Cve,
        FilterField::CveId,
        FilterField::Fcc,
        FilterField::FccId,
        FilterField::Flag,
        FilterField::IgnoreBrand,
        FilterField::IgnoreOdm,
        FilterField::IgnoreOrigin,
        FilterField::Ip,
        FilterField::Jtag,
        FilterField::Odm,
        FilterField::Origin,
        FilterField::Os,
        FilterField::Package,
        FilterField::Partition,
        FilterField::Password,
        FilterField::PcbId,
        FilterField::Rootfs,
        FilterField::Sdk,
        FilterField::Serial,
        FilterField::Type,
        FilterField::Year,
    ];

    /// Name as written in a query.
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::Baud => "baud",
            FilterField::Bootloader => "bootloader",
            FilterField::Brand => "brand",
            FilterField::Chip => "chip",
            FilterField::ChipType => "chip_type",
            FilterField::ChipVendor => "chip_vendor",
            FilterField::Connector => "connector",
            FilterField::Cpe => "cpe",
            FilterField::Cve => "cve",
            FilterField::CveId => "cveid",
            FilterField::Fcc => "fcc",
            FilterField::FccId => "fccid",
            FilterField::Flag => "flag",
            FilterField::IgnoreBrand => "ignore_brand",
            FilterField::IgnoreOdm => "ignore_odm",
            FilterField::IgnoreOrigin => "ignore_origin",
            FilterField::Ip => "ip",
            FilterField::Jtag => "jtag",
            FilterField::Odm => "odm",
            FilterField::Origin => "origin",
            FilterField::Os => "os",
            FilterField::Package => "package",
            FilterField::Partition => "partition",
            FilterField::Password => "password",
            FilterField::PcbId => "pcbid",
            FilterField::Rootfs => "rootfs",
            FilterField::Sdk => "sdk",
            FilterField::Serial => "serial",
            FilterField::Type => "type",
            FilterField::Year => "year",
        }
    }

    /// Parameter keys accepted after `?`.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            FilterField::Bootloader | FilterField::Package | FilterField::Sdk => &["version"],
            FilterField::FccId => &["type"],
            FilterField::Jtag | FilterField::Serial => &["populated"],
            _ => &[],
        }
    }

    /// Whether a match excludes the device.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            FilterField::IgnoreBrand | FilterField::IgnoreOdm | FilterField::IgnoreOrigin
        )
    }

    /// Fixed value set, for names that do not take free text.
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self {
            FilterField::Cpe | FilterField::Cve | FilterField::Fcc => Some(&["no", "yes"]),
            FilterField::Jtag | FilterField::Serial => Some(&["no", "unknown", "yes"]),
            FilterField::Origin | FilterField::IgnoreOrigin => {
                Some(&["techinfodepot", "wikidevi", "openwrt"])
            }
            _ => None,
        }
    }

    /// Parse one statement value for this name. A `year` range yields
    /// every year it covers.
    pub fn parse_value(&self, raw: &str) -> std::result::Result<Vec<FilterValue>, String> {
        let value = raw.trim();
        if value.is_empty() {
            return Err("empty value".to_string());
        }
        if let Some(choices) = self.choices() {
            if !choices.contains(&value) {
                return Err(format!("expected one of {}", choices.join(", ")));
            }
        }

        let parsed = match self {
            FilterField::Baud => {
                let rate = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid baud rate '{}'", value))?;
                FilterValue::Number(rate)
            }
            FilterField::Cpe | FilterField::Cve | FilterField::Fcc => {
                FilterValue::Flag(value == "yes")
            }
            FilterField::Jtag | FilterField::Serial => FilterValue::Presence(match value {
                "yes" => Tristate::Yes,
                "no" => Tristate::No,
                _ => Tristate::Unknown,
            }),
            FilterField::Origin | FilterField::IgnoreOrigin => {
                FilterValue::Origin(value.parse::<Origin>()?)
            }
            FilterField::Year => return parse_years(value),
            _ => FilterValue::Text(value.to_string()),
        };
        Ok(vec![parsed])
    }
}

fn parse_years(value: &str) -> std::result::Result<Vec<FilterValue>, String> {
    let parse = |s: &str| -> std::result::Result<i32, String> {
        let year = s
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid year '{}'", s))?;
        if year < YEAR_RANGE.0 || year > YEAR_RANGE.1 {
            return Err(format!(
                "year {} outside {}..{}",
                year, YEAR_RANGE.0, YEAR_RANGE.1
            ));
        }
        Ok(year)
    };

    let (start, end) = match value.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (parse(a)?, parse(b)?);
            (a.min(b), a.max(b))
        }
        None => {
            let year = parse(value)?;
            (year, year)
        }
    };
    Ok((start..=end).map(FilterValue::Year).collect())
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        FilterField::ALL
            .iter()
            .find(|f| f.name() == name)
            .copied()
            .ok_or_else(|| format!("Unknown filter name: {}", s))
    }
}

/// A typed statement value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FilterValue {
    /// Lowercased free text.
    Text(String),
    Number(u32),
    Year(i32),
    /// yes/no.
    Flag(bool),
    Presence(Tristate),
    Origin(Origin),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{}", s),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Year(y) => write!(f, "{}", y),
            FilterValue::Flag(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            FilterValue::Presence(t) => write!(f, "{}", t),
            FilterValue::Origin(o) => write!(f, "{}", o.slug()),
        }
    }
}
