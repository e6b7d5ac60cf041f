//! Source wikis and record identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The wiki that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Origin {
    TechInfoDepot,
    WikiDevi,
    OpenWrt,
}

impl Origin {
    /// All origins, in anchor-preference order.
    pub const ALL: [Origin; 3] = [Origin::TechInfoDepot, Origin::WikiDevi, Origin::OpenWrt];

    /// Get a human-readable label (also used as directory name).
    pub fn label(&self) -> &'static str {
        match self {
            Origin::TechInfoDepot => "TechInfoDepot",
            Origin::WikiDevi => "WikiDevi",
            Origin::OpenWrt => "OpenWrt",
        }
    }

    /// Lowercase name as used by the query language.
    pub fn slug(&self) -> &'static str {
        match self {
            Origin::TechInfoDepot => "techinfodepot",
            Origin::WikiDevi => "wikidevi",
            Origin::OpenWrt => "openwrt",
        }
    }

    /// Whether records of this origin may anchor a merge group.
    ///
    /// OpenWrt data is too sparse to anchor; it only corroborates.
    pub fn is_anchor(&self) -> bool {
        !matches!(self, Origin::OpenWrt)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "techinfodepot" | "tid" => Ok(Origin::TechInfoDepot),
            "wikidevi" | "wd" => Ok(Origin::WikiDevi),
            "openwrt" | "owrt" => Ok(Origin::OpenWrt),
            _ => Err(format!(
                "Unknown origin: {}. Use techinfodepot, wikidevi or openwrt.",
                s
            )),
        }
    }
}

/// Identity of one record: one per (origin, wiki page).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceKey {
    pub origin: Origin,
    pub title: String,
}

impl DeviceKey {
    /// Create a key, normalizing the title the way MediaWiki resolves links.
    pub fn new(origin: Origin, title: &str) -> Self {
        Self {
            origin,
            title: normalize_title(title),
        }
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin.label(), self.title)
    }
}

/// Normalize a page title or link target.
///
/// Underscores and spaces are equivalent, runs of whitespace collapse, a
/// `#fragment` is dropped and the first character is uppercased.
pub fn normalize_title(title: &str) -> String {
    let title = title.split('#').next().unwrap_or("");
    let collapsed = title
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
