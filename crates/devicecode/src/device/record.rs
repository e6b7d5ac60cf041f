//! The canonical device record and its parts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::chip::{ChipCategory, ChipInfo};
use super::origin::{DeviceKey, Origin};
use crate::normalize::QualityNote;

// =============================================================================
// Small value types
// =============================================================================

/// Three-valued answer used for port presence and header population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Tristate {
    pub fn label(&self) -> &'static str {
        match self {
            Tristate::Yes => "yes",
            Tristate::No => "no",
            Tristate::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tristate::Unknown)
    }
}

impl fmt::Display for Tristate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Tristate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(Tristate::Yes),
            "no" => Ok(Tristate::No),
            "unknown" => Ok(Tristate::Unknown),
            other => Err(format!("expected yes, no or unknown, got '{}'", other)),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Brand, model and revision as sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

impl Identity {
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

/// The original design manufacturer that actually built the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Manufacturer {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.model.is_none() && self.revision.is_none() && self.country.is_none()
    }
}

// =============================================================================
// Regulatory
// =============================================================================

/// Whether an FCC filing covers the product itself or an internal module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FccType {
    Main,
    Auxiliary,
    #[default]
    Unknown,
}

impl FccType {
    pub fn label(&self) -> &'static str {
        match self {
            FccType::Main => "main",
            FccType::Auxiliary => "auxiliary",
            FccType::Unknown => "unknown",
        }
    }
}

/// One FCC identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FccId {
    pub id: String,
    #[serde(default)]
    pub fcc_type: FccType,
    /// Grantee code prefix of the id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub grantee_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl FccId {
    /// True if the id identifies the product rather than a bought-in module.
    pub fn identifies_product(&self) -> bool {
        !matches!(self.fcc_type, FccType::Auxiliary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regulatory {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fcc_ids: Vec<FccId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcb_id: Option<String>,
    /// Filled by overlays.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpe_ids: Vec<String>,
    /// Filled by overlays.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cve_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_certified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_certified_date: Option<NaiveDate>,
}

// =============================================================================
// Connectivity
// =============================================================================

/// A debug port (serial console or JTAG).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortInfo {
    #[serde(default)]
    pub present: Tristate,
    #[serde(default)]
    pub populated: Tristate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_parity_stop: Option<String>,
    /// Fragments that could not be interpreted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connectivity {
    #[serde(default)]
    pub serial: PortInfo,
    #[serde(default)]
    pub jtag: PortInfo,
}

// =============================================================================
// Credentials
// =============================================================================

/// Default password, kept three-valued: a blank field on the wiki does not
/// tell whether the device has no password or nobody wrote it down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum PasswordState {
    /// The device ships without a password.
    No,
    #[default]
    Unknown,
    Present(String),
}

impl PasswordState {
    pub fn value(&self) -> Option<&str> {
        match self {
            PasswordState::Present(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_comment: Option<String>,
    #[serde(default)]
    pub password: PasswordState,
    /// Free text such as "printed on label"; set instead of a password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_comment: Option<String>,
}

// =============================================================================
// Software
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bootloader {
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub vendor_modified: Tristate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sdk {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLicense {
    pub module: String,
    pub license: String,
}

/// Software facts, from infobox fields and mined boot logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<Sdk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootloader: Option<Bootloader>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kernel_cmdline: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rootfs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub module_licenses: Vec<ModuleLicense>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nand: Vec<String>,
}

impl Software {
    /// Add a package unless the same name/version is already recorded.
    pub fn add_package(&mut self, name: &str, version: Option<String>) {
        let package = Package {
            name: name.to_string(),
            version,
        };
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
    }
}

// =============================================================================
// Device
// =============================================================================

/// Declared correspondence to a page on another wiki.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossLink {
    pub origin: Origin,
    pub title: String,
}

impl CrossLink {
    pub fn new(origin: Origin, title: impl Into<String>) -> Self {
        Self {
            origin,
            title: title.into(),
        }
    }

    pub fn target(&self) -> DeviceKey {
        DeviceKey::new(self.origin, &self.title)
    }
}

/// One device as described by one wiki page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDevice {
    pub origin: Origin,
    pub title: String,
    pub identity: Identity,
    #[serde(default, skip_serializing_if = "Manufacturer::is_empty")]
    pub manufacturer: Manufacturer,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_types: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taglines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<ChipInfo>,
    #[serde(default)]
    pub regulatory: Regulatory,
    #[serde(default)]
    pub connectivity: Connectivity,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub software: Software,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_links: Vec<CrossLink>,
    /// Data-quality annotations made while building the record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<QualityNote>,
}

impl CanonicalDevice {
    /// Create an otherwise empty record.
    pub fn new(origin: Origin, title: impl Into<String>, identity: Identity) -> Self {
        Self {
            origin,
            title: title.into(),
            identity,
            manufacturer: Manufacturer::default(),
            device_types: Vec::new(),
            flags: BTreeSet::new(),
            taglines: Vec::new(),
            release_date: None,
            chips: Vec::new(),
            regulatory: Regulatory::default(),
            connectivity: Connectivity::default(),
            credentials: Credentials::default(),
            software: Software::default(),
            cross_links: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.origin, &self.title)
    }

    /// Chips of one category, in page order.
    pub fn chips_in(&self, category: ChipCategory) -> impl Iterator<Item = &ChipInfo> {
        self.chips.iter().filter(move |c| c.slot.category == category)
    }

    /// Links into one other origin.
    pub fn links_to(&self, origin: Origin) -> impl Iterator<Item = &CrossLink> {
        self.cross_links.iter().filter(move |l| l.origin == origin)
    }

    /// Years the device is associated with: release, product FCC grants and
    /// Wi-Fi certification.
    pub fn years(&self) -> BTreeSet<i32> {
        let mut years = BTreeSet::new();
        if let Some(date) = self.release_date {
            years.insert(date.year());
        }
        for fcc in &self.regulatory.fcc_ids {
            if fcc.identifies_product() {
                if let Some(date) = fcc.date {
                    years.insert(date.year());
                }
            }
        }
        if let Some(date) = self.regulatory.wifi_certified_date {
            years.insert(date.year());
        }
        years
    }

    /// FCC ids that identify the product itself.
    pub fn product_fcc_ids(&self) -> impl Iterator<Item = &str> {
        self.regulatory
            .fcc_ids
            .iter()
            .filter(|f| f.identifies_product())
            .map(|f| f.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ChipSlot;

    fn sample() -> CanonicalDevice {
        let mut device = CanonicalDevice::new(
            Origin::TechInfoDepot,
            "Asus RT-N66U",
            Identity::new("Asus", "RT-N66U").with_revision("A1"),
        );
        device.release_date = NaiveDate::from_ymd_opt(2012, 6, 1);
        device.regulatory.fcc_ids.push(FccId {
            id: "MSQ-RTN66U".into(),
            fcc_type: FccType::Main,
            grantee_code: "MSQ".into(),
            grantee: None,
            date: NaiveDate::from_ymd_opt(2011, 12, 20),
        });
        device.regulatory.fcc_ids.push(FccId {
            id: "TX2-RTL8812".into(),
            fcc_type: FccType::Auxiliary,
            grantee_code: "TX2".into(),
            grantee: None,
            date: NaiveDate::from_ymd_opt(2009, 1, 1),
        });
        device
    }

    #[test]
    fn test_years_skip_auxiliary_fcc() {
        let years: Vec<_> = sample().years().into_iter().collect();
        assert_eq!(years, vec![2011, 2012]);
    }

    #[test]
    fn test_password_state_serialization() {
        let present = serde_json::to_value(PasswordState::Present("admin".into())).unwrap();
        assert_eq!(present["state"], "present");
        assert_eq!(present["value"], "admin");

        let no = serde_json::to_value(PasswordState::No).unwrap();
        assert_eq!(no["state"], "no");
    }

    #[test]
    fn test_device_json_roundtrip_is_stable() {
        let mut device = sample();
        device
            .chips
            .push(ChipInfo::new(ChipSlot::new(ChipCategory::Cpu, 1, 1), "Broadcom", "BCM4706"));
        device.flags.insert("linux".into());

        let json = serde_json::to_string_pretty(&device).unwrap();
        let back: CanonicalDevice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, device);
        assert_eq!(serde_json::to_string_pretty(&back).unwrap(), json);
    }

    #[test]
    fn test_tristate_parse() {
        assert_eq!("Yes".parse::<Tristate>().unwrap(), Tristate::Yes);
        assert!("maybe".parse::<Tristate>().is_err());
    }
}
