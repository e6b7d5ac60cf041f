//! Known values per filter name over a record set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::device::{CanonicalDevice, ChipCategory, PasswordState};

use super::field::{FilterField, FilterValue};
use super::filter::Query;

/// Value counts per filter name. Each record counts once per value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    values: BTreeMap<FilterField, BTreeMap<String, usize>>,
}

impl Catalog {
    pub fn from_devices<'a>(devices: impl IntoIterator<Item = &'a CanonicalDevice>) -> Self {
        let mut catalog = Catalog::default();
        for device in devices {
            for field in FilterField::ALL {
                let counts = catalog.values.entry(field).or_default();
                for value in field_values(field, device) {
                    *counts.entry(value).or_insert(0) += 1;
                }
            }
        }
        catalog
    }

    /// Counts for one name, keyed by lowercase value.
    pub fn counts(&self, field: FilterField) -> Option<&BTreeMap<String, usize>> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: FilterField, value: &str) -> bool {
        self.values
            .get(&field)
            .is_some_and(|counts| counts.contains_key(&value.to_lowercase()))
    }

    /// Free-text statement values that no record carries.
    pub fn unknown_values(&self, query: &Query) -> Vec<(FilterField, String)> {
        let mut unknown = Vec::new();
        for (field, predicates) in query.groups() {
            for predicate in predicates {
                if let FilterValue::Text(text) = &predicate.value {
                    if !self.contains(*field, text) {
                        unknown.push((*field, text.clone()));
                    }
                }
            }
        }
        unknown
    }

    /// Completions for a partial value, most common first.
    pub fn suggest(&self, field: FilterField, prefix: &str) -> Vec<&str> {
        if let Some(choices) = field.choices() {
            return choices.iter().copied().filter(|c| c.starts_with(prefix)).collect();
        }
        let Some(counts) = self.values.get(&field) else {
            return Vec::new();
        };
        let prefix = prefix.to_lowercase();
        let mut found: Vec<(&str, usize)> = counts
            .iter()
            .filter(|(value, _)| value.starts_with(&prefix))
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        found.into_iter().map(|(value, _)| value).collect()
    }
}

/// Lowercase values a record offers for one filter name.
pub fn field_values(field: FilterField, device: &CanonicalDevice) -> BTreeSet<String> {
    let lower = |s: &str| s.trim().to_lowercase();
    let mut values = BTreeSet::new();
    let cpus = || device.chips_in(ChipCategory::Cpu);
    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();

    match field {
        FilterField::Baud => values.extend(device.connectivity.serial.baud_rate.map(|b| b.to_string())),
        FilterField::Bootloader => {
            values.extend(device.software.bootloader.as_ref().map(|b| lower(&b.manufacturer)))
        }
        FilterField::Brand | FilterField::IgnoreBrand => {
            values.insert(lower(&device.identity.brand));
        }
        FilterField::Chip => values.extend(cpus().map(|c| lower(&c.model))),
        FilterField::ChipType => values.extend(cpus().filter_map(|c| c.chip_type.as_deref()).map(lower)),
        FilterField::ChipVendor => values.extend(cpus().map(|c| lower(&c.manufacturer))),
        FilterField::Connector => values.extend(device.connectivity.serial.connector.as_deref().map(lower)),
        FilterField::Cpe => {
            values.insert(yes_no(!device.regulatory.cpe_ids.is_empty()));
        }
        FilterField::Cve => {
            values.insert(yes_no(!device.regulatory.cve_ids.is_empty()));
        }
        FilterField::CveId => values.extend(device.regulatory.cve_ids.iter().map(|c| lower(c))),
        FilterField::Fcc => {
            values.insert(yes_no(!device.regulatory.fcc_ids.is_empty()));
        }
        FilterField::FccId => values.extend(device.regulatory.fcc_ids.iter().map(|f| lower(&f.id))),
        FilterField::Flag => values.extend(device.flags.iter().map(|f| lower(f))),
        FilterField::Ip => values.extend(device.credentials.ip.as_deref().map(lower)),
        FilterField::Jtag => {
            values.insert(device.connectivity.jtag.present.label().to_string());
        }
        FilterField::Odm | FilterField::IgnoreOdm => {
            values.extend(device.manufacturer.name.as_deref().map(lower))
        }
        FilterField::Origin | FilterField::IgnoreOrigin => {
            values.insert(device.origin.slug().to_string());
        }
        FilterField::Os => values.extend(device.software.os.as_deref().map(lower)),
        FilterField::Package => values.extend(device.software.packages.iter().map(|p| lower(&p.name))),
        FilterField::Partition => values.extend(device.software.partitions.iter().map(|p| lower(p))),
        FilterField::Password => {
            if let PasswordState::Present(p) = &device.credentials.password {
                values.insert(lower(p));
            }
        }
        FilterField::PcbId => values.extend(device.regulatory.pcb_id.as_deref().map(lower)),
        FilterField::Rootfs => values.extend(device.software.rootfs.iter().map(|r| lower(r))),
        FilterField::Sdk => values.extend(device.software.sdk.as_ref().map(|s| lower(&s.name))),
        FilterField::Serial => {
            values.insert(device.connectivity.serial.present.label().to_string());
        }
        FilterField::Type => values.extend(device.device_types.iter().map(|t| lower(t))),
        FilterField::Year => values.extend(device.years().into_iter().map(|y| y.to_string())),
    }
    values.retain(|v| !v.is_empty());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Identity, Origin};

    fn devices() -> Vec<CanonicalDevice> {
        let mut a = CanonicalDevice::new(Origin::WikiDevi, "A", Identity::new("Asus", "RT-N16"));
        a.manufacturer.name = Some("Accton".to_string());
        let mut b = CanonicalDevice::new(Origin::WikiDevi, "B", Identity::new("ASUS", "RT-N66U"));
        b.manufacturer.name = Some("Accton".to_string());
        let c = CanonicalDevice::new(Origin::OpenWrt, "c", Identity::new("Arcadyan", "X"));
        vec![a, b, c]
    }

    #[test]
    fn test_catalog_counts() {
        let catalog = Catalog::from_devices(&devices());
        let brands = catalog.counts(FilterField::Brand).unwrap();
        assert_eq!(brands.get("asus"), Some(&2));
        assert_eq!(brands.get("arcadyan"), Some(&1));
        assert_eq!(catalog.counts(FilterField::Serial).unwrap().get("unknown"), Some(&3));
        assert!(catalog.contains(FilterField::Odm, "ACCTON"));
    }

    #[test]
    fn test_unknown_values() {
        let catalog = Catalog::from_devices(&devices());
        let query = Query::parse("brand=asus brand=linksys odm=accton serial=yes").unwrap();
        assert_eq!(
            catalog.unknown_values(&query),
            vec![(FilterField::Brand, "linksys".to_string())]
        );
    }

    #[test]
    fn test_suggest() {
        let catalog = Catalog::from_devices(&devices());
        assert_eq!(catalog.suggest(FilterField::Brand, "a"), vec!["asus", "arcadyan"]);
        assert_eq!(catalog.suggest(FilterField::Origin, "w"), vec!["wikidevi"]);
        assert!(catalog.suggest(FilterField::Brand, "z").is_empty());
    }
}
