//! Combined view of a merge group.
//!
//! Squashing never edits the member records; it clones the leading member
//! and folds the others into the copy.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{CanonicalDevice, DeviceKey, PasswordState, PortInfo, Tristate};

use super::report::{MergeGroup, ReconciliationReport};

/// Two members disagree on a single-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub field: String,
    pub kept: String,
    pub other: String,
    /// Member the discarded value came from.
    pub source: DeviceKey,
}

/// A squashed group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquashResult {
    pub group: String,
    pub device: CanonicalDevice,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<FieldConflict>,
}

/// Squash one group. Members are looked up in `devices`; returns `None`
/// when none of them is present.
pub fn squash(group: &MergeGroup, devices: &[&CanonicalDevice]) -> Option<SquashResult> {
    let mut members: Vec<&CanonicalDevice> = group
        .members
        .iter()
        .filter_map(|key| devices.iter().copied().find(|d| &d.key() == key))
        .collect();
    // TechInfoDepot leads, then WikiDevi, then OpenWrt.
    members.sort_by_key(|d| d.origin);

    let (leader, rest) = members.split_first()?;
    let mut device = (*leader).clone();
    let mut conflicts = Vec::new();
    let keys: HashSet<DeviceKey> = group.members.iter().cloned().collect();

    for other in rest {
        let source = other.key();
        let mut folder = Folder {
            source: &source,
            conflicts: &mut conflicts,
        };
        folder.fold(&mut device, other);
    }

    device.cross_links.retain(|l| !keys.contains(&l.target()));
    for other in rest {
        for link in &other.cross_links {
            if !keys.contains(&link.target()) && !device.cross_links.contains(link) {
                device.cross_links.push(link.clone());
            }
        }
    }

    Some(SquashResult {
        group: group.id.clone(),
        device,
        conflicts,
    })
}

/// Squash every group of a report.
pub fn squash_all(report: &ReconciliationReport, devices: &[CanonicalDevice]) -> Vec<SquashResult> {
    let index: HashMap<DeviceKey, &CanonicalDevice> =
        devices.iter().map(|d| (d.key(), d)).collect();
    report
        .groups
        .iter()
        .filter_map(|group| {
            let members: Vec<&CanonicalDevice> = group
                .members
                .iter()
                .filter_map(|k| index.get(k).copied())
                .collect();
            squash(group, &members)
        })
        .collect()
}

struct Folder<'a> {
    source: &'a DeviceKey,
    conflicts: &'a mut Vec<FieldConflict>,
}

impl Folder<'_> {
    fn fold(&mut self, into: &mut CanonicalDevice, other: &CanonicalDevice) {
        if !into.identity.brand.eq_ignore_ascii_case(&other.identity.brand) {
            self.report("brand", &into.identity.brand, &other.identity.brand);
        }
        self.fill("revision", &mut into.identity.revision, &other.identity.revision);
        self.fill("part_number", &mut into.identity.part_number, &other.identity.part_number);
        self.fill("series", &mut into.identity.series, &other.identity.series);

        let (m, o) = (&mut into.manufacturer, &other.manufacturer);
        self.fill("manufacturer.name", &mut m.name, &o.name);
        self.fill("manufacturer.model", &mut m.model, &o.model);
        self.fill("manufacturer.revision", &mut m.revision, &o.revision);
        self.fill("manufacturer.country", &mut m.country, &o.country);

        union_strings(&mut into.device_types, &other.device_types);
        into.flags.extend(other.flags.iter().cloned());
        union_strings(&mut into.taglines, &other.taglines);
        self.fill("release_date", &mut into.release_date, &other.release_date);

        for chip in &other.chips {
            let known = into.chips.iter().any(|c| {
                c.slot.category == chip.slot.category
                    && c.manufacturer.eq_ignore_ascii_case(&chip.manufacturer)
                    && c.model.eq_ignore_ascii_case(&chip.model)
            });
            if !known {
                into.chips.push(chip.clone());
            }
        }

        let (r, o) = (&mut into.regulatory, &other.regulatory);
        for fcc in &o.fcc_ids {
            if !r.fcc_ids.iter().any(|f| f.id.eq_ignore_ascii_case(&fcc.id)) {
                r.fcc_ids.push(fcc.clone());
            }
        }
        self.fill("pcb_id", &mut r.pcb_id, &o.pcb_id);
        union_strings(&mut r.cpe_ids, &o.cpe_ids);
        union_strings(&mut r.cve_ids, &o.cve_ids);
        self.fill("wifi_certified", &mut r.wifi_certified, &o.wifi_certified);
        self.fill("wifi_certified_date", &mut r.wifi_certified_date, &o.wifi_certified_date);

        self.port("serial", &mut into.connectivity.serial, &other.connectivity.serial);
        self.port("jtag", &mut into.connectivity.jtag, &other.connectivity.jtag);

        let (c, o) = (&mut into.credentials, &other.credentials);
        self.fill("ip", &mut c.ip, &o.ip);
        union_strings(&mut c.logins, &o.logins);
        self.fill("login_comment", &mut c.login_comment, &o.login_comment);
        if c.password == PasswordState::Unknown {
            c.password = o.password.clone();
        } else if o.password != PasswordState::Unknown && c.password != o.password {
            self.report("password", &password_text(&c.password), &password_text(&o.password));
        }
        self.fill("password_comment", &mut c.password_comment, &o.password_comment);

        let (s, o) = (&mut into.software, &other.software);
        self.fill("os", &mut s.os, &o.os);
        if let Some(sdk) = &o.sdk {
            match &mut s.sdk {
                None => s.sdk = Some(sdk.clone()),
                Some(kept) if kept.name.eq_ignore_ascii_case(&sdk.name) => {
                    if kept.version.is_none() {
                        kept.version = sdk.version.clone();
                    }
                }
                Some(kept) => self.report("sdk", &kept.name, &sdk.name),
            }
        }
        if let Some(boot) = &o.bootloader {
            match &mut s.bootloader {
                None => s.bootloader = Some(boot.clone()),
                Some(kept) if kept.manufacturer.eq_ignore_ascii_case(&boot.manufacturer) => {
                    if kept.version.is_none() {
                        kept.version = boot.version.clone();
                    }
                    if kept.vendor_modified == Tristate::Unknown {
                        kept.vendor_modified = boot.vendor_modified;
                    }
                }
                Some(kept) => self.report("bootloader", &kept.manufacturer, &boot.manufacturer),
            }
        }
        for package in &o.packages {
            s.add_package(&package.name, package.version.clone());
        }
        union_strings(&mut s.build_dates, &o.build_dates);
        union_strings(&mut s.kernel_cmdline, &o.kernel_cmdline);
        union_strings(&mut s.partitions, &o.partitions);
        union_strings(&mut s.rootfs, &o.rootfs);
        for license in &o.module_licenses {
            if !s.module_licenses.contains(license) {
                s.module_licenses.push(license.clone());
            }
        }
        union_strings(&mut s.nand, &o.nand);

        for note in &other.notes {
            if !into.notes.contains(note) {
                into.notes.push(note.clone());
            }
        }
    }

    fn port(&mut self, name: &str, into: &mut PortInfo, other: &PortInfo) {
        self.tristate(&format!("{}.present", name), &mut into.present, other.present);
        self.tristate(&format!("{}.populated", name), &mut into.populated, other.populated);
        self.fill(&format!("{}.connector", name), &mut into.connector, &other.connector);
        self.fill(&format!("{}.baud_rate", name), &mut into.baud_rate, &other.baud_rate);
        self.fill(&format!("{}.voltage", name), &mut into.voltage, &other.voltage);
        self.fill(&format!("{}.pins", name), &mut into.pins, &other.pins);
        self.fill(
            &format!("{}.data_parity_stop", name),
            &mut into.data_parity_stop,
            &other.data_parity_stop,
        );
        union_strings(&mut into.extra, &other.extra);
    }

    /// Unknown yields to a known value.
    fn tristate(&mut self, field: &str, slot: &mut Tristate, other: Tristate) {
        if !other.is_known() {
            return;
        }
        if !slot.is_known() {
            *slot = other;
        } else if *slot != other {
            self.report(field, slot.label(), other.label());
        }
    }

    /// Empty yields to a value; two different values are a conflict.
    fn fill<T: PartialEq + Clone + fmt::Display>(
        &mut self,
        field: &str,
        slot: &mut Option<T>,
        other: &Option<T>,
    ) {
        let Some(value) = other else { return };
        match slot {
            None => *slot = Some(value.clone()),
            Some(kept) if kept != value => {
                let kept = kept.to_string();
                self.report(field, &kept, &value.to_string());
            }
            Some(_) => {}
        }
    }

    fn report(&mut self, field: &str, kept: &str, other: &str) {
        self.conflicts.push(FieldConflict {
            field: field.to_string(),
            kept: kept.to_string(),
            other: other.to_string(),
            source: self.source.clone(),
        });
    }
}

fn password_text(state: &PasswordState) -> String {
    match state {
        PasswordState::No => "(none)".to_string(),
        PasswordState::Unknown => "unknown".to_string(),
        PasswordState::Present(p) => p.clone(),
    }
}

/// Append values not already present, ignoring case.
fn union_strings(into: &mut Vec<String>, from: &[String]) {
    for value in from {
        if !into.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            into.push(value.clone());
        }
    }
}
