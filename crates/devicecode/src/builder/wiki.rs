//! TechInfoDepot and WikiDevi infobox fields.
//!
//! Both wikis use the same infobox family with slightly different
//! identifiers; aliases are listed side by side below.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::device::{
    Bootloader, CanonicalDevice, ChipCategory, ChipSlot, FccType, Origin, Sdk, Tristate,
};
use crate::error::{DeviceCodeError, Result};
use crate::input::RawPage;
use crate::normalize::{
    classify_password, is_additional_chip, parse_fcc_ids, parse_ip, parse_slot, parse_yes_no,
    split_list, ChipLayout, Normalizer,
};

use super::links::cross_link;
use super::{identity, merge_fcc_ids, set_once};

static CPU_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^cpu(\d+)_type$").unwrap());
static AUX_FCC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:rad|wi)(\d+)_?(?:fcc|fccid|fcc_id)$").unwrap());
static SDK_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"LSDK-([\w.\-]+)").unwrap());

/// Login values that describe the login instead of stating it.
const LOGIN_COMMENTS: &[&str] = &["randomly generated", "set at first login", "set during setup"];

/// Build a record from an infobox page.
pub(super) fn build(page: &RawPage, n: &mut Normalizer<'_>) -> Result<CanonicalDevice> {
    if page.template.is_none() {
        return Err(DeviceCodeError::NotADevice {
            title: page.title.clone(),
        });
    }

    let mut ident = identity(page, n, &["brand"], &["model"])?;
    ident.revision = super::single(page, n, &["revision", "rev"]);
    ident.part_number = super::single(page, n, &["model_part_num", "part_num"]);
    ident.series = super::single(page, n, &["series"]);

    let mut device = CanonicalDevice::new(page.origin, &page.title, ident);
    let mut additional = 0u8;
    let mut fcc_date: Option<NaiveDate> = None;
    let mut brand_is_odm = false;

    for field in &page.fields {
        let key = field.key.as_str();
        let raw = field.value.as_str();

        if let Some(slot) = parse_slot(key) {
            if let Some(chip) = n.chip(key, raw, slot, ChipLayout::Standard) {
                device.chips.push(chip);
            }
            continue;
        }
        if is_additional_chip(key) {
            let slot = ChipSlot::new(ChipCategory::Additional, additional + 1, 1);
            if let Some(chip) = n.chip(key, raw, slot, ChipLayout::Additional) {
                additional += 1;
                device.chips.push(chip);
            }
            continue;
        }

        match key {
            "releasedate" | "release_date" | "estreldate" | "est_release_date" => {
                if device.release_date.is_none() {
                    device.release_date = n.date(key, raw);
                }
            }
            "fccapprovaldate" | "fccapprovdate" | "fcc_date" => {
                if fcc_date.is_none() {
                    fcc_date = n.date(key, raw);
                }
            }
            "wifi_cert_date" => {
                if device.regulatory.wifi_certified_date.is_none() {
                    device.regulatory.wifi_certified_date = n.date(key, raw);
                }
            }
            "serial" => {
                if let Some(port) = n.port(key, raw) {
                    device.connectivity.serial = port;
                }
            }
            "jtag" => {
                if let Some(port) = n.port(key, raw) {
                    device.connectivity.jtag = port;
                }
            }
            _ => {
                let Some(value) = n.clean(key, raw) else { continue };
                apply_text_field(&mut device, n, key, &value, &mut brand_is_odm);
            }
        }
    }

    if let Some(date) = fcc_date {
        if let Some(fcc) = device
            .regulatory
            .fcc_ids
            .iter_mut()
            .find(|f| f.identifies_product() && f.date.is_none())
        {
            fcc.date = Some(date);
        }
    }
    if brand_is_odm && device.manufacturer.name.is_none() {
        device.manufacturer.name = Some(device.identity.brand.clone());
    }
    Ok(device)
}

/// Fields whose cleaned text is interpreted directly.
fn apply_text_field(
    device: &mut CanonicalDevice,
    n: &mut Normalizer<'_>,
    key: &str,
    value: &str,
    brand_is_odm: &mut bool,
) {
    let reference = n.reference();
    match key {
        "type" => {
            for item in split_list(value) {
                if !device.device_types.iter().any(|t| t.eq_ignore_ascii_case(&item)) {
                    device.device_types.push(item);
                }
            }
        }
        "flags" => {
            for item in split_list(value) {
                device.flags.insert(item.to_lowercase());
            }
        }
        "tagline" => device.taglines.push(value.to_string()),
        "boardid" | "pcb_id" => set_once(&mut device.regulatory.pcb_id, value, key, n),
        "wifi_cert_id" => set_once(&mut device.regulatory.wifi_certified, value, key, n),

        "manuf" => {
            let name = reference.rewrite_brand(value).to_string();
            set_once(&mut device.manufacturer.name, &name, key, n);
        }
        "manuf_mdl" | "manuf_model" => set_once(&mut device.manufacturer.model, value, key, n),
        "manuf_rev" | "manuf_revision" => set_once(&mut device.manufacturer.revision, value, key, n),
        "countrymanuf" | "manuf_country" => set_once(&mut device.manufacturer.country, value, key, n),
        "is_manuf" | "os_manuf" => {
            if parse_yes_no(value) == Some(true) {
                *brand_is_odm = true;
            }
        }

        "fcc_id" => merge_fcc_ids(device, parse_fcc_ids(value, FccType::Main, reference)),
        k if AUX_FCC.is_match(k) => {
            merge_fcc_ids(device, parse_fcc_ids(value, FccType::Auxiliary, reference))
        }

        "defaultip" | "defaulip" | "default_ip" => {
            if device.credentials.ip.is_none() {
                device.credentials.ip = parse_ip(value);
            }
        }
        "defaultlogin" | "default_user" | "default_login" => {
            if LOGIN_COMMENTS.contains(&value.to_lowercase().as_str()) {
                device.credentials.login_comment = Some(value.to_string());
            } else {
                for login in value.split(" or ").flat_map(|v| v.split(',')) {
                    let login = login.trim();
                    if !login.is_empty() && !device.credentials.logins.iter().any(|l| l == login) {
                        device.credentials.logins.push(login.to_string());
                    }
                }
            }
        }
        "defaultpass" | "default_pass" => {
            let (state, comment) = classify_password(value, reference);
            device.credentials.password = state;
            if comment.is_some() {
                device.credentials.password_comment = comment;
            }
        }

        "stockos" | "stock_os" | "os" => {
            let mut parts = value.split(';').map(str::trim);
            if let Some(os) = parts.next().filter(|o| !o.is_empty()) {
                set_once(&mut device.software.os, os, key, n);
            }
            if device.software.sdk.is_none() {
                if let Some(caps) = parts.find_map(|p| SDK_VERSION.captures(p)) {
                    device.software.sdk = Some(Sdk {
                        name: "LSDK".to_string(),
                        version: Some(caps[1].to_string()),
                    });
                }
            }
        }
        "stock_os_sdk" | "sdk" => {
            if device.software.sdk.is_none() {
                let mut parts = value.split(';').map(str::trim);
                let name = parts.next().unwrap_or(value).to_string();
                let version = parts.next().filter(|v| !v.is_empty()).map(String::from);
                device.software.sdk = Some(Sdk { name, version });
            }
        }
        "stockbootloader" | "stock_bootloader" | "stock_boot" | "bootloader" => {
            if device.software.bootloader.is_none() {
                device.software.bootloader = Some(parse_bootloader(value, n));
            }
        }

        "wikidevi" => {
            if let Some(link) = cross_link(device.origin, Origin::WikiDevi, value) {
                push_link(device, link);
            }
        }
        "techinfodepot" => {
            if let Some(link) = cross_link(device.origin, Origin::TechInfoDepot, value) {
                push_link(device, link);
            }
        }

        k => {
            if let Some(caps) = CPU_TYPE.captures(k) {
                let instance: u8 = caps[1].parse().unwrap_or(0);
                if let Some(chip) = device
                    .chips
                    .iter_mut()
                    .find(|c| c.slot.category == ChipCategory::Cpu && c.slot.instance == instance)
                {
                    chip.chip_type = Some(value.to_string());
                }
            }
        }
    }
}

fn push_link(device: &mut CanonicalDevice, link: crate::device::CrossLink) {
    if !device.cross_links.contains(&link) {
        device.cross_links.push(link);
    }
}

/// `manufacturer;version;extra...`
fn parse_bootloader(value: &str, n: &Normalizer<'_>) -> Bootloader {
    let mut parts = value.split(';').map(str::trim);
    let manufacturer = n.reference().rewrite_brand(parts.next().unwrap_or("")).to_string();
    let version = parts.next().filter(|v| !v.is_empty()).map(String::from);
    let vendor_modified = if parts.any(|p| {
        let p = p.to_lowercase();
        p.contains("vendor modified") || p.contains("vender modified")
    }) {
        Tristate::Yes
    } else {
        Tristate::Unknown
    };
    Bootloader {
        manufacturer,
        version,
        vendor_modified,
    }
}
