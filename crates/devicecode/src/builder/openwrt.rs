//! OpenWrt table-of-hardware rows.

use crate::device::{Bootloader, CanonicalDevice, ChipCategory, ChipSlot, FccType, Origin, Tristate};
use crate::error::Result;
use crate::input::RawPage;
use crate::normalize::{parse_fcc_ids, parse_port, split_list, ChipLayout, Normalizer};

use super::links::{cross_link, url_origin};
use super::{identity, merge_fcc_ids, single};

/// Bootloader cells that carry no information.
const UNKNOWN_BOOTLOADERS: &[&str] = &["other", "unknown"];

/// Build a record from one hardware row.
pub(super) fn build(page: &RawPage, n: &mut Normalizer<'_>) -> Result<CanonicalDevice> {
    let mut ident = identity(page, n, &["brand"], &["model"])?;
    ident.revision = single(page, n, &["version"]);

    let mut device = CanonicalDevice::new(Origin::OpenWrt, &page.title, ident);

    if let Some(kind) = single(page, n, &["devicetype"]) {
        device.device_types = split_list(&kind.to_lowercase());
    }

    if let Some(cpus) = n.clean("cpu", page.first("cpu").unwrap_or("")) {
        for (idx, cpu) in split_list(&cpus).iter().enumerate() {
            // "Qualcomm Atheros QCA9558": the model is the last word
            let (manufacturer, model) = match cpu.rsplit_once(char::is_whitespace) {
                Some((m, model)) => (m.trim(), model.trim()),
                None => ("", cpu.as_str()),
            };
            let slot = ChipSlot::new(ChipCategory::Cpu, (idx + 1) as u8, 1);
            let descriptor = format!("{};{}", manufacturer, model);
            if let Some(chip) = n.chip("cpu", &descriptor, slot, ChipLayout::Standard) {
                device.chips.push(chip);
            }
        }
    }

    for raw in page.values("fccid") {
        for url in raw.split(',') {
            if let Some(id) = fcc_id_from_url(url) {
                let ids = parse_fcc_ids(&id, FccType::Unknown, n.reference());
                merge_fcc_ids(&mut device, ids);
            }
        }
    }

    device.connectivity.serial.present = presence(page.first("serial"));
    device.connectivity.jtag.present = presence(page.first("jtag"));
    if device.connectivity.serial.present == Tristate::Yes {
        if let Some(params) = page.first("serialconnectionparameters") {
            let parsed = parse_port(&params.replace('/', " "));
            device.connectivity.serial.baud_rate = parsed.port.baud_rate;
            device.connectivity.serial.data_parity_stop = parsed.port.data_parity_stop;
        }
    }

    if let Some(url) = page.first("wikideviurl") {
        if url_origin(url) == Some(Origin::WikiDevi) {
            if let Some(link) = cross_link(Origin::OpenWrt, Origin::WikiDevi, url) {
                device.cross_links.push(link);
            }
        }
    }

    if let Some(bootloader) = page.first("bootloader") {
        if !UNKNOWN_BOOTLOADERS.contains(&bootloader.to_lowercase().as_str()) {
            device.software.bootloader = Some(Bootloader {
                manufacturer: n.reference().rewrite_brand(bootloader).to_string(),
                ..Default::default()
            });
        }
    }

    if let Some(commit) = page.first("supportedsincecommit") {
        if !commit.contains('¿') {
            device.flags.insert("openwrt".to_string());
        }
    }

    Ok(device)
}

fn presence(value: Option<&str>) -> Tristate {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("yes") => Tristate::Yes,
        Some("no") => Tristate::No,
        _ => Tristate::Unknown,
    }
}

/// The FCC id inside an fccid.io / fcc.report URL.
fn fcc_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.trim().split_once("://")?;
    let (site, path) = rest.split_once('/')?;
    let path = if site.contains("fcc.report") {
        // fcc.report/FCC/<id>
        path.split_once('/').map(|(_, id)| id)?
    } else {
        path
    };
    let id = path.trim_end_matches('/').replace('/', "").to_uppercase();
    if id.is_empty() || id.starts_with("ANATEL") {
        return None;
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;

    fn row() -> RawPage {
        RawPage::new(Origin::OpenWrt, "tp-link_archer_c7_v2")
            .with_field("brand", "TP-Link")
            .with_field("model", "Archer C7")
            .with_field("version", "v2")
            .with_field("devicetype", "WiFi Router")
            .with_field("cpu", "Qualcomm Atheros QCA9558")
            .with_field("fccid", "https://fcc.report/FCC/TE7AC7V2, https://fccid.io/TE7AC7V2/")
            .with_field("serial", "Yes")
            .with_field("serialconnectionparameters", "115200/8N1")
            .with_field("jtag", "no")
            .with_field("wikideviurl", "https://wikidevi.wi-cat.ru/TP-LINK_Archer_C7_v2.x")
            .with_field("bootloader", "U-Boot")
            .with_field("supportedsincecommit", "https://git.openwrt.org/?p=openwrt/openwrt.git;a=commit;h=abc")
    }

    #[test]
    fn test_build_openwrt_row() {
        let reference = ReferenceData::builtin();
        let mut n = Normalizer::new(&reference);
        let device = build(&row(), &mut n).unwrap();

        assert_eq!(device.identity.revision.as_deref(), Some("v2"));
        assert_eq!(device.device_types, vec!["wifi router"]);
        assert_eq!(device.chips[0].manufacturer, "Qualcomm Atheros");
        assert_eq!(device.chips[0].model, "QCA9558");
        assert_eq!(device.regulatory.fcc_ids.len(), 1);
        assert_eq!(device.regulatory.fcc_ids[0].id, "TE7AC7V2");
        assert_eq!(device.connectivity.serial.present, Tristate::Yes);
        assert_eq!(device.connectivity.serial.baud_rate, Some(115200));
        assert_eq!(device.connectivity.jtag.present, Tristate::No);
        assert_eq!(device.cross_links[0].title, "TP-LINK Archer C7 v2.x");
        assert!(device.flags.contains("openwrt"));
    }

    #[test]
    fn test_fcc_id_from_url() {
        assert_eq!(fcc_id_from_url("https://fccid.io/PY3-WNR3500L").as_deref(), Some("PY3-WNR3500L"));
        assert_eq!(fcc_id_from_url("https://fccid.io/ANATEL/123"), None);
        assert_eq!(fcc_id_from_url("not a url"), None);
    }
}
