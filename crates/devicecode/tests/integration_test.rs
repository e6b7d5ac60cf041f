//! Integration tests for DeviceCode: dumps and tables in, stored records,
//! queries and merge groups out.

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use devicecode::query::{Catalog, FilterField};
use devicecode::reconcile::{squash_all, AmbiguityKind, Evidence, LinkDirection};
use devicecode::store::WriteStatus;
use devicecode::{
    CanonicalDevice, DeviceCode, DeviceCodeConfig, DeviceKey, DeviceStore, NoteKind, Origin,
    Overlay, Query,
};

const TID_DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <page>
    <title>Netgear WNR3500L</title>
    <ns>0</ns>
    <revision><text xml:space="preserve">{{Wireless embedded system
|brand=Netgear
|model=WNR3500L
|cpu1chip1=Broadcom;BCM4718;480 MHz
|fcc_id=PY309300113
|fccapprovaldate=08/05/2009
|serial=yes, J2, 115200 8N1
|wikidevi=[[wd:Netgear WNR3500L v1|Netgear WNR3500L v1]]
}}</text></revision>
  </page>
  <page>
    <title>Netgear WNR3500L/boot log</title>
    <ns>0</ns>
    <revision><text>&lt;pre&gt;BusyBox v1.7.2 (2010-03-02 17:10:25 CST) built-in shell (ash)&lt;/pre&gt;</text></revision>
  </page>
  <page>
    <title>Asus RT-N16</title>
    <ns>0</ns>
    <revision><text xml:space="preserve">{{Wireless embedded system
|brand=Asus
|model=RT-N16
|cpu1chip1=Broadcom;BCM4718
|wikidevi=[[wd:ASUS RT-N16|ASUS RT-N16]]
}}</text></revision>
  </page>
  <page>
    <title>Main Page</title>
    <ns>0</ns>
    <revision><text>Welcome</text></revision>
  </page>
</mediawiki>"#;

const WD_DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <page>
    <title>Netgear WNR3500L v1</title>
    <ns>0</ns>
    <revision><text xml:space="preserve">{{Wireless embedded system
|brand=Netgear
|model=WNR3500L
|rev=v1
|fcc_id=PY309300113
|techinfodepot=[[tid:Netgear WNR3500L|Netgear WNR3500L]]
}}</text></revision>
  </page>
  <page>
    <title>ASUS RT-N16</title>
    <ns>0</ns>
    <revision><text xml:space="preserve">{{Wireless embedded system
|brand=ASUS
|model=RT-N16
}}</text></revision>
  </page>
</mediawiki>"#;

const TOH: &str = "pid\tdevicetype\tbrand\tmodel\tversion\tserial\twikideviurl\tpage
1\tWiFi Router\tNetgear\tWNR3500L\tv1\tYes\thttps://wikidevi.wi-cat.ru/Netgear_WNR3500L_v1\ttoh:hwdata:netgear:netgear_wnr3500l_v1
";

/// Helper to write a file into a temp directory.
fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Build all three inputs and store them under `<dir>/store`.
fn build_store(dir: &TempDir) -> (DeviceStore, Vec<CanonicalDevice>) {
    let dc = DeviceCode::with_config(DeviceCodeConfig::default().with_parallel(false))
        .expect("default config");
    let store = DeviceStore::new(dir.path().join("store"));

    let inputs = [
        (write_file(dir.path(), "tid.xml", TID_DUMP), Origin::TechInfoDepot),
        (write_file(dir.path(), "wd.xml", WD_DUMP), Origin::WikiDevi),
        (write_file(dir.path(), "toh.tsv", TOH), Origin::OpenWrt),
    ];
    for (path, origin) in &inputs {
        let result = dc.process(path, *origin).expect("build failed");
        store.save_all(&result.report.devices).expect("save failed");
    }

    let devices = store.load_all().expect("load failed");
    (store, devices)
}

// =============================================================================
// Build
// =============================================================================

#[test]
fn test_build_dump_summary() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "tid.xml", TID_DUMP);

    let result = DeviceCode::new()
        .process(&path, Origin::TechInfoDepot)
        .expect("build failed");

    assert_eq!(result.origin, Origin::TechInfoDepot);
    assert_eq!(result.source.format, "mediawiki-xml");
    assert_eq!(result.summary.devices, 2);
    assert_eq!(result.summary.non_device_pages, 1);
    assert_eq!(result.summary.failed_pages, 0);
    assert_eq!(result.summary.pages, 3);

    let wnr = result
        .report
        .devices
        .iter()
        .find(|d| d.title == "Netgear WNR3500L")
        .unwrap();
    assert_eq!(wnr.connectivity.serial.baud_rate, Some(115200));
    assert!(wnr.software.packages.iter().any(|p| p.name == "busybox"));
    assert_eq!(wnr.years().into_iter().collect::<Vec<_>>(), vec![2009]);
}

#[test]
fn test_build_openwrt_table() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "toh.tsv", TOH);

    let result = DeviceCode::new().process(&path, Origin::OpenWrt).unwrap();
    assert_eq!(result.summary.devices, 1);
    let device = &result.report.devices[0];
    assert_eq!(device.origin, Origin::OpenWrt);
    assert_eq!(device.identity.revision.as_deref(), Some("v1"));
    assert_eq!(device.cross_links.len(), 1);
    assert_eq!(device.cross_links[0].origin, Origin::WikiDevi);
}

#[test]
fn test_missing_input_is_error() {
    let result = DeviceCode::new().process("/nonexistent/dump.xml", Origin::WikiDevi);
    assert!(result.is_err());
}

// =============================================================================
// Store
// =============================================================================

#[test]
fn test_rebuild_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let (store, devices) = build_store(&dir);
    assert_eq!(devices.len(), 5);

    let summary = store.save_all(&devices).unwrap();
    assert_eq!(summary.unchanged, 5);
    assert_eq!(summary.total(), 5);
}

#[test]
fn test_stale_titles_after_page_removal() {
    let dir = TempDir::new().unwrap();
    let (store, _) = build_store(&dir);

    let trimmed = TID_DUMP.replace("<title>Asus RT-N16</title>", "<title>Category:Gone</title>");
    let path = write_file(dir.path(), "tid2.xml", &trimmed);
    let result = DeviceCode::new().process(&path, Origin::TechInfoDepot).unwrap();

    let stale = store.stale_titles(Origin::TechInfoDepot, &result.report.devices).unwrap();
    assert_eq!(stale, vec!["Asus RT-N16".to_string()]);
}

#[test]
fn test_overlay_changes_query_result() {
    let dir = TempDir::new().unwrap();
    let (store, _) = build_store(&dir);

    let overlay = Overlay::new("cpe_overlay", "cve", json!({"regulatory": {"cve_ids": ["CVE-2017-6334"]}}));
    assert_eq!(
        store.save_overlay(Origin::WikiDevi, "ASUS RT-N16", &overlay).unwrap(),
        WriteStatus::Created
    );

    let query = Query::parse("cve=yes").unwrap();
    let composed = store.load_composed(true).unwrap();
    let hits = query.filter(&composed);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "ASUS RT-N16");

    let plain = store.load_composed(false).unwrap();
    assert!(query.filter(&plain).is_empty());
}

// =============================================================================
// Query
// =============================================================================

#[test]
fn test_search_stored_records() {
    let dir = TempDir::new().unwrap();
    let (_, devices) = build_store(&dir);
    let dc = DeviceCode::new();

    assert_eq!(dc.search(&devices, "brand=netgear").unwrap().len(), 3);
    assert_eq!(dc.search(&devices, "brand=netgear ignore_origin=openwrt").unwrap().len(), 2);
    assert_eq!(dc.search(&devices, "origin=techinfodepot serial=yes").unwrap().len(), 1);
    assert_eq!(dc.search(&devices, "chip=bcm4718").unwrap().len(), 2);
    assert_eq!(dc.search(&devices, "year=2008:2010").unwrap().len(), 1);
    assert_eq!(dc.search(&devices, "package?version:1.7.2=busybox").unwrap().len(), 1);
    assert_eq!(dc.search(&devices, "package?version:9.9=busybox").unwrap().len(), 0);
    assert_eq!(dc.search(&devices, "").unwrap().len(), devices.len());
    assert!(dc.search(&devices, "color=red").is_err());
}

#[test]
fn test_catalog_over_store() {
    let dir = TempDir::new().unwrap();
    let (_, devices) = build_store(&dir);
    let catalog = Catalog::from_devices(&devices);

    let brands = catalog.counts(FilterField::Brand).unwrap();
    assert_eq!(brands.get("netgear"), Some(&3));

    let query = Query::parse("brand=linksys chip_vendor=broadcom").unwrap();
    let unknown = catalog.unknown_values(&query);
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].1, "linksys");
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn test_reconcile_stored_records() {
    let dir = TempDir::new().unwrap();
    let (_, devices) = build_store(&dir);
    let report = DeviceCode::new().reconcile(&devices);

    assert_eq!(report.device_count, 5);
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.merged_count(), 5);

    let wnr = report
        .group_of(&DeviceKey::new(Origin::TechInfoDepot, "Netgear WNR3500L"))
        .expect("WNR3500L is grouped");
    assert_eq!(wnr.members.len(), 3);
    assert!(wnr.members.iter().any(|m| m.origin == Origin::OpenWrt));
    assert!(wnr.evidence.iter().any(|e| matches!(
        e,
        Evidence::Link { direction: LinkDirection::Bidirectional, .. }
    )));

    let asus = report
        .group_of(&DeviceKey::new(Origin::WikiDevi, "ASUS RT-N16"))
        .expect("RT-N16 is grouped");
    assert_eq!(asus.members.len(), 2);

    assert_eq!(report.ambiguities_of(AmbiguityKind::UnanchoredOpenWrt).count(), 0);
    assert_eq!(report.ambiguities_of(AmbiguityKind::DanglingLink).count(), 0);
}

#[test]
fn test_squash_groups() {
    let dir = TempDir::new().unwrap();
    let (_, devices) = build_store(&dir);
    let report = DeviceCode::new().reconcile(&devices);
    let squashed = squash_all(&report, &devices);

    assert_eq!(squashed.len(), 2);
    let wnr = squashed
        .iter()
        .find(|s| s.device.identity.model == "WNR3500L")
        .unwrap();
    assert_eq!(wnr.device.origin, Origin::TechInfoDepot);
    assert_eq!(wnr.device.identity.revision.as_deref(), Some("v1"));
    assert!(wnr.device.cross_links.is_empty());

    // Squashing works on copies.
    let original = devices
        .iter()
        .find(|d| d.title == "Netgear WNR3500L")
        .unwrap();
    assert!(original.identity.revision.is_none());
}

#[test]
fn test_lint_notes_survive_store() {
    let dir = TempDir::new().unwrap();
    let (_, devices) = build_store(&dir);

    let unverified = devices
        .iter()
        .flat_map(|d| d.notes.iter())
        .filter(|n| n.kind == NoteKind::UnverifiedChip)
        .count();
    let fresh = DeviceCode::new()
        .process(write_file(dir.path(), "tid3.xml", TID_DUMP), Origin::TechInfoDepot)
        .unwrap();
    let expected = fresh
        .report
        .devices
        .iter()
        .flat_map(|d| d.notes.iter())
        .filter(|n| n.kind == NoteKind::UnverifiedChip)
        .count();
    assert_eq!(unverified, expected);
}
