//! Record builder: one raw page in, one canonical device out.
//!
//! Building a page is all-or-nothing. A page either yields a complete
//! [`CanonicalDevice`] or a [`PageFailure`]; bulk builds collect both and
//! never let one bad page affect the others.

mod facts;
mod links;
mod openwrt;
mod wiki;

pub use facts::{apply_facts, derive_flags};
pub use links::{cross_link, link_target, url_origin};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::{CanonicalDevice, FccId, Identity, Origin};
use crate::error::{DeviceCodeError, Result};
use crate::input::RawPage;
use crate::normalize::{LogMiner, NoteKind, Normalizer, QualityNote};
use crate::reference::ReferenceData;

/// A page that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub title: String,
    pub reason: String,
    /// The page has no device infobox at all.
    #[serde(default)]
    pub not_a_device: bool,
}

/// Outcome of building many pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub devices: Vec<CanonicalDevice>,
    pub failures: Vec<PageFailure>,
}

impl BuildReport {
    /// Number of pages that were looked at.
    pub fn page_count(&self) -> usize {
        self.devices.len() + self.failures.len()
    }

    /// Pages skipped because they are not device pages at all.
    pub fn non_device_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.not_a_device)
            .count()
    }
}

/// Turns raw pages into canonical records.
pub struct RecordBuilder<'a> {
    reference: &'a ReferenceData,
    miner: &'a LogMiner,
    mine_logs: bool,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(reference: &'a ReferenceData, miner: &'a LogMiner) -> Self {
        Self {
            reference,
            miner,
            mine_logs: true,
        }
    }

    /// Enable or disable boot log mining.
    pub fn with_log_mining(mut self, enabled: bool) -> Self {
        self.mine_logs = enabled;
        self
    }

    /// Build one record.
    pub fn build(&self, page: &RawPage) -> Result<CanonicalDevice> {
        let mut normalizer = Normalizer::new(self.reference);
        let mut device = match page.origin {
            Origin::TechInfoDepot | Origin::WikiDevi => wiki::build(page, &mut normalizer)?,
            Origin::OpenWrt => openwrt::build(page, &mut normalizer)?,
        };

        if self.mine_logs {
            for section in page.sections.iter().filter(|s| s.is_log()) {
                let facts = self.miner.mine(&section.body);
                debug!(title = %page.title, section = %section.heading, facts = facts.len(), "mined log section");
                apply_facts(&mut device, &facts);
            }
        }
        derive_flags(&mut device);

        device.notes = normalizer.into_notes();
        Ok(device)
    }

    /// Build every page, in parallel when asked to.
    pub fn build_all(&self, pages: &[RawPage], parallel: bool) -> BuildReport {
        let results: Vec<(&str, Result<CanonicalDevice>)> = if parallel {
            pages
                .par_iter()
                .map(|page| (page.title.as_str(), self.build(page)))
                .collect()
        } else {
            pages
                .iter()
                .map(|page| (page.title.as_str(), self.build(page)))
                .collect()
        };

        let mut report = BuildReport::default();
        for (title, result) in results {
            match result {
                Ok(device) => report.devices.push(device),
                Err(e) => {
                    let not_a_device = matches!(e, DeviceCodeError::NotADevice { .. });
                    if not_a_device {
                        debug!(title, "skipping page: {}", e);
                    } else {
                        info!(title, "skipping page: {}", e);
                    }
                    report.failures.push(PageFailure {
                        title: title.to_string(),
                        reason: e.to_string(),
                        not_a_device,
                    });
                }
            }
        }
        report
    }
}

// =============================================================================
// Shared field helpers
// =============================================================================

/// First non-empty cleaned value among `keys`. Later differing values are
/// noted as conflicts.
pub(crate) fn single(page: &RawPage, n: &mut Normalizer<'_>, keys: &[&str]) -> Option<String> {
    let mut chosen: Option<String> = None;
    for field in page.fields.iter().filter(|f| keys.iter().any(|k| f.key.eq_ignore_ascii_case(k))) {
        let Some(value) = n.clean(&field.key, &field.value) else { continue };
        match &chosen {
            None => chosen = Some(value),
            Some(existing) if existing != &value => n.note(
                QualityNote::new(
                    NoteKind::ConflictingValues,
                    field.key.clone(),
                    format!("keeping '{}'", existing),
                )
                .with_raw(value),
            ),
            Some(_) => {}
        }
    }
    chosen
}

/// Brand and model, both required.
pub(crate) fn identity(
    page: &RawPage,
    n: &mut Normalizer<'_>,
    brand_keys: &[&str],
    model_keys: &[&str],
) -> Result<Identity> {
    let missing = |field: &str| DeviceCodeError::MissingIdentity {
        title: page.title.clone(),
        field: field.to_string(),
    };
    let brand = single(page, n, brand_keys).ok_or_else(|| missing("brand"))?;
    let model = single(page, n, model_keys).ok_or_else(|| missing("model"))?;
    let brand = n.reference().rewrite_brand(&brand).to_string();
    Ok(Identity::new(brand, model))
}

/// Set a single-valued field once; a differing later value becomes a note.
pub(crate) fn set_once(slot: &mut Option<String>, value: &str, field: &str, n: &mut Normalizer<'_>) {
    match slot {
        None => *slot = Some(value.to_string()),
        Some(existing) if existing != value => n.note(
            QualityNote::new(NoteKind::ConflictingValues, field, format!("keeping '{}'", existing))
                .with_raw(value),
        ),
        Some(_) => {}
    }
}

/// Append FCC ids, skipping ones already present.
pub(crate) fn merge_fcc_ids(device: &mut CanonicalDevice, ids: Vec<FccId>) {
    for id in ids {
        if !device.regulatory.fcc_ids.iter().any(|f| f.id == id.id) {
            device.regulatory.fcc_ids.push(id);
        }
    }
}
