//! Main DeviceCode struct and public API.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builder::{BuildReport, RecordBuilder};
use crate::device::{CanonicalDevice, Origin};
use crate::error::{DeviceCodeError, Result};
use crate::input::{pages_from_dump, pages_from_table, read_dump, RawPage, SourceMetadata, TableReader};
use crate::normalize::{LogMiner, Severity};
use crate::query::Query;
use crate::reconcile::{ReconciliationReport, Reconciler};
use crate::reference::ReferenceData;

/// Configuration for building records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCodeConfig {
    /// JSON reference tables that extend the built-in ones.
    pub reference: Option<PathBuf>,
    /// Build pages on the rayon thread pool.
    pub parallel: bool,
    /// Drop boot log helper pages instead of folding them into their parent.
    pub skip_helper_pages: bool,
    /// Mine boot logs for packages, bootloaders and kernel parameters.
    pub mine_logs: bool,
}

impl Default for DeviceCodeConfig {
    fn default() -> Self {
        Self {
            reference: None,
            parallel: true,
            skip_helper_pages: false,
            mine_logs: true,
        }
    }
}

impl DeviceCodeConfig {
    pub fn with_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference = Some(path.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_skip_helper_pages(mut self, skip: bool) -> Self {
        self.skip_helper_pages = skip;
        self
    }

    pub fn with_log_mining(mut self, enabled: bool) -> Self {
        self.mine_logs = enabled;
        self
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DeviceCodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DeviceCodeError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })
    }
}

/// Result of building one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub source: SourceMetadata,
    pub origin: Origin,
    pub report: BuildReport,
    pub summary: BuildSummary,
}

/// Summary counts of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub pages: usize,
    pub devices: usize,
    /// Pages without a device infobox.
    pub non_device_pages: usize,
    /// Device pages that could not be built.
    pub failed_pages: usize,
    pub notes: usize,
    pub warnings: usize,
}

impl BuildSummary {
    pub fn from_report(report: &BuildReport) -> Self {
        let notes = report.devices.iter().map(|d| d.notes.len()).sum();
        let warnings = report
            .devices
            .iter()
            .flat_map(|d| d.notes.iter())
            .filter(|n| n.severity == Severity::Warning)
            .count();
        let non_device_pages = report.non_device_count();
        Self {
            pages: report.page_count(),
            devices: report.devices.len(),
            non_device_pages,
            failed_pages: report.failures.len() - non_device_pages,
            notes,
            warnings,
        }
    }
}

/// The main DeviceCode pipeline: raw pages in, canonical records out.
pub struct DeviceCode {
    config: DeviceCodeConfig,
    reference: ReferenceData,
    miner: LogMiner,
}

impl Default for DeviceCode {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCode {
    /// Create an instance with the built-in reference tables.
    pub fn new() -> Self {
        Self {
            config: DeviceCodeConfig::default(),
            reference: ReferenceData::builtin(),
            miner: LogMiner::new(),
        }
    }

    /// Create an instance with custom configuration. Fails when the
    /// configured reference file cannot be loaded.
    pub fn with_config(config: DeviceCodeConfig) -> Result<Self> {
        let reference = match &config.reference {
            Some(path) => ReferenceData::builtin_with_file(path)?,
            None => ReferenceData::builtin(),
        };
        Ok(Self {
            config,
            reference,
            miner: LogMiner::new(),
        })
    }

    pub fn config(&self) -> &DeviceCodeConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Build records from raw pages.
    pub fn build_pages(&self, pages: &[RawPage]) -> BuildReport {
        RecordBuilder::new(&self.reference, &self.miner)
            .with_log_mining(self.config.mine_logs)
            .build_all(pages, self.config.parallel)
    }

    /// Build records from an input file of the given origin.
    pub fn process(&self, path: impl AsRef<Path>, origin: Origin) -> Result<BuildResult> {
        match origin {
            Origin::TechInfoDepot | Origin::WikiDevi => self.process_dump(path, origin),
            Origin::OpenWrt => self.process_table(path),
        }
    }

    /// Build records from a MediaWiki XML dump.
    pub fn process_dump(&self, path: impl AsRef<Path>, origin: Origin) -> Result<BuildResult> {
        if origin == Origin::OpenWrt {
            return Err(DeviceCodeError::Config(
                "OpenWrt data comes as a table, not a wiki dump".to_string(),
            ));
        }
        let (dump, source) = read_dump(path)?;
        let pages = pages_from_dump(&dump, origin, self.config.skip_helper_pages);
        Ok(self.finish(source, origin, &pages))
    }

    /// Build records from an OpenWrt table-of-hardware export.
    pub fn process_table(&self, path: impl AsRef<Path>) -> Result<BuildResult> {
        let (table, source) = TableReader::new().read_file(path)?;
        let pages = pages_from_table(&table);
        Ok(self.finish(source, Origin::OpenWrt, &pages))
    }

    fn finish(&self, source: SourceMetadata, origin: Origin, pages: &[RawPage]) -> BuildResult {
        let report = self.build_pages(pages);
        let summary = BuildSummary::from_report(&report);
        info!(
            file = %source.file,
            origin = %origin,
            devices = summary.devices,
            failed = summary.failed_pages,
            "build finished"
        );
        BuildResult {
            source,
            origin,
            report,
            summary,
        }
    }

    /// Group records of different origins.
    pub fn reconcile(&self, devices: &[CanonicalDevice]) -> ReconciliationReport {
        Reconciler::new(devices).run()
    }

    /// Records matching a filter query.
    pub fn search<'d>(&self, devices: &'d [CanonicalDevice], query: &str) -> Result<Vec<&'d CanonicalDevice>> {
        let query = Query::parse(query)?;
        Ok(query.filter(devices))
    }
}
