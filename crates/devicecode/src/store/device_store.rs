//! On-disk layout for records and overlays.
//!
//! ```text
//! <root>/
//! ├── WikiDevi/
//! │   ├── devices/
//! │   │   └── Netgear WNR3500L.json
//! │   └── overlays/
//! │       └── Netgear WNR3500L/
//! │           └── cve.json
//! └── TechInfoDepot/
//!     └── devices/
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::{CanonicalDevice, DeviceKey, Origin};
use crate::error::{DeviceCodeError, Result};
use crate::input::hash_bytes;

use super::overlay::{compose, Overlay};

/// Outcome of writing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Created,
    Updated,
    /// Content hash equal to the file on disk; nothing written.
    Unchanged,
}

/// Counts of write outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl StoreSummary {
    pub fn record(&mut self, status: WriteStatus) {
        match status {
            WriteStatus::Created => self.created += 1,
            WriteStatus::Updated => self.updated += 1,
            WriteStatus::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

/// File name for a page title. `/` cannot appear in file names, so it is
/// percent-escaped along with `%` itself, keeping distinct titles distinct.
pub fn file_stem(title: &str) -> String {
    title.replace('%', "%25").replace('/', "%2F")
}

/// A directory of persisted records.
#[derive(Debug, Clone)]
pub struct DeviceStore {
    root: PathBuf,
}

impl DeviceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn devices_dir(&self, origin: Origin) -> PathBuf {
        self.root.join(origin.label()).join("devices")
    }

    pub fn overlays_dir(&self, origin: Origin) -> PathBuf {
        self.root.join(origin.label()).join("overlays")
    }

    pub fn device_path(&self, origin: Origin, title: &str) -> PathBuf {
        self.devices_dir(origin)
            .join(format!("{}.json", file_stem(title)))
    }

    /// Write one record, skipping the write when nothing changed.
    pub fn save(&self, device: &CanonicalDevice) -> Result<WriteStatus> {
        let path = self.device_path(device.origin, &device.title);
        let bytes = serde_json::to_vec_pretty(device).map_err(|e| {
            DeviceCodeError::Persistence(format!(
                "Failed to serialize device '{}': {}",
                device.title, e
            ))
        })?;
        write_if_changed(&path, &bytes)
    }

    /// Write many records.
    pub fn save_all<'a>(
        &self,
        devices: impl IntoIterator<Item = &'a CanonicalDevice>,
    ) -> Result<StoreSummary> {
        let mut summary = StoreSummary::default();
        for device in devices {
            summary.record(self.save(device)?);
        }
        debug!(
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "saved devices"
        );
        Ok(summary)
    }

    /// Load one record file.
    pub fn load(path: impl AsRef<Path>) -> Result<CanonicalDevice> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|e| DeviceCodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_slice(&content).map_err(|e| {
            DeviceCodeError::Persistence(format!(
                "Failed to parse device '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// All records of one origin, in file name order. Unreadable files are
    /// skipped with a warning.
    pub fn load_origin(&self, origin: Origin) -> Result<Vec<CanonicalDevice>> {
        let mut devices = Vec::new();
        for path in json_files(&self.devices_dir(origin))? {
            match Self::load(&path) {
                Ok(device) => devices.push(device),
                Err(e) => warn!(path = %path.display(), "skipping record: {}", e),
            }
        }
        Ok(devices)
    }

    /// All records of every origin.
    pub fn load_all(&self) -> Result<Vec<CanonicalDevice>> {
        let mut devices = Vec::new();
        for origin in Origin::ALL {
            devices.extend(self.load_origin(origin)?);
        }
        Ok(devices)
    }

    /// All records, with their overlays applied when `use_overlays` is set.
    pub fn load_composed(&self, use_overlays: bool) -> Result<Vec<CanonicalDevice>> {
        let devices = self.load_all()?;
        if !use_overlays {
            return Ok(devices);
        }
        let mut composed = Vec::with_capacity(devices.len());
        for device in devices {
            let overlays = self.overlays_for(device.origin, &device.title)?;
            if overlays.is_empty() {
                composed.push(device);
                continue;
            }
            match compose(&device, &overlays) {
                Ok(merged) => composed.push(merged),
                Err(e) => {
                    warn!(title = %device.title, "ignoring overlays: {}", e);
                    composed.push(device);
                }
            }
        }
        Ok(composed)
    }

    /// Write an overlay for a record.
    pub fn save_overlay(&self, origin: Origin, title: &str, overlay: &Overlay) -> Result<WriteStatus> {
        let path = self
            .overlays_dir(origin)
            .join(file_stem(title))
            .join(format!("{}.json", file_stem(&overlay.name)));
        let bytes = serde_json::to_vec_pretty(overlay)?;
        write_if_changed(&path, &bytes)
    }

    /// Overlays stored for a record, in file name order. Files that are not
    /// overlay documents are ignored.
    pub fn overlays_for(&self, origin: Origin, title: &str) -> Result<Vec<Overlay>> {
        let dir = self.overlays_dir(origin).join(file_stem(title));
        let mut overlays = Vec::new();
        for path in json_files(&dir)? {
            let content = fs::read(&path).map_err(|e| DeviceCodeError::Io {
                path: path.clone(),
                source: e,
            })?;
            match serde_json::from_slice::<Overlay>(&content) {
                Ok(overlay) if overlay.is_overlay() => overlays.push(overlay),
                Ok(_) => debug!(path = %path.display(), "not an overlay document"),
                Err(e) => warn!(path = %path.display(), "skipping overlay: {}", e),
            }
        }
        Ok(overlays)
    }

    /// Titles stored for `origin` that a fresh build no longer produced.
    pub fn stale_titles(&self, origin: Origin, fresh: &[CanonicalDevice]) -> Result<Vec<String>> {
        let current: BTreeSet<DeviceKey> = fresh
            .iter()
            .filter(|d| d.origin == origin)
            .map(CanonicalDevice::key)
            .collect();
        let mut stale: Vec<String> = self
            .load_origin(origin)?
            .into_iter()
            .filter(|d| !current.contains(&d.key()))
            .map(|d| d.title)
            .collect();
        stale.sort();
        Ok(stale)
    }
}

/// `*.json` files directly inside `dir`, sorted. A missing directory is empty.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| DeviceCodeError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<WriteStatus> {
    let status = match fs::read(path) {
        Ok(existing) if hash_bytes(&existing) == hash_bytes(bytes) => {
            return Ok(WriteStatus::Unchanged);
        }
        Ok(_) => WriteStatus::Updated,
        Err(_) => WriteStatus::Created,
    };

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                DeviceCodeError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    fs::write(path, bytes).map_err(|e| {
        DeviceCodeError::Persistence(format!(
            "Failed to write file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(status)
}
