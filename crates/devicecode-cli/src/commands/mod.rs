//! CLI command implementations.

pub mod build;
pub mod dump;
pub mod lint;
pub mod nearest;
pub mod reconcile;
pub mod search;

use std::path::Path;

use devicecode::{CanonicalDevice, DeviceStore};

/// Load every stored record under `directory`, failing when there are none.
pub(crate) fn load_devices(
    directory: &Path,
    use_overlays: bool,
) -> Result<Vec<CanonicalDevice>, Box<dyn std::error::Error>> {
    if !directory.is_dir() {
        return Err(format!("Directory not found: {}", directory.display()).into());
    }
    let devices = DeviceStore::new(directory).load_composed(use_overlays)?;
    if devices.is_empty() {
        return Err(format!(
            "No records found in {}\nRun 'devicecode build' first.",
            directory.display()
        )
        .into());
    }
    Ok(devices)
}
