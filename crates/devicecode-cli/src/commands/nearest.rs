//! Nearest command - devices built on the same ODM board.

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use devicecode::CanonicalDevice;

pub fn run(
    directory: PathBuf,
    model: String,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let devices = super::load_devices(&directory, true)?;
    let groups = by_odm(&devices, &model);

    if groups.is_empty() {
        println!("{} {}", "No devices with ODM model".yellow(), model.white());
        return Ok(());
    }

    for (odm, members) in &groups {
        println!("{} ({})", odm.cyan().bold(), members.len());
        for device in members {
            println!(
                "  {} {} {} [{}]",
                device.origin.label().dimmed(),
                device.identity.brand.white(),
                device.identity.model,
                device.title.dimmed()
            );
        }
    }
    Ok(())
}

/// Devices whose ODM model equals `model` (case-insensitive), grouped by ODM
/// name. Devices without an ODM name are listed under "unknown".
fn by_odm<'d>(devices: &'d [CanonicalDevice], model: &str) -> BTreeMap<String, Vec<&'d CanonicalDevice>> {
    let wanted = model.trim().to_lowercase();
    let mut groups: BTreeMap<String, Vec<&CanonicalDevice>> = BTreeMap::new();
    for device in devices {
        let Some(odm_model) = &device.manufacturer.model else {
            continue;
        };
        if odm_model.trim().to_lowercase() != wanted {
            continue;
        }
        let odm = device
            .manufacturer
            .name
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        groups.entry(odm).or_default().push(device);
    }
    groups
}
