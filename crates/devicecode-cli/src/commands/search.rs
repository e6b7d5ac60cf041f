//! Search command - filter stored records with the query language.

use std::path::PathBuf;

use colored::Colorize;
use devicecode::device::ChipCategory;
use devicecode::query::Catalog;
use devicecode::{CanonicalDevice, Query};

use crate::cli::SearchFormat;

pub fn run(
    directory: PathBuf,
    filter: String,
    strict: bool,
    no_overlays: bool,
    format: SearchFormat,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = Query::parse(&filter)?;
    let devices = super::load_devices(&directory, !no_overlays)?;

    if strict {
        let catalog = Catalog::from_devices(&devices);
        let unknown = catalog.unknown_values(&query);
        if !unknown.is_empty() {
            let listed: Vec<String> = unknown
                .iter()
                .map(|(field, value)| {
                    let hints = catalog.suggest(*field, value.get(..1).unwrap_or(""));
                    if hints.is_empty() {
                        format!("{}={}", field, value)
                    } else {
                        let hints: Vec<&str> = hints.into_iter().take(5).collect();
                        format!("{}={} (did you mean: {})", field, value, hints.join(", "))
                    }
                })
                .collect();
            return Err(format!("Values not found in the data: {}", listed.join("; ")).into());
        }
    }

    let matches = query.filter(&devices);

    match format {
        SearchFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        SearchFormat::Compact => {
            for device in &matches {
                println!("{}", compact_line(device));
            }
            if verbose || matches.is_empty() {
                eprintln!(
                    "{} {} of {} records",
                    "Matched".cyan().bold(),
                    matches.len().to_string().white().bold(),
                    devices.len()
                );
            }
        }
    }
    Ok(())
}

fn compact_line(device: &CanonicalDevice) -> String {
    let mut line = format!(
        "{} {} {}",
        device.origin.label().dimmed(),
        device.identity.brand.white().bold(),
        device.identity.model.white()
    );
    if let Some(revision) = &device.identity.revision {
        line.push_str(&format!(" {}", revision));
    }
    let cpus: Vec<String> = device
        .chips_in(ChipCategory::Cpu)
        .map(|c| format!("{} {}", c.manufacturer, c.model).trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if !cpus.is_empty() {
        line.push_str(&format!("  {}", cpus.join(", ").cyan()));
    }
    if let Some(year) = device.years().iter().next() {
        line.push_str(&format!("  {}", year));
    }
    line.push_str(&format!("  [{}]", device.title.dimmed()));
    line
}
